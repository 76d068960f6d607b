use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::debug;

/// File name of the activity list inside the application directory.
pub const ACTIVITY_LIST_FILE: &str = "activity_list.txt";

/// Names seeded into a fresh registry so the selector is never empty on
/// first launch.
pub const DEFAULT_ACTIVITIES: &[&str] = &["Study", "Game", "Watch YouTube", "Do Anything Unuseful"];

/// Whether `add` accepts a name that is already registered. The historical
/// behavior performed no check, which `Allow` reproduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    #[default]
    Reject,
    Allow,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("activity name cannot be empty")]
    EmptyName,
    #[error("activity {0:?} is already registered")]
    DuplicateName(String),
    #[error("activity {0:?} is not registered")]
    NotFound(String),
    #[error("failed to update activity list")]
    Io(#[from] std::io::Error),
}

/// The user-managed, ordered list of selectable activity names, backed by a
/// plain-text file with one name per line. Insertion order is display order.
pub struct ActivityRegistry {
    path: PathBuf,
    names: Vec<String>,
    duplicate_policy: DuplicatePolicy,
}

impl ActivityRegistry {
    /// Reads the activity list, seeding it with [DEFAULT_ACTIVITIES] when
    /// the file does not exist yet. Blank lines are skipped.
    pub fn load(dir: &Path, duplicate_policy: DuplicatePolicy) -> Result<Self> {
        let path = dir.join(ACTIVITY_LIST_FILE);
        if !path.exists() {
            let registry = Self {
                path,
                names: DEFAULT_ACTIVITIES.iter().map(|v| v.to_string()).collect(),
                duplicate_policy,
            };
            registry
                .write_all()
                .with_context(|| format!("failed to seed activity list {:?}", registry.path))?;
            return Ok(registry);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read activity list {path:?}"))?;
        let names = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();
        debug!("Loaded {} activities from {path:?}", names.len());
        Ok(Self {
            path,
            names,
            duplicate_policy,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Appends a name to the registry and to the backing file.
    pub fn add(&mut self, name: &str) -> Result<(), RegistryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.duplicate_policy == DuplicatePolicy::Reject && self.names.iter().any(|v| v == name)
        {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }

        self.names.push(name.to_string());
        if let Err(e) = self.append_line(name) {
            // keep memory consistent with disk if the write failed
            self.names.pop();
            return Err(e.into());
        }
        Ok(())
    }

    /// Removes the first occurrence of a name and rewrites the backing file
    /// with the remaining ordered set. An empty registry is a valid state.
    pub fn remove(&mut self, name: &str) -> Result<(), RegistryError> {
        let Some(position) = self.names.iter().position(|v| v == name) else {
            return Err(RegistryError::NotFound(name.to_string()));
        };
        let removed = self.names.remove(position);
        if let Err(e) = self.write_all() {
            self.names.insert(position, removed);
            return Err(e.into());
        }
        Ok(())
    }

    fn append_line(&self, name: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{name}")
    }

    fn write_all(&self) -> std::io::Result<()> {
        let mut contents = self.names.join("\n");
        contents.push('\n');
        std::fs::write(&self.path, contents)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::{ActivityRegistry, DEFAULT_ACTIVITIES, DuplicatePolicy, RegistryError};

    #[test]
    fn seeds_default_set_when_file_is_absent() -> Result<()> {
        let dir = tempdir()?;
        let registry = ActivityRegistry::load(dir.path(), DuplicatePolicy::Reject)?;
        assert_eq!(registry.names(), DEFAULT_ACTIVITIES);

        let on_disk = std::fs::read_to_string(dir.path().join("activity_list.txt"))?;
        assert_eq!(
            on_disk.lines().collect::<Vec<_>>(),
            DEFAULT_ACTIVITIES.to_vec()
        );
        Ok(())
    }

    #[test]
    fn add_then_reload_round_trips() -> Result<()> {
        let dir = tempdir()?;
        let mut registry = ActivityRegistry::load(dir.path(), DuplicatePolicy::Reject)?;
        registry.add("Practice guitar")?;

        let reloaded = ActivityRegistry::load(dir.path(), DuplicatePolicy::Reject)?;
        assert!(reloaded.names().iter().any(|v| v == "Practice guitar"));
        // insertion order is display order
        assert_eq!(reloaded.names().last().unwrap(), "Practice guitar");
        Ok(())
    }

    #[test]
    fn remove_then_reload_drops_the_name() -> Result<()> {
        let dir = tempdir()?;
        let mut registry = ActivityRegistry::load(dir.path(), DuplicatePolicy::Reject)?;
        registry.remove("Game")?;

        let reloaded = ActivityRegistry::load(dir.path(), DuplicatePolicy::Reject)?;
        assert!(!reloaded.names().iter().any(|v| v == "Game"));
        assert_eq!(reloaded.names().len(), DEFAULT_ACTIVITIES.len() - 1);
        Ok(())
    }

    #[test]
    fn empty_name_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let mut registry = ActivityRegistry::load(dir.path(), DuplicatePolicy::Reject)?;
        assert!(matches!(registry.add(""), Err(RegistryError::EmptyName)));
        assert!(matches!(registry.add("  "), Err(RegistryError::EmptyName)));
        Ok(())
    }

    #[test]
    fn duplicate_policy_controls_repeated_names() -> Result<()> {
        let dir = tempdir()?;
        let mut rejecting = ActivityRegistry::load(dir.path(), DuplicatePolicy::Reject)?;
        assert!(matches!(
            rejecting.add("Study"),
            Err(RegistryError::DuplicateName(_))
        ));

        let dir = tempdir()?;
        let mut allowing = ActivityRegistry::load(dir.path(), DuplicatePolicy::Allow)?;
        allowing.add("Study")?;
        assert_eq!(
            allowing.names().iter().filter(|v| *v == "Study").count(),
            2
        );
        Ok(())
    }

    #[test]
    fn removing_unknown_name_reports_not_found() -> Result<()> {
        let dir = tempdir()?;
        let mut registry = ActivityRegistry::load(dir.path(), DuplicatePolicy::Reject)?;
        assert!(matches!(
            registry.remove("Skydiving"),
            Err(RegistryError::NotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn all_removed_is_a_valid_state() -> Result<()> {
        let dir = tempdir()?;
        let mut registry = ActivityRegistry::load(dir.path(), DuplicatePolicy::Reject)?;
        for name in DEFAULT_ACTIVITIES {
            registry.remove(name)?;
        }
        assert!(registry.is_empty());

        let reloaded = ActivityRegistry::load(dir.path(), DuplicatePolicy::Reject)?;
        assert!(reloaded.is_empty());
        Ok(())
    }
}
