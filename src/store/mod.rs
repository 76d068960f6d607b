pub mod entities;

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::debug;

use entities::SessionRecord;

/// File name of the session table inside the application directory.
pub const SESSION_TABLE_FILE: &str = "activities.csv";

/// The persisted table of all completed session records. Loaded whole at
/// startup; every append rewrites the file from the in-memory table, so the
/// file is always a full, valid snapshot.
pub struct SessionStore {
    path: PathBuf,
    records: Vec<SessionRecord>,
}

impl SessionStore {
    /// Opens the session table, creating a header-only file when none
    /// exists yet.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(SESSION_TABLE_FILE);
        if !path.exists() {
            let store = Self {
                path,
                records: Vec::new(),
            };
            store.write_all()?;
            return Ok(store);
        }

        let file = File::open(&path)
            .with_context(|| format!("failed to open session table {path:?}"))?;
        let mut reader = csv::Reader::from_reader(file);
        let mut records = Vec::new();
        for row in reader.deserialize::<SessionRecord>() {
            records.push(row.with_context(|| format!("corrupt row in {path:?}"))?);
        }
        debug!("Loaded {} session records from {path:?}", records.len());
        Ok(Self { path, records })
    }

    /// Appends one completed record and persists the whole table.
    pub fn append(&mut self, record: SessionRecord) -> Result<()> {
        self.records.push(record);
        if let Err(e) = self.write_all() {
            // keep memory consistent with disk if the write failed
            self.records.pop();
            return Err(e);
        }
        Ok(())
    }

    pub fn all(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    fn write_all(&self) -> Result<()> {
        let file = File::create(&self.path)
            .with_context(|| format!("failed to write session table {:?}", self.path))?;
        let mut writer = csv::Writer::from_writer(file);
        if self.records.is_empty() {
            // serde only emits the header alongside a record, so an empty
            // table writes its header row explicitly.
            writer.write_record(["Activity", "Start Time", "End Time", "Duration", "Notes"])?;
        } else {
            for record in &self.records {
                writer.serialize(record)?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}
