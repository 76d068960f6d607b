use chrono::{Duration, NaiveDateTime};
use tracing::info;

use crate::{
    store::entities::SessionRecord,
    utils::clock::{Clock, SystemClock},
};

/// Placeholder stored when the user supplies no notes.
pub const NO_NOTES: &str = "No notes";

/// The in-progress, not-yet-persisted timed activity. At most one exists at
/// a time and it is lost if the process exits before `stop`.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSession {
    pub activity: String,
    pub start_time: NaiveDateTime,
    pub notes: String,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TimerError {
    #[error("please select an activity")]
    EmptyActivity,
    #[error("{activity:?} is already running")]
    AlreadyRunning { activity: String },
    #[error("no activity is running")]
    NotRunning,
}

/// Two-state timer: Idle when `active` is None, Running otherwise. Misuse
/// (start while running, stop while idle) is reported, never fatal.
pub struct SessionTimer<C = SystemClock> {
    clock: C,
    active: Option<ActiveSession>,
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> SessionTimer<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            active: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn current(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    /// Starts timing `activity`, capturing the current moment. Empty notes
    /// are replaced with the [NO_NOTES] sentinel.
    pub fn start(&mut self, activity: &str, notes: &str) -> Result<&ActiveSession, TimerError> {
        if activity.trim().is_empty() {
            return Err(TimerError::EmptyActivity);
        }
        if let Some(active) = &self.active {
            return Err(TimerError::AlreadyRunning {
                activity: active.activity.clone(),
            });
        }

        let notes = if notes.trim().is_empty() {
            NO_NOTES.to_string()
        } else {
            notes.to_string()
        };
        let session = ActiveSession {
            activity: activity.to_string(),
            start_time: self.clock.now(),
            notes,
        };
        info!("Started {:?} at {}", session.activity, session.start_time);
        Ok(self.active.insert(session))
    }

    /// Stops the running session and returns the finished record. The caller
    /// is responsible for appending it to the session store.
    pub fn stop(&mut self) -> Result<SessionRecord, TimerError> {
        let Some(session) = self.active.take() else {
            return Err(TimerError::NotRunning);
        };

        let end_time = self.clock.now();
        let duration_hours = (end_time - session.start_time).num_seconds() as f64 / 3600.0;
        info!(
            "Stopped {:?} after {:.4} hours",
            session.activity, duration_hours
        );
        Ok(SessionRecord {
            activity: session.activity,
            start_time: session.start_time,
            end_time,
            duration_hours,
            notes: session.notes,
        })
    }

    /// Time since start, None while idle. Drives the periodic display
    /// refresh.
    pub fn elapsed(&self) -> Option<Duration> {
        self.active
            .as_ref()
            .map(|session| self.clock.now() - session.start_time)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use anyhow::Result;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    use super::{NO_NOTES, SessionTimer, TimerError};
    use crate::utils::clock::Clock;

    /// Clock advanced by hand so durations are exact.
    #[derive(Clone)]
    struct ManualClock {
        moment: Rc<Cell<NaiveDateTime>>,
    }

    impl ManualClock {
        fn start_of_2024() -> Self {
            let moment = NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap();
            Self {
                moment: Rc::new(Cell::new(moment)),
            }
        }

        fn advance(&self, duration: Duration) {
            self.moment.set(self.moment.get() + duration);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> NaiveDateTime {
            self.moment.get()
        }
    }

    #[test]
    fn start_then_stop_yields_one_record_with_derived_duration() -> Result<()> {
        let clock = ManualClock::start_of_2024();
        let mut timer = SessionTimer::new(clock.clone());

        timer.start("Study", "algebra")?;
        clock.advance(Duration::minutes(90));
        let record = timer.stop()?;

        assert_eq!(record.activity, "Study");
        assert_eq!(record.notes, "algebra");
        assert_eq!(record.end_time - record.start_time, Duration::minutes(90));
        assert!((record.duration_hours - 1.5).abs() < 1e-9);
        assert!(!timer.is_running());
        Ok(())
    }

    #[test]
    fn empty_notes_become_the_sentinel() -> Result<()> {
        let mut timer = SessionTimer::new(ManualClock::start_of_2024());
        let session = timer.start("Study", "  ")?;
        assert_eq!(session.notes, NO_NOTES);
        Ok(())
    }

    #[test]
    fn start_requires_an_activity() {
        let mut timer = SessionTimer::new(ManualClock::start_of_2024());
        assert_eq!(timer.start("", "notes"), Err(TimerError::EmptyActivity));
        assert!(!timer.is_running());
    }

    #[test]
    fn start_while_running_leaves_the_session_untouched() -> Result<()> {
        let clock = ManualClock::start_of_2024();
        let mut timer = SessionTimer::new(clock.clone());
        timer.start("Study", "")?;
        let before = timer.current().cloned();

        clock.advance(Duration::minutes(5));
        assert_eq!(
            timer.start("Game", ""),
            Err(TimerError::AlreadyRunning {
                activity: "Study".into()
            })
        );
        assert_eq!(timer.current().cloned(), before);
        Ok(())
    }

    #[test]
    fn stop_while_idle_is_a_reported_failure() {
        let mut timer = SessionTimer::new(ManualClock::start_of_2024());
        assert_eq!(timer.stop(), Err(TimerError::NotRunning));
    }

    #[test]
    fn elapsed_tracks_the_clock_and_clears_on_stop() -> Result<()> {
        let clock = ManualClock::start_of_2024();
        let mut timer = SessionTimer::new(clock.clone());
        assert_eq!(timer.elapsed(), None);

        timer.start("Study", "")?;
        clock.advance(Duration::seconds(42));
        assert_eq!(timer.elapsed(), Some(Duration::seconds(42)));

        timer.stop()?;
        assert_eq!(timer.elapsed(), None);
        Ok(())
    }
}
