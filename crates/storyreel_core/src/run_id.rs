//! Run identifiers derived from wall-clock start time.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Identifier of one pipeline run.
///
/// Formatted as `YYYYMMDD_HHMMSS`, with a `_N` suffix when several runs start
/// within the same second in one process. Used as the correlation key in logs
/// and as a filename component for the final video and the metadata record.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Wrap an existing identifier, e.g. one read back from a metadata file.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier for a run started at `started_at`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Local, TimeZone};
    /// use storyreel_core::RunId;
    ///
    /// let started = Local.with_ymd_and_hms(2026, 10, 19, 14, 5, 9).unwrap();
    /// assert_eq!(RunId::from_timestamp(&started).as_str(), "20261019_140509");
    /// ```
    pub fn from_timestamp(started_at: &DateTime<Local>) -> Self {
        Self(started_at.format("%Y%m%d_%H%M%S").to_string())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Source of the current time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current local time.
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock frozen at a single instant, for deterministic runs in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Local>);

impl FixedClock {
    /// Create a clock that always reports `instant`.
    pub fn new(instant: DateTime<Local>) -> Self {
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// Hands out run identifiers that are distinct within a process.
///
/// Two runs started within the same second receive `base`, `base_2`,
/// `base_3`, and so on.
///
/// # Examples
///
/// ```
/// use chrono::{Local, TimeZone};
/// use std::sync::Arc;
/// use storyreel_core::{FixedClock, RunIdGenerator};
///
/// let clock = FixedClock::new(Local.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap());
/// let ids = RunIdGenerator::new(Arc::new(clock));
/// assert_eq!(ids.next_id().as_str(), "20261019_090000");
/// assert_eq!(ids.next_id().as_str(), "20261019_090000_2");
/// ```
#[derive(Debug)]
pub struct RunIdGenerator {
    clock: Arc<dyn Clock>,
    last: Mutex<Option<(String, u32)>>,
}

impl RunIdGenerator {
    /// Create a generator reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last: Mutex::new(None),
        }
    }

    /// Current time according to the generator's clock.
    pub fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    /// Next identifier.
    pub fn next_id(&self) -> RunId {
        let base = RunId::from_timestamp(&self.clock.now()).0;
        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let sequence = match last.as_ref() {
            Some((previous, sequence)) if *previous == base => sequence + 1,
            _ => 1,
        };
        *last = Some((base.clone(), sequence));

        if sequence == 1 {
            RunId(base)
        } else {
            RunId(format!("{}_{}", base, sequence))
        }
    }
}

impl Default for RunIdGenerator {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sequence_resets_when_second_changes() {
        #[derive(Debug)]
        struct SteppingClock(Mutex<i64>);

        impl Clock for SteppingClock {
            fn now(&self) -> DateTime<Local> {
                let mut calls = self.0.lock().unwrap();
                *calls += 1;
                // Two calls per second
                let second = ((*calls - 1) / 2) as u32;
                Local.with_ymd_and_hms(2026, 1, 2, 3, 4, second).unwrap()
            }
        }

        let ids = RunIdGenerator::new(Arc::new(SteppingClock(Mutex::new(0))));
        assert_eq!(ids.next_id().as_str(), "20260102_030400");
        assert_eq!(ids.next_id().as_str(), "20260102_030400_2");
        assert_eq!(ids.next_id().as_str(), "20260102_030401");
        assert_eq!(ids.next_id().as_str(), "20260102_030401_2");
    }

    #[test]
    fn test_ids_order_by_start_time() {
        let earlier = RunId::from_timestamp(&Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap());
        let later = RunId::from_timestamp(&Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 6).unwrap());
        assert!(earlier < later);
    }
}
