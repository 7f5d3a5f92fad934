//! Injected time and identity sources.
//!
//! The engine reads wall-clock time and mints job ids only through these
//! traits so tests can substitute deterministic implementations.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::Utc;

use crate::types::{JobId, Timestamp};

/// Length of generated job ids.
pub const JOB_ID_LEN: usize = 12;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Source of unique job ids.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> JobId;
}

/// The real UTC wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Random ids: the first 12 hex characters of a v4 UUID.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidJobIds;

impl IdGenerator for UuidJobIds {
    fn next_id(&self) -> JobId {
        let mut id = uuid::Uuid::new_v4().simple().to_string();
        id.truncate(JOB_ID_LEN);
        id
    }
}

/// Sequential ids (`job-000001`, `job-000002`, ...).
#[derive(Debug, Default)]
pub struct SequentialJobIds {
    next: AtomicU64,
}

impl IdGenerator for SequentialJobIds {
    fn next_id(&self) -> JobId {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        format!("job-{n:06}")
    }
}

/// A clock that advances by a fixed step on every read.
#[derive(Debug)]
pub struct SteppingClock {
    current: Mutex<Timestamp>,
    step: chrono::TimeDelta,
}

impl SteppingClock {
    pub fn new(start: Timestamp, step: chrono::TimeDelta) -> Self {
        Self {
            current: Mutex::new(start),
            step,
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> Timestamp {
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let now = *current;
        *current = now + self.step;
        now
    }
}
