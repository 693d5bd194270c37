use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Errors raised by a time source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("Clock unavailable: {reason}")]
    ClockUnavailable { reason: String },
}

/// Clock abstraction for testability
pub trait Clock: Send + Sync {
    /// Current Unix time in milliseconds
    fn now_millis(&self) -> Result<i64, ClockError>;
}

/// Floor epoch milliseconds to whole epoch seconds.
pub fn epoch_seconds(millis: i64) -> i64 {
    millis.div_euclid(1000)
}

/// System clock implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> Result<i64, ClockError> {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ClockError::ClockUnavailable {
                reason: format!("system time is before the Unix epoch: {}", e),
            })?;

        i64::try_from(elapsed.as_millis()).map_err(|_| ClockError::ClockUnavailable {
            reason: "system time overflows i64 milliseconds".to_string(),
        })
    }
}

/// Settable clock. Clones share the same underlying time, so a test can keep
/// one handle while the store owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    millis: Arc<AtomicI64>,
    available: Arc<AtomicBool>,
}

impl ManualClock {
    pub fn new(millis: i64) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(millis)),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn set_millis(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    pub fn advance_millis(&self, delta: i64) {
        self.millis.fetch_add(delta, Ordering::SeqCst);
    }

    /// While unavailable every read fails with `ClockUnavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> Result<i64, ClockError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(ClockError::ClockUnavailable {
                reason: "manual clock marked unavailable".to_string(),
            });
        }
        Ok(self.millis.load(Ordering::SeqCst))
    }
}
