//! Cooperative cancellation
//!
//! The core has no ambient timers; bounded-time extraction works by
//! threading a [`Deadline`] through entry points and checking it at
//! traversal boundaries. Expiry surfaces as [`Error::Timeout`], a
//! recoverable condition batch callers use to skip one input.

use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// An optional point in time after which work should stop.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// No deadline; checks always pass.
    pub fn none() -> Self {
        Deadline(None)
    }

    /// A deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Deadline(Some(Instant::now() + timeout))
    }

    /// A deadline from an optional timeout.
    pub fn from_timeout(timeout: Option<Duration>) -> Self {
        match timeout {
            Some(t) => Self::after(t),
            None => Self::none(),
        }
    }

    /// Whether the deadline has passed.
    pub fn expired(&self) -> bool {
        matches!(self.0, Some(t) if Instant::now() >= t)
    }

    /// Fail with [`Error::Timeout`] if the deadline has passed.
    pub fn check(&self) -> Result<()> {
        if self.expired() {
            Err(Error::Timeout)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_never_expires() {
        let d = Deadline::none();
        assert!(!d.expired());
        d.check().unwrap();
    }

    #[test]
    fn test_zero_timeout_expires_immediately() {
        let d = Deadline::after(Duration::ZERO);
        assert!(d.expired());
        assert!(matches!(d.check(), Err(Error::Timeout)));
    }

    #[test]
    fn test_generous_timeout_passes() {
        let d = Deadline::after(Duration::from_secs(3600));
        d.check().unwrap();
    }
}
