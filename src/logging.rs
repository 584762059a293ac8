//! Logging utilities for structured tracing

use std::time::{Duration, Instant};

/// Track operation timing and log on drop
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    /// Create a new timer for an operation
    pub fn new(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }

    /// Time since the timer was started
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration_us = self.elapsed().as_micros() as u64;
        tracing::debug!(
            operation = %self.operation,
            duration_us = duration_us,
            "Operation completed"
        );
    }
}

/// Log a recovered error with structured context
///
/// Used at the boundaries where failures are swallowed so message delivery is never blocked.
pub fn log_error(operation: &str, group_id: &str, error: &impl std::error::Error) {
    tracing::error!(
        operation = %operation,
        group_id = %group_id,
        error = %error,
        error_kind = std::any::type_name_of_val(error),
        "Operation failed"
    );
}
