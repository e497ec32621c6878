//! # Strata Event System Errors
//!
//! Errors raised by the event manager itself. Listener failures are not
//! wrapped: whatever error a listener returns is handed back from `emit()`
//! unchanged.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventSystemError {
    #[error("Validation failed for event '{event_name}': {reason}")]
    ValidationFailed { event_name: String, reason: String },
}

impl EventSystemError {
    /// Convenience constructor for `Event::validate` implementations.
    pub fn validation(event_name: impl Into<String>, reason: impl Into<String>) -> Self {
        EventSystemError::ValidationFailed {
            event_name: event_name.into(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            EventSystemError::ValidationFailed { .. } => "EVENT_VALIDATION_FAILED",
        }
    }
}
