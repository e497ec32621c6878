#![cfg(test)]

use crate::event::error::EventSystemError;
use crate::kernel::error::Error;

#[test]
fn test_event_system_error_display() {
    let err = EventSystemError::validation("UserCreatedEvent", "missing user id");
    assert_eq!(
        format!("{}", err),
        "Validation failed for event 'UserCreatedEvent': missing user id"
    );
    assert_eq!(err.code(), "EVENT_VALIDATION_FAILED");
}

#[test]
fn test_event_system_error_wraps_into_kernel_error() {
    let err: Error = EventSystemError::validation("A", "b").into();
    assert_eq!(err.code(), "EVENT_VALIDATION_FAILED");
    assert!(matches!(err, Error::EventSystem(EventSystemError::ValidationFailed { .. })));
    assert!(err.to_string().starts_with("Event system error:"));
}
