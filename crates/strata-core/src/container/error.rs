//! # Strata Container Errors
//!
//! Errors raised while registering or resolving services.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Service not found: {service}")]
    ServiceNotFound { service: String },

    #[error("Circular dependency detected while resolving: {}", .path.join(" -> "))]
    CircularDependency { path: Vec<String> },

    #[error("Service '{service}' is registered with a different type than requested '{expected}'")]
    TypeMismatch { service: String, expected: &'static str },

    #[error("Parameter '{name}' could not be read: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Service '{service}' is no longer available (owner dropped)")]
    Unavailable { service: String },
}

impl ContainerError {
    pub fn code(&self) -> &'static str {
        match self {
            ContainerError::ServiceNotFound { .. } => "SERVICE_NOT_FOUND",
            ContainerError::CircularDependency { .. } => "SERVICE_CIRCULAR_DEPENDENCY",
            ContainerError::TypeMismatch { .. } => "SERVICE_TYPE_MISMATCH",
            ContainerError::InvalidParameter { .. } => "SERVICE_INVALID_PARAMETER",
            ContainerError::Unavailable { .. } => "SERVICE_UNAVAILABLE",
        }
    }
}
