//! # Strata Kernel Errors
//!
//! Defines [`Error`], the crate-wide error enum. Subsystem errors
//! ([`ContainerError`], [`EventSystemError`], [`ConfigError`]) are wrapped via
//! `#[from]` so every fallible operation in the crate returns [`Result`].
//!
//! Each variant carries a stable [`Error::code`] that callers can match on or
//! log without depending on the human-readable message.
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::bundle::BundlePhase;
use crate::container::error::ContainerError;
use crate::event::error::EventSystemError;
use crate::kernel::phase::KernelPhase;

#[derive(Debug, ThisError)]
pub enum Error {
    /// A mutation was attempted after the kernel finished `init()`.
    #[error("Kernel is frozen: cannot {operation} after initialisation")]
    KernelFrozen { operation: String },

    /// A kernel lifecycle operation was called in the wrong phase.
    #[error("Kernel lifecycle error during {phase}: {message}")]
    KernelLifecycle { phase: KernelPhase, message: String },

    /// The same bundle type was added twice.
    #[error("Bundle '{bundle}' is already registered in this kernel")]
    BundleSingleInstance { bundle: String },

    /// A phase change was requested on a bundle that is frozen or shut down.
    #[error("Bundle '{bundle}' is frozen and cannot move to phase {requested}")]
    BundleFrozen { bundle: String, requested: BundlePhase },

    #[error("Bundle '{bundle}' cannot move from phase {from} to {to}")]
    InvalidPhaseTransition { bundle: String, from: BundlePhase, to: BundlePhase },

    #[error("Bundle '{bundle}' requires bundle '{dependency}', which is not registered in the kernel")]
    BundleDependencyMissing { bundle: String, dependency: String },

    #[error("Invalid configuration for bundle '{bundle}': {message}")]
    InvalidConfig { bundle: String, message: String },

    #[error("Method '{method}' is not implemented")]
    MethodNotImplemented { method: String },

    #[error("Missing required kernel parameter '{name}'")]
    MissingParameter { name: String },

    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    #[error("Event system error: {0}")]
    EventSystem(#[from] EventSystemError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Errors raised while loading kernel parameters from files or the environment.
#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported configuration format for '{path}'")]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to parse {format} configuration '{path}': {message}")]
    Parse { format: &'static str, path: PathBuf, message: String },

    #[error("Invalid value '{value}' for '{key}': expected one of {expected}")]
    InvalidValue { key: String, value: String, expected: &'static str },
}

impl Error {
    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Error::KernelFrozen { .. } => "KERNEL_FROZEN",
            Error::KernelLifecycle { .. } => "KERNEL_LIFECYCLE",
            Error::BundleSingleInstance { .. } => "BUNDLE_SINGLE_INSTANCE",
            Error::BundleFrozen { .. } => "BUNDLE_FROZEN",
            Error::InvalidPhaseTransition { .. } => "BUNDLE_INVALID_PHASE_TRANSITION",
            Error::BundleDependencyMissing { .. } => "BUNDLE_DEPENDENCY_MISSING",
            Error::InvalidConfig { .. } => "BUNDLE_INVALID_CONFIG",
            Error::MethodNotImplemented { .. } => "METHOD_NOT_IMPLEMENTED",
            Error::MissingParameter { .. } => "MISSING_PARAMETER",
            Error::Container(e) => e.code(),
            Error::EventSystem(e) => e.code(),
            Error::Config(_) => "CONFIG",
            Error::Other(_) => "OTHER",
        }
    }

    pub fn not_implemented(method: impl Into<String>) -> Self {
        Error::MethodNotImplemented { method: method.into() }
    }

    pub fn missing_parameter(name: impl Into<String>) -> Self {
        Error::MissingParameter { name: name.into() }
    }
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
