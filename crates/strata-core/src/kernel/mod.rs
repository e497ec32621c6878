//! # Strata Kernel
//!
//! The `kernel` module is the composition root of a Strata application.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Lifecycle driving**: [`Kernel`](bootstrap::Kernel) owns the ordered
//!   bundle list and runs every bundle through setup, extend, hook, prepare
//!   and init, emitting the lifecycle events in [`events`] around each step.
//!   All bundles finish preparing before any bundle initialises.
//! - **Shared services**: each kernel owns one
//!   [`ContainerInstance`](crate::container::ContainerInstance) and one
//!   [`EventManager`](crate::event::EventManager), published in the container
//!   together with the kernel itself and its [`KernelParameters`].
//! - **Parameters**: [`parameters`] loads the debug/testing flags and the
//!   deployment context from files or the environment.
//! - **Error Handling**: the crate-wide [`Error`](error::Error) and `Result`.
pub mod bootstrap;
pub mod constants;
pub mod error;
pub mod events;
pub mod parameters;
pub mod phase;
pub mod warmup;

pub use bootstrap::{Kernel, KernelOptions};
pub use error::{Error, Result};
pub use parameters::{ExecutionContext, KernelContext, KernelParameters};
pub use phase::KernelPhase;
pub use warmup::ServiceWarmup;

// Test module declaration
#[cfg(test)]
mod tests;
