//! # Strata Core
//!
//! Composition kernel for Strata applications. Features are packaged as
//! [`Bundle`]s, handed to a [`Kernel`], and driven together through one phase
//! sequence (setup, extend, hook, prepare, init). Bundles share a dependency
//! injection [`ContainerInstance`] and coordinate through the [`EventManager`].
pub mod bundle;
pub mod container;
pub mod event;
pub mod kernel;
pub mod utils;

// Re-export key public types/traits for easier use by the binary and bundles
pub use bundle::{Bundle, BundleConfig, BundlePhase, BundleRef, BundleState};
pub use container::{ContainerInstance, Injectable, Resolver, Scope, ServiceId, Token};
pub use event::{Event, EventManager, ListenerId, ListenerOptions};
pub use kernel::error::Error as KernelError;
pub use kernel::{Kernel, KernelOptions, KernelParameters, KernelPhase};

#[cfg(test)]
mod tests;
