//! # Strata Event System
//!
//! In-process, typed publish/subscribe used for cross-bundle coordination.
//!
//! Listeners are keyed by the concrete event type (exact `TypeId` match, no
//! inheritance). Each carries an `order` (lower runs first) and an optional
//! filter. Global listeners run for every event type and are merged with the
//! type-specific ones at emission time. Emission is sequential: each listener
//! is awaited before the next one starts, and the first error stops the chain.
pub mod error;
pub mod listener;
pub mod manager;

use std::fmt;

use async_trait::async_trait;

use crate::kernel::error::Result;
use crate::utils::{short_type_name, AsAny};

/// Core event trait.
///
/// Events are plain structs; by convention the payload lives in a public
/// `data` field set at construction. The dispatch key is the concrete type.
#[async_trait]
pub trait Event: AsAny + fmt::Debug + Send + Sync {
    /// Name of the concrete event type, e.g. `"BundleBeforePrepareEvent"`.
    fn name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Checked before any listener runs. An error aborts the emission.
    async fn validate(&self) -> Result<()> {
        Ok(())
    }
}

pub use error::EventSystemError;
pub use listener::{ListenerId, ListenerOptions};
pub use manager::EventManager;

// Test module declaration
#[cfg(test)]
mod tests;
