//! # Strata Dependency Injection
//!
//! A keyed service registry. Identifiers ([`ServiceId`]) are either a Rust
//! type, an opaque [`Token`], a kernel parameter name, or a bundle type.
//! Registrations hold a literal value or a factory with a [`Scope`]:
//! container-scoped factories are materialised once and cached, transient
//! ones build a fresh instance on every resolution.
//!
//! Types implementing [`Injectable`] need no registration: the first
//! [`ContainerInstance::get`] registers them as container-scoped singletons.
//! Constructor dependencies are resolved through the [`Resolver`] handed to
//! `construct`, which also tracks the resolution path so circular
//! dependencies fail fast.
pub mod error;
pub mod instance;
pub mod registration;
pub mod token;

use std::any::{Any, TypeId};
use std::fmt;

use async_trait::async_trait;

use crate::kernel::error::Result;
use crate::utils::short_type_name;

pub use error::ContainerError;
pub use instance::{ContainerInstance, Resolver};
pub use registration::{Provider, Registration};
pub use token::Token;

/// Key of a container entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceId {
    /// A service keyed by its own type.
    Type { type_id: TypeId, name: &'static str },
    /// An opaque token.
    Token { id: u64, name: &'static str },
    /// A kernel parameter, published as `%name%`.
    Parameter(String),
    /// A bundle registered in the kernel, keyed by the bundle type.
    Bundle { type_id: TypeId, name: &'static str },
}

impl ServiceId {
    pub fn of<T: Any + ?Sized>() -> Self {
        ServiceId::Type {
            type_id: TypeId::of::<T>(),
            name: short_type_name(std::any::type_name::<T>()),
        }
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        ServiceId::Parameter(name.into())
    }

    pub fn bundle<B: Any>() -> Self {
        Self::bundle_from_parts(TypeId::of::<B>(), short_type_name(std::any::type_name::<B>()))
    }

    pub(crate) fn bundle_from_parts(type_id: TypeId, name: &'static str) -> Self {
        ServiceId::Bundle { type_id, name }
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceId::Type { name, .. } => write!(f, "{}", name),
            ServiceId::Token { id, name } => write!(f, "Token({}#{})", name, id),
            ServiceId::Parameter(name) => write!(f, "%{}%", name),
            ServiceId::Bundle { name, .. } => write!(f, "bundle:{}", name),
        }
    }
}

/// Lifetime of instances produced by a factory registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// One cached instance per container.
    #[default]
    Container,
    /// A fresh instance on every resolution.
    Transient,
}

/// A type the container knows how to build.
///
/// `construct` receives a [`Resolver`] for constructor dependencies; `inject`
/// runs right after construction for field-level dependencies. Both resolve
/// through the same container, so dependency graphs of any depth are built on
/// demand.
#[async_trait]
pub trait Injectable: Any + Send + Sync + Sized {
    fn construct(resolver: &Resolver<'_>) -> Result<Self>;

    fn inject(&mut self, _resolver: &Resolver<'_>) -> Result<()> {
        Ok(())
    }

    /// Activation hook awaited by kernel warm-up. No-op by default.
    async fn init(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests;
