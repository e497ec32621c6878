use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::container::{Injectable, Resolver, Scope, ServiceId, Token};
use crate::kernel::error::Result;
use crate::utils::short_type_name;

pub type AnyService = Arc<dyn Any + Send + Sync>;

/// Type-erased factory stored by the container.
pub type Factory = Arc<dyn Fn(&Resolver<'_>) -> Result<AnyService> + Send + Sync>;

/// What a registration resolves to.
#[derive(Clone)]
pub enum Provider {
    /// A literal, already materialised value.
    Value(AnyService),
    /// Built on demand according to `scope`.
    Factory { factory: Factory, scope: Scope },
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Value(_) => f.write_str("Value"),
            Provider::Factory { scope, .. } => f.debug_struct("Factory").field("scope", scope).finish(),
        }
    }
}

/// One entry to hand to [`ContainerInstance::set`](crate::container::ContainerInstance::set).
#[derive(Debug, Clone)]
pub struct Registration {
    pub(crate) id: ServiceId,
    pub(crate) type_name: &'static str,
    pub(crate) provider: Provider,
}

fn erase_factory<F>(f: F) -> Factory
where
    F: Fn(&Resolver<'_>) -> Result<AnyService> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn typed_factory<T, F>(f: F) -> Factory
where
    T: Any + Send + Sync,
    F: Fn(&Resolver<'_>) -> Result<T> + Send + Sync + 'static,
{
    erase_factory(move |resolver| f(resolver).map(|value| Arc::new(value) as AnyService))
}

fn class_factory<T: Injectable>() -> Factory {
    typed_factory(|resolver| {
        let mut instance = T::construct(resolver)?;
        instance.inject(resolver)?;
        Ok(instance)
    })
}

impl Registration {
    pub fn new(id: ServiceId, type_name: &'static str, provider: Provider) -> Self {
        Self { id, type_name, provider }
    }

    /// Register `value` under its own type.
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Self::arc(Arc::new(value))
    }

    /// Register an existing shared instance under its own type.
    pub fn arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self::new(ServiceId::of::<T>(), type_name_of::<T>(), Provider::Value(value))
    }

    /// Register `T` to be built through [`Injectable::construct`].
    pub fn class<T: Injectable>(scope: Scope) -> Self {
        Self::new(
            ServiceId::of::<T>(),
            type_name_of::<T>(),
            Provider::Factory { factory: class_factory::<T>(), scope },
        )
    }

    /// Register `T` to be built by a custom factory.
    pub fn factory<T, F>(scope: Scope, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Resolver<'_>) -> Result<T> + Send + Sync + 'static,
    {
        Self::new(
            ServiceId::of::<T>(),
            type_name_of::<T>(),
            Provider::Factory { factory: typed_factory(factory), scope },
        )
    }

    pub fn token_value<T: Any + Send + Sync>(token: &Token<T>, value: T) -> Self {
        Self::new(token.service_id(), type_name_of::<T>(), Provider::Value(Arc::new(value)))
    }

    pub fn token_factory<T, F>(token: &Token<T>, scope: Scope, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Resolver<'_>) -> Result<T> + Send + Sync + 'static,
    {
        Self::new(
            token.service_id(),
            type_name_of::<T>(),
            Provider::Factory { factory: typed_factory(factory), scope },
        )
    }

    /// A kernel parameter value, resolved with `ContainerInstance::parameter`.
    pub fn parameter(name: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(
            ServiceId::parameter(name),
            "serde_json::Value",
            Provider::Value(Arc::new(value)),
        )
    }

    /// Factory that is never cached, keyed by an arbitrary id.
    pub(crate) fn dynamic<F>(id: ServiceId, type_name: &'static str, factory: F) -> Self
    where
        F: Fn(&Resolver<'_>) -> Result<AnyService> + Send + Sync + 'static,
    {
        Self::new(
            id,
            type_name,
            Provider::Factory { factory: erase_factory(factory), scope: Scope::Transient },
        )
    }

    pub fn id(&self) -> &ServiceId {
        &self.id
    }

    pub fn scope(&self) -> Option<Scope> {
        match &self.provider {
            Provider::Value(_) => None,
            Provider::Factory { scope, .. } => Some(*scope),
        }
    }
}

fn type_name_of<T: ?Sized>() -> &'static str {
    short_type_name(std::any::type_name::<T>())
}
