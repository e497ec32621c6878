use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, error, trace};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;

use crate::container::error::ContainerError;
use crate::container::registration::{AnyService, Provider, Registration};
use crate::container::{Injectable, Scope, ServiceId, Token};
use crate::kernel::error::Result;

struct Entry {
    type_name: &'static str,
    provider: Provider,
    instance: Option<AnyService>,
}

/// The service registry shared by the kernel and every bundle.
///
/// Always handled through an `Arc`; the container registers itself under its
/// own type so services can depend on it.
pub struct ContainerInstance {
    entries: RwLock<HashMap<ServiceId, Entry>>,
}

impl ContainerInstance {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|weak| {
            let container = Self { entries: RwLock::new(HashMap::new()) };
            let weak = weak.clone();
            container.set(Registration::dynamic(
                ServiceId::of::<ContainerInstance>(),
                "ContainerInstance",
                move |_| {
                    weak.upgrade()
                        .map(|container| container as AnyService)
                        .ok_or_else(|| {
                            ContainerError::Unavailable { service: "ContainerInstance".to_string() }.into()
                        })
                },
            ));
            container
        })
    }

    /// Register or replace an entry. A replaced entry drops its cached instance.
    pub fn set(&self, registration: Registration) {
        trace!("Registering service {} ({:?})", registration.id, registration.provider);
        self.entries.write().insert(
            registration.id,
            Entry {
                type_name: registration.type_name,
                provider: registration.provider,
                instance: None,
            },
        );
    }

    pub fn set_value<T: Any + Send + Sync>(&self, value: T) {
        self.set(Registration::value(value));
    }

    pub fn set_arc<T: Any + Send + Sync>(&self, value: Arc<T>) {
        self.set(Registration::arc(value));
    }

    pub fn set_type<T: Injectable>(&self, scope: Scope) {
        self.set(Registration::class::<T>(scope));
    }

    pub fn set_factory<T, F>(&self, scope: Scope, factory: F)
    where
        T: Any + Send + Sync,
        F: Fn(&Resolver<'_>) -> Result<T> + Send + Sync + 'static,
    {
        self.set(Registration::factory(scope, factory));
    }

    pub fn set_token<T: Any + Send + Sync>(&self, token: &Token<T>, value: T) {
        self.set(Registration::token_value(token, value));
    }

    pub fn set_token_factory<T, F>(&self, token: &Token<T>, scope: Scope, factory: F)
    where
        T: Any + Send + Sync,
        F: Fn(&Resolver<'_>) -> Result<T> + Send + Sync + 'static,
    {
        self.set(Registration::token_factory(token, scope, factory));
    }

    pub fn set_parameter(&self, name: impl Into<String>, value: serde_json::Value) {
        self.set(Registration::parameter(name, value));
    }

    pub fn has(&self, id: &ServiceId) -> bool {
        self.entries.read().contains_key(id)
    }

    pub fn remove(&self, id: &ServiceId) -> bool {
        self.entries.write().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn ids(&self) -> Vec<ServiceId> {
        self.entries.read().keys().cloned().collect()
    }

    /// Resolve an injectable type, registering it as a container-scoped
    /// singleton on first use.
    pub fn get<T: Injectable>(&self) -> Result<Arc<T>> {
        Resolver::new(self).get::<T>()
    }

    /// Resolve `T`, falling back to a `T::default()` singleton when nothing is
    /// registered.
    pub fn get_or_default<T: Default + Any + Send + Sync>(&self) -> Result<Arc<T>> {
        Resolver::new(self).get_or_default::<T>()
    }

    /// Resolve a registered entry keyed by type. Never auto-registers.
    pub fn resolve<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
        Resolver::new(self).resolve::<T>()
    }

    pub fn get_token<T: Any + Send + Sync>(&self, token: &Token<T>) -> Result<Arc<T>> {
        Resolver::new(self).get_token(token)
    }

    pub fn parameter<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        Resolver::new(self).parameter(name)
    }

    pub fn get_by_id(&self, id: &ServiceId) -> Result<AnyService> {
        Resolver::new(self).get_by_id(id)
    }

    /// `Ok(None)` when `id` is not registered.
    fn lookup(&self, id: &ServiceId, resolver: &Resolver<'_>) -> Result<Option<AnyService>> {
        let (factory, scope) = {
            let entries = self.entries.read();
            let Some(entry) = entries.get(id) else {
                return Ok(None);
            };
            match &entry.provider {
                Provider::Value(value) => return Ok(Some(value.clone())),
                Provider::Factory { factory, scope } => {
                    if let Some(instance) = &entry.instance {
                        return Ok(Some(instance.clone()));
                    }
                    (factory.clone(), *scope)
                }
            }
        };

        // The lock is released while the factory runs; factories resolve
        // their own dependencies through the same container.
        let instance = {
            let _building = Building::enter(self, id)?;
            factory(resolver)?
        };

        if scope == Scope::Container {
            let mut entries = self.entries.write();
            if let Some(entry) = entries.get_mut(id) {
                return Ok(Some(entry.instance.get_or_insert(instance).clone()));
            }
        }
        Ok(Some(instance))
    }

    fn type_name(&self, id: &ServiceId) -> Option<&'static str> {
        self.entries.read().get(id).map(|entry| entry.type_name)
    }
}

impl fmt::Debug for ContainerInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerInstance").field("services", &self.len()).finish()
    }
}

/// Resolution context handed to factories and [`Injectable::construct`].
///
/// Services currently being built are tracked per thread and per container,
/// so asking for one that is already under construction fails with
/// [`ContainerError::CircularDependency`], even when the request goes through
/// [`Resolver::container`] instead of the resolver itself.
pub struct Resolver<'c> {
    container: &'c ContainerInstance,
}

impl<'c> Resolver<'c> {
    pub fn new(container: &'c ContainerInstance) -> Self {
        Self { container }
    }

    pub fn container(&self) -> &'c ContainerInstance {
        self.container
    }

    pub fn get<T: Injectable>(&self) -> Result<Arc<T>> {
        let id = ServiceId::of::<T>();
        if let Some(service) = self.container.lookup(&id, self)? {
            return downcast(&id, service);
        }
        debug!("Auto-registering injectable service {}", id);
        self.container.set(Registration::class::<T>(Scope::Container));
        self.registered(&id)
    }

    pub fn get_or_default<T: Default + Any + Send + Sync>(&self) -> Result<Arc<T>> {
        let id = ServiceId::of::<T>();
        if let Some(service) = self.container.lookup(&id, self)? {
            return downcast(&id, service);
        }
        debug!("Registering default instance for service {}", id);
        self.container.set(Registration::factory(Scope::Container, |_| Ok(T::default())));
        self.registered(&id)
    }

    pub fn resolve<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
        self.registered(&ServiceId::of::<T>())
    }

    pub fn get_token<T: Any + Send + Sync>(&self, token: &Token<T>) -> Result<Arc<T>> {
        self.registered(&token.service_id())
    }

    pub fn parameter<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let id = ServiceId::parameter(name);
        let value = self.registered::<serde_json::Value>(&id)?;
        serde_json::from_value(value.as_ref().clone()).map_err(|err| {
            ContainerError::InvalidParameter { name: name.to_string(), reason: err.to_string() }.into()
        })
    }

    pub fn get_by_id(&self, id: &ServiceId) -> Result<AnyService> {
        self.container.lookup(id, self)?.ok_or_else(|| not_found(id))
    }

    fn registered<T: Any + Send + Sync>(&self, id: &ServiceId) -> Result<Arc<T>> {
        let service = self.container.lookup(id, self)?.ok_or_else(|| not_found(id))?;
        downcast(id, service).inspect_err(|_| {
            if let Some(actual) = self.container.type_name(id) {
                debug!("Service {} holds a {}", id, actual);
            }
        })
    }
}

thread_local! {
    // Factories are synchronous, so a whole resolution chain runs on one thread.
    static BUILDING: RefCell<Vec<(usize, ServiceId)>> = const { RefCell::new(Vec::new()) };
}

/// Marks `id` as under construction in one container until dropped.
struct Building {
    container: usize,
}

impl Building {
    fn enter(container: &ContainerInstance, id: &ServiceId) -> Result<Self> {
        let key = container as *const ContainerInstance as usize;
        BUILDING.with(|building| {
            let mut building = building.borrow_mut();
            if building.iter().any(|(owner, entry)| *owner == key && entry == id) {
                let mut path: Vec<String> = building
                    .iter()
                    .filter(|(owner, _)| *owner == key)
                    .map(|(_, entry)| entry.to_string())
                    .collect();
                path.push(id.to_string());
                error!("Circular dependency: {}", path.join(" -> "));
                return Err(ContainerError::CircularDependency { path }.into());
            }
            building.push((key, id.clone()));
            Ok(Building { container: key })
        })
    }
}

impl Drop for Building {
    fn drop(&mut self) {
        BUILDING.with(|building| {
            let mut building = building.borrow_mut();
            if let Some(position) = building.iter().rposition(|(owner, _)| *owner == self.container) {
                building.remove(position);
            }
        });
    }
}

fn not_found(id: &ServiceId) -> crate::kernel::error::Error {
    error!("Service not found: {}", id);
    ContainerError::ServiceNotFound { service: id.to_string() }.into()
}

fn downcast<T: Any + Send + Sync>(id: &ServiceId, service: AnyService) -> Result<Arc<T>> {
    service.downcast::<T>().map_err(|_| {
        ContainerError::TypeMismatch {
            service: id.to_string(),
            expected: std::any::type_name::<T>(),
        }
        .into()
    })
}
