use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::event::listener::{erased, insert_sorted, Listener, ListenerId, ListenerOptions};
use crate::event::Event;
use crate::kernel::error::Result;
use crate::utils::BoxFuture;

/// Ordered, filterable event dispatcher owned by one kernel.
///
/// Listener maps are guarded by short synchronous locks that are never held
/// across an `.await`: `emit` snapshots the effective listener list first, so
/// listeners may register or remove listeners while an emission is running.
pub struct EventManager {
    listeners: RwLock<HashMap<TypeId, Vec<Arc<Listener>>>>,
    global_listeners: RwLock<Vec<Arc<Listener>>>,
    next_listener_id: AtomicU64,
}

impl fmt::Debug for EventManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let typed_count: usize = self.listeners.read().values().map(Vec::len).sum();
        f.debug_struct("EventManager")
            .field("typed_listeners_count", &typed_count)
            .field("global_listeners_count", &self.global_listeners.read().len())
            .finish()
    }
}

impl EventManager {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            global_listeners: RwLock::new(Vec::new()),
            next_listener_id: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> ListenerId {
        self.next_listener_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Register an async handler for events of type `E`.
    ///
    /// Duplicate registrations are allowed and all of them run.
    pub fn add_listener<E, F>(&self, handler: F, options: ListenerOptions<E>) -> ListenerId
    where
        E: Event,
        F: for<'a> Fn(&'a E) -> BoxFuture<'a, Result<()>> + Send + Sync + 'static,
    {
        let id = self.next_id();
        let (order, filter) = options.into_parts();
        let invoke = erased(move |event: &(dyn Event + 'static)| {
            let typed = event.as_any().downcast_ref::<E>()?;
            if let Some(filter) = &filter {
                if !filter(typed) {
                    return None;
                }
            }
            Some(handler(typed))
        });

        let listener = Arc::new(Listener { id, order, invoke: Arc::new(invoke) });
        let mut listeners = self.listeners.write();
        insert_sorted(listeners.entry(TypeId::of::<E>()).or_default(), listener);
        log::trace!(
            "Registered listener {} for {} (order {})",
            id,
            crate::utils::short_type_name(std::any::type_name::<E>()),
            order
        );
        id
    }

    /// Register a synchronous handler for events of type `E`.
    pub fn add_sync_listener<E, F>(&self, handler: F, options: ListenerOptions<E>) -> ListenerId
    where
        E: Event,
        F: Fn(&E) -> Result<()> + Send + Sync + 'static,
    {
        self.add_listener(
            move |event: &E| {
                let result = handler(event);
                Box::pin(async move { result })
            },
            options,
        )
    }

    /// Remove a listener previously registered for `E`. Returns whether an
    /// entry was removed; unknown ids are a no-op.
    pub fn remove_listener<E: Event>(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let Some(entries) = listeners.get_mut(&TypeId::of::<E>()) else {
            return false;
        };
        let len_before = entries.len();
        entries.retain(|listener| listener.id != id);
        let removed = entries.len() < len_before;
        if entries.is_empty() {
            listeners.remove(&TypeId::of::<E>());
        }
        removed
    }

    /// Register a handler that runs for every event type.
    pub fn add_global_listener<F>(&self, handler: F, options: ListenerOptions<dyn Event>) -> ListenerId
    where
        F: for<'a> Fn(&'a (dyn Event + 'static)) -> BoxFuture<'a, Result<()>> + Send + Sync + 'static,
    {
        let id = self.next_id();
        let (order, filter) = options.into_parts();
        let invoke = erased(move |event: &(dyn Event + 'static)| {
            if let Some(filter) = &filter {
                if !filter(event) {
                    return None;
                }
            }
            Some(handler(event))
        });

        let listener = Arc::new(Listener { id, order, invoke: Arc::new(invoke) });
        insert_sorted(&mut self.global_listeners.write(), listener);
        log::trace!("Registered global listener {} (order {})", id, order);
        id
    }

    pub fn remove_global_listener(&self, id: ListenerId) -> bool {
        let mut global = self.global_listeners.write();
        let len_before = global.len();
        global.retain(|listener| listener.id != id);
        global.len() < len_before
    }

    /// Number of type-specific listeners registered for `E`.
    pub fn listener_count<E: Event>(&self) -> usize {
        self.listeners
            .read()
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    pub fn global_listener_count(&self) -> usize {
        self.global_listeners.read().len()
    }

    /// Drop every registration, typed and global.
    pub fn clear(&self) {
        self.listeners.write().clear();
        self.global_listeners.write().clear();
    }

    /// Effective listener list for one emission: type-specific entries followed
    /// by global ones, stable-sorted by order. On equal order the
    /// type-specific listener runs first.
    fn snapshot(&self, type_id: TypeId) -> Vec<Arc<Listener>> {
        let mut merged: Vec<Arc<Listener>> = self
            .listeners
            .read()
            .get(&type_id)
            .map(|entries| entries.to_vec())
            .unwrap_or_default();
        merged.extend(self.global_listeners.read().iter().cloned());
        merged.sort_by_key(|listener| listener.order);
        merged
    }

    /// Validate and deliver `event` to every interested listener, in order.
    ///
    /// A validation error means no listener runs. A listener error stops the
    /// chain and is returned as-is.
    pub async fn emit(&self, event: &(dyn Event + 'static)) -> Result<()> {
        let event_name = event.name();
        if let Err(e) = event.validate().await {
            log::debug!("Event {} rejected by validation: {}", event_name, e);
            return Err(e);
        }

        let listeners = self.snapshot(event.as_any().type_id());
        log::debug!("Emitting {} to {} listener(s)", event_name, listeners.len());

        for listener in listeners {
            let Some(pending) = (listener.invoke)(event) else {
                log::trace!("Listener {} skipped {}", listener.id, event_name);
                continue;
            };
            log::trace!("Listener {} handling {}", listener.id, event_name);
            if let Err(e) = pending.await {
                log::debug!("Listener {} failed on {}: {}", listener.id, event_name, e);
                return Err(e);
            }
        }
        Ok(())
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}
