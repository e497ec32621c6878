use std::fmt;
use std::sync::Arc;

use crate::event::Event;
use crate::kernel::error::Result;
use crate::utils::BoxFuture;

/// Identifier returned by every listener registration, used for removal.
pub type ListenerId = u64;

/// Registration options: ordering and filtering.
///
/// `E` is the event type the filter sees; global listeners use `dyn Event`.
pub struct ListenerOptions<E: ?Sized> {
    order: i32,
    filter: Option<Arc<dyn Fn(&E) -> bool + Send + Sync>>,
}

impl<E: ?Sized> ListenerOptions<E> {
    pub fn new() -> Self {
        Self { order: 0, filter: None }
    }

    /// Lower values run first. Defaults to 0.
    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Skip the handler whenever `filter` returns false for the event.
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn get_order(&self) -> i32 {
        self.order
    }

    pub(crate) fn into_parts(self) -> (i32, Option<Arc<dyn Fn(&E) -> bool + Send + Sync>>) {
        (self.order, self.filter)
    }
}

impl<E: ?Sized> Default for ListenerOptions<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ?Sized> fmt::Debug for ListenerOptions<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerOptions")
            .field("order", &self.order)
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

/// Type-erased handler. Returns `None` when the filter (or the downcast)
/// rejects the event, otherwise the handler's future.
pub(crate) type ErasedHandler =
    Arc<dyn for<'a> Fn(&'a (dyn Event + 'static)) -> Option<BoxFuture<'a, Result<()>>> + Send + Sync>;

/// A stored registration entry.
pub(crate) struct Listener {
    pub(crate) id: ListenerId,
    pub(crate) order: i32,
    pub(crate) invoke: ErasedHandler,
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

/// Pins the higher-ranked signature so closures can return futures that
/// borrow the event.
pub(crate) fn erased<F>(f: F) -> F
where
    F: for<'a> Fn(&'a (dyn Event + 'static)) -> Option<BoxFuture<'a, Result<()>>> + Send + Sync + 'static,
{
    f
}

/// Insert keeping the list sorted by ascending order; equal orders keep
/// registration order.
pub(crate) fn insert_sorted(list: &mut Vec<Arc<Listener>>, listener: Arc<Listener>) {
    let position = list.partition_point(|existing| existing.order <= listener.order);
    list.insert(position, listener);
}
