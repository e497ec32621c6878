//! Small helpers shared across the kernel: the asymmetric deep merge used for
//! bundle configuration, type-name shortening, and the `AsAny` bridge used to
//! downcast trait objects.
pub mod merge;

use std::any::Any;
use std::future::Future;
use std::pin::Pin;

pub use merge::deep_merge;

/// Owned, sendable future used by listeners, factories and warm-up hooks.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Downcasting bridge implemented for every `'static` type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Strip the module path (and generic arguments) from a type name.
///
/// `my_app::bundles::SecurityBundle` becomes `SecurityBundle`.
pub fn short_type_name(full: &'static str) -> &'static str {
    let base = match full.find('<') {
        Some(idx) => &full[..idx],
        None => full,
    };
    match base.rfind("::") {
        Some(idx) => &base[idx + 2..],
        None => base,
    }
}

#[cfg(test)]
mod tests;
