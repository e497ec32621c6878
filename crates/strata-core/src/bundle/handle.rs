use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::bundle::{Bundle, BundlePhase};

/// Shared handle to a bundle registered in a kernel.
///
/// Cheap to clone. The bundle sits behind an async mutex so listeners and
/// other bundles can reach it between lifecycle hooks; the kernel holds the
/// lock only while one of the bundle's own hooks runs.
#[derive(Clone)]
pub struct BundleRef {
    type_id: TypeId,
    name: &'static str,
    handle: Arc<Mutex<Box<dyn Bundle>>>,
}

impl BundleRef {
    pub fn new<B: Bundle>(bundle: B) -> Self {
        Self::from_boxed(Box::new(bundle))
    }

    pub fn from_boxed(bundle: Box<dyn Bundle>) -> Self {
        Self {
            type_id: (*bundle).as_any().type_id(),
            name: bundle.name(),
            handle: Arc::new(Mutex::new(bundle)),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<B: Bundle>(&self) -> bool {
        self.type_id == TypeId::of::<B>()
    }

    /// Lock the bundle. Must not be called from inside one of this bundle's
    /// own hooks: the kernel already holds the lock there.
    pub async fn lock(&self) -> MutexGuard<'_, Box<dyn Bundle>> {
        self.handle.lock().await
    }

    pub async fn phase(&self) -> BundlePhase {
        self.handle.lock().await.phase()
    }

    /// Run `f` against the concrete bundle. `None` if it is not a `B`.
    pub async fn with<B: Bundle, R>(&self, f: impl FnOnce(&B) -> R) -> Option<R> {
        let guard = self.handle.lock().await;
        (**guard).as_any().downcast_ref::<B>().map(f)
    }

    pub async fn with_mut<B: Bundle, R>(&self, f: impl FnOnce(&mut B) -> R) -> Option<R> {
        let mut guard = self.handle.lock().await;
        (**guard).as_any_mut().downcast_mut::<B>().map(f)
    }

    pub fn ptr_eq(&self, other: &BundleRef) -> bool {
        Arc::ptr_eq(&self.handle, &other.handle)
    }
}

impl fmt::Debug for BundleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundleRef").field("name", &self.name).finish_non_exhaustive()
    }
}
