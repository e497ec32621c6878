//! Lifecycle events emitted by the kernel. Kernel-wide events carry the
//! kernel; per-bundle events carry a handle to the bundle being processed.
use crate::bundle::BundleRef;
use crate::event::Event;
use crate::kernel::Kernel;

#[derive(Debug, Clone)]
pub struct KernelEventData {
    pub kernel: Kernel,
}

#[derive(Debug, Clone)]
pub struct BundleEventData {
    pub bundle: BundleRef,
}

macro_rules! lifecycle_event {
    ($(#[$meta:meta])* $name:ident, $data:ident, $field:ident: $ty:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            pub data: $data,
        }

        impl $name {
            pub fn new($field: $ty) -> Self {
                Self { data: $data { $field } }
            }
        }

        impl Event for $name {}
    };
}

lifecycle_event!(
    /// Emitted after every bundle has hooked, before the preparation pass.
    KernelBeforeInitEvent, KernelEventData, kernel: Kernel
);
lifecycle_event!(
    /// Emitted once the kernel is initialised.
    KernelAfterInitEvent, KernelEventData, kernel: Kernel
);
lifecycle_event!(BundleBeforePrepareEvent, BundleEventData, bundle: BundleRef);
lifecycle_event!(BundleAfterPrepareEvent, BundleEventData, bundle: BundleRef);
lifecycle_event!(BundleBeforeInitEvent, BundleEventData, bundle: BundleRef);
lifecycle_event!(BundleAfterInitEvent, BundleEventData, bundle: BundleRef);
