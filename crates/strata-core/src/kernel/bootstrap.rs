use std::any::TypeId;
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use log::{debug, info};
use parking_lot::{Mutex, RwLock};

use crate::bundle::{Bundle, BundleConfig, BundlePhase, BundleRef, BundleState};
use crate::container::error::ContainerError;
use crate::container::registration::AnyService;
use crate::container::{ContainerInstance, Injectable, Provider, Registration, ServiceId};
use crate::event::{Event, EventManager, ListenerId, ListenerOptions};
use crate::kernel::constants;
use crate::kernel::error::{Error, Result};
use crate::kernel::events::{
    BundleAfterInitEvent, BundleAfterPrepareEvent, BundleBeforeInitEvent, BundleBeforePrepareEvent,
    KernelAfterInitEvent, KernelBeforeInitEvent,
};
use crate::kernel::parameters::{KernelContext, KernelParameters};
use crate::kernel::phase::KernelPhase;
use crate::kernel::warmup::ServiceWarmup;
use crate::utils::BoxFuture;

/// Construction options for a [`Kernel`].
#[derive(Default)]
pub struct KernelOptions {
    pub parameters: KernelParameters,
    pub bundles: Vec<Box<dyn Bundle>>,
}

impl KernelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parameters(mut self, parameters: KernelParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn bundle<B: Bundle>(mut self, bundle: B) -> Self {
        self.bundles.push(Box::new(bundle));
        self
    }
}

impl fmt::Debug for KernelOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KernelOptions")
            .field("parameters", &self.parameters)
            .field("bundles", &self.bundles.iter().map(|b| b.name()).collect::<Vec<_>>())
            .finish()
    }
}

struct KernelInner {
    bundles: RwLock<Vec<BundleRef>>,
    parameters: KernelParameters,
    container: Arc<ContainerInstance>,
    event_manager: Arc<EventManager>,
    phase: Mutex<KernelPhase>,
}

/// Lifecycle hooks a kernel drives bundles through.
#[derive(Debug, Clone, Copy)]
enum Hook {
    Extend,
    Hook,
    Prepare,
    Init,
    Shutdown,
}

/// The composition root: owns the container, the event manager, the ordered
/// bundle list and the parameters, and drives every bundle through the same
/// phase sequence.
///
/// `Kernel` is a cheap handle; clones refer to the same kernel.
#[derive(Clone)]
pub struct Kernel {
    inner: Arc<KernelInner>,
}

impl Kernel {
    /// Creates a kernel, publishes its core services in the container and
    /// registers the given bundles.
    pub fn new(options: KernelOptions) -> Result<Self> {
        debug!("Creating {} kernel v{}", constants::APP_NAME, constants::APP_VERSION);
        let inner = Arc::new(KernelInner {
            bundles: RwLock::new(Vec::new()),
            parameters: options.parameters,
            container: ContainerInstance::new(),
            event_manager: Arc::new(EventManager::new()),
            phase: Mutex::new(KernelPhase::Dormant),
        });
        let kernel = Kernel { inner };
        kernel.publish_services()?;
        kernel.add_bundles(options.bundles)?;
        Ok(kernel)
    }

    fn publish_services(&self) -> Result<()> {
        let container = &self.inner.container;
        let weak: Weak<KernelInner> = Arc::downgrade(&self.inner);
        container.set(Registration::dynamic(ServiceId::of::<Kernel>(), "Kernel", move |_| {
            weak.upgrade()
                .map(|inner| Arc::new(Kernel { inner }) as AnyService)
                .ok_or_else(|| ContainerError::Unavailable { service: "Kernel".to_string() }.into())
        }));
        container.set_arc(self.inner.event_manager.clone());
        container.set_value(self.inner.parameters.clone());
        for (name, value) in self.inner.parameters.to_map()? {
            container.set_parameter(name, value);
        }
        Ok(())
    }

    pub fn container(&self) -> Arc<ContainerInstance> {
        self.inner.container.clone()
    }

    pub fn event_manager(&self) -> Arc<EventManager> {
        self.inner.event_manager.clone()
    }

    pub fn parameters(&self) -> &KernelParameters {
        &self.inner.parameters
    }

    pub fn phase(&self) -> KernelPhase {
        *self.inner.phase.lock()
    }

    fn set_phase(&self, phase: KernelPhase) {
        debug!("Kernel phase: {}", phase);
        *self.inner.phase.lock() = phase;
    }

    pub fn is_initialised(&self) -> bool {
        self.phase().is_frozen()
    }

    pub fn is_debug(&self) -> bool {
        self.inner.parameters.debug
    }

    pub fn is_testing(&self) -> bool {
        self.inner.parameters.testing
    }

    pub fn is_production(&self) -> bool {
        self.inner.parameters.context == KernelContext::Production
    }

    pub fn is_development(&self) -> bool {
        self.inner.parameters.context == KernelContext::Development
    }

    /// Resolve a service from the kernel's container.
    pub fn get<T: Injectable>(&self) -> Result<Arc<T>> {
        self.inner.container.get::<T>()
    }

    /// Emit an event through the kernel's event manager.
    pub async fn emit(&self, event: &(dyn Event + 'static)) -> Result<()> {
        self.inner.event_manager.emit(event).await
    }

    /// Register a bundle. Only a dormant kernel accepts new bundles; bundles
    /// needed while `init()` runs go through [`Kernel::add_dependency`].
    /// Fails when a bundle of the same type is already present.
    pub fn add_bundle<B: Bundle>(&self, bundle: B) -> Result<BundleRef> {
        self.add_boxed_bundle(Box::new(bundle))
    }

    pub fn add_boxed_bundle(&self, bundle: Box<dyn Bundle>) -> Result<BundleRef> {
        self.register_bundle(bundle, |phase| phase == KernelPhase::Dormant)
    }

    /// Append a bundle when `accepts(phase)` holds, after the duplicate check.
    fn register_bundle(&self, bundle: Box<dyn Bundle>, accepts: impl Fn(KernelPhase) -> bool) -> Result<BundleRef> {
        let handle = BundleRef::from_boxed(bundle);
        {
            let mut bundles = self.inner.bundles.write();
            if bundles.iter().any(|existing| existing.type_id() == handle.type_id()) {
                return Err(Error::BundleSingleInstance { bundle: handle.name().to_string() });
            }
            if !accepts(self.phase()) {
                return Err(Error::KernelFrozen { operation: format!("add bundle {}", handle.name()) });
            }
            bundles.push(handle.clone());
        }
        self.inner.container.set(Registration::new(
            ServiceId::bundle_from_parts(handle.type_id(), handle.name()),
            handle.name(),
            Provider::Value(Arc::new(handle.clone())),
        ));
        debug!("Registered bundle {}", handle.name());
        Ok(handle)
    }

    pub fn add_bundles<I>(&self, bundles: I) -> Result<()>
    where
        I: IntoIterator<Item = Box<dyn Bundle>>,
    {
        for bundle in bundles {
            self.add_boxed_bundle(bundle)?;
        }
        Ok(())
    }

    /// Add `B` unless already present, typically from another bundle's
    /// `extend()`. When added while `init()` runs, its setup happens right
    /// away and the remaining stages pick it up. Returns the handle to the
    /// present bundle either way.
    pub async fn add_dependency<B: Bundle + Default>(&self, config: Option<BundleConfig>) -> Result<BundleRef> {
        if let Some(existing) = self.bundle::<B>() {
            return Ok(existing);
        }
        let mut bundle = B::default();
        if let Some(config) = config {
            *bundle.state_mut() = BundleState::with_config(config);
        }
        let handle = self.register_bundle(Box::new(bundle), |phase| {
            !phase.is_frozen() && phase != KernelPhase::Shutdown
        })?;
        if self.phase() != KernelPhase::Dormant {
            self.setup_bundle(&handle).await?;
        }
        Ok(handle)
    }

    pub fn has_bundle<B: Bundle>(&self) -> bool {
        self.has_bundle_type(TypeId::of::<B>())
    }

    pub fn has_bundle_type(&self, type_id: TypeId) -> bool {
        self.inner.bundles.read().iter().any(|bundle| bundle.type_id() == type_id)
    }

    pub fn bundle<B: Bundle>(&self) -> Option<BundleRef> {
        self.inner.bundles.read().iter().find(|bundle| bundle.is::<B>()).cloned()
    }

    /// Bundle handles in registration order.
    pub fn bundles(&self) -> Vec<BundleRef> {
        self.inner.bundles.read().clone()
    }

    pub fn bundle_names(&self) -> Vec<&'static str> {
        self.inner.bundles.read().iter().map(BundleRef::name).collect()
    }

    fn bundle_at(&self, index: usize) -> Option<BundleRef> {
        self.inner.bundles.read().get(index).cloned()
    }

    /// Resolve each service and await its activation hook, in order.
    pub async fn warmup(&self, services: &[ServiceWarmup]) -> Result<()> {
        for service in services {
            debug!("Warming up service {}", service.name());
            service.run(self.container()).await?;
        }
        Ok(())
    }

    /// Run `handler` with the container once the kernel is initialised: now,
    /// if it already is, otherwise on the `KernelAfterInitEvent`.
    pub async fn on_init<F>(&self, handler: F) -> Result<()>
    where
        F: FnOnce(Arc<ContainerInstance>) -> BoxFuture<'static, Result<()>> + Send + 'static,
    {
        if self.is_initialised() {
            return handler(self.container()).await;
        }
        let slot = Mutex::new(Some(handler));
        let registered: Arc<OnceLock<ListenerId>> = Arc::new(OnceLock::new());
        let own_id = registered.clone();
        let id = self.inner.event_manager.add_listener(
            move |event: &KernelAfterInitEvent| {
                let kernel = &event.data.kernel;
                if let Some(id) = own_id.get() {
                    kernel.event_manager().remove_listener::<KernelAfterInitEvent>(*id);
                }
                let pending = slot.lock().take().map(|handler| handler(kernel.container()));
                Box::pin(async move {
                    match pending {
                        Some(pending) => pending.await,
                        None => Ok(()),
                    }
                })
            },
            ListenerOptions::new(),
        );
        let _ = registered.set(id);
        Ok(())
    }

    /// Drive every bundle through setup, extend, hook, prepare and init.
    ///
    /// Each stage completes for all bundles, in registration order, before the
    /// next one starts. Bundles added along the way join the remaining stages.
    /// Failures propagate as-is; completed stages are not rolled back.
    pub async fn init(&self) -> Result<()> {
        {
            let mut phase = self.inner.phase.lock();
            if *phase != KernelPhase::Dormant {
                return Err(Error::KernelLifecycle {
                    phase: *phase,
                    message: "init() may only be called once, on a dormant kernel".to_string(),
                });
            }
            *phase = KernelPhase::BundleSetup;
        }
        info!("Initialising kernel with {} bundle(s)", self.inner.bundles.read().len());

        let mut index = 0;
        while let Some(handle) = self.bundle_at(index) {
            self.setup_bundle(&handle).await?;
            index += 1;
        }

        self.set_phase(KernelPhase::Extending);
        self.run_stage(Hook::Extend, BundlePhase::Extending, BundlePhase::Extended).await?;

        self.set_phase(KernelPhase::Hooking);
        self.run_stage(Hook::Hook, BundlePhase::Hooking, BundlePhase::Hooked).await?;

        self.emit(&KernelBeforeInitEvent::new(self.clone())).await?;

        self.set_phase(KernelPhase::Preparing);
        let mut index = 0;
        while let Some(handle) = self.bundle_at(index) {
            self.transition(&handle, BundlePhase::BeforePreparation).await?;
            self.emit(&BundleBeforePrepareEvent::new(handle.clone())).await?;
            self.invoke(&handle, Hook::Prepare, BundlePhase::Prepared).await?;
            self.emit(&BundleAfterPrepareEvent::new(handle.clone())).await?;
            index += 1;
        }

        self.set_phase(KernelPhase::Initialising);
        let mut index = 0;
        while let Some(handle) = self.bundle_at(index) {
            self.transition(&handle, BundlePhase::BeforeInitialisation).await?;
            self.emit(&BundleBeforeInitEvent::new(handle.clone())).await?;
            self.invoke(&handle, Hook::Init, BundlePhase::Initialised).await?;
            self.emit(&BundleAfterInitEvent::new(handle.clone())).await?;
            index += 1;
        }

        self.set_phase(KernelPhase::Initialised);
        self.emit(&KernelAfterInitEvent::new(self.clone())).await?;
        info!("Kernel initialised ({} bundle(s))", self.inner.bundles.read().len());
        Ok(())
    }

    /// Run every bundle's `shutdown()` in registration order.
    ///
    /// A failing hook stops the pass and leaves the kernel initialised;
    /// calling `shutdown()` again resumes with the bundles not yet shut down.
    pub async fn shutdown(&self) -> Result<()> {
        let phase = self.phase();
        if !phase.is_frozen() {
            return Err(Error::KernelLifecycle {
                phase,
                message: "shutdown() requires an initialised kernel".to_string(),
            });
        }
        info!("Shutting down kernel");
        for handle in self.bundles() {
            if handle.phase().await == BundlePhase::Shutdown {
                debug!("Bundle {} is already shut down", handle.name());
                continue;
            }
            self.invoke(&handle, Hook::Shutdown, BundlePhase::Shutdown).await?;
        }
        self.set_phase(KernelPhase::Shutdown);
        Ok(())
    }

    async fn setup_bundle(&self, handle: &BundleRef) -> Result<()> {
        debug!("Setting up bundle {}", handle.name());
        let mut bundle = handle.lock().await;
        bundle.set_phase(BundlePhase::Setup)?;
        bundle.setup(self)
    }

    async fn run_stage(&self, hook: Hook, before: BundlePhase, after: BundlePhase) -> Result<()> {
        let mut index = 0;
        while let Some(handle) = self.bundle_at(index) {
            self.transition(&handle, before).await?;
            self.invoke(&handle, hook, after).await?;
            index += 1;
        }
        Ok(())
    }

    async fn transition(&self, handle: &BundleRef, phase: BundlePhase) -> Result<()> {
        handle.lock().await.set_phase(phase)
    }

    /// Call one hook with the bundle locked, then move it to `then`.
    async fn invoke(&self, handle: &BundleRef, hook: Hook, then: BundlePhase) -> Result<()> {
        debug!("Running {:?} for bundle {}", hook, handle.name());
        let mut bundle = handle.lock().await;
        match hook {
            Hook::Extend => bundle.extend(self).await?,
            Hook::Hook => bundle.hook(self).await?,
            Hook::Prepare => bundle.prepare(self).await?,
            Hook::Init => bundle.init(self).await?,
            Hook::Shutdown => bundle.shutdown(self).await?,
        }
        bundle.set_phase(then)
    }
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel")
            .field("phase", &self.phase())
            .field("bundles", &self.bundle_names())
            .finish()
    }
}
