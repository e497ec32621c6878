//! # Strata Bundles
//!
//! A bundle is a feature module: it carries a configuration, declares the
//! bundles it depends on, and hooks into the kernel lifecycle. The kernel
//! drives every bundle through the same [`BundlePhase`] sequence, stage by
//! stage, so by the time any bundle prepares every other bundle has already
//! extended and hooked.
//!
//! Configuration is the deep merge of the author's [`Bundle::default_config`]
//! and the application-supplied required configuration, computed at setup.
//! Once initialised a bundle is frozen and only accepts a move to shutdown.
pub mod config;
pub mod handle;
pub mod phase;

use std::any::TypeId;

use async_trait::async_trait;

use crate::kernel::Kernel;
use crate::kernel::error::{Error, Result};
use crate::utils::{AsAny, short_type_name};

pub use config::BundleConfig;
pub use handle::BundleRef;
pub use phase::BundlePhase;

/// Mutable state every bundle carries: its phase and configuration.
#[derive(Debug, Clone, Default)]
pub struct BundleState {
    phase: BundlePhase,
    required_config: BundleConfig,
    config: BundleConfig,
}

impl BundleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State carrying application-supplied configuration, merged over the
    /// bundle's defaults at setup.
    pub fn with_config(required_config: BundleConfig) -> Self {
        Self { required_config, ..Self::default() }
    }

    pub fn required_config(&self) -> &BundleConfig {
        &self.required_config
    }
}

/// A bundle type another bundle needs registered before its own setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleDependency {
    pub type_id: TypeId,
    pub name: &'static str,
}

impl BundleDependency {
    pub fn of<B: Bundle>() -> Self {
        Self {
            type_id: TypeId::of::<B>(),
            name: short_type_name(std::any::type_name::<B>()),
        }
    }
}

/// Core bundle trait.
///
/// Implementors provide [`Bundle::state`] and [`Bundle::state_mut`]; every
/// lifecycle hook defaults to a no-op.
#[async_trait]
pub trait Bundle: AsAny + Send + Sync {
    fn name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    fn state(&self) -> &BundleState;

    fn state_mut(&mut self) -> &mut BundleState;

    fn default_config(&self) -> BundleConfig {
        BundleConfig::new()
    }

    /// Bundles that must already be registered when this one is set up.
    fn dependencies(&self) -> Vec<BundleDependency> {
        Vec::new()
    }

    /// Checked against the merged configuration during setup.
    fn validate(&self, _config: &BundleConfig) -> Result<()> {
        Ok(())
    }

    /// Add dependent bundles and register services.
    async fn extend(&mut self, _kernel: &Kernel) -> Result<()> {
        Ok(())
    }

    /// Register event listeners.
    async fn hook(&mut self, _kernel: &Kernel) -> Result<()> {
        Ok(())
    }

    async fn prepare(&mut self, _kernel: &Kernel) -> Result<()> {
        Ok(())
    }

    async fn init(&mut self, _kernel: &Kernel) -> Result<()> {
        Ok(())
    }

    async fn shutdown(&mut self, _kernel: &Kernel) -> Result<()> {
        Ok(())
    }

    /// Merge configuration, validate it, and check declared dependencies.
    fn setup(&mut self, kernel: &Kernel) -> Result<()> {
        let mut config = self.default_config();
        config.merge(&self.state().required_config);
        self.validate(&config)?;

        for dependency in self.dependencies() {
            if !kernel.has_bundle_type(dependency.type_id) {
                return Err(Error::BundleDependencyMissing {
                    bundle: self.name().to_string(),
                    dependency: dependency.name.to_string(),
                });
            }
        }

        self.state_mut().config = config;
        Ok(())
    }

    fn config(&self) -> &BundleConfig {
        &self.state().config
    }

    fn set_config(&mut self, config: BundleConfig) {
        self.state_mut().config = config;
    }

    /// Deep-merge `patch` over the current configuration.
    fn update_config(&mut self, patch: &BundleConfig) {
        self.state_mut().config.merge(patch);
    }

    fn phase(&self) -> BundlePhase {
        self.state().phase
    }

    fn set_phase(&mut self, phase: BundlePhase) -> Result<()> {
        let current = self.state().phase;
        if current == BundlePhase::Shutdown || (current.is_frozen() && phase != BundlePhase::Shutdown) {
            return Err(Error::BundleFrozen { bundle: self.name().to_string(), requested: phase });
        }
        if phase == BundlePhase::Shutdown && !current.is_frozen() {
            return Err(Error::InvalidPhaseTransition {
                bundle: self.name().to_string(),
                from: current,
                to: phase,
            });
        }
        self.state_mut().phase = phase;
        Ok(())
    }
}
