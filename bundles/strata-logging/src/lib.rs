//! # Strata Logging Bundle
//!
//! Installs a `tracing-subscriber` registry for the whole process and routes
//! `log` records into it, so the kernel's own logging becomes visible.
//!
//! Configuration keys:
//!
//! - `level`: `error`, `warn`, `info`, `debug`, `trace` or `off`. Defaults to
//!   `info`, or `debug` when the kernel runs with the debug flag.
//! - `json`: emit JSON lines instead of human-readable text.
//! - `filter`: an env-filter directive (`strata_core=trace,info`) that takes
//!   precedence over `level`.
//!
//! Output goes to stderr.
use std::str::FromStr;

use async_trait::async_trait;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing_log::AsTrace;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use strata_core::kernel::error::{Error as KernelError, Result as KernelResult};
use strata_core::{Bundle, BundleConfig, BundleState, Kernel};

/// Effective logging settings, published in the container once resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
    pub filter: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false, filter: None }
    }
}

impl LoggingSettings {
    pub fn level_filter(&self) -> KernelResult<LevelFilter> {
        LevelFilter::from_str(&self.level).map_err(|_| KernelError::InvalidConfig {
            bundle: "LoggingBundle".to_string(),
            message: format!("unknown log level '{}'", self.level),
        })
    }

    /// Subscriber filter: the explicit directive if any, otherwise `level`.
    pub fn env_filter(&self) -> KernelResult<EnvFilter> {
        match &self.filter {
            Some(directive) => EnvFilter::try_new(directive).map_err(|e| KernelError::InvalidConfig {
                bundle: "LoggingBundle".to_string(),
                message: format!("invalid filter '{}': {}", directive, e),
            }),
            None => Ok(EnvFilter::default().add_directive(self.level_filter()?.as_trace().into())),
        }
    }
}

#[derive(Default)]
pub struct LoggingBundle {
    state: BundleState,
    installed: bool,
}

impl LoggingBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BundleConfig) -> Self {
        Self { state: BundleState::with_config(config), installed: false }
    }

    /// Whether this bundle installed the global subscriber. False when one
    /// was already in place.
    pub fn installed(&self) -> bool {
        self.installed
    }

    /// Settings from the merged configuration. The kernel's debug flag raises
    /// the default level unless the application set one explicitly.
    pub fn settings(&self, kernel: &Kernel) -> KernelResult<LoggingSettings> {
        let mut settings: LoggingSettings = self.config().deserialize()?;
        if kernel.is_debug() && !self.state().required_config().contains_key("level") {
            settings.level = "debug".to_string();
        }
        Ok(settings)
    }

    fn install(settings: &LoggingSettings) -> KernelResult<bool> {
        let registry = tracing_subscriber::registry().with(settings.env_filter()?);
        let result = if settings.json {
            registry.with(fmt::layer().json().with_writer(std::io::stderr)).try_init()
        } else {
            registry.with(fmt::layer().with_writer(std::io::stderr)).try_init()
        };
        match result {
            Ok(()) => Ok(true),
            Err(e) => {
                log::warn!("A logging subscriber is already installed, keeping it: {}", e);
                Ok(false)
            }
        }
    }
}

#[async_trait]
impl Bundle for LoggingBundle {
    fn state(&self) -> &BundleState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut BundleState {
        &mut self.state
    }

    fn default_config(&self) -> BundleConfig {
        BundleConfig::from_value(json!({ "level": "info", "json": false }))
    }

    fn validate(&self, config: &BundleConfig) -> KernelResult<()> {
        let settings: LoggingSettings = config.deserialize()?;
        settings.level_filter()?;
        settings.env_filter()?;
        Ok(())
    }

    async fn extend(&mut self, kernel: &Kernel) -> KernelResult<()> {
        let settings = self.settings(kernel)?;
        self.installed = Self::install(&settings)?;
        if self.installed {
            tracing::info!(level = %settings.level, json = settings.json, "Logging initialised");
        }
        kernel.container().set_value(settings);
        Ok(())
    }

    async fn shutdown(&mut self, _kernel: &Kernel) -> KernelResult<()> {
        log::logger().flush();
        Ok(())
    }
}

#[cfg(test)]
mod tests;
