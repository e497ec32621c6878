//! Kernel-wide parameters: the debug and testing flags, the deployment
//! context, the execution context, and any application-defined extras.
//!
//! Parameters load from JSON, TOML or YAML files (format chosen by extension)
//! and can be overlaid from `STRATA_*` environment variables. Every parameter
//! is published in the container under `%name%`.
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::kernel::constants::{ENV_CONTEXT, ENV_DEBUG, ENV_TESTING};
use crate::kernel::error::{ConfigError, Result};

/// Deployment context the application runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KernelContext {
    #[default]
    Development,
    PreProduction,
    Production,
}

impl KernelContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            KernelContext::Development => "development",
            KernelContext::PreProduction => "pre-production",
            KernelContext::Production => "production",
        }
    }
}

impl FromStr for KernelContext {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(KernelContext::Development),
            "pre-production" | "preproduction" | "staging" => Ok(KernelContext::PreProduction),
            "production" | "prod" => Ok(KernelContext::Production),
            _ => Err(ConfigError::InvalidValue {
                key: "context".to_string(),
                value: s.to_string(),
                expected: "development, pre-production, production",
            }),
        }
    }
}

impl fmt::Display for KernelContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the application executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionContext {
    Web,
    ReactNative,
    Server,
}

impl ExecutionContext {
    /// `Web` when compiled for `wasm32`, `Server` otherwise.
    pub fn detect() -> Self {
        if cfg!(target_arch = "wasm32") {
            ExecutionContext::Web
        } else {
            ExecutionContext::Server
        }
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::detect()
    }
}

/// Supported parameter file formats
#[derive(Debug, Clone, Copy, PartialEq)]
enum ParameterFormat {
    Json,
    #[cfg(feature = "yaml-config")]
    Yaml,
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ParameterFormat {
    fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ParameterFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ParameterFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ParameterFormat::Toml),
                _ => None,
            })
    }

    fn name(&self) -> &'static str {
        match self {
            ParameterFormat::Json => "JSON",
            #[cfg(feature = "yaml-config")]
            ParameterFormat::Yaml => "YAML",
            #[cfg(feature = "toml-config")]
            ParameterFormat::Toml => "TOML",
        }
    }
}

/// Global kernel parameters. Missing keys take their defaults; unknown keys
/// are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelParameters {
    pub debug: bool,
    pub testing: bool,
    pub context: KernelContext,
    #[serde(rename = "executionContext", alias = "execution_context")]
    pub execution_context: ExecutionContext,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for KernelParameters {
    fn default() -> Self {
        Self {
            debug: false,
            testing: false,
            context: KernelContext::default(),
            execution_context: ExecutionContext::detect(),
            extra: Map::new(),
        }
    }
}

impl KernelParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_testing(mut self, testing: bool) -> Self {
        self.testing = testing;
        self
    }

    pub fn with_context(mut self, context: KernelContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_extra(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    /// Load parameters from a JSON, TOML or YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = ParameterFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat { path: path.to_path_buf() })?;
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        log::debug!("Loading kernel parameters from {} ({})", path.display(), format.name());
        Self::parse(&contents, format).map_err(|message| {
            ConfigError::Parse { format: format.name(), path: path.to_path_buf(), message }.into()
        })
    }

    fn parse(contents: &str, format: ParameterFormat) -> std::result::Result<Self, String> {
        match format {
            ParameterFormat::Json => serde_json::from_str(contents).map_err(|e| e.to_string()),
            #[cfg(feature = "yaml-config")]
            ParameterFormat::Yaml => serde_yaml::from_str(contents).map_err(|e| e.to_string()),
            #[cfg(feature = "toml-config")]
            ParameterFormat::Toml => toml::from_str(contents).map_err(|e| e.to_string()),
        }
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env()
    }

    /// Overlay `STRATA_DEBUG`, `STRATA_TESTING` and `STRATA_CONTEXT`.
    pub fn with_env(self) -> Result<Self> {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay environment-style variables read through `lookup`.
    pub fn with_env_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_DEBUG) {
            self.debug = parse_flag(ENV_DEBUG, &value)?;
        }
        if let Some(value) = lookup(ENV_TESTING) {
            self.testing = parse_flag(ENV_TESTING, &value)?;
        }
        if let Some(value) = lookup(ENV_CONTEXT) {
            self.context = value.parse()?;
        }
        Ok(self)
    }

    /// Flattened view of every parameter, extras included.
    pub fn to_map(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Ok(Map::new()),
            Err(e) => Err(format!("Failed to serialize kernel parameters: {}", e).into()),
        }
    }

    pub fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.extra
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

fn parse_flag(key: &str, value: &str) -> std::result::Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: "true, false, 1, 0, yes, no, on, off",
        }),
    }
}
