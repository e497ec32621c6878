/// Framework name
pub const APP_NAME: &str = "Strata";

/// Framework version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding the `debug` parameter
pub const ENV_DEBUG: &str = "STRATA_DEBUG";

/// Environment variable overriding the `testing` parameter
pub const ENV_TESTING: &str = "STRATA_TESTING";

/// Environment variable overriding the `context` parameter
pub const ENV_CONTEXT: &str = "STRATA_CONTEXT";
