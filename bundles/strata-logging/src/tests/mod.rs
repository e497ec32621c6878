use serde_json::json;

use strata_core::kernel::parameters::KernelParameters;
use strata_core::{Bundle, BundleConfig, Kernel, KernelOptions};

use crate::{LoggingBundle, LoggingSettings};

fn kernel(debug: bool) -> Kernel {
    Kernel::new(KernelOptions::new().parameters(KernelParameters::new().with_debug(debug)))
        .expect("kernel should build")
}

fn set_up(bundle: &mut LoggingBundle, kernel: &Kernel) {
    bundle.setup(kernel).expect("setup should succeed");
}

#[test]
fn test_default_settings() {
    let kernel = kernel(false);
    let mut bundle = LoggingBundle::new();
    set_up(&mut bundle, &kernel);

    let settings = bundle.settings(&kernel).expect("settings");
    assert_eq!(settings, LoggingSettings::default());
}

#[test]
fn test_debug_flag_raises_default_level() {
    let kernel = kernel(true);
    let mut bundle = LoggingBundle::new();
    set_up(&mut bundle, &kernel);

    assert_eq!(bundle.settings(&kernel).expect("settings").level, "debug");
}

#[test]
fn test_explicit_level_wins_over_debug_flag() {
    let kernel = kernel(true);
    let mut bundle = LoggingBundle::with_config(BundleConfig::new().with("level", json!("warn")));
    set_up(&mut bundle, &kernel);

    let settings = bundle.settings(&kernel).expect("settings");
    assert_eq!(settings.level, "warn");
    assert_eq!(settings.level_filter().expect("valid level"), log::LevelFilter::Warn);
}

#[test]
fn test_invalid_level_fails_setup() {
    let kernel = kernel(false);
    let mut bundle = LoggingBundle::with_config(BundleConfig::new().with("level", json!("loud")));

    let err = bundle.setup(&kernel).expect_err("unknown level");
    assert_eq!(err.code(), "BUNDLE_INVALID_CONFIG");
}

#[test]
fn test_filter_directive_is_validated() {
    let settings = LoggingSettings { filter: Some("strata_core=trace,info".to_string()), ..Default::default() };
    assert!(settings.env_filter().is_ok());

    let settings = LoggingSettings { filter: Some("strata_core=loud".to_string()), ..Default::default() };
    assert!(settings.env_filter().is_err());
}

#[tokio::test]
async fn test_kernel_with_logging_bundle_publishes_settings() {
    let kernel = Kernel::new(
        KernelOptions::new().bundle(LoggingBundle::with_config(BundleConfig::new().with("json", json!(true)))),
    )
    .expect("kernel should build");

    kernel.init().await.expect("init should succeed");

    let settings = kernel.container().resolve::<LoggingSettings>().expect("settings are published");
    assert!(settings.json);

    // A second kernel in the same process keeps the first subscriber.
    let second = Kernel::new(KernelOptions::new().bundle(LoggingBundle::new())).expect("kernel should build");
    second.init().await.expect("re-installing is tolerated");
    let installed = second
        .bundle::<LoggingBundle>()
        .expect("logging bundle")
        .with(|bundle: &LoggingBundle| bundle.installed())
        .await;
    assert_eq!(installed, Some(false));

    kernel.shutdown().await.expect("shutdown should succeed");
}
