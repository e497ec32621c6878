use std::collections::HashMap;
use std::fs;

use serde_json::json;
use tempfile::tempdir;

use crate::kernel::error::{ConfigError, Error};
use crate::kernel::parameters::{ExecutionContext, KernelContext, KernelParameters};

fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |key: &str| vars.get(key).cloned()
}

#[test]
fn test_defaults() {
    let parameters = KernelParameters::default();
    assert!(!parameters.debug);
    assert!(!parameters.testing);
    assert_eq!(parameters.context, KernelContext::Development);
    assert_eq!(parameters.execution_context, ExecutionContext::Server);
    assert!(parameters.extra.is_empty());
}

#[test]
fn test_from_json_file_keeps_unknown_keys() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("strata.json");
    fs::write(&path, r#"{ "debug": true, "context": "production", "executionContext": "web", "region": "eu-west" }"#).unwrap();

    let parameters = KernelParameters::from_file(&path).expect("json parameters");
    assert!(parameters.debug);
    assert!(!parameters.testing);
    assert_eq!(parameters.context, KernelContext::Production);
    assert_eq!(parameters.execution_context, ExecutionContext::Web);
    assert_eq!(parameters.get::<String>("region").as_deref(), Some("eu-west"));
    assert!(parameters.get::<String>("executionContext").is_none());
}

#[cfg(feature = "toml-config")]
#[test]
fn test_from_toml_file() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("strata.toml");
    fs::write(&path, "testing = true\ncontext = \"pre-production\"\nworkers = 4\n").unwrap();

    let parameters = KernelParameters::from_file(&path).expect("toml parameters");
    assert!(parameters.testing);
    assert_eq!(parameters.context, KernelContext::PreProduction);
    assert_eq!(parameters.get::<u32>("workers"), Some(4));
}

#[cfg(feature = "yaml-config")]
#[test]
fn test_from_yaml_file() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("strata.yml");
    fs::write(&path, "debug: true\nexecution_context: web\n").unwrap();

    let parameters = KernelParameters::from_file(&path).expect("yaml parameters");
    assert!(parameters.debug);
    assert_eq!(parameters.execution_context, ExecutionContext::Web);
}

#[test]
fn test_from_file_errors() {
    let dir = tempdir().expect("Failed to create temporary directory");

    let unsupported = dir.path().join("strata.ini");
    fs::write(&unsupported, "debug=true").unwrap();
    assert!(matches!(
        KernelParameters::from_file(&unsupported),
        Err(Error::Config(ConfigError::UnsupportedFormat { .. }))
    ));

    let missing = dir.path().join("absent.json");
    assert!(matches!(
        KernelParameters::from_file(&missing),
        Err(Error::Config(ConfigError::Io { .. }))
    ));

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{ \"debug\": ").unwrap();
    match KernelParameters::from_file(&broken) {
        Err(Error::Config(ConfigError::Parse { format, .. })) => assert_eq!(format, "JSON"),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_env_overlay() {
    let parameters = KernelParameters::default()
        .with_env_from(env(&[("STRATA_DEBUG", "1"), ("STRATA_CONTEXT", "production")]))
        .expect("valid environment");

    assert!(parameters.debug);
    assert!(!parameters.testing);
    assert_eq!(parameters.context, KernelContext::Production);
}

#[test]
fn test_env_overlay_rejects_bad_values() {
    let err = KernelParameters::default()
        .with_env_from(env(&[("STRATA_TESTING", "maybe")]))
        .expect_err("not a flag");
    assert_eq!(err.code(), "CONFIG");

    let err = KernelParameters::default()
        .with_env_from(env(&[("STRATA_CONTEXT", "moon")]))
        .expect_err("not a context");
    assert!(err.to_string().contains("moon"));
}

#[test]
fn test_context_parsing() {
    assert_eq!("pre-production".parse::<KernelContext>().unwrap(), KernelContext::PreProduction);
    assert_eq!("PROD".parse::<KernelContext>().unwrap(), KernelContext::Production);
    assert_eq!(KernelContext::PreProduction.to_string(), "pre-production");
}

#[test]
fn test_to_map_flattens_extras() {
    let parameters = KernelParameters::new().with_extra("region", json!("eu-west"));
    let map = parameters.to_map().expect("serializable");

    assert_eq!(map.get("debug"), Some(&json!(false)));
    assert_eq!(map.get("context"), Some(&json!("development")));
    assert_eq!(map.get("executionContext"), Some(&json!("server")));
    assert!(!map.contains_key("execution_context"));
    assert_eq!(map.get("region"), Some(&json!("eu-west")));
    assert!(!map.contains_key("extra"));
}
