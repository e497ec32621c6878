#![cfg(test)]

use std::sync::{Arc, Mutex};

use crate::bundle::BundlePhase;
use crate::event::ListenerOptions;
use crate::kernel::events::{BundleBeforePrepareEvent, KernelAfterInitEvent};
use crate::kernel::{Kernel, KernelOptions};

use super::common::{AppBundle, MongoSecurityBundle, SecurityBundle, USER_STORE, UserStoreReady};

#[tokio::test]
async fn test_listener_overrides_bundle_before_it_prepares() {
    let kernel = Kernel::new(
        KernelOptions::new()
            .bundle(SecurityBundle::default())
            .bundle(MongoSecurityBundle::default())
            .bundle(AppBundle::default()),
    )
    .expect("kernel should build");

    kernel.init().await.expect("init should succeed");

    let store = kernel.container().get_token(&USER_STORE).expect("user store registered");
    assert_eq!(store.backend(), "mongo");

    let app = kernel.bundle::<AppBundle>().expect("app bundle");
    assert_eq!(app.with(|app: &AppBundle| app.backend).await, Some(Some("mongo")));

    let security = kernel.bundle::<SecurityBundle>().expect("security bundle");
    let configured = security.lock().await.config().get::<String>("store");
    assert_eq!(configured.as_deref(), Some("mongo"));
}

#[tokio::test]
async fn test_default_store_without_override() {
    let kernel = Kernel::new(KernelOptions::new().bundle(SecurityBundle::default()).bundle(AppBundle::default()))
        .expect("kernel should build");

    kernel.init().await.expect("init should succeed");

    let store = kernel.container().get_token(&USER_STORE).expect("user store registered");
    assert_eq!(store.backend(), "memory");
}

#[tokio::test]
async fn test_override_requires_abstract_bundle() {
    let kernel = Kernel::new(KernelOptions::new().bundle(MongoSecurityBundle::default()))
        .expect("kernel should build");

    let err = kernel.init().await.expect_err("security bundle is missing");
    assert_eq!(err.code(), "BUNDLE_DEPENDENCY_MISSING");
}

#[tokio::test]
async fn test_application_events_and_lifecycle_observers() {
    let kernel = Kernel::new(KernelOptions::new().bundle(SecurityBundle::default()).bundle(AppBundle::default()))
        .expect("kernel should build");
    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

    let log = seen.clone();
    kernel.event_manager().add_sync_listener(
        move |event: &UserStoreReady| {
            log.lock().unwrap().push(format!("ready:{}", event.data.backend));
            Ok(())
        },
        ListenerOptions::new(),
    );

    let log = seen.clone();
    kernel.event_manager().add_sync_listener(
        move |event: &BundleBeforePrepareEvent| {
            log.lock().unwrap().push(format!("preparing:{}", event.data.bundle.name()));
            Ok(())
        },
        ListenerOptions::new(),
    );

    let log = seen.clone();
    kernel.event_manager().add_listener(
        move |event: &KernelAfterInitEvent| {
            let log = log.clone();
            Box::pin(async move {
                let mut phases = Vec::new();
                for bundle in event.data.kernel.bundles() {
                    phases.push(bundle.phase().await);
                }
                let all_initialised = phases.iter().all(|phase| *phase == BundlePhase::Initialised);
                log.lock().unwrap().push(format!("after-init:{}", all_initialised));
                Ok(())
            })
        },
        ListenerOptions::new(),
    );

    kernel.init().await.expect("init should succeed");

    assert_eq!(
        seen.lock().unwrap().clone(),
        vec![
            "preparing:SecurityBundle",
            "preparing:AppBundle",
            "ready:memory",
            "after-init:true",
        ]
    );
}
