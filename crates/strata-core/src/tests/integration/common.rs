#![cfg(test)]

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use serde_json::json;

use crate::bundle::{Bundle, BundleConfig, BundleDependency, BundleState};
use crate::container::{Scope, Token};
use crate::event::{Event, ListenerOptions};
use crate::kernel::Kernel;
use crate::kernel::error::Result;
use crate::kernel::events::BundleBeforePrepareEvent;

// ===== SERVICES =====

pub trait UserStore: Send + Sync {
    fn backend(&self) -> &'static str;
}

pub struct InMemoryUserStore;

impl UserStore for InMemoryUserStore {
    fn backend(&self) -> &'static str {
        "memory"
    }
}

pub struct MongoUserStore;

impl UserStore for MongoUserStore {
    fn backend(&self) -> &'static str {
        "mongo"
    }
}

pub static USER_STORE: LazyLock<Token<Arc<dyn UserStore>>> = LazyLock::new(|| Token::new("UserStore"));

/// Custom event emitted by the application bundle once it is wired.
#[derive(Debug)]
pub struct UserStoreReady {
    pub data: UserStoreReadyData,
}

#[derive(Debug)]
pub struct UserStoreReadyData {
    pub backend: &'static str,
}

impl Event for UserStoreReady {}

// ===== BUNDLES =====

/// Abstract security bundle: registers the user store selected by its
/// `store` configuration key.
#[derive(Default)]
pub struct SecurityBundle {
    state: BundleState,
}

#[async_trait]
impl Bundle for SecurityBundle {
    fn state(&self) -> &BundleState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut BundleState {
        &mut self.state
    }

    fn default_config(&self) -> BundleConfig {
        BundleConfig::new().with("store", json!("memory"))
    }

    async fn prepare(&mut self, kernel: &Kernel) -> Result<()> {
        let store = self.config().get_or("store", "memory".to_string());
        kernel.container().set_token_factory(&USER_STORE, Scope::Container, move |_| {
            let store: Arc<dyn UserStore> = match store.as_str() {
                "mongo" => Arc::new(MongoUserStore),
                _ => Arc::new(InMemoryUserStore),
            };
            Ok(store)
        });
        Ok(())
    }
}

/// Concrete persistence for the security bundle: switches its store right
/// before the security bundle prepares.
#[derive(Default)]
pub struct MongoSecurityBundle {
    state: BundleState,
}

#[async_trait]
impl Bundle for MongoSecurityBundle {
    fn state(&self) -> &BundleState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut BundleState {
        &mut self.state
    }

    fn dependencies(&self) -> Vec<BundleDependency> {
        vec![BundleDependency::of::<SecurityBundle>()]
    }

    async fn hook(&mut self, kernel: &Kernel) -> Result<()> {
        kernel.event_manager().add_listener(
            |event: &BundleBeforePrepareEvent| {
                Box::pin(async move {
                    let patch = BundleConfig::new().with("store", json!("mongo"));
                    event
                        .data
                        .bundle
                        .with_mut(|security: &mut SecurityBundle| security.update_config(&patch))
                        .await;
                    Ok(())
                })
            },
            ListenerOptions::new().filter(|event: &BundleBeforePrepareEvent| event.data.bundle.is::<SecurityBundle>()),
        );
        Ok(())
    }
}

/// Application bundle: reads the user store once everything is prepared and
/// announces it.
#[derive(Default)]
pub struct AppBundle {
    state: BundleState,
    pub backend: Option<&'static str>,
}

#[async_trait]
impl Bundle for AppBundle {
    fn state(&self) -> &BundleState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut BundleState {
        &mut self.state
    }

    async fn init(&mut self, kernel: &Kernel) -> Result<()> {
        let store = kernel.container().get_token(&USER_STORE)?;
        let backend = store.backend();
        self.backend = Some(backend);
        kernel.emit(&UserStoreReady { data: UserStoreReadyData { backend } }).await
    }
}
