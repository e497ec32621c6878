use std::fmt;
use std::sync::Arc;

use crate::container::{ContainerInstance, Injectable};
use crate::kernel::error::Result;
use crate::utils::{short_type_name, BoxFuture};

/// A service to instantiate and activate ahead of first use.
///
/// Resolving forces singleton construction; the service's
/// [`Injectable::init`] is awaited afterwards.
#[derive(Clone, Copy)]
pub struct ServiceWarmup {
    name: &'static str,
    run: fn(Arc<ContainerInstance>) -> BoxFuture<'static, Result<()>>,
}

impl ServiceWarmup {
    pub fn of<T: Injectable>() -> Self {
        Self {
            name: short_type_name(std::any::type_name::<T>()),
            run: |container| {
                Box::pin(async move {
                    let service = container.get::<T>()?;
                    service.init().await
                })
            },
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) async fn run(&self, container: Arc<ContainerInstance>) -> Result<()> {
        (self.run)(container).await
    }
}

impl fmt::Debug for ServiceWarmup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceWarmup").field("name", &self.name).finish()
    }
}
