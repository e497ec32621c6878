use std::path::Path;

use async_trait::async_trait;
use serde_json::json;

use strata_core::kernel::error::Result;
use strata_core::kernel::parameters::{KernelContext, KernelParameters};
use strata_core::{Bundle, BundleConfig, BundleState, Kernel, KernelOptions, ListenerOptions};
use strata_logging::LoggingBundle;

/// Parameters from the optional file, then the environment, then the flags.
pub fn load_parameters(
    config: Option<&Path>,
    debug: bool,
    context: Option<KernelContext>,
) -> Result<KernelParameters> {
    let mut parameters = match config {
        Some(path) => KernelParameters::from_file(path)?,
        None => KernelParameters::default(),
    }
    .with_env()?;

    if debug {
        parameters.debug = true;
    }
    if let Some(context) = context {
        parameters.context = context;
    }
    Ok(parameters)
}

pub fn build_kernel(parameters: KernelParameters) -> Result<Kernel> {
    Kernel::new(
        KernelOptions::new()
            .parameters(parameters)
            .bundle(LoggingBundle::new())
            .bundle(GreetingBundle::default()),
    )
}

/// Initialise the kernel, printing lifecycle events as they fire, then shut it
/// down again.
pub async fn boot(kernel: &Kernel) -> Result<()> {
    kernel.event_manager().add_global_listener(
        |event| {
            println!("event: {}", event.name());
            Box::pin(async { Ok(()) })
        },
        ListenerOptions::new(),
    );

    kernel.init().await?;
    println!("Kernel initialised with {} bundles", kernel.bundle_names().len());

    kernel.shutdown().await?;
    println!("Kernel shut down");
    Ok(())
}

pub fn inspect(kernel: &Kernel) -> Result<()> {
    println!("Parameters:");
    for (key, value) in kernel.parameters().to_map()? {
        match value {
            serde_json::Value::String(text) => println!("  {}: {}", key, text),
            other => println!("  {}: {}", key, other),
        }
    }
    println!("Bundles:");
    for (index, name) in kernel.bundle_names().iter().enumerate() {
        println!("  {}. {}", index + 1, name);
    }
    Ok(())
}

/// The message [`GreetingBundle`] registers during preparation.
#[derive(Debug)]
pub struct Greeting(pub String);

/// Demo bundle: composes a greeting from its configuration (the `audience`
/// kernel parameter wins when set) and prints it on init.
#[derive(Default)]
pub struct GreetingBundle {
    state: BundleState,
}

#[async_trait]
impl Bundle for GreetingBundle {
    fn state(&self) -> &BundleState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut BundleState {
        &mut self.state
    }

    fn default_config(&self) -> BundleConfig {
        BundleConfig::from_value(json!({ "greeting": "Hello", "audience": "world" }))
    }

    async fn prepare(&mut self, kernel: &Kernel) -> Result<()> {
        let greeting = self.config().get_or("greeting", "Hello".to_string());
        let audience = kernel
            .parameters()
            .get::<String>("audience")
            .unwrap_or_else(|| self.config().get_or("audience", "world".to_string()));
        kernel.container().set_value(Greeting(format!("{}, {}!", greeting, audience)));
        Ok(())
    }

    async fn init(&mut self, kernel: &Kernel) -> Result<()> {
        let greeting = kernel.container().resolve::<Greeting>()?;
        println!("{}", greeting.0);
        Ok(())
    }
}
