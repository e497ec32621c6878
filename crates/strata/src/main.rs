mod cli; // Declare the cli module

use std::path::PathBuf;

use clap::{Parser, Subcommand}; // Use clap for argument parsing
use log::error;

use strata_core::kernel::parameters::KernelContext;

/// Strata: boot a kernel of bundles and drive it through its lifecycle
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Kernel parameters file (JSON, TOML or YAML)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Run the kernel with the debug flag set
    #[arg(long)]
    debug: bool,

    /// Deployment context: development, pre-production or production
    #[arg(long)]
    context: Option<KernelContext>,

    /// Simple ping command for testing
    #[arg(long)]
    ping: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print parameters and bundles without initialising the kernel
    Inspect,
}

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    // Handle simple ping command
    if args.ping {
        println!("pong");
        return;
    }

    let parameters = match cli::load_parameters(args.config.as_deref(), args.debug, args.context) {
        Ok(parameters) => parameters,
        Err(e) => {
            eprintln!("Failed to load kernel parameters: {}", e);
            std::process::exit(1);
        }
    };

    let kernel = match cli::build_kernel(parameters) {
        Ok(kernel) => kernel,
        Err(e) => {
            eprintln!("Failed to create kernel: {}", e);
            std::process::exit(1);
        }
    };

    let result = match args.command {
        Some(Commands::Inspect) => cli::inspect(&kernel),
        None => cli::boot(&kernel).await,
    };

    if let Err(e) = result {
        error!("Kernel error [{}]: {}", e.code(), e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
