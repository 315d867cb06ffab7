//! cfgmap CLI
//!
//! Converts configuration entities between tree documents and wire JSON,
//! and pushes or pulls them against a configuration API.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cfgmap_client::ClientConfig;
use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: logging disabled: {e}", "warning".yellow().bold());
    }
    tracing::debug!("Verbose mode enabled");

    match cli.command {
        Some(cmd) => execute_command(cmd, cli.config.as_deref()),
        None => {
            println!("{} configuration mapper", "cfgmap".green().bold());
            println!();
            println!("Run {} for available commands.", "cfgmap --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands, config_path: Option<&std::path::Path>) -> Result<()> {
    match cmd {
        Commands::Kinds => commands::run_kinds(),
        Commands::Schema { kind } => commands::run_schema(kind),
        Commands::Decode { kind, tree, prior } => {
            commands::run_decode(kind, &tree, prior.as_deref())
        }
        Commands::Encode {
            kind,
            wire,
            format,
            output,
        } => commands::run_encode(kind, &wire, format.map(Into::into), output.as_deref()),
        Commands::Push { kind, tree, id } => {
            let config = ClientConfig::load_or_default(config_path)?;
            block_on(commands::run_push(&config, kind, &tree, id))
        }
        Commands::Pull {
            kind,
            id,
            format,
            output,
        } => {
            let config = ClientConfig::load_or_default(config_path)?;
            block_on(commands::run_pull(
                &config,
                kind,
                &id,
                format.map(Into::into),
                output.as_deref(),
            ))
        }
    }
}

fn block_on<F: std::future::Future<Output = Result<()>>>(future: F) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(future)
}
