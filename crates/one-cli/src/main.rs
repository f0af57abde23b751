//! one CLI
//!
//! Dispatches subcommands to separately published packages, installing and
//! updating them in a local cache on demand.

mod bootstrap;
mod cli;
mod error;
mod logging;
mod update_check;

use clap::Parser;
use colored::Colorize;
use one_exec::{Dispatcher, InvocationContext, ProcessLoader};
use one_package::NpmTransport;
use one_registry::RegistryClient;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let raw_args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    let cli = Cli::parse();

    let config = bootstrap::load_config(&cli)?;
    logging::init(config.log_level)?;
    tracing::debug!(cli_home = %config.cli_home.display(), "verbose mode enabled");

    let Some(command) = cli.command else {
        println!("{} project tooling, installed on demand", "one".green().bold());
        println!();
        println!("Run {} for available commands.", "one --help".cyan());
        return Ok(0);
    };

    let registry = config.registry_url();
    if config.check_update {
        match RegistryClient::with_url(&registry) {
            Ok(client) => {
                update_check::check(&client, &update_check::current_version());
            }
            Err(e) => tracing::warn!(error = %e, "skipping update check"),
        }
    }

    let ctx = match command {
        Commands::Init {
            project_name,
            force,
        } => InvocationContext::new("init", raw_args, &config)
            .with_positionals(vec![project_name])
            .with_flag("force", force),
        Commands::External(words) => InvocationContext::from_words(&words, raw_args, &config),
    };

    let transport = NpmTransport::new(&registry)?;
    let table = config.command_table();
    let loader = ProcessLoader::new();
    let code = Dispatcher::new(&table, &transport, &loader).dispatch(&ctx)?;
    tracing::debug!(code, "command finished");
    Ok(code)
}
