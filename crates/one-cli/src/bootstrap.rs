//! Startup checks and configuration loading.

use std::path::PathBuf;

use one_exec::{CliConfig, ConfigFlags, EnvSnapshot};

use crate::cli::Cli;
use crate::error::{CliError, Result};

/// The user's home directory, which must exist.
pub fn user_home() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(CliError::NoUserHome(None))?;
    if !home.is_dir() {
        return Err(CliError::NoUserHome(Some(home.display().to_string())));
    }
    Ok(home)
}

/// Resolve the configuration for this run from flags, environment,
/// `~/.env` and the settings file.
pub fn load_config(cli: &Cli) -> Result<CliConfig> {
    let home = user_home()?;
    let env = EnvSnapshot::from_process().with_dotenv_file(&home)?;
    let flags = ConfigFlags {
        debug: cli.debug,
        target_path: cli.target_path.clone(),
        registry: cli.registry.clone(),
        mirror: cli.mirror,
    };
    Ok(CliConfig::load(&home, &flags, &env)?)
}
