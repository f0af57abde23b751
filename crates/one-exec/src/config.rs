//! Resolved CLI configuration.
//!
//! Built once at startup and passed down explicitly. Sources, highest
//! precedence first:
//!
//! 1. command-line flags ([`ConfigFlags`])
//! 2. the process environment
//! 3. `<home>/.env`
//! 4. `<cliHome>/config.toml` ([`UserSettings`])
//! 5. built-in defaults
//!
//! Nothing here writes to the process environment.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ExecError, Result};
use crate::table::CommandTable;

/// Default CLI home, relative to the user home.
pub const DEFAULT_CLI_HOME: &str = ".one-cli";

/// Settings file inside the CLI home.
pub const SETTINGS_FILENAME: &str = "config.toml";

/// Dotenv file inside the user home.
pub const ENV_FILENAME: &str = ".env";

pub const ENV_CLI_HOME: &str = "CLI_HOME";
pub const ENV_CLI_HOME_PATH: &str = "CLI_HOME_PATH";
pub const ENV_CLI_TARGET_PATH: &str = "CLI_TARGET_PATH";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_REGISTRY: &str = "ONE_CLI_REGISTRY";
pub const ENV_SKIP_UPDATE_CHECK: &str = "ONE_CLI_SKIP_UPDATE_CHECK";

/// Log level forwarded to invoked packages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Info,
    Verbose,
}

impl LogLevel {
    /// Value of `LOG_LEVEL` for child processes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Verbose => "verbose",
        }
    }

    /// Matching `tracing` filter directive.
    pub fn directive(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Verbose => "debug",
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Self::Verbose)
    }
}

/// Options given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigFlags {
    pub debug: bool,
    pub target_path: Option<PathBuf>,
    pub registry: Option<String>,
    pub mirror: bool,
}

/// `<cliHome>/config.toml`
///
/// ```toml
/// registry = "https://registry.npmmirror.com"
/// check_update = false
///
/// [commands]
/// publish = "@acme/one-publish"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserSettings {
    #[serde(default)]
    pub registry: Option<String>,
    #[serde(default)]
    pub check_update: Option<bool>,
    /// Extra command routes, merged over the built-in table.
    #[serde(default)]
    pub commands: BTreeMap<String, String>,
}

impl UserSettings {
    /// Load settings from `cli_home`; a missing file yields the defaults.
    pub fn load(cli_home: &Path) -> Result<Self> {
        let path = cli_home.join(SETTINGS_FILENAME);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = one_fs::io::read_text(&path)?;
        toml::from_str(&content).map_err(|source| ExecError::Settings { path, source })
    }
}

/// Environment variables visible to configuration, process values over
/// `.env` values.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    process: HashMap<String, String>,
    dotenv: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the current process environment.
    pub fn from_process() -> Self {
        Self {
            process: std::env::vars().collect(),
            dotenv: BTreeMap::new(),
        }
    }

    /// Snapshot from explicit pairs, for tests and embedding.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            process: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            dotenv: BTreeMap::new(),
        }
    }

    /// Layer `<home>/.env` underneath the process values.
    pub fn with_dotenv_file(mut self, home: &Path) -> Result<Self> {
        let path = home.join(ENV_FILENAME);
        if path.is_file() {
            let content = one_fs::io::read_text(&path)?;
            self.dotenv = parse_dotenv(&content);
            tracing::debug!(path = %path.display(), keys = self.dotenv.len(), "loaded env file");
        }
        Ok(self)
    }

    /// Non-empty value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.process
            .get(key)
            .or_else(|| self.dotenv.get(key))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Whether `key` holds a truthy flag value.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key)
            .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
    }
}

/// Parse `KEY=VALUE` lines. Blank lines and `#` comments are skipped, an
/// optional `export ` prefix is dropped and matching outer quotes are
/// removed from values.
pub fn parse_dotenv(content: &str) -> BTreeMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), unquote(value.trim()).to_string()))
        })
        .collect()
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Everything the CLI needs to know about its environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// User home directory.
    pub home: PathBuf,
    /// CLI home (`CLI_HOME_PATH`); the managed cache lives here.
    pub cli_home: PathBuf,
    /// Pre-populated package directory that bypasses the cache.
    pub target_path: Option<PathBuf>,
    pub log_level: LogLevel,
    /// Registry chosen by flag, environment or settings.
    pub registry: Option<String>,
    /// Use the mirror when no registry was chosen.
    pub use_mirror: bool,
    pub check_update: bool,
    /// Command routes from the settings file.
    pub commands: BTreeMap<String, String>,
}

impl CliConfig {
    /// Defaults for a user home, ignoring every other source.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let cli_home = home.join(DEFAULT_CLI_HOME);
        Self {
            home,
            cli_home,
            target_path: None,
            log_level: LogLevel::Info,
            registry: None,
            use_mirror: false,
            check_update: true,
            commands: BTreeMap::new(),
        }
    }

    /// Resolve the configuration from all sources.
    pub fn load(home: &Path, flags: &ConfigFlags, env: &EnvSnapshot) -> Result<Self> {
        let mut config = Self::new(home);

        if let Some(relative) = env.get(ENV_CLI_HOME) {
            config.cli_home = home.join(relative);
        }
        let settings = UserSettings::load(&config.cli_home)?;

        config.log_level = if flags.debug || env.get(ENV_LOG_LEVEL) == Some("verbose") {
            LogLevel::Verbose
        } else {
            LogLevel::Info
        };

        config.target_path = flags
            .target_path
            .clone()
            .or_else(|| env.get(ENV_CLI_TARGET_PATH).map(PathBuf::from))
            .map(|p| if p.is_absolute() { p } else { absolutize(&p) });

        config.registry = flags
            .registry
            .clone()
            .or_else(|| env.get(ENV_REGISTRY).map(str::to_string))
            .or(settings.registry);
        config.use_mirror = flags.mirror;

        config.check_update =
            !env.flag(ENV_SKIP_UPDATE_CHECK) && settings.check_update.unwrap_or(true);
        config.commands = settings.commands;

        tracing::debug!(cli_home = %config.cli_home.display(), "configuration resolved");
        Ok(config)
    }

    /// Registry URL to use for queries and installs.
    pub fn registry_url(&self) -> String {
        self.registry
            .clone()
            .unwrap_or_else(|| one_registry::default_registry(self.use_mirror).to_string())
    }

    /// Built-in routes plus those from the settings file.
    pub fn command_table(&self) -> CommandTable {
        let mut table = CommandTable::with_builtin();
        table.extend(self.commands.iter().map(|(c, p)| (c.as_str(), p.as_str())));
        table
    }
}

fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
