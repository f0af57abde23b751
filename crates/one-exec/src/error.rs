use std::path::PathBuf;

use one_package::InstallError;
use one_registry::{RegistryError, Version};

/// Errors that end a dispatch.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// The command word is not in the routing table.
    #[error("unknown command '{command}'\navailable commands: {}", known.join(", "))]
    UnknownCommand { command: String, known: Vec<String> },

    /// `latest` could not be resolved and nothing usable is cached.
    #[error("registry unavailable while resolving {package}: {source}")]
    RegistryUnavailable {
        package: String,
        #[source]
        source: RegistryError,
    },

    /// The registry transport failed to install the package.
    #[error("failed to install {package}@{version}: {source}")]
    InstallFailed {
        package: String,
        version: String,
        #[source]
        source: InstallError,
    },

    /// The package has no manifest or its manifest names no entry file.
    #[error("package {package} has no entry point under {}", root.display())]
    NoEntryPoint { package: String, root: PathBuf },

    /// The entry exists but does not satisfy the plugin contract.
    #[error("{} is not a compatible entry point: {reason}", path.display())]
    IncompatibleEntry { path: PathBuf, reason: String },

    /// A runtime the entry needs is not installed.
    #[error("'{tool}' not found on PATH{}", hint.as_deref().unwrap_or(""))]
    RuntimeNotFound { tool: String, hint: Option<String> },

    /// A runtime the entry needs is installed but too old.
    #[error("{tool} {found} is too old, {required} or newer is required")]
    RuntimeTooOld {
        tool: String,
        found: Version,
        required: Version,
    },

    /// The entry process could not be started.
    #[error("failed to run {}: {source}", path.display())]
    Invoke {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {}: {source}", path.display())]
    Settings {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to encode invocation context: {0}")]
    Context(#[from] serde_json::Error),

    #[error(transparent)]
    Fs(#[from] one_fs::Error),
}

impl From<one_package::Error> for ExecError {
    fn from(err: one_package::Error) -> Self {
        match err {
            one_package::Error::RegistryUnavailable { package, source } => {
                Self::RegistryUnavailable { package, source }
            }
            one_package::Error::InstallFailed {
                package,
                version,
                source,
            } => Self::InstallFailed {
                package,
                version,
                source,
            },
            one_package::Error::Fs(e) => Self::Fs(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExecError>;
