//! Error types for one-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from dispatching a command
    #[error(transparent)]
    Exec(#[from] one_exec::ExecError),

    /// Error from the registry client
    #[error(transparent)]
    Registry(#[from] one_registry::RegistryError),

    /// The user home directory could not be determined or is missing
    #[error("user home directory does not exist{}", .0.as_deref().map(|p| format!(": {p}")).unwrap_or_default())]
    NoUserHome(Option<String>),

    /// Logging could not be set up
    #[error("failed to initialize logging: {0}")]
    Logging(String),
}
