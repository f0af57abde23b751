use std::path::PathBuf;

use one_registry::RegistryError;

/// Errors raised while acquiring a package.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `latest` could not be resolved and nothing usable is cached.
    #[error("registry unavailable while resolving {package}: {source}")]
    RegistryUnavailable {
        package: String,
        #[source]
        source: RegistryError,
    },

    /// The transport failed to install a pinned version.
    #[error("failed to install {package}@{version}: {source}")]
    InstallFailed {
        package: String,
        version: String,
        #[source]
        source: InstallError,
    },

    /// Cache bookkeeping (store directory, lock, completion marker) failed.
    #[error(transparent)]
    Fs(#[from] one_fs::Error),
}

/// Errors raised by a [`RegistryTransport`](crate::RegistryTransport) install.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("integrity mismatch for {package}: expected {expected}, got {actual}")]
    Integrity {
        package: String,
        expected: String,
        actual: String,
    },

    #[error("failed to extract archive into {path}: {source}")]
    Extract {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("archive entry escapes the package directory: {0}")]
    UnsafeEntry(String),

    #[error("install finished but {0} was not created")]
    Missing(PathBuf),

    #[error(transparent)]
    Fs(#[from] one_fs::Error),

    /// Failure reported by a transport that is not backed by the HTTP client.
    #[error("{0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, Error>;
