/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// HTTP request failed (connection refused, timeout, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The registry has no package with this name.
    #[error("package not found: {0}")]
    PackageNotFound(String),

    /// The package exists but not at this version.
    #[error("version {version} not found for package {package}")]
    VersionNotFound { package: String, version: String },

    /// The packument carries no `latest` dist-tag.
    #[error("package {0} has no 'latest' dist-tag")]
    NoLatestTag(String),

    /// A version string from the registry is not valid semver.
    #[error("invalid version '{version}': {source}")]
    InvalidVersion {
        version: String,
        source: semver::Error,
    },

    /// The registry answered with an unexpected status.
    #[error("registry unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
