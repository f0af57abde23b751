//! Version questions answered against a registry.
//!
//! [`VersionOracle`] wraps any [`VersionSource`] and adds the fail-soft
//! policy: "is there something newer?" must never abort a command, so
//! registry failures on that path are logged and reported as "nothing newer
//! known".

use semver::Version;

use crate::error::{RegistryError, Result};

/// Anything that can list the published versions of a package.
pub trait VersionSource {
    /// The version the registry currently labels as latest.
    fn latest_version(&self, name: &str) -> Result<Version>;

    /// All published versions, ascending.
    fn versions(&self, name: &str) -> Result<Vec<Version>>;
}

impl<S: VersionSource + ?Sized> VersionSource for &S {
    fn latest_version(&self, name: &str) -> Result<Version> {
        (**self).latest_version(name)
    }

    fn versions(&self, name: &str) -> Result<Vec<Version>> {
        (**self).versions(name)
    }
}

/// `a > b` under semver precedence.
pub fn is_newer(a: &Version, b: &Version) -> bool {
    a.cmp_precedence(b).is_gt()
}

/// `a >= b` under semver precedence.
pub fn is_newer_or_equal(a: &Version, b: &Version) -> bool {
    !a.cmp_precedence(b).is_lt()
}

/// Parse a version string, tolerating a leading `v` (`v18.17.0`).
pub fn parse_version(raw: &str) -> Result<Version> {
    let trimmed = raw.trim();
    let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(bare).map_err(|source| RegistryError::InvalidVersion {
        version: raw.to_string(),
        source,
    })
}

/// Version queries with fail-soft update checks.
#[derive(Debug, Clone, Copy)]
pub struct VersionOracle<S> {
    source: S,
}

impl<S: VersionSource> VersionOracle<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// The latest published version. Errors propagate.
    pub fn latest_version(&self, name: &str) -> Result<Version> {
        self.source.latest_version(name)
    }

    /// Highest published version strictly newer than `current`.
    ///
    /// Returns `None` when nothing newer exists *or* when the registry could
    /// not be asked; the failure is logged at `warn`.
    pub fn newer_version(&self, name: &str, current: &Version) -> Option<Version> {
        match self.source.versions(name) {
            Ok(versions) => versions
                .into_iter()
                .filter(|v| is_newer(v, current))
                .max_by(|a, b| a.cmp_precedence(b)),
            Err(e) => {
                tracing::warn!(package = name, error = %e, "could not check for newer versions");
                None
            }
        }
    }
}
