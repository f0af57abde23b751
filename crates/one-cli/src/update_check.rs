//! Warn when a newer release of the CLI itself is published.

use colored::Colorize;
use one_registry::{Version, VersionOracle, VersionSource};

/// Registry name of the CLI's own package.
pub const SELF_PACKAGE: &str = "@one-cli/core";

/// The newer release, if any. Never fails: registry problems are logged.
pub fn check<S: VersionSource>(source: S, current: &Version) -> Option<Version> {
    let newer = VersionOracle::new(source).newer_version(SELF_PACKAGE, current)?;
    eprintln!(
        "{} {}",
        "warning:".yellow().bold(),
        format!(
            "please update {}, current version: {}, latest version: {}",
            SELF_PACKAGE, current, newer
        )
        .yellow()
    );
    Some(newer)
}

/// Version of the running binary.
pub fn current_version() -> Version {
    one_registry::parse_version(env!("CARGO_PKG_VERSION")).unwrap_or_else(|_| Version::new(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use one_registry::{RegistryError, Result};

    struct Published(Vec<Version>);

    impl VersionSource for Published {
        fn latest_version(&self, _name: &str) -> Result<Version> {
            self.0.last().cloned().ok_or(RegistryError::NoLatestTag(SELF_PACKAGE.into()))
        }

        fn versions(&self, _name: &str) -> Result<Vec<Version>> {
            Ok(self.0.clone())
        }
    }

    struct Offline;

    impl VersionSource for Offline {
        fn latest_version(&self, _name: &str) -> Result<Version> {
            Err(RegistryError::Unavailable("offline".into()))
        }

        fn versions(&self, _name: &str) -> Result<Vec<Version>> {
            Err(RegistryError::Unavailable("offline".into()))
        }
    }

    #[test]
    fn test_reports_newer_release() {
        let source = Published(vec![Version::new(0, 1, 0), Version::new(0, 3, 1)]);
        assert_eq!(check(&source, &Version::new(0, 1, 0)), Some(Version::new(0, 3, 1)));
    }

    #[test]
    fn test_silent_when_current() {
        let source = Published(vec![Version::new(0, 1, 0)]);
        assert_eq!(check(&source, &Version::new(0, 1, 0)), None);
    }

    #[test]
    fn test_silent_when_offline() {
        assert_eq!(check(Offline, &Version::new(0, 1, 0)), None);
    }

    #[test]
    fn test_current_version_parses() {
        assert_eq!(current_version().to_string(), env!("CARGO_PKG_VERSION"));
    }
}
