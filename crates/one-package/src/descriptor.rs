//! What to acquire and where.

use std::fmt;
use std::path::{Path, PathBuf};

use semver::Version;

use crate::cache::CacheLayout;

/// Requested version of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageVersion {
    /// Whatever the registry's `latest` dist-tag points at.
    Latest,
    /// A pinned, resolved version.
    Concrete(Version),
}

impl PackageVersion {
    pub fn is_latest(&self) -> bool {
        matches!(self, Self::Latest)
    }

    /// The pinned version, if resolution already happened.
    pub fn concrete(&self) -> Option<&Version> {
        match self {
            Self::Latest => None,
            Self::Concrete(v) => Some(v),
        }
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Concrete(v) => write!(f, "{}", v),
        }
    }
}

impl From<Version> for PackageVersion {
    fn from(v: Version) -> Self {
        Self::Concrete(v)
    }
}

/// Identifies a package to acquire and the cache it lives in.
///
/// Only the version changes after construction: it moves from
/// [`PackageVersion::Latest`] to a concrete version once the acquirer has
/// resolved it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    name: String,
    version: PackageVersion,
    layout: CacheLayout,
}

impl PackageDescriptor {
    pub fn new(name: impl Into<String>, version: PackageVersion, layout: CacheLayout) -> Self {
        Self {
            name: name.into(),
            version,
            layout,
        }
    }

    /// Descriptor for the latest version of `name`.
    pub fn latest(name: impl Into<String>, layout: CacheLayout) -> Self {
        Self::new(name, PackageVersion::Latest, layout)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &PackageVersion {
        &self.version
    }

    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    pub fn target_path(&self) -> &Path {
        self.layout.install_root()
    }

    pub fn store_dir(&self) -> Option<&Path> {
        self.layout.store_dir()
    }

    /// Where this package's files live for the current version.
    ///
    /// In bypass mode that is the target path itself. In managed mode it is
    /// the cache-key directory, which requires a resolved version.
    pub fn package_root(&self) -> Option<PathBuf> {
        match (self.layout.store_dir(), &self.version) {
            (None, _) => Some(self.layout.install_root().to_path_buf()),
            (Some(_), PackageVersion::Concrete(v)) => Some(self.layout.package_root(&self.name, v)),
            (Some(_), PackageVersion::Latest) => None,
        }
    }

    pub(crate) fn pin(&mut self, version: Version) {
        self.version = PackageVersion::Concrete(version);
    }
}

impl fmt::Display for PackageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}
