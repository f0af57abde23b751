//! On-disk layout of the package cache.
//!
//! The layout is the one `npminstall` produces, so caches written by either
//! tool are interchangeable:
//!
//! ```text
//! <cliHome>/dependencies/                       install root
//! └── node_modules/                             module store
//!     ├── _debug@4.3.4@debug/                   unscoped entry
//!     │   └── .npminstall.done
//!     └── _@one-cli_init@1.1.0@@one-cli/
//!         └── init/                             scoped entry (key ends in the name)
//!             └── .npminstall.done
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use semver::Version;

use crate::Result;

/// Name of the install root under the CLI home.
pub const DEPENDENCIES_DIR: &str = "dependencies";

/// Name of the module store under the install root.
pub const STORE_DIR: &str = "node_modules";

/// Written last into a package root; its presence means the entry is complete.
pub const COMPLETION_MARKER: &str = ".npminstall.done";

/// Replace the path separators a package name may contain.
pub fn sanitize_name(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

/// Deterministic cache key for `(name, version)`.
///
/// `_<sanitized>@<version>@<name>`. The trailing name keeps the key traceable
/// back to the package; for scoped names it also nests the entry one level
/// deeper, exactly as `npminstall` does.
pub fn cache_key(name: &str, version: &Version) -> String {
    format!("_{}@{}@{}", sanitize_name(name), version, name)
}

/// `(installRoot, moduleStoreDir)` for one acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLayout {
    install_root: PathBuf,
    store_dir: Option<PathBuf>,
}

impl CacheLayout {
    /// Managed cache under the CLI home directory.
    pub fn managed(cli_home: &Path) -> Self {
        let install_root = cli_home.join(DEPENDENCIES_DIR);
        let store_dir = install_root.join(STORE_DIR);
        Self {
            install_root,
            store_dir: Some(store_dir),
        }
    }

    /// Caller-supplied, pre-populated package directory.
    pub fn bypass(target_path: impl Into<PathBuf>) -> Self {
        Self {
            install_root: target_path.into(),
            store_dir: None,
        }
    }

    pub fn is_managed(&self) -> bool {
        self.store_dir.is_some()
    }

    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    pub fn store_dir(&self) -> Option<&Path> {
        self.store_dir.as_deref()
    }

    /// Directory holding `(name, version)`.
    pub fn package_root(&self, name: &str, version: &Version) -> PathBuf {
        match &self.store_dir {
            Some(store) => store.join(cache_key(name, version)),
            None => self.install_root.clone(),
        }
    }
}

/// Whether the entry at `package_root` finished installing.
pub fn is_complete(package_root: &Path) -> bool {
    package_root.join(COMPLETION_MARKER).is_file()
}

/// Record that `package_root` finished installing.
pub fn mark_complete(package_root: &Path) -> Result<()> {
    one_fs::io::write_atomic(&package_root.join(COMPLETION_MARKER), b"")?;
    Ok(())
}

/// Lock file guarding installs into `package_root`.
///
/// A sibling of the root rather than a file inside it, so it survives the
/// removal of a half-written entry.
pub fn lock_path(package_root: &Path) -> PathBuf {
    let mut name = package_root
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    package_root.with_file_name(name)
}

/// Versions of `name` with a complete entry in `store`, ascending.
pub fn cached_versions(store: &Path, name: &str) -> Vec<Version> {
    let prefix = format!("_{}@", sanitize_name(name));
    let Ok(entries) = fs::read_dir(store) else {
        return Vec::new();
    };

    let mut versions: Vec<Version> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let file_name = entry.file_name();
            let rest = file_name.to_str()?.strip_prefix(&prefix)?;
            let (raw_version, _) = rest.split_once('@')?;
            Version::parse(raw_version).ok()
        })
        .filter(|version| is_complete(&store.join(cache_key(name, version))))
        .collect();

    versions.sort_by(|a, b| a.cmp_precedence(b));
    versions.dedup();
    versions
}
