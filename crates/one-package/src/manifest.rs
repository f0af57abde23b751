//! Entry-point resolution for installed packages.
//!
//! A package declares its invocable module through the `main` field of its
//! `package.json`. The manifest is read fresh on every call: an install or
//! update may have replaced the package since the last dispatch.

use std::path::{Path, PathBuf};

use one_fs::NormalizedPath;
use serde::Deserialize;

/// The manifest file looked for in a package tree.
pub const MANIFEST_FILENAME: &str = "package.json";

/// Highest plugin protocol this build can invoke.
pub const SUPPORTED_PROTOCOL: u32 = 1;

/// The fields of `package.json` the dispatcher cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EntryPointManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// Entry file, relative to the manifest directory.
    #[serde(default)]
    pub main: Option<String>,
    /// Plugin contract metadata.
    #[serde(default, rename = "oneCli")]
    pub one_cli: Option<PluginSection>,
}

/// `"oneCli": { "protocol": 1 }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PluginSection {
    #[serde(default)]
    pub protocol: Option<u32>,
}

impl EntryPointManifest {
    /// Read and parse a manifest file.
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = one_fs::io::read_text(path)?;
        serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Plugin protocol declared by the package; packages that predate the
    /// field speak protocol 1.
    pub fn protocol(&self) -> u32 {
        self.one_cli
            .as_ref()
            .and_then(|section| section.protocol)
            .unwrap_or(1)
    }

    pub fn is_protocol_supported(&self) -> bool {
        self.protocol() <= SUPPORTED_PROTOCOL
    }
}

/// Why a manifest could not be read. Only logged: resolution reports a
/// missing entry, not a failure.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error(transparent)]
    Fs(#[from] one_fs::Error),

    #[error("malformed manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// An entry module ready to be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
    /// Absolute, normalized path of the entry file.
    pub path: PathBuf,
    /// Directory containing the manifest the entry came from.
    pub manifest_dir: PathBuf,
    pub manifest: EntryPointManifest,
}

/// Nearest directory at or above `start` that contains a manifest.
///
/// The walk stops before `boundary` when one is given, so a package in a
/// shared store can never pick up a manifest belonging to the store itself.
pub fn find_manifest_dir(start: &Path, boundary: Option<&Path>) -> Option<PathBuf> {
    if !start.is_dir() {
        return None;
    }
    let mut current = Some(start);
    while let Some(dir) = current {
        if boundary.is_some_and(|b| dir == b) {
            return None;
        }
        if dir.join(MANIFEST_FILENAME).is_file() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

/// Resolve the entry point of the package installed at `package_root`.
///
/// Returns `None` when no manifest is found, when it cannot be parsed or when
/// it declares no `main`. The returned path is not checked for existence;
/// loading it reports that.
pub fn resolve_entry(package_root: &Path, boundary: Option<&Path>) -> Option<ResolvedEntry> {
    let manifest_dir = find_manifest_dir(package_root, boundary)?;
    let manifest_path = manifest_dir.join(MANIFEST_FILENAME);

    let manifest = match EntryPointManifest::from_file(&manifest_path) {
        Ok(manifest) => manifest,
        Err(e) => {
            tracing::warn!(manifest = %manifest_path.display(), error = %e, "ignoring unreadable manifest");
            return None;
        }
    };

    let Some(main) = manifest.main.as_deref().filter(|m| !m.trim().is_empty()) else {
        tracing::debug!(manifest = %manifest_path.display(), "manifest declares no main file");
        return None;
    };

    let joined = manifest_dir.join(main.replace('\\', "/"));
    let normalized = match NormalizedPath::absolute(&joined) {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!(path = %joined.display(), error = %e, "cannot make entry path absolute");
            return None;
        }
    };

    Some(ResolvedEntry {
        path: normalized.to_native(),
        manifest_dir,
        manifest,
    })
}
