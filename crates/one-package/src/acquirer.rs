//! The install/update state machine.
//!
//! ```text
//! Unchecked ──exists()──► Absent ──install()──► Installing ──► Installed
//!                    └──► PresentCurrent ──update()──► PresentStale ──► Installing ──► Installed
//! ```
//!
//! The cache is append-only: an update installs the new version next to the
//! old one and never touches existing entries. Install and update therefore
//! share one primitive, "install this pinned version", which runs under an
//! exclusive per-entry lock.

use std::path::PathBuf;

use one_fs::CacheLock;
use one_registry::VersionOracle;
use semver::Version;

use crate::cache::{self, cached_versions, is_complete};
use crate::descriptor::{PackageDescriptor, PackageVersion};
use crate::error::{Error, InstallError, Result};
use crate::manifest::{self, ResolvedEntry};
use crate::transport::{InstallRequest, PackageSpec, RegistryTransport};

/// Where an acquisition stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireState {
    Unchecked,
    Absent,
    PresentStale,
    PresentCurrent,
    Installing,
    Installed,
}

/// Drives one package from "requested" to "on disk".
pub struct PackageAcquirer<'t, T: RegistryTransport + ?Sized> {
    descriptor: PackageDescriptor,
    transport: &'t T,
    state: AcquireState,
}

impl<'t, T: RegistryTransport + ?Sized> PackageAcquirer<'t, T> {
    pub fn new(descriptor: PackageDescriptor, transport: &'t T) -> Self {
        Self {
            descriptor,
            transport,
            state: AcquireState::Unchecked,
        }
    }

    pub fn descriptor(&self) -> &PackageDescriptor {
        &self.descriptor
    }

    pub fn state(&self) -> AcquireState {
        self.state
    }

    pub fn is_managed(&self) -> bool {
        self.descriptor.layout().is_managed()
    }

    /// Make the managed store usable and pin `latest` to a concrete version.
    ///
    /// No-op in bypass mode and once the version is pinned.
    pub fn prepare(&mut self) -> Result<()> {
        let Some(store) = self.descriptor.store_dir() else {
            return Ok(());
        };
        one_fs::io::ensure_dir(store)?;

        if self.descriptor.version().is_latest() {
            let version = self.resolve_latest()?;
            tracing::debug!(package = self.descriptor.name(), %version, "resolved latest");
            self.descriptor.pin(version);
        }
        Ok(())
    }

    /// Whether a complete copy of the requested version is on disk.
    ///
    /// Managed mode resolves `latest` first. A cache directory without the
    /// completion marker counts as absent. Bypass mode only checks that the
    /// target path exists.
    pub fn exists(&mut self) -> Result<bool> {
        let present = if self.is_managed() {
            self.prepare()?;
            self.descriptor.package_root().is_some_and(|root| is_complete(&root))
        } else {
            self.descriptor.target_path().exists()
        };

        self.state = if present {
            AcquireState::PresentCurrent
        } else {
            AcquireState::Absent
        };
        tracing::debug!(package = %self.descriptor, present, "checked cache");
        Ok(present)
    }

    /// Install the requested version. Failures are fatal and not retried.
    pub fn install(&mut self) -> Result<()> {
        self.prepare()?;
        let version = self.pinned_version()?;
        self.install_pinned(version)
    }

    /// Install the registry's latest version if it is not cached yet.
    ///
    /// Meant to follow a successful [`exists`](Self::exists). If the registry
    /// cannot be reached the cached version is kept and the failure is only
    /// logged. Calling it again without a registry change installs nothing.
    pub fn update(&mut self) -> Result<()> {
        if !self.is_managed() {
            return Ok(());
        }

        let name = self.descriptor.name().to_string();
        let latest = match self.oracle().latest_version(&name) {
            Ok(version) => version,
            Err(e) => {
                tracing::warn!(package = %name, error = %e, "update check failed, using cached version");
                self.state = AcquireState::PresentCurrent;
                return Ok(());
            }
        };

        let root = self.descriptor.layout().package_root(&name, &latest);
        if is_complete(&root) {
            self.descriptor.pin(latest);
            self.state = AcquireState::PresentCurrent;
            return Ok(());
        }

        tracing::info!(package = %name, version = %latest, "newer version available, installing");
        self.state = AcquireState::PresentStale;
        self.install_pinned(latest)
    }

    /// `exists()`, then `update()` or `install()` as appropriate.
    ///
    /// Bypass mode never installs: the caller vouches for the target path.
    pub fn acquire(&mut self) -> Result<()> {
        if !self.is_managed() {
            if !self.exists()? {
                tracing::warn!(path = %self.descriptor.target_path().display(), "target path does not exist");
            }
            return Ok(());
        }

        if self.exists()? {
            self.update()
        } else {
            self.install()
        }
    }

    /// Directory of the acquired package, once its version is known.
    pub fn package_root(&self) -> Option<PathBuf> {
        self.descriptor.package_root()
    }

    /// Entry point of the acquired package.
    ///
    /// The manifest search never leaves the store in managed mode. In bypass
    /// mode it walks up from the target path to the nearest manifest.
    pub fn resolve_entry(&self) -> Option<ResolvedEntry> {
        let root = self.package_root()?;
        manifest::resolve_entry(&root, self.descriptor.store_dir())
    }

    pub fn into_descriptor(self) -> PackageDescriptor {
        self.descriptor
    }

    fn oracle(&self) -> VersionOracle<&'t T> {
        VersionOracle::new(self.transport)
    }

    fn pinned_version(&self) -> Result<Version> {
        match self.descriptor.version() {
            PackageVersion::Concrete(version) => Ok(version.clone()),
            // Bypass mode never pins on its own
            PackageVersion::Latest => self.resolve_latest(),
        }
    }

    /// Registry `latest`, falling back to the newest complete cached copy.
    fn resolve_latest(&self) -> Result<Version> {
        let name = self.descriptor.name();
        match self.oracle().latest_version(name) {
            Ok(version) => Ok(version),
            Err(source) => {
                let cached = self
                    .descriptor
                    .store_dir()
                    .and_then(|store| cached_versions(store, name).pop());
                match cached {
                    Some(version) => {
                        tracing::warn!(package = name, %version, error = %source, "registry unavailable, using cached version");
                        Ok(version)
                    }
                    None => Err(Error::RegistryUnavailable {
                        package: name.to_string(),
                        source,
                    }),
                }
            }
        }
    }

    fn install_pinned(&mut self, version: Version) -> Result<()> {
        self.state = AcquireState::Installing;
        self.install_version(&version)?;
        if self.is_managed() {
            self.descriptor.pin(version);
        }
        self.state = AcquireState::Installed;
        Ok(())
    }

    fn install_version(&self, version: &Version) -> Result<()> {
        let name = self.descriptor.name();
        let layout = self.descriptor.layout();
        let spec = PackageSpec {
            name: name.to_string(),
            version: version.clone(),
        };
        let request = InstallRequest {
            root: layout.install_root().to_path_buf(),
            store_dir: layout.store_dir().map(|p| p.to_path_buf()),
            registry: self.transport.registry_url().to_string(),
            packages: vec![spec.clone()],
        };
        let root = request.package_dir(&spec);
        let failed = |source: InstallError| Error::InstallFailed {
            package: name.to_string(),
            version: version.to_string(),
            source,
        };

        let _lock = CacheLock::acquire(&cache::lock_path(&root))?;

        // Another process may have finished while we waited
        if is_complete(&root) {
            tracing::debug!(package = name, %version, "entry completed by another process");
            return Ok(());
        }
        if root.exists() {
            tracing::warn!(path = %root.display(), "removing incomplete install");
            one_fs::io::remove_dir_if_exists(&root)?;
        }

        tracing::info!(package = name, %version, registry = %request.registry, "installing");
        self.transport.install(&request).map_err(failed)?;

        if !root.is_dir() {
            return Err(failed(InstallError::Missing(root)));
        }
        cache::mark_complete(&root)
    }
}
