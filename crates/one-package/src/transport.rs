//! The registry install primitive.
//!
//! A [`RegistryTransport`] knows how to answer version questions (it is a
//! [`VersionSource`]) and how to install pinned `(name, version)` pairs into
//! a cache layout. The acquirer never talks HTTP itself; it only sees this
//! trait, which keeps the install/update logic testable with a fake.

use std::fs;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use data_encoding::BASE64;
use flate2::read::GzDecoder;
use one_registry::{RegistryClient, RegistryError, VersionSource};
use semver::Version;
use sha2::{Digest, Sha512};
use tar::Archive;

use crate::cache::{STORE_DIR, cache_key};
use crate::error::InstallError;

/// A pinned package to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    pub version: Version,
}

/// Arguments of one install call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    /// Install root (`<cliHome>/dependencies` or the bypass target path)
    pub root: PathBuf,
    /// Module store; `None` installs into `<root>/node_modules/<name>`
    pub store_dir: Option<PathBuf>,
    /// Registry to download from
    pub registry: String,
    /// Packages to install
    pub packages: Vec<PackageSpec>,
}

impl InstallRequest {
    /// Directory the given package ends up in.
    pub fn package_dir(&self, spec: &PackageSpec) -> PathBuf {
        match &self.store_dir {
            Some(store) => store.join(cache_key(&spec.name, &spec.version)),
            None => self.root.join(STORE_DIR).join(&spec.name),
        }
    }
}

/// Registry access used by the acquirer.
pub trait RegistryTransport: VersionSource {
    /// Registry URL installs are requested from.
    fn registry_url(&self) -> &str;

    /// Install every package in `request`. All or nothing is not promised;
    /// callers install one package per request.
    fn install(&self, request: &InstallRequest) -> Result<(), InstallError>;
}

/// Transport backed by an npm-compatible HTTP registry.
#[derive(Debug, Clone)]
pub struct NpmTransport {
    client: RegistryClient,
}

impl NpmTransport {
    pub fn new(registry: &str) -> Result<Self, RegistryError> {
        Ok(Self {
            client: RegistryClient::with_url(registry)?,
        })
    }

    fn install_one(
        &self,
        client: &RegistryClient,
        spec: &PackageSpec,
        dest: &Path,
    ) -> Result<(), InstallError> {
        let manifest = client.version_manifest(&spec.name, &spec.version)?;
        let archive = client.download(&manifest.dist.tarball)?;

        match manifest.dist.integrity.as_deref() {
            Some(integrity) => verify_integrity(&spec.name, integrity, &archive)?,
            None => tracing::debug!(package = %spec.name, "registry sent no integrity, skipping check"),
        }

        extract_tarball(&archive, dest)?;
        tracing::info!(package = %spec.name, version = %spec.version, dest = %dest.display(), "installed");
        Ok(())
    }
}

impl VersionSource for NpmTransport {
    fn latest_version(&self, name: &str) -> one_registry::Result<Version> {
        self.client.latest_version(name)
    }

    fn versions(&self, name: &str) -> one_registry::Result<Vec<Version>> {
        self.client.versions(name)
    }
}

impl RegistryTransport for NpmTransport {
    fn registry_url(&self) -> &str {
        self.client.base_url()
    }

    fn install(&self, request: &InstallRequest) -> Result<(), InstallError> {
        let other;
        let client = if request.registry.trim_end_matches('/') == self.client.base_url() {
            &self.client
        } else {
            other = RegistryClient::with_url(&request.registry)?;
            &other
        };

        for spec in &request.packages {
            self.install_one(client, spec, &request.package_dir(spec))?;
        }
        Ok(())
    }
}

/// Check `archive` against a subresource-integrity string.
///
/// Only `sha512` digests are checked; other algorithms in the string are
/// ignored, and a string with no `sha512` entry is accepted.
pub(crate) fn verify_integrity(
    package: &str,
    integrity: &str,
    archive: &[u8],
) -> Result<(), InstallError> {
    let Some(expected) = integrity
        .split_whitespace()
        .find_map(|entry| entry.strip_prefix("sha512-"))
    else {
        tracing::debug!(package, integrity, "no sha512 digest to verify");
        return Ok(());
    };

    let actual = BASE64.encode(&Sha512::digest(archive));
    if actual != expected {
        return Err(InstallError::Integrity {
            package: package.to_string(),
            expected: format!("sha512-{}", expected),
            actual: format!("sha512-{}", actual),
        });
    }
    Ok(())
}

/// Unpack an npm tarball into `dest`.
///
/// npm archives wrap everything in one top-level directory (usually
/// `package/`), which is stripped. Only regular files and directories are
/// written; entries that would land outside `dest` abort the extraction.
pub(crate) fn extract_tarball(archive: &[u8], dest: &Path) -> Result<(), InstallError> {
    let extract_err = |source| InstallError::Extract {
        path: dest.to_path_buf(),
        source,
    };

    fs::create_dir_all(dest).map_err(extract_err)?;
    let mut tar = Archive::new(GzDecoder::new(archive));

    for entry in tar.entries().map_err(extract_err)? {
        let mut entry = entry.map_err(extract_err)?;
        let entry_type = entry.header().entry_type();
        if !(entry_type.is_file() || entry_type.is_dir()) {
            continue;
        }

        let raw_path = entry.path().map_err(extract_err)?.into_owned();
        let Some(relative) = strip_top_level(&raw_path)? else {
            continue;
        };

        let target = dest.join(&relative);
        if entry_type.is_dir() {
            fs::create_dir_all(&target).map_err(extract_err)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(extract_err)?;
        }

        let mut contents = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut contents).map_err(extract_err)?;
        fs::write(&target, &contents).map_err(extract_err)?;

        #[cfg(unix)]
        if let Ok(mode) = entry.header().mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&target, fs::Permissions::from_mode(mode & 0o777))
                .map_err(extract_err)?;
        }
    }
    Ok(())
}

/// Drop the first path component; reject anything that climbs out.
fn strip_top_level(path: &Path) -> Result<Option<PathBuf>, InstallError> {
    let mut components = path.components();
    components.next();

    let mut relative = PathBuf::new();
    for component in components {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(InstallError::UnsafeEntry(path.display().to_string()));
            }
        }
    }

    Ok(if relative.as_os_str().is_empty() {
        None
    } else {
        Some(relative)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;

    fn tarball(files: &[(&str, &str)]) -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        for (path, contents) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, path, contents.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn test_extract_strips_package_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let archive = tarball(&[
            ("package/package.json", r#"{"main":"lib/index.js"}"#),
            ("package/lib/index.js", "module.exports = () => 0;"),
        ]);

        extract_tarball(&archive, dir.path()).unwrap();

        assert!(dir.path().join("package.json").is_file());
        assert_eq!(
            fs::read_to_string(dir.path().join("lib/index.js")).unwrap(),
            "module.exports = () => 0;"
        );
        assert!(!dir.path().join("package").exists());
    }

    #[test]
    fn test_extract_rejects_parent_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("pkg");
        let mut header = tar::Header::new_gnu();
        header.set_size(1);
        header.set_mode(0o644);
        // Bypass the builder's own path validation
        header.as_gnu_mut().unwrap().name[..21].copy_from_slice(b"package/../../evil.js");
        header.set_cksum();
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        builder.append(&header, &b"x"[..]).unwrap();
        let archive = builder.into_inner().unwrap().finish().unwrap();

        let result = extract_tarball(&archive, &dest);

        assert!(matches!(result, Err(InstallError::UnsafeEntry(_))));
        assert!(!dir.path().join("evil.js").exists());
    }

    #[test]
    fn test_verify_integrity_accepts_matching_digest() {
        let data = b"tarball bytes";
        let integrity = format!("sha512-{}", BASE64.encode(&Sha512::digest(data)));
        assert!(verify_integrity("pkg", &integrity, data).is_ok());
    }

    #[test]
    fn test_verify_integrity_rejects_mismatch() {
        let integrity = format!("sha512-{}", BASE64.encode(&Sha512::digest(b"other")));
        let result = verify_integrity("pkg", &integrity, b"tarball bytes");
        assert!(matches!(result, Err(InstallError::Integrity { .. })));
    }

    #[test]
    fn test_verify_integrity_ignores_unknown_algorithms() {
        assert!(verify_integrity("pkg", "sha1-deadbeef", b"anything").is_ok());
    }

    #[test]
    fn test_package_dir_managed_and_bypass() {
        let spec = PackageSpec {
            name: "@one-cli/init".into(),
            version: Version::new(1, 0, 0),
        };
        let managed = InstallRequest {
            root: PathBuf::from("/h/dependencies"),
            store_dir: Some(PathBuf::from("/h/dependencies/node_modules")),
            registry: "https://registry.npmjs.org".into(),
            packages: vec![spec.clone()],
        };
        assert_eq!(
            managed.package_dir(&spec),
            PathBuf::from("/h/dependencies/node_modules/_@one-cli_init@1.0.0@@one-cli/init")
        );

        let bypass = InstallRequest {
            store_dir: None,
            root: PathBuf::from("/work"),
            ..managed
        };
        assert_eq!(
            bypass.package_dir(&spec),
            PathBuf::from("/work/node_modules/@one-cli/init")
        );
    }
}
