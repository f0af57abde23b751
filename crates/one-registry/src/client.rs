//! Registry HTTP client
//!
//! Provides a blocking HTTP client for npm-compatible registries.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use semver::Version;

use crate::api::{Packument, VersionManifest};
use crate::error::{RegistryError, Result};
use crate::oracle::{VersionSource, parse_version};

/// Public npm registry
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Mainland China mirror of the npm registry
pub const MIRROR_REGISTRY: &str = "https://registry.npmmirror.com";

/// Accept header selecting the abbreviated install metadata format
const ABBREVIATED_METADATA: &str = "application/vnd.npm.install-v1+json; q=1.0, application/json; q=0.8";

/// Default registry URL provider.
pub fn default_registry(use_mirror: bool) -> &'static str {
    if use_mirror {
        MIRROR_REGISTRY
    } else {
        DEFAULT_REGISTRY
    }
}

/// Registry client for reading package metadata and tarballs
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: Client,
    base_url: String,
}

impl RegistryClient {
    /// Create a client for the public registry.
    pub fn new() -> Result<Self> {
        Self::with_url(DEFAULT_REGISTRY)
    }

    /// Create a client for a custom registry URL.
    pub fn with_url(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("one-cli/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Registry base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the package document.
    ///
    /// GET /{name}
    pub fn packument(&self, name: &str) -> Result<Packument> {
        let url = format!("{}/{}", self.base_url, encode_package_name(name));
        tracing::debug!(%url, "fetching package metadata");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, ABBREVIATED_METADATA)
            .send()?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RegistryError::PackageNotFound(name.to_string()));
        }

        if !response.status().is_success() {
            return Err(RegistryError::Unavailable(format!(
                "registry returned status {} for {}",
                response.status(),
                name
            )));
        }

        Ok(response.json()?)
    }

    /// Look up one published version.
    pub fn version_manifest(&self, name: &str, version: &Version) -> Result<VersionManifest> {
        let mut packument = self.packument(name)?;
        packument
            .versions
            .remove(&version.to_string())
            .ok_or_else(|| RegistryError::VersionNotFound {
                package: name.to_string(),
                version: version.to_string(),
            })
    }

    /// Download raw bytes, typically a release tarball.
    pub fn download(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!(%url, "downloading");
        let response = self.client.get(url).send()?;

        if !response.status().is_success() {
            return Err(RegistryError::Unavailable(format!(
                "download of {} failed with status {}",
                url,
                response.status()
            )));
        }

        Ok(response.bytes()?.to_vec())
    }
}

impl VersionSource for RegistryClient {
    fn latest_version(&self, name: &str) -> Result<Version> {
        let packument = self.packument(name)?;
        let latest = packument
            .latest_tag()
            .ok_or_else(|| RegistryError::NoLatestTag(name.to_string()))?;
        parse_version(latest)
    }

    fn versions(&self, name: &str) -> Result<Vec<Version>> {
        let packument = self.packument(name)?;
        let mut versions: Vec<Version> = packument
            .versions
            .keys()
            .filter_map(|v| Version::parse(v).ok())
            .collect();
        versions.sort();
        Ok(versions)
    }
}

/// Encode a package name for a URL path.
///
/// Scoped packages keep their `@` but the scope separator is escaped:
/// `@org/name` becomes `@org%2Fname`.
pub fn encode_package_name(name: &str) -> String {
    if name.starts_with('@') {
        name.replacen('/', "%2F", 1)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_package_name() {
        assert_eq!(encode_package_name("debug"), "debug");
        assert_eq!(encode_package_name("my-package"), "my-package");
        assert_eq!(encode_package_name("@one-cli/init"), "@one-cli%2Finit");
    }

    #[test]
    fn test_default_registry_selection() {
        assert_eq!(default_registry(false), "https://registry.npmjs.org");
        assert_eq!(default_registry(true), "https://registry.npmmirror.com");
    }

    #[test]
    fn test_with_url_trims_trailing_slash() {
        let client = RegistryClient::with_url("http://localhost:4873/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:4873");
    }
}
