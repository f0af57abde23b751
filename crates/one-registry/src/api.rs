//! Registry API types
//!
//! Response shapes of an npm-compatible registry.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Package document returned by `GET /{name}`.
///
/// Only the fields the CLI reads are modelled; everything else the registry
/// sends is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Packument {
    /// Package name
    pub name: String,

    /// Named version pointers, `latest` being the one that matters here
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: HashMap<String, String>,

    /// Every published version, keyed by version string
    #[serde(default)]
    pub versions: BTreeMap<String, VersionManifest>,
}

impl Packument {
    /// The version the `latest` dist-tag points at.
    pub fn latest_tag(&self) -> Option<&str> {
        self.dist_tags.get("latest").map(String::as_str)
    }
}

/// One published version inside a packument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionManifest {
    /// Package name
    pub name: String,

    /// Version string
    pub version: String,

    /// Download information
    pub dist: Dist,
}

/// Tarball location and checksums for a published version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dist {
    /// Tarball URL
    pub tarball: String,

    /// Subresource-integrity string, e.g. `sha512-<base64>`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrity: Option<String>,

    /// Legacy hex SHA-1 of the tarball
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shasum: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_abbreviated_packument() {
        let json = r#"{
            "name": "@one-cli/init",
            "modified": "2024-01-01T00:00:00.000Z",
            "dist-tags": { "latest": "1.1.0", "next": "2.0.0-beta.1" },
            "versions": {
                "1.0.0": {
                    "name": "@one-cli/init",
                    "version": "1.0.0",
                    "dist": {
                        "tarball": "https://registry.npmjs.org/@one-cli/init/-/init-1.0.0.tgz",
                        "shasum": "abc"
                    }
                },
                "1.1.0": {
                    "name": "@one-cli/init",
                    "version": "1.1.0",
                    "dependencies": { "kleur": "^4.0.0" },
                    "dist": {
                        "tarball": "https://registry.npmjs.org/@one-cli/init/-/init-1.1.0.tgz",
                        "integrity": "sha512-AAAA"
                    }
                }
            }
        }"#;

        let packument: Packument = serde_json::from_str(json).unwrap();
        assert_eq!(packument.name, "@one-cli/init");
        assert_eq!(packument.latest_tag(), Some("1.1.0"));
        assert_eq!(packument.versions.len(), 2);
        assert_eq!(
            packument.versions["1.1.0"].dist.integrity.as_deref(),
            Some("sha512-AAAA")
        );
        assert!(packument.versions["1.0.0"].dist.integrity.is_none());
    }

    #[test]
    fn test_deserialize_packument_without_tags() {
        let packument: Packument = serde_json::from_str(r#"{"name": "ghost"}"#).unwrap();
        assert!(packument.latest_tag().is_none());
        assert!(packument.versions.is_empty());
    }
}
