//! Registry access for one-cli.
//!
//! This crate talks to an npm-compatible package registry: it reads package
//! metadata ("packuments"), downloads release tarballs, and answers the
//! version questions the rest of the CLI asks through [`VersionOracle`].

pub mod api;
pub mod client;
pub mod error;
pub mod oracle;

pub use api::{Dist, Packument, VersionManifest};
pub use client::{DEFAULT_REGISTRY, MIRROR_REGISTRY, RegistryClient, default_registry};
pub use error::{RegistryError, Result};
pub use oracle::{VersionOracle, VersionSource, is_newer, is_newer_or_equal, parse_version};

pub use semver::Version;
