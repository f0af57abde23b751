//! Package acquisition for one-cli.
//!
//! Given a package name, this crate makes sure a correctly-versioned copy of
//! the package sits in the local cache and tells the caller where its entry
//! point is:
//!
//! - [`cache`] derives the on-disk key and layout for a `(name, version)` pair
//! - [`transport`] is the seam to the registry's install primitive
//! - [`acquirer`] decides between install and update
//! - [`manifest`] locates `package.json` and resolves its `main` file

pub mod acquirer;
pub mod cache;
pub mod descriptor;
pub mod error;
pub mod manifest;
pub mod transport;

pub use acquirer::{AcquireState, PackageAcquirer};
pub use cache::{CacheLayout, cache_key, sanitize_name};
pub use descriptor::{PackageDescriptor, PackageVersion};
pub use error::{Error, InstallError, Result};
pub use manifest::{
    EntryPointManifest, MANIFEST_FILENAME, ManifestError, ResolvedEntry, SUPPORTED_PROTOCOL,
    resolve_entry,
};
pub use transport::{InstallRequest, NpmTransport, PackageSpec, RegistryTransport};

pub use one_registry::Version;
