//! Filesystem helpers for one-cli
//!
//! Provides separator-agnostic path handling, atomic writes and the advisory
//! lock used to serialize installs into the shared package cache.

pub mod error;
pub mod io;
pub mod lock;
pub mod path;

pub use error::{Error, Result};
pub use lock::CacheLock;
pub use path::NormalizedPath;
