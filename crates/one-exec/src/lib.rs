//! Command execution for one-cli.
//!
//! Routes a command word to the package that implements it, acquires that
//! package and hands the invocation over to its entry point.
//!
//! - [`table`] maps command words to package names
//! - [`config`] is the resolved CLI configuration
//! - [`context`] is what an invoked package receives
//! - [`loader`] is the plugin contract and its process-based implementation
//! - [`dispatcher`] ties the pieces together

pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod loader;
pub mod table;

pub use config::{CliConfig, ConfigFlags, EnvSnapshot, LogLevel, UserSettings};
pub use context::InvocationContext;
pub use dispatcher::Dispatcher;
pub use error::{ExecError, Result};
pub use loader::{EntryLoader, PackageEntry, ProcessLoader};
pub use table::{CommandEntry, CommandTable};
