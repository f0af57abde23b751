//! Shared test utilities for the one-cli workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`registry`]: [`FakeRegistry`], an in-memory registry transport that
//!   records every install call
//! - [`fixtures`]: package directories and a throwaway CLI home

pub mod fixtures;
pub mod registry;

pub use fixtures::{TestHome, write_package};
pub use registry::FakeRegistry;
