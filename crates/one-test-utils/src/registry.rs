//! In-memory registry transport.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use one_package::{InstallError, InstallRequest, RegistryTransport};
use one_registry::{RegistryError, VersionSource};
use semver::Version;

use crate::fixtures::{DEFAULT_ENTRY_SOURCE, write_package_with_entry};

/// URL reported by [`FakeRegistry::registry_url`].
pub const FAKE_REGISTRY_URL: &str = "https://registry.invalid";

/// A registry that lives in memory and installs fixture packages.
///
/// Every install request is recorded so tests can assert how many transport
/// calls a scenario made and what they were scoped to. Installed packages get
/// a `package.json` whose `main` is `lib/index.js` unless configured
/// otherwise.
///
/// # Example
///
/// ```rust,no_run
/// use one_test_utils::FakeRegistry;
///
/// let registry = FakeRegistry::new().with_package("@one-cli/init", &["1.0.0", "1.1.0"]);
/// assert_eq!(registry.install_count(), 0);
/// ```
#[derive(Debug)]
pub struct FakeRegistry {
    packages: Mutex<HashMap<String, Vec<Version>>>,
    installs: Mutex<Vec<InstallRequest>>,
    version_queries: AtomicUsize,
    unavailable: AtomicBool,
    fail_installs: AtomicBool,
    main: Option<String>,
    entry_source: String,
    install_delay: Option<Duration>,
}

impl Default for FakeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self {
            packages: Mutex::new(HashMap::new()),
            installs: Mutex::new(Vec::new()),
            version_queries: AtomicUsize::new(0),
            unavailable: AtomicBool::new(false),
            fail_installs: AtomicBool::new(false),
            main: Some("lib/index.js".to_string()),
            entry_source: DEFAULT_ENTRY_SOURCE.to_string(),
            install_delay: None,
        }
    }

    /// Publish `versions` of `name`.
    pub fn with_package(self, name: &str, versions: &[&str]) -> Self {
        for version in versions {
            self.publish(name, version);
        }
        self
    }

    /// Installed packages declare this `main`, or none at all.
    pub fn with_main(mut self, main: Option<&str>) -> Self {
        self.main = main.map(str::to_string);
        self
    }

    /// Contents of the entry file in installed packages.
    pub fn with_entry_source(mut self, source: &str) -> Self {
        self.entry_source = source.to_string();
        self
    }

    /// Hold every install for `delay` before writing the package, so
    /// concurrent acquirers pile up on the cache lock.
    pub fn with_install_delay(mut self, delay: Duration) -> Self {
        self.install_delay = Some(delay);
        self
    }

    /// Publish one more version; it becomes `latest` if it is the highest.
    pub fn publish(&self, name: &str, version: &str) {
        let version = Version::parse(version).unwrap();
        let mut packages = self.packages.lock().unwrap();
        let versions = packages.entry(name.to_string()).or_default();
        versions.push(version);
        versions.sort_by(|a, b| a.cmp_precedence(b));
    }

    /// Make every registry query fail as if the network were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make every install call fail.
    pub fn set_fail_installs(&self, fail: bool) {
        self.fail_installs.store(fail, Ordering::SeqCst);
    }

    /// Every install request received, in order.
    pub fn installs(&self) -> Vec<InstallRequest> {
        self.installs.lock().unwrap().clone()
    }

    pub fn install_count(&self) -> usize {
        self.installs.lock().unwrap().len()
    }

    /// Number of `latest_version`/`versions` queries answered or refused.
    pub fn version_queries(&self) -> usize {
        self.version_queries.load(Ordering::SeqCst)
    }

    fn published(&self, name: &str) -> Result<Vec<Version>, RegistryError> {
        self.version_queries.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RegistryError::Unavailable("fake registry is offline".into()));
        }
        self.packages
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::PackageNotFound(name.to_string()))
    }
}

impl VersionSource for FakeRegistry {
    fn latest_version(&self, name: &str) -> one_registry::Result<Version> {
        self.published(name)?
            .pop()
            .ok_or_else(|| RegistryError::NoLatestTag(name.to_string()))
    }

    fn versions(&self, name: &str) -> one_registry::Result<Vec<Version>> {
        self.published(name)
    }
}

impl RegistryTransport for FakeRegistry {
    fn registry_url(&self) -> &str {
        FAKE_REGISTRY_URL
    }

    fn install(&self, request: &InstallRequest) -> Result<(), InstallError> {
        self.installs.lock().unwrap().push(request.clone());

        if self.fail_installs.load(Ordering::SeqCst) {
            return Err(InstallError::Transport("simulated install failure".into()));
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RegistryError::Unavailable("fake registry is offline".into()).into());
        }
        if let Some(delay) = self.install_delay {
            std::thread::sleep(delay);
        }

        for spec in &request.packages {
            let known = self
                .packages
                .lock()
                .unwrap()
                .get(&spec.name)
                .is_some_and(|versions| versions.contains(&spec.version));
            if !known {
                return Err(RegistryError::VersionNotFound {
                    package: spec.name.clone(),
                    version: spec.version.to_string(),
                }
                .into());
            }

            write_package_with_entry(
                &request.package_dir(spec),
                &spec.name,
                &spec.version.to_string(),
                self.main.as_deref(),
                &self.entry_source,
            );
        }
        Ok(())
    }
}
