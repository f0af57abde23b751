//! On-disk fixtures: installed packages and a scratch CLI home.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Entry module written when a fixture does not supply its own.
pub const DEFAULT_ENTRY_SOURCE: &str = "module.exports = function () {};\n";

/// Write a package into `dir`: a `package.json` naming `main` and, when
/// `main` is given, the entry file itself.
pub fn write_package(dir: &Path, name: &str, version: &str, main: Option<&str>) {
    write_package_with_entry(dir, name, version, main, DEFAULT_ENTRY_SOURCE);
}

/// Like [`write_package`] with explicit entry file contents.
pub fn write_package_with_entry(
    dir: &Path,
    name: &str,
    version: &str,
    main: Option<&str>,
    entry_source: &str,
) {
    fs::create_dir_all(dir).unwrap();

    let mut manifest = serde_json::json!({ "name": name, "version": version });
    if let Some(main) = main {
        manifest["main"] = serde_json::Value::String(main.to_string());
        let entry = dir.join(main);
        if let Some(parent) = entry.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&entry, entry_source).unwrap();
    }

    fs::write(
        dir.join("package.json"),
        serde_json::to_string_pretty(&manifest).unwrap(),
    )
    .unwrap();
}

/// Write an executable shell script, for entries run without node.
#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// A temporary user home with a CLI home inside it.
///
/// # Example
///
/// ```rust,no_run
/// use one_test_utils::TestHome;
///
/// let home = TestHome::new();
/// home.write_env("CLI_HOME=.custom");
/// assert!(home.home().join(".env").is_file());
/// ```
pub struct TestHome {
    temp_dir: TempDir,
}

impl Default for TestHome {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHome {
    /// Name of the CLI home under the user home.
    pub const CLI_HOME: &'static str = ".one-cli";

    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// The user home directory.
    pub fn home(&self) -> &Path {
        self.temp_dir.path()
    }

    /// `<home>/.one-cli`
    pub fn cli_home(&self) -> PathBuf {
        self.home().join(Self::CLI_HOME)
    }

    /// `<cliHome>/dependencies/node_modules`
    pub fn store_dir(&self) -> PathBuf {
        self.cli_home().join("dependencies").join("node_modules")
    }

    /// Write `<home>/.env`.
    pub fn write_env(&self, content: &str) {
        fs::write(self.home().join(".env"), content).unwrap();
    }

    /// Write `<cliHome>/config.toml`.
    pub fn write_settings(&self, content: &str) {
        let cli_home = self.cli_home();
        fs::create_dir_all(&cli_home).unwrap();
        fs::write(cli_home.join("config.toml"), content).unwrap();
    }

    /// Create a directory under the home and return its path.
    pub fn mkdir(&self, relative: &str) -> PathBuf {
        let dir = self.home().join(relative);
        fs::create_dir_all(&dir).unwrap();
        dir
    }
}
