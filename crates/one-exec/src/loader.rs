//! The plugin contract and its process-based implementation.
//!
//! A dispatched package is used through two traits: an [`EntryLoader`]
//! checks a resolved entry against the contract and produces a
//! [`PackageEntry`], which runs the invocation and reports an exit code.
//!
//! [`ProcessLoader`] runs entries as child processes:
//!
//! - JavaScript modules (`.js`, `.cjs`, `.mjs`) run under `node` through a
//!   small bootstrap. The module must export one function; it is called as
//!   `fn(...positionals, flags, context)`. Every declared positional has a
//!   fixed slot, so an omitted optional one arrives as `undefined`.
//! - Anything else must be an executable file and is run with the raw
//!   argument list.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use one_package::ResolvedEntry;
use one_registry::{Version, is_newer_or_equal, parse_version};

use crate::context::InvocationContext;
use crate::error::{ExecError, Result};

/// Oldest `node` able to run the bootstrap.
pub const LOWEST_NODE_VERSION: Version = Version::new(12, 0, 0);

/// Environment variable naming the file the bootstrap reports through.
pub const ENV_STATUS_FILE: &str = "ONE_CLI_STATUS_FILE";

/// Written to the status file when the module exports no function.
const INCOMPATIBLE_MARKER: &str = "incompatible";

const JS_EXTENSIONS: &[&str] = &["js", "cjs", "mjs"];

/// Loads the entry module of the package, then calls its single export.
/// `process.argv[1]` is the module path and `ONE_CLI_CONTEXT` the context.
/// A missing export is reported through the status file, leaving every exit
/// code to the package.
const NODE_BOOTSTRAP: &str = r#"
const entry = process.argv[1];
const ctx = JSON.parse(process.env.ONE_CLI_CONTEXT || '{}');
const positionals = (ctx.positionals || []).map((p) => (p === null ? undefined : p));
(async () => {
  let mod;
  try {
    mod = require(entry);
  } catch (e) {
    if (e && e.code === 'ERR_REQUIRE_ESM') {
      mod = await import(require('url').pathToFileURL(entry).href);
    } else {
      throw e;
    }
  }
  const fn = typeof mod === 'function' ? mod
    : mod && typeof mod.default === 'function' ? mod.default : null;
  if (!fn) {
    require('fs').writeFileSync(process.env.ONE_CLI_STATUS_FILE, 'incompatible');
    process.exit(1);
  }
  const code = await fn(...positionals, ctx.flags || {}, ctx);
  if (typeof code === 'number') process.exitCode = code;
})().catch((e) => {
  console.error(e && e.stack ? e.stack : e);
  process.exit(1);
});
"#;

/// Turns a resolved entry into something invocable.
pub trait EntryLoader {
    /// Check `entry` against the plugin contract. Every compatibility check
    /// happens here, before anything runs.
    fn load(&self, entry: &ResolvedEntry) -> Result<Box<dyn PackageEntry>>;
}

/// A loaded, contract-satisfying entry point.
pub trait PackageEntry {
    /// Run the invocation; returns the entry's exit code.
    fn invoke(&self, ctx: &InvocationContext) -> Result<i32>;
}

/// Runs entries as child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessLoader {
    node: Option<PathBuf>,
}

impl ProcessLoader {
    pub fn new() -> Self {
        Self { node: None }
    }

    /// Use this `node` binary instead of searching `PATH`.
    pub fn with_node(node: impl Into<PathBuf>) -> Self {
        Self {
            node: Some(node.into()),
        }
    }

    fn node(&self) -> Result<PathBuf> {
        let node = match &self.node {
            Some(node) => node.clone(),
            None => check_binary_on_path("node")?,
        };

        let found = query_node_version(&node)?;
        if !is_newer_or_equal(&found, &LOWEST_NODE_VERSION) {
            return Err(ExecError::RuntimeTooOld {
                tool: "node".to_string(),
                found,
                required: LOWEST_NODE_VERSION,
            });
        }
        tracing::debug!(node = %node.display(), version = %found, "using node");
        Ok(node)
    }
}

impl EntryLoader for ProcessLoader {
    fn load(&self, entry: &ResolvedEntry) -> Result<Box<dyn PackageEntry>> {
        let incompatible = |reason: String| ExecError::IncompatibleEntry {
            path: entry.path.clone(),
            reason,
        };

        if !entry.manifest.is_protocol_supported() {
            return Err(incompatible(format!(
                "plugin protocol {} is newer than the supported protocol {}",
                entry.manifest.protocol(),
                one_package::SUPPORTED_PROTOCOL
            )));
        }
        if !entry.path.is_file() {
            return Err(incompatible("entry file does not exist".to_string()));
        }

        if is_javascript(&entry.path) {
            return Ok(Box::new(NodeEntry {
                node: self.node()?,
                module: entry.path.clone(),
            }));
        }

        if !is_executable(&entry.path) {
            return Err(incompatible(
                "not a JavaScript module and not executable".to_string(),
            ));
        }
        Ok(Box::new(ExecutableEntry {
            program: entry.path.clone(),
        }))
    }
}

/// A JavaScript module run through the node bootstrap.
#[derive(Debug)]
struct NodeEntry {
    node: PathBuf,
    module: PathBuf,
}

impl PackageEntry for NodeEntry {
    fn invoke(&self, ctx: &InvocationContext) -> Result<i32> {
        let status_file = tempfile::Builder::new()
            .prefix("one-cli-status")
            .tempfile()
            .map_err(|source| ExecError::Invoke {
                path: self.module.clone(),
                source,
            })?;

        let mut cmd = Command::new(&self.node);
        cmd.arg("-e")
            .arg(NODE_BOOTSTRAP)
            .arg(&self.module)
            .env(ENV_STATUS_FILE, status_file.path());

        let status = run(cmd, ctx, &self.module)?;
        let reported = std::fs::read_to_string(status_file.path()).unwrap_or_default();
        if reported.trim() == INCOMPATIBLE_MARKER {
            return Err(ExecError::IncompatibleEntry {
                path: self.module.clone(),
                reason: "module does not export a function".to_string(),
            });
        }
        Ok(exit_code(status))
    }
}

/// An executable file run with the raw argument list.
#[derive(Debug)]
struct ExecutableEntry {
    program: PathBuf,
}

impl PackageEntry for ExecutableEntry {
    fn invoke(&self, ctx: &InvocationContext) -> Result<i32> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&ctx.raw_args);
        Ok(exit_code(run(cmd, ctx, &self.program)?))
    }
}

fn run(mut cmd: Command, ctx: &InvocationContext, path: &Path) -> Result<ExitStatus> {
    cmd.envs(ctx.child_env()?)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    tracing::debug!(entry = %path.display(), command = %ctx.command, "invoking entry");
    cmd.status().map_err(|source| ExecError::Invoke {
        path: path.to_path_buf(),
        source,
    })
}

/// A child killed by a signal reports no code; treat it as a failure.
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

fn is_javascript(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| JS_EXTENSIONS.contains(&e))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .is_ok_and(|m| m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "exe" | "bat" | "cmd" | "com"))
}

/// Verify a binary is on PATH. Returns the resolved path or [`ExecError::RuntimeNotFound`].
pub fn check_binary_on_path(tool: &str) -> Result<PathBuf> {
    let path_var = std::env::var_os("PATH").unwrap_or_default();
    let extensions: Vec<String> = if cfg!(windows) {
        std::env::var("PATHEXT")
            .unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string())
            .split(';')
            .map(|s| s.to_ascii_lowercase())
            .collect()
    } else {
        vec![String::new()]
    };

    for dir in std::env::split_paths(&path_var) {
        for ext in &extensions {
            let candidate = if ext.is_empty() {
                dir.join(tool)
            } else {
                dir.join(format!("{}{}", tool, ext))
            };
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
    }

    Err(ExecError::RuntimeNotFound {
        tool: tool.to_string(),
        hint: install_hint(tool).map(str::to_string),
    })
}

fn install_hint(tool: &str) -> Option<&'static str> {
    match tool {
        "node" => Some("\n  Install: https://nodejs.org"),
        _ => None,
    }
}

/// Run `node --version` and parse `v18.17.0`.
fn query_node_version(node: &Path) -> Result<Version> {
    let output = Command::new(node)
        .arg("--version")
        .output()
        .map_err(|source| ExecError::Invoke {
            path: node.to_path_buf(),
            source,
        })?;

    let raw = String::from_utf8_lossy(&output.stdout);
    parse_version(raw.trim()).map_err(|_| ExecError::RuntimeNotFound {
        tool: node.display().to_string(),
        hint: Some(format!(": unexpected version output '{}'", raw.trim())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_javascript() {
        assert!(is_javascript(Path::new("/p/lib/index.js")));
        assert!(is_javascript(Path::new("/p/lib/index.mjs")));
        assert!(is_javascript(Path::new("/p/lib/index.cjs")));
        assert!(!is_javascript(Path::new("/p/bin/run")));
        assert!(!is_javascript(Path::new("/p/bin/run.sh")));
    }

    #[test]
    fn test_bootstrap_reports_through_status_file() {
        assert!(NODE_BOOTSTRAP.contains(&format!("process.env.{}", ENV_STATUS_FILE)));
        assert!(NODE_BOOTSTRAP.contains(&format!("'{}'", INCOMPATIBLE_MARKER)));
    }

    #[test]
    fn test_missing_binary_is_runtime_not_found() {
        let err = check_binary_on_path("definitely-not-a-real-binary-one-cli").unwrap_err();
        assert!(matches!(err, ExecError::RuntimeNotFound { .. }));
    }
}
