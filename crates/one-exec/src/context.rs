//! The invocation handed to a dispatched package.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use crate::config::{
    CliConfig, ENV_CLI_HOME_PATH, ENV_CLI_TARGET_PATH, ENV_LOG_LEVEL, LogLevel,
};

/// Environment variable carrying the serialized context to a child process.
pub const ENV_CONTEXT: &str = "ONE_CLI_CONTEXT";

/// Everything a package sees of the user's invocation.
///
/// Positionals and flags are already split out for the command; `raw_args`
/// keeps the argument list exactly as typed. Each declared positional owns
/// a slot, and an omitted optional one is `None` (`null` in JSON).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationContext {
    pub command: String,
    pub raw_args: Vec<String>,
    pub positionals: Vec<Option<String>>,
    /// Option flags keyed by camelCase name (`--target-path` is `targetPath`).
    pub flags: BTreeMap<String, Value>,
    pub cli_home: PathBuf,
    /// Bypass directory; the managed cache is used when absent.
    pub target_path: Option<PathBuf>,
    pub log_level: LogLevel,
}

impl InvocationContext {
    /// Empty invocation of `command`, carrying the paths from `config`.
    ///
    /// The global `debug` and `targetPath` flags are filled in from the
    /// configuration.
    pub fn new(command: impl Into<String>, raw_args: Vec<String>, config: &CliConfig) -> Self {
        let mut flags = BTreeMap::new();
        flags.insert("debug".to_string(), Value::Bool(config.log_level.is_verbose()));
        if let Some(target) = &config.target_path {
            flags.insert(
                "targetPath".to_string(),
                Value::String(target.display().to_string()),
            );
        }

        Self {
            command: command.into(),
            raw_args,
            positionals: Vec::new(),
            flags,
            cli_home: config.cli_home.clone(),
            target_path: config.target_path.clone(),
            log_level: config.log_level,
        }
    }

    /// Invocation of an arbitrary command word. `words[0]` is the command;
    /// the rest is split with [`parse_args`].
    pub fn from_words(words: &[String], raw_args: Vec<String>, config: &CliConfig) -> Self {
        let (command, rest) = match words.split_first() {
            Some((command, rest)) => (command.as_str(), rest),
            None => ("", &[][..]),
        };
        let (positionals, flags) = parse_args(rest);
        Self::new(command, raw_args, config)
            .with_positionals(positionals.into_iter().map(Some).collect())
            .with_flags(flags)
    }

    pub fn with_positionals(mut self, positionals: Vec<Option<String>>) -> Self {
        self.positionals = positionals;
        self
    }

    /// Merge `flags` over the current ones.
    pub fn with_flags(mut self, flags: BTreeMap<String, Value>) -> Self {
        self.flags.extend(flags);
        self
    }

    pub fn with_flag(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.flags.insert(camel_case(name), value.into());
        self
    }

    /// Variables exported to the child process.
    pub fn child_env(&self) -> serde_json::Result<Vec<(String, String)>> {
        let mut env = vec![
            (
                ENV_CLI_HOME_PATH.to_string(),
                self.cli_home.display().to_string(),
            ),
            (ENV_LOG_LEVEL.to_string(), self.log_level.as_str().to_string()),
            (ENV_CONTEXT.to_string(), serde_json::to_string(self)?),
        ];
        if let Some(target) = &self.target_path {
            env.push((ENV_CLI_TARGET_PATH.to_string(), target.display().to_string()));
        }
        Ok(env)
    }
}

/// Split command arguments into positionals and flags.
///
/// `--name` is `true`, `--name=value` is a string, `--no-name` is `false`,
/// and `-abc` sets `a`, `b` and `c`. Everything after `--` is positional.
pub fn parse_args(args: &[String]) -> (Vec<String>, BTreeMap<String, Value>) {
    let mut positionals = Vec::new();
    let mut flags = BTreeMap::new();
    let mut only_positionals = false;

    for arg in args {
        if only_positionals {
            positionals.push(arg.clone());
        } else if arg == "--" {
            only_positionals = true;
        } else if let Some(long) = arg.strip_prefix("--") {
            match long.split_once('=') {
                Some((name, value)) => {
                    flags.insert(camel_case(name), Value::String(value.to_string()));
                }
                None => match long.strip_prefix("no-") {
                    Some(name) => {
                        flags.insert(camel_case(name), Value::Bool(false));
                    }
                    None => {
                        flags.insert(camel_case(long), Value::Bool(true));
                    }
                },
            }
        } else if let Some(short) = arg.strip_prefix('-').filter(|s| !s.is_empty()) {
            for c in short.chars() {
                flags.insert(c.to_string(), Value::Bool(true));
            }
        } else {
            positionals.push(arg.clone());
        }
    }

    (positionals, flags)
}

/// `target-path` to `targetPath`.
fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '-' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_mixed() {
        let (positionals, flags) =
            parse_args(&strings(&["myProject", "--force", "--template=vue", "-xy", "--no-git"]));

        assert_eq!(positionals, vec!["myProject"]);
        assert_eq!(flags["force"], json!(true));
        assert_eq!(flags["template"], json!("vue"));
        assert_eq!(flags["x"], json!(true));
        assert_eq!(flags["y"], json!(true));
        assert_eq!(flags["git"], json!(false));
    }

    #[test]
    fn test_parse_args_double_dash() {
        let (positionals, flags) = parse_args(&strings(&["a", "--", "--force", "-"]));
        assert_eq!(positionals, vec!["a", "--force", "-"]);
        assert!(flags.is_empty());
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("target-path"), "targetPath");
        assert_eq!(camel_case("force"), "force");
        assert_eq!(camel_case("dry-run-now"), "dryRunNow");
    }

    #[test]
    fn test_context_carries_config_paths() {
        let mut config = CliConfig::new("/home/dev");
        config.target_path = Some(PathBuf::from("/work/init"));
        config.log_level = LogLevel::Verbose;

        let ctx = InvocationContext::new("init", strings(&["init"]), &config);
        let env = ctx.child_env().unwrap();

        assert_eq!(ctx.flags["debug"], json!(true));
        assert_eq!(ctx.flags["targetPath"], json!("/work/init"));
        assert!(env.contains(&("CLI_HOME_PATH".into(), "/home/dev/.one-cli".into())));
        assert!(env.contains(&("CLI_TARGET_PATH".into(), "/work/init".into())));
        assert!(env.contains(&("LOG_LEVEL".into(), "verbose".into())));
        assert!(env.iter().any(|(k, v)| k == "ONE_CLI_CONTEXT" && v.contains("\"rawArgs\":[\"init\"]")));
    }

    #[test]
    fn test_omitted_positional_keeps_its_slot() {
        let config = CliConfig::new("/home/dev");
        let ctx = InvocationContext::new("init", strings(&["init", "--force"]), &config)
            .with_positionals(vec![None])
            .with_flag("force", true);

        let json: Value = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["positionals"], json!([null]));
        assert_eq!(json["flags"]["force"], json!(true));
    }
}
