//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// one - project scaffolding and tooling, installed on demand
#[derive(Parser, Debug)]
#[command(name = "one")]
#[command(author, version, about, long_about = None)]
#[command(override_usage = "one <command> [options]")]
pub struct Cli {
    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Run the command from this local package directory instead of the cache
    #[arg(long = "target-path", visible_alias = "tp", value_name = "PATH", global = true)]
    pub target_path: Option<PathBuf>,

    /// Registry to resolve and install packages from
    #[arg(long, value_name = "URL", global = true)]
    pub registry: Option<String>,

    /// Use the npmmirror registry when no registry is configured
    #[arg(long, global = true)]
    pub mirror: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create a new project
    ///
    /// Examples:
    ///   one init                 # Initialize in the current directory
    ///   one init my-project      # Create my-project/
    ///   one init my-project -f   # Overwrite a non-empty directory
    Init {
        /// Project name
        project_name: Option<String>,

        /// Initialize even if the target directory is not empty
        #[arg(short, long)]
        force: bool,
    },

    /// Any other command is looked up in the command table
    #[command(external_subcommand)]
    External(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_no_command() {
        let cli = Cli::parse_from(["one"]);
        assert!(cli.command.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn parse_debug_flag() {
        let cli = Cli::parse_from(["one", "-d", "init"]);
        assert!(cli.debug);
    }

    #[test]
    fn parse_init_with_name_and_force() {
        let cli = Cli::parse_from(["one", "init", "myProject", "--force"]);
        assert_eq!(
            cli.command,
            Some(Commands::Init {
                project_name: Some("myProject".to_string()),
                force: true,
            })
        );
    }

    #[test]
    fn parse_init_defaults() {
        let cli = Cli::parse_from(["one", "init"]);
        assert_eq!(
            cli.command,
            Some(Commands::Init {
                project_name: None,
                force: false,
            })
        );
    }

    #[test]
    fn parse_target_path_alias() {
        let cli = Cli::parse_from(["one", "--tp", "/work/init", "init"]);
        assert_eq!(cli.target_path, Some(PathBuf::from("/work/init")));

        let cli = Cli::parse_from(["one", "init", "--target-path", "/work/init"]);
        assert_eq!(cli.target_path, Some(PathBuf::from("/work/init")));
    }

    #[test]
    fn parse_unknown_word_is_external() {
        let cli = Cli::parse_from(["one", "frobnicate", "--hard", "x"]);
        assert_eq!(
            cli.command,
            Some(Commands::External(vec![
                "frobnicate".to_string(),
                "--hard".to_string(),
                "x".to_string()
            ]))
        );
    }
}
