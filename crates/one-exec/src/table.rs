//! Command-to-package routing table.

use std::collections::HashMap;

/// The package implementing `init`.
pub const INIT_PACKAGE: &str = "@one-cli/init";

/// One routing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEntry {
    /// Command word typed by the user (e.g. "init").
    pub command: String,
    /// Registry name of the implementing package.
    pub package: String,
}

/// Maps command words to the packages that implement them.
///
/// The dispatcher only ever asks this table; adding a command means
/// registering an entry, never touching dispatch logic.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    entries: HashMap<String, CommandEntry>,
}

impl CommandTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Create a table holding the built-in commands.
    pub fn with_builtin() -> Self {
        let mut table = Self::new();
        table.register("init", INIT_PACKAGE);
        table
    }

    /// Route `command` to `package`, replacing any previous route.
    pub fn register(&mut self, command: impl Into<String>, package: impl Into<String>) {
        let command = command.into();
        self.entries.insert(
            command.clone(),
            CommandEntry {
                command,
                package: package.into(),
            },
        );
    }

    /// Register every `(command, package)` pair.
    pub fn extend<I, C, P>(&mut self, routes: I)
    where
        I: IntoIterator<Item = (C, P)>,
        C: Into<String>,
        P: Into<String>,
    {
        for (command, package) in routes {
            self.register(command, package);
        }
    }

    /// Package implementing `command`.
    pub fn package_for(&self, command: &str) -> Option<&str> {
        self.entries.get(command).map(|e| e.package.as_str())
    }

    /// All command words (sorted).
    pub fn known_commands(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn contains(&self, command: &str) -> bool {
        self.entries.contains_key(command)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_table_is_empty() {
        let table = CommandTable::new();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_builtin_routes_init() {
        let table = CommandTable::with_builtin();
        assert!(table.contains("init"));
        assert_eq!(table.package_for("init"), Some("@one-cli/init"));
    }

    #[test]
    fn test_known_commands_sorted() {
        let mut table = CommandTable::with_builtin();
        table.register("publish", "@one-cli/publish");
        table.register("add", "@one-cli/add");

        assert_eq!(table.known_commands(), vec!["add", "init", "publish"]);
    }

    #[test]
    fn test_unknown_command_returns_none() {
        let table = CommandTable::with_builtin();
        assert!(table.package_for("frobnicate").is_none());
        assert!(!table.contains("frobnicate"));
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut table = CommandTable::with_builtin();
        table.extend([("init", "@acme/init")]);

        assert_eq!(table.len(), 1);
        assert_eq!(table.package_for("init"), Some("@acme/init"));
    }
}
