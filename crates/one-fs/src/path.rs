//! Normalized path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

/// A path normalized to use forward slashes internally.
///
/// Backslashes are converted to forward slashes and the path is cleaned
/// lexically: empty and `.` segments are dropped and `..` segments consume
/// their parent where one exists. Nothing touches the filesystem, so
/// symlinks are not resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        Self {
            inner: clean(&path_str.replace('\\', "/")),
        }
    }

    /// Normalize `path`, first anchoring it at the current directory when it
    /// is relative.
    pub fn absolute(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let anchored = std::path::absolute(path.as_ref())?;
        Ok(Self::new(anchored))
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }
}

/// Lexically clean a forward-slash path.
///
/// A drive (`C:`) or UNC (`//server/share`) prefix is kept as is and only
/// the remainder is cleaned, so `..` never climbs into the prefix.
fn clean(raw: &str) -> String {
    let (prefix, rest) = split_prefix(raw);
    let unc = prefix.starts_with("//");
    let rooted = unc || rest.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(last) if *last != ".." => {
                    parts.pop();
                }
                // `/..` is `/`
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let body = parts.join("/");
    match (prefix.is_empty(), rooted) {
        (true, true) => format!("/{}", body),
        (true, false) if body.is_empty() => ".".to_string(),
        (true, false) => body,
        (false, true) if unc && body.is_empty() => prefix.to_string(),
        (false, true) => format!("{}/{}", prefix, body),
        (false, false) => format!("{}{}", prefix, body),
    }
}

/// Split off a leading `C:` or `//server/share`.
fn split_prefix(raw: &str) -> (&str, &str) {
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        return raw.split_at(2);
    }

    let Some(after) = raw.strip_prefix("//") else {
        return ("", raw);
    };
    let server_len = after.find('/').unwrap_or(after.len());
    if server_len == 0 {
        return ("", raw);
    }
    let share = &after[server_len..];
    let share_len = match share.strip_prefix('/') {
        Some(tail) => match tail.find('/').unwrap_or(tail.len()) {
            0 => 0,
            n => n + 1,
        },
        None => 0,
    };
    raw.split_at(2 + server_len + share_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_drops_current_dir_segments() {
        assert_eq!(clean("./a/./b"), "a/b");
    }

    #[test]
    fn clean_collapses_repeated_slashes() {
        assert_eq!(clean("/a//b///c"), "/a/b/c");
    }

    #[test]
    fn clean_parent_of_root_is_root() {
        assert_eq!(clean("/../a"), "/a");
    }

    #[test]
    fn clean_keeps_leading_parent_on_relative() {
        assert_eq!(clean("../a/../../b"), "../../b");
    }

    #[test]
    fn clean_empty_is_current_dir() {
        assert_eq!(clean(""), ".");
    }

    #[test]
    fn clean_keeps_drive_prefix() {
        assert_eq!(clean("C:/../pkg"), "C:/pkg");
        assert_eq!(clean("C:/.."), "C:/");
        assert_eq!(clean("C:a/../../b"), "C:../b");
    }

    #[test]
    fn clean_keeps_unc_prefix() {
        assert_eq!(clean("//server/share/pkg/../index.js"), "//server/share/index.js");
        assert_eq!(clean("//server/share/../.."), "//server/share");
        assert_eq!(clean("//server//x"), "//server/x");
    }

    #[test]
    fn split_prefix_plain_paths_have_none() {
        assert_eq!(split_prefix("/a/b"), ("", "/a/b"));
        assert_eq!(split_prefix("///a"), ("", "///a"));
        assert_eq!(split_prefix("a:b"), ("a:", "b"));
    }
}
