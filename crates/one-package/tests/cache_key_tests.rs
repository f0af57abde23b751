use std::path::{Component, Path};

use one_package::{Version, cache_key, sanitize_name};
use proptest::prelude::*;
use rstest::rstest;

fn package_name() -> impl Strategy<Value = String> {
    (
        proptest::option::of("[a-z][a-z0-9-]{0,8}"),
        "[a-z][a-z0-9._-]{0,12}",
    )
        .prop_map(|(scope, name)| match scope {
            Some(scope) => format!("@{scope}/{name}"),
            None => name,
        })
}

fn version() -> impl Strategy<Value = Version> {
    (0u64..20, 0u64..20, 0u64..20).prop_map(|(major, minor, patch)| Version::new(major, minor, patch))
}

proptest! {
    #[test]
    fn test_cache_key_is_injective(
        a in (package_name(), version()),
        b in (package_name(), version()),
    ) {
        if a != b {
            prop_assert_ne!(cache_key(&a.0, &a.1), cache_key(&b.0, &b.1));
        } else {
            prop_assert_eq!(cache_key(&a.0, &a.1), cache_key(&b.0, &b.1));
        }
    }

    #[test]
    fn test_cache_key_is_path_safe(name in package_name(), version in version()) {
        let key = cache_key(&name, &version);

        prop_assert!(!key.contains('\\'));
        prop_assert!(Path::new(&key)
            .components()
            .all(|c| matches!(c, Component::Normal(_))), "{}", key);

        // The sanitized part never introduces a directory level
        let first = key.split('/').next().unwrap_or_default();
        let expected_prefix = format!("_{}@", sanitize_name(&name));
        prop_assert!(first.starts_with(&expected_prefix));
    }
}

#[rstest]
#[case("debug", "debug")]
#[case("@one-cli/init", "@one-cli_init")]
#[case(r"weird\name", "weird_name")]
fn test_sanitize_name(#[case] name: &str, #[case] expected: &str) {
    assert_eq!(sanitize_name(name), expected);
}

#[rstest]
#[case("debug", "4.3.4", "_debug@4.3.4@debug")]
#[case("@one-cli/init", "1.1.0", "_@one-cli_init@1.1.0@@one-cli/init")]
#[case("@one-cli/init", "2.0.0-beta.1", "_@one-cli_init@2.0.0-beta.1@@one-cli/init")]
fn test_cache_key_format(#[case] name: &str, #[case] version: &str, #[case] expected: &str) {
    assert_eq!(cache_key(name, &Version::parse(version).unwrap()), expected);
}
