use one_fs::NormalizedPath;
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_normalization_invariants(root in "/?", s in "[a-z.][a-z./\\\\]{0,40}") {
        let path = NormalizedPath::new(format!("{root}{s}"));
        let as_str = path.as_str();

        prop_assert!(!as_str.contains('\\'));
        prop_assert!(!as_str.contains("//"));
        prop_assert!(!as_str.split('/').any(|seg| seg == "."), "{}", as_str);

        // Normalizing twice changes nothing
        let again = NormalizedPath::new(path.to_native());
        prop_assert_eq!(path, again);
    }

    #[test]
    fn test_prefixed_paths_keep_prefix(s in "[a-z./\\\\]{0,30}") {
        let drive = NormalizedPath::new(format!("C:/{s}"));
        prop_assert!(drive.as_str().starts_with("C:/"), "{}", drive.as_str());

        let unc = NormalizedPath::new(format!("//server/share/{s}"));
        prop_assert!(unc.as_str().starts_with("//server/share"), "{}", unc.as_str());
        prop_assert_eq!(NormalizedPath::new(unc.to_native()), unc);
    }
}
