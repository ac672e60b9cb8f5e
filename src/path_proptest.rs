//! Property-based tests for vendored path normalisation.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::path::VendorPath;
    use proptest::prelude::*;

    proptest! {
        /// Property: a normalised path parses back to itself
        #[test]
        fn parse_is_idempotent(parts in prop::collection::vec("[a-zA-Z0-9_-]{1,8}", 1..5)) {
            let input = parts.join("/");
            let first = VendorPath::parse(&input).unwrap();
            let second = VendorPath::parse(first.as_str()).unwrap();
            prop_assert_eq!(first, second);
        }

        /// Property: leading "./", doubled and trailing separators do not change the key
        #[test]
        fn cosmetic_variants_share_a_key(parts in prop::collection::vec("[a-z0-9]{1,6}", 1..4)) {
            let plain = parts.join("/");
            let dotted = format!("./{}/", parts.join("//"));
            prop_assert_eq!(
                VendorPath::parse(&plain).unwrap(),
                VendorPath::parse(&dotted).unwrap()
            );
        }

        /// Property: the normalised form never contains parent or current-dir components
        #[test]
        fn normalised_form_has_no_dot_components(input in "[a-z./]{1,20}") {
            if let Ok(path) = VendorPath::parse(&input) {
                for part in path.as_str().split('/') {
                    prop_assert!(!part.is_empty());
                    prop_assert_ne!(part, ".");
                    prop_assert_ne!(part, "..");
                }
            }
        }

        /// Property: an accepted key is always a usable INI section name
        #[test]
        fn accepted_keys_are_section_safe(input in "(?s).{0,24}") {
            if let Ok(path) = VendorPath::parse(&input) {
                prop_assert!(!path.as_str().contains(['[', ']']));
                prop_assert!(!path.as_str().chars().any(char::is_control));
                prop_assert_eq!(path.as_str().trim(), path.as_str());
            }
        }

        /// Property: any path with a ".." component is rejected
        #[test]
        fn parent_components_are_rejected(prefix in "[a-z]{1,6}", suffix in "[a-z]{1,6}") {
            let input = format!("{}/../{}", prefix, suffix);
            prop_assert!(VendorPath::parse(&input).is_err());
        }
    }
}
