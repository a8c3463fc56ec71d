//! Property-based tests for OAuth signing and code generation.

use std::collections::HashSet;

use proptest::prelude::*;
use rose_web::oauth::AssociationStore;
use rose_web::oauth::codes::{generate_code, is_well_formed};
use rose_web::oauth::signature::{percent_encode, signature_base_string, signing_key};

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

proptest! {
    /// Encoded output holds only unreserved characters and uppercase escapes.
    #[test]
    fn percent_encode_output_is_oauth_safe(input in any::<String>()) {
        let encoded = percent_encode(&input);
        let bytes = encoded.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'%' {
                prop_assert!(i + 2 < bytes.len());
                let hex = &encoded[i + 1..i + 3];
                prop_assert!(hex.bytes().all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b)));
                i += 3;
            } else {
                prop_assert!(is_unreserved(bytes[i]));
                i += 1;
            }
        }
    }

    /// Encoding is reversible.
    #[test]
    fn percent_encode_decodes_back(input in any::<String>()) {
        let encoded = percent_encode(&input);
        let decoded = percent_encoding::percent_decode_str(&encoded).decode_utf8().expect("utf8");
        prop_assert_eq!(decoded.as_ref(), input.as_str());
    }

    /// Unreserved input passes through untouched.
    #[test]
    fn percent_encode_keeps_unreserved(input in "[A-Za-z0-9._~-]{0,64}") {
        prop_assert_eq!(percent_encode(&input), input);
    }

    /// The base string does not depend on the order parameters are supplied in.
    #[test]
    fn base_string_ignores_parameter_order(
        params in proptest::collection::vec(("[a-z_]{1,12}", "[ -~]{0,24}"), 0..8),
    ) {
        let forward: Vec<(&str, &str)> =
            params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let mut backward = forward.clone();
        backward.reverse();

        let url = "https://api.twitter.com/oauth/request_token";
        prop_assert_eq!(
            signature_base_string("POST", url, &forward),
            signature_base_string("POST", url, &backward)
        );
    }

    /// The signing key always has exactly one unescaped separator.
    #[test]
    fn signing_key_has_single_separator(
        consumer in any::<String>(),
        token in proptest::option::of(any::<String>()),
    ) {
        let key = signing_key(&consumer, token.as_deref());
        prop_assert_eq!(key.matches('&').count(), 1);
        prop_assert!(key.starts_with(&percent_encode(&consumer)));
    }

    /// Generated codes are six digits and avoid every taken code.
    #[test]
    fn generated_codes_avoid_taken(taken in proptest::collection::hash_set(100_000u32..=999_999, 0..64)) {
        let taken: HashSet<String> = taken.into_iter().map(|n| n.to_string()).collect();
        let code = generate_code(|c| taken.contains(c));
        prop_assert!(is_well_formed(&code));
        prop_assert!(!taken.contains(&code));
    }

    /// Strings that are not six digits are never well formed.
    #[test]
    fn malformed_codes_rejected(code in "[0-9]{0,5}|[0-9]{7,10}|[a-z]{6}") {
        prop_assert!(!is_well_formed(&code));
    }

    /// Reserved codes are unique across the store.
    #[test]
    fn reserved_codes_are_unique(count in 1usize..50) {
        let codes = tokio_test::block_on(async {
            let store = AssociationStore::new();
            let mut codes = Vec::with_capacity(count);
            for _ in 0..count {
                codes.push(store.reserve_code().await);
            }
            codes
        });

        let unique: HashSet<&String> = codes.iter().collect();
        prop_assert_eq!(unique.len(), count);
        prop_assert!(codes.iter().all(|c| is_well_formed(c)));
    }
}
