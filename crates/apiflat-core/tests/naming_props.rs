//! Property tests for key naming

use apiflat_core::{qualified_key, response_name, sanitize_media_type};
use proptest::prelude::*;

const NAMED: [&str; 9] = [
    "200", "201", "202", "204", "400", "401", "403", "404", "405",
];

proptest! {
    #[test]
    fn unlisted_status_codes_pass_through(code in 100u16..600) {
        let code = code.to_string();
        prop_assume!(!NAMED.contains(&code.as_str()));
        prop_assert_eq!(response_name(Some(&code)), code);
    }

    #[test]
    fn sanitized_media_type_is_hyphenated_words(
        words in prop::collection::vec("[A-Za-z0-9_]{1,6}", 1..5),
        separators in prop::collection::vec("[/.+; =-]{1,3}", 4),
    ) {
        let mut media_type = String::new();
        for (idx, word) in words.iter().enumerate() {
            if idx > 0 {
                media_type.push_str(&separators[idx - 1]);
            }
            media_type.push_str(word);
        }

        let expected = words
            .iter()
            .map(|w| w.to_lowercase())
            .collect::<Vec<_>>()
            .join("-");
        prop_assert_eq!(sanitize_media_type(&media_type), expected);
    }

    #[test]
    fn trailing_separators_survive(word in "[a-z]{1,8}", tail in "[/.+;]{1,3}") {
        let media_type = format!("{word}{tail}");
        prop_assert_eq!(sanitize_media_type(&media_type), media_type);
    }

    #[test]
    fn distinct_sanitized_types_give_distinct_keys(
        a in "[a-z]{1,6}/[a-z]{1,6}",
        b in "[a-z]{1,6}/[a-z]{1,6}",
    ) {
        prop_assume!(sanitize_media_type(&a) != sanitize_media_type(&b));
        prop_assert_ne!(qualified_key("op", &a), qualified_key("op", &b));
    }
}
