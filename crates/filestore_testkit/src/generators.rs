//! Property-based test generators using proptest.
//!
//! Provides strategies for generating names, paths and payloads that either
//! satisfy or deliberately break the validation rules.

use proptest::prelude::*;

/// Characters a filename must not contain.
pub const FORBIDDEN_FILENAME_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Strategy for generating valid filenames.
pub fn filename_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9_-][a-zA-Z0-9_. -]{0,30}")
        .expect("Invalid regex")
}

/// Strategy for generating one valid path segment.
pub fn segment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex("[a-zA-Z0-9_-]{1,12}").expect("Invalid regex"),
        prop::string::string_regex("[a-zA-Z0-9_-][a-zA-Z0-9_ .-]{0,10}[a-zA-Z0-9_-]")
            .expect("Invalid regex"),
    ]
}

/// Strategy for generating valid, normalized paths (`""` for root).
pub fn path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(segment_strategy(), 0..5).prop_map(|segments| segments.join("/"))
}

/// Strategy for generating valid raw paths, with optional leading and
/// trailing separators and blank root forms.
pub fn raw_path_strategy() -> impl Strategy<Value = String> {
    (path_strategy(), any::<bool>(), any::<bool>()).prop_map(|(path, lead, trail)| {
        if path.is_empty() {
            return if lead { "/".to_string() } else { String::new() };
        }
        let mut raw = String::new();
        if lead {
            raw.push('/');
        }
        raw.push_str(&path);
        if trail {
            raw.push('/');
        }
        raw
    })
}

/// Strategy for generating filenames with at least one forbidden character.
///
/// Yields the filename and its distinct forbidden characters in
/// first-occurrence order.
pub fn invalid_filename_strategy() -> impl Strategy<Value = (String, Vec<char>)> {
    (
        "[a-z]{0,6}",
        prop::collection::vec((prop::sample::select(FORBIDDEN_FILENAME_CHARS.to_vec()), "[a-z]{0,3}"), 1..6),
    )
        .prop_map(|(head, parts)| {
            let mut name = head;
            let mut offenders = Vec::new();
            for (c, tail) in parts {
                name.push(c);
                name.push_str(&tail);
                if !offenders.contains(&c) {
                    offenders.push(c);
                }
            }
            (name, offenders)
        })
}

/// Strategy for generating paths that break a segment rule.
pub fn invalid_path_strategy() -> impl Strategy<Value = String> {
    let bad_segment = prop_oneof![
        Just(String::new()),
        "\\.{1,4}",
        " [a-z]{1,5}",
        "[a-z]{1,5} ",
        "[a-z]{1,5}\\.",
    ];
    (path_strategy(), bad_segment, path_strategy()).prop_map(|(head, bad, tail)| {
        // a leading separator and trailing ones are ignored, so pad both ends
        let head = if head.is_empty() { "start".to_string() } else { head };
        let tail = if tail.is_empty() { "end".to_string() } else { tail };
        [head, bad, tail].join("/")
    })
}

/// Strategy for generating non-empty payloads.
pub fn content_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..512)
}

#[cfg(test)]
mod tests {
    use super::*;
    use filestore_core::validate::{validate_filename, validate_path};

    proptest! {
        #[test]
        fn generated_filenames_are_valid(name in filename_strategy()) {
            prop_assert!(validate_filename(&name).is_ok());
        }

        #[test]
        fn generated_raw_paths_are_valid(path in raw_path_strategy()) {
            prop_assert!(validate_path(&path).is_ok());
        }

        #[test]
        fn generated_invalid_paths_are_invalid(path in invalid_path_strategy()) {
            prop_assert!(validate_path(&path).is_err());
        }
    }
}
