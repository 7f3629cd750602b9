//! Hashtag style labels in free text.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"#([A-Za-z0-9_]+)").expect("valid tag regex"));

/// Extract the distinct tags in `text`, lower-cased, in order of first
/// appearance.
///
/// A tag is a `#` followed by one or more ASCII letters, digits or
/// underscores. A lone `#` is not a tag.
///
/// Repeats are returned once, whatever their case, so `#music #Music` counts
/// an event toward `music` once rather than twice.
pub fn extract_tags(text: &str) -> Vec<String> {
    TAG.captures_iter(text)
        .map(|captures| captures[1].to_ascii_lowercase())
        .unique()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Nosferatu", &[])]
    #[case("Nosferatu #music", &["music"])]
    #[case("Nosferatu #music #soundtrack", &["music", "soundtrack"])]
    #[case("#Music practice", &["music"])]
    #[case("#music then more #MUSIC", &["music"])]
    #[case("lone # and #_under_score1", &["_under_score1"])]
    #[case("email me@example.org, C# or 50%", &[])]
    #[case("##double", &["double"])]
    #[case("#mixing,#mastering;", &["mixing", "mastering"])]
    fn tags_in_text(#[case] text: &str, #[case] expected: &[&str]) {
        assert_eq!(extract_tags(text), expected);
    }

    #[test]
    fn extraction_is_idempotent() {
        for tag in extract_tags("#Music #SoundTrack #film_2") {
            assert_eq!(extract_tags(&format!("#{}", tag)), vec![tag]);
        }
    }
}
