//! Text normalization and approximate string matching.
//!
//! Label text wraps across lines, so every comparison in the engine runs on
//! normalized text: a phrase split by a line break must compare equal to the
//! same phrase on one line.

use std::sync::LazyLock;

use regex::Regex;
use strsim::normalized_levenshtein;

/// Letter O read between a digit and a percent sign ("4O%").
static O_AS_ZERO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)O%").expect("valid O-as-zero regex"));

/// Lowercase l read in place of a leading 1 ("l5.5%").
static L_BEFORE_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\s)l(\d)").expect("valid l-before-digit regex"));

/// Lowercase l read in place of a 1 before a decimal point ("4l.5").
static L_BEFORE_POINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)l\.").expect("valid l-before-point regex"));

/// Lowercase, collapse every whitespace run (including line breaks) to a
/// single space, and trim.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Word-level tokens of `text`.
///
/// Apostrophes are dropped ("Daniel's" -> "daniels"), other punctuation
/// separates tokens, and `.`/`%` survive inside numbers ("13.5%").
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = normalize(text)
        .chars()
        .filter(|c| !matches!(c, '\'' | '\u{2018}' | '\u{2019}' | '`'))
        .map(|c| if c.is_alphanumeric() || c == '.' || c == '%' { c } else { ' ' })
        .collect();

    cleaned
        .split_whitespace()
        .map(|token| token.trim_matches('.'))
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Tokens re-joined with single spaces; the canonical form for phrase
/// containment checks.
pub fn token_text(text: &str) -> String {
    tokenize(text).join(" ")
}

/// Whether `phrase` occurs in `haystack` on token boundaries. Both arguments
/// must already be in `token_text` form.
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    format!(" {haystack} ").contains(&format!(" {phrase} "))
}

/// Edit-distance similarity in [0, 1] after normalizing both sides.
pub fn similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(&normalize(a), &normalize(b))
}

/// Approximate equality: `(similarity >= threshold, similarity)`.
pub fn fuzzy_match(a: &str, b: &str, threshold: f64) -> (bool, f64) {
    let score = similarity(a, b);
    (score >= threshold, score)
}

/// Token comparison for already-tokenized input.
pub fn tokens_match(label_token: &str, expected_token: &str, threshold: f64) -> bool {
    label_token == expected_token || normalized_levenshtein(label_token, expected_token) >= threshold
}

/// Repair glyph confusions that only matter in numeric context.
pub fn repair_numeric_glyphs(text: &str) -> String {
    let text = O_AS_ZERO.replace_all(text, "${1}0%");
    let text = L_BEFORE_DIGIT.replace_all(&text, "${1}1${2}");
    L_BEFORE_POINT.replace_all(&text, "${1}1.").into_owned()
}

/// Render a number the way labels print it: no trailing ".0".
pub fn format_number(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{value:.0}")
    } else {
        let rendered = format!("{value:.2}");
        rendered.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_normalize_collapses_line_breaks() {
        assert_eq!(normalize("  SURGEON\nGENERAL \t WARNING  "), "surgeon general warning");
    }

    #[test_case("Jack Daniel's\r\n Tennessee   Whiskey"; "mixed whitespace")]
    #[test_case("   "; "blank")]
    #[test_case("GOVERNMENT\nWARNING:\n(1)"; "warning fragment")]
    #[test_case("Rosé\u{00a0}Wine"; "non-breaking space")]
    fn test_normalize_idempotent(input: &str) {
        let once = normalize(input);
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_tokenize_drops_apostrophes() {
        assert_eq!(tokenize("Jack Daniel's"), vec!["jack", "daniels"]);
        assert_eq!(tokenize("JACK DANIEL\u{2019}S"), vec!["jack", "daniels"]);
    }

    #[test]
    fn test_tokenize_keeps_numbers() {
        assert_eq!(tokenize("13.5% ALC./VOL."), vec!["13.5%", "alc", "vol"]);
        assert_eq!(tokenize("(1) According"), vec!["1", "according"]);
        assert_eq!(tokenize("EAGLE RARE\u{00ae}"), vec!["eagle", "rare"]);
    }

    #[test]
    fn test_contains_phrase_respects_token_boundaries() {
        assert!(contains_phrase("london dry gin 750 ml", "dry gin"));
        assert!(!contains_phrase("virgin islands rum", "gin"));
        assert!(!contains_phrase("anything", ""));
    }

    #[test]
    fn test_fuzzy_match_tolerates_ocr_noise() {
        let (is_match, score) = fuzzy_match("Eagle Rare", "EAGLE RAVE", 0.85);
        assert!(is_match, "score was {score}");
        let (is_match, _) = fuzzy_match("Bourbon", "Whiskey", 0.85);
        assert!(!is_match);
    }

    #[test]
    fn test_tokens_match_threshold() {
        assert!(tokens_match("warnlng", "warning", 0.85));
        assert!(!tokens_match("45%", "40%", 0.75));
    }

    #[test_case("4O% ALC/VOL", "40% ALC/VOL"; "letter o in percent")]
    #[test_case("ALC l3.5%", "ALC 13.5%"; "leading l")]
    #[test_case("4l.5%", "41.5%"; "l before decimal point")]
    #[test_case("Old Forester", "Old Forester"; "untouched words")]
    fn test_repair_numeric_glyphs(input: &str, expected: &str) {
        assert_eq!(repair_numeric_glyphs(input), expected);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(45.0), "45");
        assert_eq!(format_number(13.5), "13.5");
        assert_eq!(format_number(25.36), "25.36");
    }
}
