//! Token-coverage phrase location.
//!
//! Recognized text arrives as many small units, and an expected phrase is
//! often split across units that are not adjacent (trademark marks, symbols
//! and segmentation artifacts land in between). Rather than combining
//! neighbouring units, the locator asks what fraction of the phrase's tokens
//! can be found anywhere among the units.

use strsim::normalized_levenshtein;
use tracing::debug;

use crate::models::recognition::{BoundingRegion, RecognitionResult};
use crate::services::text::{contains_phrase, token_text, tokenize, tokens_match};

/// Thresholds for a single phrase search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoveragePolicy {
    /// Whole-phrase similarity accepted by the cheap path.
    pub phrase_threshold: f64,
    /// Per-token similarity needed to mark a token covered.
    pub token_threshold: f64,
}

/// Outcome of searching for one expected phrase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseMatch {
    /// Fraction of expected tokens covered; 1.0 when the cheap path accepted.
    pub coverage: f64,
    pub covered_tokens: usize,
    pub total_tokens: usize,
    /// Accepted by comparing the whole phrase against the full text.
    pub whole_phrase: bool,
    /// Whole-phrase similarity on the cheap path, coverage otherwise.
    pub confidence: f64,
    /// Text of the contributing units, or the covered tokens when the
    /// recognition result has no units.
    pub matched_text: Option<String>,
    /// Region of the first contributing unit.
    pub region: Option<BoundingRegion>,
}

impl PhraseMatch {
    fn empty(total_tokens: usize) -> Self {
        Self {
            coverage: 0.0,
            covered_tokens: 0,
            total_tokens,
            whole_phrase: false,
            confidence: 0.0,
            matched_text: None,
            region: None,
        }
    }

    pub fn meets(&self, coverage_threshold: f64) -> bool {
        self.total_tokens > 0 && self.coverage >= coverage_threshold
    }
}

/// Find `expected` among the recognized units.
pub fn locate_phrase(
    expected: &str,
    recognition: &RecognitionResult,
    policy: CoveragePolicy,
) -> PhraseMatch {
    let expected_tokens = tokenize(expected);
    if expected_tokens.is_empty() {
        return PhraseMatch::empty(0);
    }
    let total = expected_tokens.len();
    let scan = scan_units(&expected_tokens, recognition, policy.token_threshold);

    let expected_text = expected_tokens.join(" ");
    let full_text = token_text(recognition.full_text());
    let whole_similarity = if contains_phrase(&full_text, &expected_text) {
        Some(1.0)
    } else {
        let score = normalized_levenshtein(&expected_text, &full_text);
        (score >= policy.phrase_threshold).then_some(score)
    };

    if let Some(similarity) = whole_similarity {
        debug!(phrase = %expected, similarity, "Phrase matched against full text");
        return PhraseMatch {
            coverage: 1.0,
            covered_tokens: total,
            total_tokens: total,
            whole_phrase: true,
            confidence: similarity,
            matched_text: scan.matched_text.or(Some(expected.trim().to_string())),
            region: scan.region,
        };
    }

    let coverage = scan.covered as f64 / total as f64;
    debug!(
        phrase = %expected,
        covered = scan.covered,
        total,
        coverage,
        "Token coverage computed"
    );

    PhraseMatch {
        coverage,
        covered_tokens: scan.covered,
        total_tokens: total,
        whole_phrase: false,
        confidence: coverage,
        matched_text: scan.matched_text,
        region: scan.region,
    }
}

struct UnitScan {
    covered: usize,
    matched_text: Option<String>,
    region: Option<BoundingRegion>,
}

fn scan_units(expected_tokens: &[String], recognition: &RecognitionResult, threshold: f64) -> UnitScan {
    let mut covered = vec![false; expected_tokens.len()];

    if recognition.units().is_empty() {
        let label_tokens = tokenize(recognition.full_text());
        let mut found = Vec::new();
        for (slot, expected) in covered.iter_mut().zip(expected_tokens) {
            if let Some(token) = label_tokens.iter().find(|t| tokens_match(t, expected, threshold)) {
                *slot = true;
                found.push(token.as_str());
            }
        }
        return UnitScan {
            covered: found.len(),
            matched_text: (!found.is_empty()).then(|| found.join(" ")),
            region: None,
        };
    }

    let mut region = None;
    let mut contributing = Vec::new();
    for unit in recognition.units() {
        let unit_tokens = tokenize(unit.normalized());
        let mut contributed = false;
        for (slot, expected) in covered.iter_mut().zip(expected_tokens) {
            if unit_tokens.iter().any(|t| tokens_match(t, expected, threshold)) {
                *slot = true;
                contributed = true;
            }
        }
        if contributed {
            region.get_or_insert(unit.region());
            contributing.push(unit.text().trim());
        }
    }

    UnitScan {
        covered: covered.iter().filter(|c| **c).count(),
        matched_text: (!contributing.is_empty()).then(|| contributing.join(" ")),
        region,
    }
}
