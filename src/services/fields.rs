//! Field verifiers.
//!
//! One routine per label attribute, all with the same [`Verifier`] shape so
//! the orchestrator can run them from a table. A verifier that cannot run
//! returns a [`FieldError`]; it never panics and never aborts the batch.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::config::VerificationConfig;
use crate::models::label::ProductDeclaration;
use crate::models::recognition::{BoundingRegion, RecognitionResult, RecognizedTextUnit};
use crate::models::verification::{FieldId, FieldResult, FieldStatus};
use crate::services::locator::{locate_phrase, PhraseMatch};
use crate::services::rules::{self, declared_text, Requirement};
use crate::services::text::{
    contains_phrase, format_number, normalize, repair_numeric_glyphs, token_text, tokenize,
    tokens_match,
};
use crate::services::ttb_standards::{
    age_family, class_variants, cfr_reference, GOVERNMENT_WARNING_TEXT, WARNING_KEYWORDS,
};
use crate::services::volume::{extract_volumes, is_standard_size, parse_volume, VolumeError};

/// Confidence reported for a numeric value read by pattern.
const NUMERIC_CONFIDENCE: f64 = 0.95;

/// Confidence reported for a keyword-pattern hit.
const PATTERN_CONFIDENCE: f64 = 0.9;

/// Ceiling on confidence when only a synonym of the declared class matched.
const SYNONYM_CONFIDENCE: f64 = 0.8;

/// Extracted strengths outside this range are recognition noise.
const PLAUSIBLE_ABV: std::ops::RangeInclusive<f64> = 0.5..=95.0;

static STRENGTH_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(\d+(?:\.\d+)?)\s*%\s*(?:alc|abv)",
        r"(?i)(\d+(?:\.\d+)?)\s*percent\s+alc",
        r"(?i)alcohol\s+(?:by\s+volume\s+)?(\d+(?:\.\d+)?)\s*%",
        r"(?i)(?:alc|vol)\D{0,15}?(\d+(?:\.\d+)?)\s*%",
        r"(?i)(\d+(?:\.\d+)?)\s*%\D{0,15}vol",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid strength regex"))
    .collect()
});

static PROOF_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*°?\s*proof\b").expect("valid proof regex"));

static SULFITE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:contains\s+)?sul(?:f|ph)ites?\b").expect("valid sulfite regex")
});

static GOVERNMENT_WARNING_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)government\s+warning").expect("valid warning phrase regex"));

static SURGEON_GENERAL_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)surgeon\s+general").expect("valid surgeon general regex"));

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("{field} is required but was not declared")]
    MissingDeclaredValue { field: FieldId },

    #[error("declared net contents: {0}")]
    NetContents(#[from] VolumeError),
}

/// Common shape of every field verifier.
pub type Verifier =
    fn(&ProductDeclaration, &RecognitionResult, &VerificationConfig) -> Result<FieldResult, FieldError>;

fn outcome(field: FieldId, status: FieldStatus, expected: impl Into<String>, decl: &ProductDeclaration) -> FieldResult {
    FieldResult::new(field, status, expected).with_cfr(cfr_reference(field, decl.category))
}

fn region_where<F>(recognition: &RecognitionResult, predicate: F) -> Option<BoundingRegion>
where
    F: Fn(&RecognizedTextUnit) -> bool,
{
    recognition
        .units()
        .iter()
        .find(|unit| predicate(unit))
        .map(RecognizedTextUnit::region)
}

fn percent(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

fn located(found: &PhraseMatch, config: &VerificationConfig) -> bool {
    found.meets(config.short_phrase_coverage)
}

// ── Identity ────────────────────────────────────────────────────────────

pub fn verify_brand_name(
    decl: &ProductDeclaration,
    recognition: &RecognitionResult,
    config: &VerificationConfig,
) -> Result<FieldResult, FieldError> {
    let brand = decl.brand_name.trim();
    let found = locate_phrase(brand, recognition, config.phrase_policy());
    debug!(field = %FieldId::BrandName, coverage = found.coverage, "Brand name searched");

    if located(&found, config) {
        let mut result = outcome(FieldId::BrandName, FieldStatus::Match, brand, decl)
            .with_confidence(found.confidence)
            .with_location(found.region)
            .with_message(format!("Brand name found ({} token coverage)", percent(found.coverage)));
        if let Some(text) = found.matched_text {
            result = result.with_found(text);
        }
        return Ok(result);
    }

    Ok(outcome(FieldId::BrandName, FieldStatus::NotFound, brand, decl).with_message(format!(
        "Brand name '{brand}' not found on label ({} token coverage)",
        percent(found.coverage)
    )))
}

pub fn verify_product_class(
    decl: &ProductDeclaration,
    recognition: &RecognitionResult,
    config: &VerificationConfig,
) -> Result<FieldResult, FieldError> {
    let class = decl.product_class.trim();
    let policy = config.phrase_policy();

    for (index, variant) in class_variants(class).iter().enumerate() {
        let found = locate_phrase(variant, recognition, policy);
        debug!(field = %FieldId::ProductClass, variant = %variant, coverage = found.coverage, "Class variant searched");
        if !located(&found, config) {
            continue;
        }

        let (confidence, message) = if index == 0 {
            (
                found.confidence,
                format!("Product class found ({} token coverage)", percent(found.coverage)),
            )
        } else {
            (
                found.confidence.min(SYNONYM_CONFIDENCE),
                format!("Product class matched via synonym '{variant}'"),
            )
        };
        let mut result = outcome(FieldId::ProductClass, FieldStatus::Match, class, decl)
            .with_confidence(confidence)
            .with_location(found.region)
            .with_message(message);
        if let Some(text) = found.matched_text {
            result = result.with_found(text);
        }
        return Ok(result);
    }

    Ok(outcome(FieldId::ProductClass, FieldStatus::NotFound, class, decl)
        .with_message(format!("Product class '{class}' not found on label")))
}

// ── Strength and volume ─────────────────────────────────────────────────

/// Every plausible ABV printed on the label, in pattern order.
pub fn extract_strengths(text: &str) -> Vec<f64> {
    let text = normalize(&repair_numeric_glyphs(text));
    let mut values: Vec<f64> = Vec::new();
    for pattern in STRENGTH_PATTERNS.iter() {
        for caps in pattern.captures_iter(&text) {
            let Ok(value) = caps[1].parse::<f64>() else {
                continue;
            };
            if PLAUSIBLE_ABV.contains(&value) && !values.iter().any(|v| (v - value).abs() < 1e-9) {
                values.push(value);
            }
        }
    }
    values
}

/// Every "N proof" statement on the label.
pub fn extract_proofs(text: &str) -> Vec<f64> {
    let text = normalize(&repair_numeric_glyphs(text));
    PROOF_PATTERN
        .captures_iter(&text)
        .filter_map(|caps| caps[1].parse().ok())
        .collect()
}

/// The candidate agreeing with the declaration, else the first one.
fn pick<T: Copy>(candidates: &[T], agrees: impl Fn(T) -> bool) -> Option<(T, bool)> {
    candidates
        .iter()
        .copied()
        .find(|c| agrees(*c))
        .map(|c| (c, true))
        .or_else(|| candidates.first().map(|c| (*c, false)))
}

pub fn verify_alcohol_content(
    decl: &ProductDeclaration,
    recognition: &RecognitionResult,
    config: &VerificationConfig,
) -> Result<FieldResult, FieldError> {
    let declared = decl.alcohol_content;
    let expected = format!("{}% ABV", format_number(declared));
    let candidates = extract_strengths(recognition.full_text());
    debug!(field = %FieldId::AlcoholContent, ?candidates, declared, "Strength candidates extracted");

    let Some((found, agrees)) = pick(&candidates, |v| (v - declared).abs() <= config.abv_tolerance) else {
        return Ok(outcome(FieldId::AlcoholContent, FieldStatus::NotFound, expected, decl)
            .with_message("Alcohol content not found on label"));
    };

    let printed = format!("{}%", format_number(found));
    let location = region_where(recognition, |unit| {
        extract_strengths(unit.text()).iter().any(|v| (v - found).abs() < 1e-9)
    })
    .or_else(|| region_where(recognition, |unit| tokenize(unit.text()).contains(&printed)));

    let (status, message) = if agrees {
        (
            FieldStatus::Match,
            format!(
                "ABV matches: {printed} (declared {}%, tolerance ±{})",
                format_number(declared),
                format_number(config.abv_tolerance)
            ),
        )
    } else {
        (
            FieldStatus::Mismatch,
            format!(
                "ABV mismatch: declared {}%, found {printed} on label",
                format_number(declared)
            ),
        )
    };

    Ok(outcome(FieldId::AlcoholContent, status, expected, decl)
        .with_found(format!("{printed} ABV"))
        .with_confidence(NUMERIC_CONFIDENCE)
        .with_location(location)
        .with_message(message))
}

pub fn verify_net_contents(
    decl: &ProductDeclaration,
    recognition: &RecognitionResult,
    _config: &VerificationConfig,
) -> Result<FieldResult, FieldError> {
    if let Requirement::NotRequired(reason) = rules::net_contents(decl) {
        return Ok(FieldResult::not_required(FieldId::NetContents, reason));
    }
    let declared_raw = declared_text(&decl.net_contents).ok_or(FieldError::MissingDeclaredValue {
        field: FieldId::NetContents,
    })?;
    let declared = parse_volume(declared_raw)?;
    let candidates = extract_volumes(recognition.full_text());
    debug!(field = %FieldId::NetContents, ?candidates, declared = %declared, "Volume candidates extracted");

    let Some((found, agrees)) = pick(&candidates, |v| declared.agrees_with(v)) else {
        return Ok(outcome(FieldId::NetContents, FieldStatus::NotFound, declared_raw, decl)
            .with_message("Net contents not found on label"));
    };

    let location = region_where(recognition, |unit| {
        extract_volumes(unit.text()).iter().any(|v| *v == found)
    });
    let base = outcome(FieldId::NetContents, FieldStatus::Match, declared_raw, decl)
        .with_found(found.to_string())
        .with_confidence(NUMERIC_CONFIDENCE)
        .with_location(location);

    if !agrees {
        return Ok(FieldResult {
            status: FieldStatus::Mismatch,
            ..base.with_message(format!(
                "Net contents mismatch: declared {declared} ({} mL), found {found} ({} mL)",
                format_number(declared.to_ml()),
                format_number(found.to_ml())
            ))
        });
    }

    if !is_standard_size(declared.to_ml(), decl.category) {
        return Ok(FieldResult {
            status: FieldStatus::Warning,
            ..base.with_message(format!(
                "{found} matches the declaration but is not a standard of fill for {} ({})",
                decl.category,
                cfr_reference(FieldId::NetContents, decl.category)
            ))
        });
    }

    Ok(base.with_message(format!("Net contents match: {found}")))
}

// ── Health warning ──────────────────────────────────────────────────────

fn keyword_present(keyword: &str, label_text: &str, label_tokens: &[String], threshold: f64) -> bool {
    if contains_phrase(label_text, &token_text(keyword)) {
        return true;
    }
    tokenize(keyword).iter().all(|expected| {
        label_tokens
            .iter()
            .any(|token| tokens_match(token, expected, threshold))
    })
}

/// A phrase that appears (ignoring case) but never with the required
/// capitalization.
fn miscapitalized(pattern: &Regex, text: &str, conforms: impl Fn(&str) -> bool) -> bool {
    let mut occurrences = pattern.find_iter(text).peekable();
    occurrences.peek().is_some() && !occurrences.any(|m| conforms(m.as_str()))
}

fn all_caps(phrase: &str) -> bool {
    !phrase.chars().any(char::is_lowercase)
}

fn title_initials(phrase: &str) -> bool {
    phrase
        .split_whitespace()
        .all(|word| word.chars().next().is_some_and(char::is_uppercase))
}

pub fn verify_government_warning(
    decl: &ProductDeclaration,
    recognition: &RecognitionResult,
    config: &VerificationConfig,
) -> Result<FieldResult, FieldError> {
    const EXPECTED: &str = "GOVERNMENT WARNING: (1) According to the Surgeon General...";

    let raw = recognition.full_text();
    let label_text = token_text(raw);
    let label_tokens = tokenize(raw);
    let (present, missing): (Vec<&str>, Vec<&str>) = WARNING_KEYWORDS
        .iter()
        .copied()
        .partition(|kw| keyword_present(kw, &label_text, &label_tokens, config.keyword_token_threshold));
    debug!(field = %FieldId::GovernmentWarning, present = present.len(), ?missing, "Warning keywords checked");

    if present.is_empty() {
        return Ok(outcome(FieldId::GovernmentWarning, FieldStatus::NotFound, EXPECTED, decl)
            .with_message("Government warning statement not found on label"));
    }

    let location = locate_phrase("government warning", recognition, config.statement_policy()).region;
    if !missing.is_empty() {
        return Ok(outcome(FieldId::GovernmentWarning, FieldStatus::NotFound, EXPECTED, decl)
            .with_location(location)
            .with_message(format!(
                "Government warning incomplete, missing: {}",
                missing.join(", ")
            )));
    }

    let spaced = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if miscapitalized(&GOVERNMENT_WARNING_PHRASE, &spaced, all_caps) {
        return Ok(outcome(FieldId::GovernmentWarning, FieldStatus::Mismatch, EXPECTED, decl)
            .with_location(location)
            .with_message("\"GOVERNMENT WARNING\" must appear in capital letters"));
    }
    if miscapitalized(&SURGEON_GENERAL_PHRASE, &spaced, title_initials) {
        return Ok(outcome(FieldId::GovernmentWarning, FieldStatus::Mismatch, EXPECTED, decl)
            .with_location(location)
            .with_message("\"Surgeon General\" must be written with a capital S and G"));
    }

    let found = locate_phrase(GOVERNMENT_WARNING_TEXT, recognition, config.statement_policy());
    debug!(
        field = %FieldId::GovernmentWarning,
        coverage = found.coverage,
        covered = found.covered_tokens,
        total = found.total_tokens,
        "Warning statement coverage"
    );

    let base = outcome(FieldId::GovernmentWarning, FieldStatus::Match, EXPECTED, decl)
        .with_confidence(found.confidence)
        .with_location(location.or(found.region));

    if found.coverage >= config.warning_match_coverage {
        Ok(base
            .with_found("Government warning present")
            .with_message(format!("Government warning matches ({} coverage)", percent(found.coverage))))
    } else if found.coverage >= config.warning_partial_coverage {
        Ok(FieldResult {
            status: FieldStatus::Warning,
            ..base
                .with_found("Government warning present with variations")
                .with_message(format!(
                    "Government warning found but deviates from the statutory text ({} coverage)",
                    percent(found.coverage)
                ))
        })
    } else {
        Ok(FieldResult {
            status: FieldStatus::NotFound,
            ..base.with_confidence(0.0).with_message(format!(
                "Government warning text incomplete ({} coverage)",
                percent(found.coverage)
            ))
        })
    }
}

// ── Distilled spirits ───────────────────────────────────────────────────

pub fn verify_age_statement(
    decl: &ProductDeclaration,
    recognition: &RecognitionResult,
    config: &VerificationConfig,
) -> Result<FieldResult, FieldError> {
    let requirement = rules::age_statement(decl);
    if let Requirement::NotRequired(reason) = requirement {
        return Ok(FieldResult::not_required(FieldId::AgeStatement, reason));
    }
    let declared = declared_text(&decl.age_statement).ok_or(FieldError::MissingDeclaredValue {
        field: FieldId::AgeStatement,
    })?;

    let found = locate_phrase(declared, recognition, config.phrase_policy());
    let evidence = if located(&found, config) {
        Some((found.matched_text.unwrap_or_else(|| declared.to_string()), found.region, found.confidence))
    } else {
        rules::declared_age_years(declared).and_then(|years| {
            rules::age_mentions(recognition.full_text())
                .into_iter()
                .find(|mention| (mention.years - years).abs() < 1e-9)
                .map(|mention| {
                    let region = region_where(recognition, |unit| {
                        rules::age_mentions(unit.text())
                            .iter()
                            .any(|m| (m.years - years).abs() < 1e-9)
                    });
                    (mention.text, region, PATTERN_CONFIDENCE)
                })
        })
    };
    debug!(field = %FieldId::AgeStatement, ?requirement, located = evidence.is_some(), "Age statement searched");

    let Some((text, location, confidence)) = evidence else {
        return Ok(match requirement {
            Requirement::Mandatory => {
                let family = age_family(&decl.product_class).map_or("this class", |f| f.name);
                outcome(FieldId::AgeStatement, FieldStatus::NotFound, declared, decl).with_message(format!(
                    "Age statement '{declared}' is required for {family} of this age but was not found on label"
                ))
            }
            _ => outcome(FieldId::AgeStatement, FieldStatus::Warning, declared, decl)
                .with_message(format!("Age statement '{declared}' not found on label")),
        });
    };

    let base = outcome(FieldId::AgeStatement, FieldStatus::Match, declared, decl)
        .with_found(text)
        .with_confidence(confidence)
        .with_location(location);

    if !rules::conforms_to_age_template(declared) {
        return Ok(FieldResult {
            status: FieldStatus::Warning,
            ..base.with_message(format!(
                "Age statement '{declared}' does not follow an approved form such as 'Aged 4 Years' or '4 Years Old'"
            ))
        });
    }

    Ok(base.with_message("Age statement matches"))
}

pub fn verify_proof(
    decl: &ProductDeclaration,
    recognition: &RecognitionResult,
    config: &VerificationConfig,
) -> Result<FieldResult, FieldError> {
    let stated = extract_proofs(recognition.full_text());
    if let Requirement::NotRequired(reason) = rules::proof(decl, !stated.is_empty()) {
        return Ok(FieldResult::not_required(FieldId::Proof, reason));
    }

    let implied = decl.alcohol_content * 2.0;
    let target = decl.proof.unwrap_or(implied);
    let expected = format!("{} proof", format_number(target));
    debug!(field = %FieldId::Proof, ?stated, declared = ?decl.proof, implied, "Proof candidates extracted");

    if let Some(declared) = decl.proof {
        if (declared - implied).abs() > config.proof_tolerance {
            return Ok(outcome(FieldId::Proof, FieldStatus::Mismatch, expected, decl)
                .with_confidence(1.0)
                .with_message(format!(
                    "Declared {} proof is inconsistent with {}% ABV ({} proof)",
                    format_number(declared),
                    format_number(decl.alcohol_content),
                    format_number(implied)
                )));
        }
    }

    let Some((found, agrees)) = pick(&stated, |p| (p - target).abs() <= config.proof_tolerance) else {
        return Ok(outcome(FieldId::Proof, FieldStatus::Warning, &expected, decl)
            .with_message(format!("Proof statement '{expected}' not found on label")));
    };

    let printed = format!("{} proof", format_number(found));
    let location = region_where(recognition, |unit| {
        extract_proofs(unit.text()).iter().any(|p| (p - found).abs() < 1e-9)
    });
    let status = if agrees { FieldStatus::Match } else { FieldStatus::Mismatch };
    let message = if agrees {
        format!("Proof statement matches: {printed}")
    } else {
        format!("Label states {printed}, expected {expected}")
    };

    Ok(outcome(FieldId::Proof, status, expected, decl)
        .with_found(printed)
        .with_confidence(NUMERIC_CONFIDENCE)
        .with_location(location)
        .with_message(message))
}

// ── Wine ────────────────────────────────────────────────────────────────

pub fn verify_sulfites(
    decl: &ProductDeclaration,
    recognition: &RecognitionResult,
    _config: &VerificationConfig,
) -> Result<FieldResult, FieldError> {
    if let Requirement::NotRequired(reason) = rules::sulfite_declaration(decl) {
        return Ok(FieldResult::not_required(FieldId::Sulfites, reason));
    }

    const EXPECTED: &str = "Contains Sulfites";
    let text = normalize(recognition.full_text());
    let Some(found) = SULFITE_PATTERN.find(&text) else {
        return Ok(outcome(FieldId::Sulfites, FieldStatus::NotFound, EXPECTED, decl)
            .with_message("Sulfite declaration required but not found on label"));
    };

    let location = region_where(recognition, |unit| SULFITE_PATTERN.is_match(unit.normalized()));
    Ok(outcome(FieldId::Sulfites, FieldStatus::Match, EXPECTED, decl)
        .with_found(found.as_str())
        .with_confidence(PATTERN_CONFIDENCE)
        .with_location(location)
        .with_message("Sulfite declaration found on label"))
}

pub fn verify_vintage(
    decl: &ProductDeclaration,
    recognition: &RecognitionResult,
    _config: &VerificationConfig,
) -> Result<FieldResult, FieldError> {
    if let Requirement::NotRequired(reason) = rules::vintage(decl) {
        return Ok(FieldResult::not_required(FieldId::Vintage, reason));
    }
    let year = decl
        .vintage_year
        .ok_or(FieldError::MissingDeclaredValue { field: FieldId::Vintage })?
        .to_string();

    let has_year = |text: &str| tokenize(text).iter().any(|token| *token == year);
    if !has_year(recognition.full_text()) {
        return Ok(outcome(FieldId::Vintage, FieldStatus::NotFound, &year, decl)
            .with_message(format!("Vintage year {year} not found on label")));
    }

    let location = region_where(recognition, |unit| has_year(unit.text()));
    Ok(outcome(FieldId::Vintage, FieldStatus::Match, &year, decl)
        .with_found(&year)
        .with_confidence(NUMERIC_CONFIDENCE)
        .with_location(location)
        .with_message(format!("Vintage year {year} found on label")))
}

pub fn verify_appellation(
    decl: &ProductDeclaration,
    recognition: &RecognitionResult,
    config: &VerificationConfig,
) -> Result<FieldResult, FieldError> {
    if let Requirement::NotRequired(reason) = rules::appellation(decl) {
        return Ok(FieldResult::not_required(FieldId::Appellation, reason));
    }
    let declared = declared_text(&decl.appellation).ok_or(FieldError::MissingDeclaredValue {
        field: FieldId::Appellation,
    })?;

    let found = locate_phrase(declared, recognition, config.phrase_policy());
    debug!(field = %FieldId::Appellation, coverage = found.coverage, "Appellation searched");
    if !located(&found, config) {
        return Ok(outcome(FieldId::Appellation, FieldStatus::NotFound, declared, decl)
            .with_message(format!("Appellation '{declared}' not found on label")));
    }

    let mut result = outcome(FieldId::Appellation, FieldStatus::Match, declared, decl)
        .with_confidence(found.confidence)
        .with_location(found.region)
        .with_message(format!("Appellation '{declared}' found on label"));
    if let Some(text) = found.matched_text {
        result = result.with_found(text);
    }
    Ok(result)
}

// ── Imports ─────────────────────────────────────────────────────────────

pub fn verify_country_of_origin(
    decl: &ProductDeclaration,
    recognition: &RecognitionResult,
    config: &VerificationConfig,
) -> Result<FieldResult, FieldError> {
    if let Requirement::NotRequired(reason) = rules::country_of_origin(decl) {
        return Ok(FieldResult::not_required(FieldId::CountryOfOrigin, reason));
    }
    let country = declared_text(&decl.country_of_origin).ok_or(FieldError::MissingDeclaredValue {
        field: FieldId::CountryOfOrigin,
    })?;

    let found = locate_phrase(country, recognition, config.phrase_policy());
    debug!(field = %FieldId::CountryOfOrigin, coverage = found.coverage, "Country of origin searched");
    if !located(&found, config) {
        return Ok(outcome(FieldId::CountryOfOrigin, FieldStatus::NotFound, country, decl).with_message(
            format!("Country of origin '{country}' is required for imports but was not found on label"),
        ));
    }

    let mut result = outcome(FieldId::CountryOfOrigin, FieldStatus::Match, country, decl)
        .with_confidence(found.confidence)
        .with_location(found.region)
        .with_message(format!("Country of origin found: {country}"));
    if let Some(text) = found.matched_text {
        result = result.with_found(text);
    }
    Ok(result)
}
