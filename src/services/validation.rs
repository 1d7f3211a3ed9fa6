use std::time::Instant;

use garde::Validate;
use metrics::{counter, histogram};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::VerificationConfig;
use crate::models::label::{ProductCategory, ProductDeclaration};
use crate::models::recognition::RecognitionResult;
use crate::models::verification::{FieldId, FieldResult, FieldStatus, VerificationResult};
use crate::services::fields::{self, Verifier};
use crate::services::scoring;
use crate::services::ttb_standards::cfr_reference;

#[derive(Debug, Error)]
pub enum VerifyError {
    /// The declaration violates a domain invariant; nothing was verified.
    #[error("invalid declaration: {0}")]
    InvalidInput(String),
}

/// Run for every category, in this order.
const UNIVERSAL: &[(FieldId, Verifier)] = &[
    (FieldId::BrandName, fields::verify_brand_name),
    (FieldId::ProductClass, fields::verify_product_class),
    (FieldId::AlcoholContent, fields::verify_alcohol_content),
    (FieldId::GovernmentWarning, fields::verify_government_warning),
    (FieldId::NetContents, fields::verify_net_contents),
];

const SPIRITS: &[(FieldId, Verifier)] = &[
    (FieldId::AgeStatement, fields::verify_age_statement),
    (FieldId::Proof, fields::verify_proof),
];

const WINE: &[(FieldId, Verifier)] = &[
    (FieldId::Sulfites, fields::verify_sulfites),
    (FieldId::Vintage, fields::verify_vintage),
    (FieldId::Appellation, fields::verify_appellation),
];

const BEER: &[(FieldId, Verifier)] = &[];

/// Conditional fields that apply to every category.
const CROSS_CUTTING: &[(FieldId, Verifier)] = &[(FieldId::CountryOfOrigin, fields::verify_country_of_origin)];

/// Verifiers applicable to a category, in execution order.
pub fn verifiers_for(category: ProductCategory) -> impl Iterator<Item = &'static (FieldId, Verifier)> {
    let specific = match category {
        ProductCategory::Spirits => SPIRITS,
        ProductCategory::Wine => WINE,
        ProductCategory::Beer => BEER,
    };
    UNIVERSAL.iter().chain(specific).chain(CROSS_CUTTING)
}

/// Run one verifier, downgrading a failure to an error-status result.
pub fn run_verifier(
    field: FieldId,
    verifier: Verifier,
    decl: &ProductDeclaration,
    recognition: &RecognitionResult,
    config: &VerificationConfig,
) -> FieldResult {
    match verifier(decl, recognition, config) {
        Ok(result) => {
            debug!(field = %field, status = %result.status, confidence = result.confidence, "Field verified");
            result
        }
        Err(e) => {
            warn!(field = %field, error = %e, "Field verifier failed");
            FieldResult::new(field, FieldStatus::Error, "Verifiable declaration")
                .with_message(format!("Could not verify {field}: {e}"))
                .with_cfr(cfr_reference(field, decl.category))
        }
    }
}

/// Messages for the result's `warnings` and `errors` lists.
fn summarize(results: &[FieldResult]) -> (Vec<String>, Vec<String>) {
    let mut warnings = Vec::new();
    let mut errors = Vec::new();
    for result in results.iter().filter(|r| !r.not_required) {
        match result.status {
            FieldStatus::Match => {}
            FieldStatus::Warning => warnings.push(result.summary()),
            FieldStatus::Mismatch | FieldStatus::NotFound | FieldStatus::Error => errors.push(result.summary()),
        }
    }
    (warnings, errors)
}

/// Verify a label against its declaration.
///
/// Validates the declaration, runs the universal, category-specific and
/// cross-cutting verifiers, scores the results and assembles the final
/// result. A failing verifier never aborts the batch; only an invalid
/// declaration does.
pub fn verify_label(
    decl: &ProductDeclaration,
    recognition: &RecognitionResult,
    config: &VerificationConfig,
) -> Result<VerificationResult, VerifyError> {
    let started = Instant::now();

    if let Err(report) = decl.validate() {
        warn!(brand = %decl.brand_name, error = %report, "Declaration rejected");
        return Err(VerifyError::InvalidInput(report.to_string()));
    }

    let field_results: Vec<FieldResult> = verifiers_for(decl.category)
        .map(|(field, verifier)| run_verifier(*field, *verifier, decl, recognition, config))
        .collect();

    for result in &field_results {
        let field: &'static str = result.field.into();
        let status: &'static str = result.status.into();
        counter!("label_field_results_total", "field" => field, "status" => status).increment(1);
    }

    let score = scoring::score(&field_results);
    let (warnings, errors) = summarize(&field_results);
    let confidence_score = if field_results.is_empty() {
        0.0
    } else {
        field_results.iter().map(|r| r.confidence).sum::<f64>() / field_results.len() as f64
    };

    let elapsed = started.elapsed();
    let grade: &'static str = score.grade.into();
    let outcome = if score.passed { "pass" } else { "fail" };
    counter!("label_verifications_total", "grade" => grade, "outcome" => outcome).increment(1);
    histogram!("label_verification_seconds").record(elapsed.as_secs_f64());

    info!(
        category = %decl.category,
        brand = %decl.brand_name,
        grade = %score.grade,
        score = score.percentage,
        passed = score.passed,
        warnings = warnings.len(),
        errors = errors.len(),
        "Label verification complete"
    );

    Ok(VerificationResult {
        overall_match: score.passed,
        confidence_score,
        compliance_score: score.percentage,
        compliance_grade: score.grade,
        earned_points: score.earned_points,
        max_points: score.max_points,
        field_results,
        warnings,
        errors,
        ocr_full_text: recognition.full_text().to_string(),
        processing_time_ms: elapsed.as_secs_f64() * 1000.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fields::FieldError;

    fn failing(
        _: &ProductDeclaration,
        _: &RecognitionResult,
        _: &VerificationConfig,
    ) -> Result<FieldResult, FieldError> {
        Err(FieldError::MissingDeclaredValue {
            field: FieldId::CountryOfOrigin,
        })
    }

    #[test]
    fn test_verifier_order_per_category() {
        let spirits: Vec<FieldId> = verifiers_for(ProductCategory::Spirits).map(|(f, _)| *f).collect();
        assert_eq!(
            spirits,
            vec![
                FieldId::BrandName,
                FieldId::ProductClass,
                FieldId::AlcoholContent,
                FieldId::GovernmentWarning,
                FieldId::NetContents,
                FieldId::AgeStatement,
                FieldId::Proof,
                FieldId::CountryOfOrigin,
            ]
        );
        assert_eq!(verifiers_for(ProductCategory::Beer).count(), 6);
        assert_eq!(verifiers_for(ProductCategory::Wine).count(), 9);
    }

    #[test]
    fn test_failure_becomes_error_result() {
        let decl = ProductDeclaration::new(ProductCategory::Beer, "Hop Valley", "IPA", 6.5);
        let result = run_verifier(
            FieldId::CountryOfOrigin,
            failing,
            &decl,
            &RecognitionResult::from_text(""),
            &VerificationConfig::default(),
        );
        assert_eq!(result.status, FieldStatus::Error);
        assert!(result.message.unwrap().contains("not declared"));
    }

    #[test]
    fn test_invalid_declaration_aborts() {
        let decl = ProductDeclaration::new(ProductCategory::Spirits, "Eagle Rare", "Bourbon", 140.0);
        let err = verify_label(&decl, &RecognitionResult::from_text("EAGLE RARE"), &VerificationConfig::default());
        assert!(matches!(err, Err(VerifyError::InvalidInput(_))));
    }

    #[test]
    fn test_result_echoes_recognized_text() {
        let decl = ProductDeclaration::new(ProductCategory::Beer, "Hop Valley", "IPA", 6.5);
        let recognition = RecognitionResult::from_text("HOP VALLEY\nIPA\n6.5% ALC/VOL");
        let result = verify_label(&decl, &recognition, &VerificationConfig::default()).unwrap();
        assert_eq!(result.ocr_full_text, "HOP VALLEY\nIPA\n6.5% ALC/VOL");
    }

    #[test]
    fn test_summary_skips_synthetic_results() {
        let results = vec![
            FieldResult::not_required(FieldId::Sulfites, "Product declared free of sulfites"),
            FieldResult::new(FieldId::NetContents, FieldStatus::Warning, "725 mL").with_message("non-standard"),
            FieldResult::new(FieldId::BrandName, FieldStatus::NotFound, "X").with_message("missing"),
        ];
        let (warnings, errors) = summarize(&results);
        assert_eq!(warnings, vec!["non-standard".to_string()]);
        assert_eq!(errors, vec!["missing".to_string()]);
    }
}
