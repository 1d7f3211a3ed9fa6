//! Test helper utilities for end-to-end verification

#![allow(dead_code)]

use label_verify_core::{
    verify_label, BoundingRegion, FieldId, FieldResult, FieldStatus, ProductDeclaration,
    RecognitionResult, RecognizedTextUnit, VerificationConfig, VerificationResult,
};

use crate::fixtures::LabelFixture;

/// Declaration matching a fixture's printed values.
pub fn declaration_for(fixture: &LabelFixture) -> ProductDeclaration {
    let mut decl = ProductDeclaration::new(fixture.category, fixture.brand, fixture.class, fixture.abv);
    decl.net_contents = Some(fixture.net_contents.to_string());
    decl
}

/// One unit per entry, stacked top to bottom.
pub fn units(texts: &[&str]) -> RecognitionResult {
    RecognitionResult::from_units(
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| RecognizedTextUnit::new(*text, row(i), 0.95))
            .collect(),
    )
}

/// Region of the `index`-th unit built by [`units`].
pub fn row(index: usize) -> BoundingRegion {
    BoundingRegion::new(10, index as u32 * 24, 300, 20)
}

/// Verify with default thresholds; the declaration must be valid.
pub fn verify(decl: &ProductDeclaration, recognition: &RecognitionResult) -> VerificationResult {
    verify_label(decl, recognition, &VerificationConfig::default()).expect("declaration should be valid")
}

pub fn verify_text(decl: &ProductDeclaration, text: &str) -> VerificationResult {
    verify(decl, &RecognitionResult::from_text(text))
}

pub fn field(result: &VerificationResult, field: FieldId) -> &FieldResult {
    result
        .field(field)
        .unwrap_or_else(|| panic!("no result for {field}"))
}

pub fn status(result: &VerificationResult, id: FieldId) -> FieldStatus {
    field(result, id).status
}

/// Every field's status, in execution order.
pub fn statuses(result: &VerificationResult) -> Vec<(FieldId, FieldStatus)> {
    result.field_results.iter().map(|r| (r.field, r.status)).collect()
}
