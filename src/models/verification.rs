use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::models::recognition::BoundingRegion;

/// Outcome of verifying one label field.
///
/// The four non-match states are never collapsed: they score differently and
/// carry different messaging.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, IntoStaticStr, PartialEq, Eq, Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FieldStatus {
    Match,
    /// Contradictory evidence on the label.
    Mismatch,
    /// No evidence on the label.
    NotFound,
    /// Present but non-conforming on a non-critical axis.
    Warning,
    /// The verifier itself could not run.
    Error,
}

/// Label attributes the engine knows how to verify.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, IntoStaticStr, PartialEq, Eq, Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FieldId {
    BrandName,
    ProductClass,
    AlcoholContent,
    NetContents,
    GovernmentWarning,
    AgeStatement,
    Proof,
    Sulfites,
    Vintage,
    Appellation,
    CountryOfOrigin,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldResult {
    pub field: FieldId,
    pub status: FieldStatus,
    pub expected: String,
    pub found: Option<String>,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<BoundingRegion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cfr_reference: Option<String>,
    /// Synthetic result for a field whose condition does not hold.
    /// Always awarded full weight.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub not_required: bool,
}

impl FieldResult {
    pub fn new(field: FieldId, status: FieldStatus, expected: impl Into<String>) -> Self {
        Self {
            field,
            status,
            expected: expected.into(),
            found: None,
            confidence: 0.0,
            location: None,
            message: None,
            cfr_reference: None,
            not_required: false,
        }
    }

    /// Short-circuit result for an inapplicable conditional field.
    pub fn not_required(field: FieldId, reason: impl Into<String>) -> Self {
        Self {
            confidence: 1.0,
            message: Some(reason.into()),
            not_required: true,
            ..Self::new(field, FieldStatus::Match, "Not required")
        }
    }

    pub fn with_found(mut self, found: impl Into<String>) -> Self {
        self.found = Some(found.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_location(mut self, location: Option<BoundingRegion>) -> Self {
        self.location = location;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_cfr(mut self, reference: &str) -> Self {
        self.cfr_reference = Some(reference.to_string());
        self
    }

    /// Message for summary lists, falling back to a generic description.
    pub fn summary(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| format!("{}: {}", self.field, self.status))
    }
}

/// Letter grade bands over the compliance percentage.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, IntoStaticStr, PartialEq, Eq, Hash,
)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_percentage(percentage: u8) -> Self {
        match percentage {
            90.. => Grade::A,
            80..=89 => Grade::B,
            70..=79 => Grade::C,
            60..=69 => Grade::D,
            _ => Grade::F,
        }
    }
}

/// Final result for one request. Built once by `verify_label`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub overall_match: bool,
    pub confidence_score: f64,
    pub compliance_score: u8,
    pub compliance_grade: Grade,
    pub earned_points: f64,
    pub max_points: u32,
    pub field_results: Vec<FieldResult>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub errors: Vec<String>,
    /// Recognized text the verdicts were drawn from.
    #[serde(default)]
    pub ocr_full_text: String,
    pub processing_time_ms: f64,
}

impl VerificationResult {
    pub fn field(&self, field: FieldId) -> Option<&FieldResult> {
        self.field_results.iter().find(|f| f.field == field)
    }

    /// Fields with mismatch or not-found status.
    pub fn failed_fields(&self) -> impl Iterator<Item = &FieldResult> {
        self.field_results
            .iter()
            .filter(|f| matches!(f.status, FieldStatus::Mismatch | FieldStatus::NotFound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_bands() {
        assert_eq!(Grade::from_percentage(100), Grade::A);
        assert_eq!(Grade::from_percentage(90), Grade::A);
        assert_eq!(Grade::from_percentage(89), Grade::B);
        assert_eq!(Grade::from_percentage(80), Grade::B);
        assert_eq!(Grade::from_percentage(79), Grade::C);
        assert_eq!(Grade::from_percentage(69), Grade::D);
        assert_eq!(Grade::from_percentage(60), Grade::D);
        assert_eq!(Grade::from_percentage(59), Grade::F);
        assert_eq!(Grade::from_percentage(0), Grade::F);
    }

    #[test]
    fn test_not_required_result() {
        let result = FieldResult::not_required(FieldId::Sulfites, "no sulfites declared");
        assert_eq!(result.status, FieldStatus::Match);
        assert!(result.not_required);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_value(FieldStatus::NotFound).unwrap();
        assert_eq!(json, serde_json::json!("not_found"));
        assert_eq!(FieldId::CountryOfOrigin.to_string(), "country_of_origin");
    }
}
