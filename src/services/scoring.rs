//! Weighted compliance scoring.

use serde::Serialize;
use strum::{Display, IntoStaticStr};

use crate::models::verification::{FieldId, FieldResult, FieldStatus, Grade};

/// Minimum percentage for a passing label.
pub const PASSING_PERCENTAGE: u8 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WeightTier {
    Critical,
    Important,
    Optional,
}

impl WeightTier {
    pub fn points(self) -> u32 {
        match self {
            WeightTier::Critical => 40,
            WeightTier::Important => 20,
            WeightTier::Optional => 10,
        }
    }
}

pub fn weight_tier(field: FieldId) -> WeightTier {
    match field {
        FieldId::BrandName | FieldId::ProductClass | FieldId::AlcoholContent | FieldId::GovernmentWarning => {
            WeightTier::Critical
        }
        FieldId::NetContents | FieldId::Sulfites => WeightTier::Important,
        FieldId::AgeStatement
        | FieldId::Proof
        | FieldId::Vintage
        | FieldId::Appellation
        | FieldId::CountryOfOrigin => WeightTier::Optional,
    }
}

/// Share of a field's weight awarded for a status.
pub fn status_multiplier(status: FieldStatus) -> f64 {
    match status {
        FieldStatus::Match => 1.0,
        FieldStatus::Warning => 0.8,
        FieldStatus::Mismatch | FieldStatus::NotFound | FieldStatus::Error => 0.0,
    }
}

/// Points awarded for one field result.
pub fn award(result: &FieldResult) -> f64 {
    let weight = f64::from(weight_tier(result.field).points());
    if result.not_required {
        weight
    } else {
        weight * status_multiplier(result.status)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceScore {
    pub earned_points: f64,
    pub max_points: u32,
    pub percentage: u8,
    pub grade: Grade,
    /// A critical field is mismatched or missing.
    pub critical_failure: bool,
    pub passed: bool,
}

/// Aggregate field results into a weighted score and grade.
pub fn score(results: &[FieldResult]) -> ComplianceScore {
    let earned_points: f64 = results.iter().map(award).sum();
    let max_points: u32 = results.iter().map(|r| weight_tier(r.field).points()).sum();

    let percentage = if max_points == 0 {
        0
    } else {
        (earned_points / f64::from(max_points) * 100.0).round().clamp(0.0, 100.0) as u8
    };

    let critical_failure = results.iter().any(|r| {
        weight_tier(r.field) == WeightTier::Critical
            && !r.not_required
            && matches!(r.status, FieldStatus::Mismatch | FieldStatus::NotFound)
    });

    ComplianceScore {
        earned_points,
        max_points,
        percentage,
        grade: Grade::from_percentage(percentage),
        critical_failure,
        passed: !critical_failure && percentage >= PASSING_PERCENTAGE,
    }
}
