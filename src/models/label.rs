use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// TTB product categories per 27 CFR Parts 4, 5, 7.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, IntoStaticStr, PartialEq, Eq, Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ProductCategory {
    /// Distilled spirits, 27 CFR Part 5.
    Spirits,
    /// Wine, 27 CFR Part 4.
    Wine,
    /// Malt beverages, 27 CFR Part 7.
    Beer,
}

/// Label attributes declared by the operator for one verification request.
///
/// The request layer has already type-checked these values; `validate()` only
/// enforces the domain invariants that abort a request before any field is
/// verified.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductDeclaration {
    #[garde(skip)]
    pub category: ProductCategory,

    #[garde(length(min = 1, max = 200), custom(not_blank))]
    pub brand_name: String,

    #[garde(length(min = 1, max = 200), custom(not_blank))]
    pub product_class: String,

    /// Alcohol by volume, percent.
    #[garde(range(min = 0.0, max = 100.0))]
    pub alcohol_content: f64,

    /// Volume with unit as printed, e.g. "750 mL" or "12 FL OZ".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(length(max = 100))]
    pub net_contents: Option<String>,

    // Spirits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(length(max = 100))]
    pub age_statement: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(range(min = 0.0, max = 200.0))]
    pub proof: Option<f64>,

    // Wine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(range(min = 1800, max = 2100))]
    pub vintage_year: Option<u16>,

    /// Wine contains 10 ppm or more sulfur dioxide.
    #[serde(default)]
    #[garde(skip)]
    pub contains_sulfites: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(length(max = 200))]
    pub appellation: Option<String>,

    // Imports
    #[serde(default)]
    #[garde(skip)]
    pub is_imported: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(length(max = 100))]
    pub country_of_origin: Option<String>,
}

impl ProductDeclaration {
    /// Declaration with only the fields every category requires.
    pub fn new(
        category: ProductCategory,
        brand_name: impl Into<String>,
        product_class: impl Into<String>,
        alcohol_content: f64,
    ) -> Self {
        Self {
            category,
            brand_name: brand_name.into(),
            product_class: product_class.into(),
            alcohol_content,
            net_contents: None,
            age_statement: None,
            proof: None,
            vintage_year: None,
            contains_sulfites: false,
            appellation: None,
            is_imported: false,
            country_of_origin: None,
        }
    }
}

fn not_blank(value: &str, _ctx: &()) -> garde::Result {
    if value.trim().is_empty() {
        return Err(garde::Error::new("must not be blank"));
    }
    Ok(())
}
