//! Volume parsing, unit conversion and standards-of-fill lookup.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use strum::{EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

use crate::models::label::ProductCategory;
use crate::services::text::{format_number, repair_numeric_glyphs};
use crate::services::ttb_standards::approved_sizes;

/// Number followed by a volume unit anywhere in label text. Longer unit
/// spellings come first so "ml" is never read as "m" + "l".
static VOLUME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d+(?:\.\d+)?)\s*(milliliters?|millilitres?|ml|centiliters?|centilitres?|cl|liters?|litres?|fluid\s+ounces?|fl\.?\s*oz|ounces?|oz|pints?|pt|quarts?|qt|gallons?|gal|l)\b",
    )
    .expect("valid volume regex")
});

/// Number then a word-like unit; only consulted to tell an unknown unit
/// from text with no amount at all.
static DECLARED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d+(?:\.\d+)?)\s*([a-z][a-z.\s]*?)\s*$").expect("valid declared volume regex")
});

#[derive(Debug, Error, PartialEq)]
pub enum VolumeError {
    #[error("no amount and unit in {0:?}")]
    Unparseable(String),

    #[error("unknown volume unit {0:?}")]
    UnknownUnit(String),
}

/// US customary and metric volume units.
///
/// Parsing expects whitespace and periods already removed ("fl. oz" ->
/// "floz"); see [`VolumeUnit::parse_loose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter, IntoStaticStr, strum::Display)]
#[strum(ascii_case_insensitive)]
pub enum VolumeUnit {
    #[strum(
        to_string = "mL",
        serialize = "ml",
        serialize = "milliliter",
        serialize = "milliliters",
        serialize = "millilitre",
        serialize = "millilitres"
    )]
    Milliliter,
    #[strum(
        to_string = "cL",
        serialize = "cl",
        serialize = "centiliter",
        serialize = "centiliters",
        serialize = "centilitre",
        serialize = "centilitres"
    )]
    Centiliter,
    #[strum(
        to_string = "L",
        serialize = "l",
        serialize = "liter",
        serialize = "liters",
        serialize = "litre",
        serialize = "litres"
    )]
    Liter,
    #[strum(
        to_string = "fl oz",
        serialize = "floz",
        serialize = "fluidounce",
        serialize = "fluidounces",
        serialize = "oz",
        serialize = "ounce",
        serialize = "ounces"
    )]
    FluidOunce,
    #[strum(to_string = "pt", serialize = "pint", serialize = "pints")]
    Pint,
    #[strum(to_string = "qt", serialize = "quart", serialize = "quarts")]
    Quart,
    #[strum(to_string = "gal", serialize = "gallon", serialize = "gallons")]
    Gallon,
}

impl VolumeUnit {
    /// Milliliters in one unit.
    pub fn milliliters(self) -> f64 {
        match self {
            VolumeUnit::Milliliter => 1.0,
            VolumeUnit::Centiliter => 10.0,
            VolumeUnit::Liter => 1000.0,
            VolumeUnit::FluidOunce => 29.5735,
            VolumeUnit::Pint => 473.176,
            VolumeUnit::Quart => 946.353,
            VolumeUnit::Gallon => 3785.41,
        }
    }

    /// Parse a unit as printed, ignoring case, whitespace and periods.
    pub fn parse_loose(raw: &str) -> Result<Self, VolumeError> {
        let compact: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '.')
            .collect();
        compact
            .parse()
            .map_err(|_| VolumeError::UnknownUnit(raw.trim().to_string()))
    }
}

/// Convert `value` between units through milliliters.
pub fn convert(value: f64, from: VolumeUnit, to: VolumeUnit) -> f64 {
    value * from.milliliters() / to.milliliters()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    pub amount: f64,
    pub unit: VolumeUnit,
}

impl Volume {
    pub fn new(amount: f64, unit: VolumeUnit) -> Self {
        Self { amount, unit }
    }

    pub fn to_ml(self) -> f64 {
        convert(self.amount, self.unit, VolumeUnit::Milliliter)
    }

    /// Same volume within [`volume_tolerance_ml`] of `self`.
    pub fn agrees_with(self, other: Volume) -> bool {
        let declared = self.to_ml();
        (declared - other.to_ml()).abs() <= volume_tolerance_ml(declared)
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", format_number(self.amount), self.unit)
    }
}

/// Approved container sizes are exact volumes; this only absorbs the
/// rounding in customary-unit declarations (25.4 fl oz is 751.2 mL).
pub const STANDARD_FILL_TOLERANCE_ML: f64 = 1.5;

/// Allowed difference between two volumes: 0.5% of the reference, never
/// less than 1 mL.
pub fn volume_tolerance_ml(reference_ml: f64) -> f64 {
    (reference_ml.abs() * 0.005).max(1.0)
}

/// Parse an operator-declared volume such as "750 mL" or "12 FL. OZ.".
///
/// Dual-unit declarations ("750 mL (25.4 FL OZ)") resolve to the first
/// amount and unit.
pub fn parse_volume(text: &str) -> Result<Volume, VolumeError> {
    let caps = VOLUME_PATTERN
        .captures(text)
        .or_else(|| DECLARED_PATTERN.captures(text))
        .ok_or_else(|| VolumeError::Unparseable(text.trim().to_string()))?;
    let amount: f64 = caps[1]
        .parse()
        .map_err(|_| VolumeError::Unparseable(text.trim().to_string()))?;
    if amount <= 0.0 {
        return Err(VolumeError::Unparseable(text.trim().to_string()));
    }
    let unit = VolumeUnit::parse_loose(&caps[2])?;
    Ok(Volume::new(amount, unit))
}

/// Every (amount, unit) pair printed on the label, in reading order.
pub fn extract_volumes(text: &str) -> Vec<Volume> {
    let repaired = repair_numeric_glyphs(text);
    VOLUME_PATTERN
        .captures_iter(&repaired)
        .filter_map(|caps| {
            let amount: f64 = caps[1].parse().ok()?;
            let unit = VolumeUnit::parse_loose(&caps[2]).ok()?;
            (amount > 0.0).then(|| Volume::new(amount, unit))
        })
        .collect()
}

/// Whether `volume_ml` is an approved container size for the category.
pub fn is_standard_size(volume_ml: f64, category: ProductCategory) -> bool {
    match approved_sizes(category) {
        Some(sizes) => sizes
            .iter()
            .any(|size| (size - volume_ml).abs() <= STANDARD_FILL_TOLERANCE_ML),
        None => true,
    }
}
