//! Recognized label text as delivered by the upstream OCR provider.
//!
//! The engine never runs recognition itself; these values arrive ready-made
//! and are only read.

use serde::{Deserialize, Serialize};

use crate::services::text::normalize;

/// Pixel region in the source image, in the provider's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// One unit of recognized text (usually a word or short phrase).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTextUnit")]
pub struct RecognizedTextUnit {
    text: String,
    normalized: String,
    region: BoundingRegion,
    confidence: f64,
}

#[derive(Deserialize)]
struct RawTextUnit {
    text: String,
    region: BoundingRegion,
    #[serde(default = "full_confidence")]
    confidence: f64,
}

fn full_confidence() -> f64 {
    1.0
}

impl From<RawTextUnit> for RecognizedTextUnit {
    fn from(raw: RawTextUnit) -> Self {
        Self::new(raw.text, raw.region, raw.confidence)
    }
}

impl RecognizedTextUnit {
    pub fn new(text: impl Into<String>, region: BoundingRegion, confidence: f64) -> Self {
        let text = text.into();
        let normalized = normalize(&text);
        Self {
            text,
            normalized,
            region,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn region(&self) -> BoundingRegion {
        self.region
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

/// Full recognized text plus its ordered units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRecognition")]
pub struct RecognitionResult {
    full_text: String,
    units: Vec<RecognizedTextUnit>,
}

#[derive(Deserialize)]
struct RawRecognition {
    #[serde(default)]
    full_text: String,
    #[serde(default)]
    units: Vec<RecognizedTextUnit>,
}

impl From<RawRecognition> for RecognitionResult {
    fn from(raw: RawRecognition) -> Self {
        Self::new(raw.full_text, raw.units)
    }
}

impl RecognitionResult {
    /// A blank `full_text` is rebuilt from the units, one per line.
    pub fn new(full_text: impl Into<String>, units: Vec<RecognizedTextUnit>) -> Self {
        let mut full_text = full_text.into();
        if full_text.trim().is_empty() && !units.is_empty() {
            full_text = join_units(&units);
        }
        Self { full_text, units }
    }

    pub fn from_units(units: Vec<RecognizedTextUnit>) -> Self {
        Self::new(String::new(), units)
    }

    /// Text-only result; locator scans fall back to the full text.
    pub fn from_text(full_text: impl Into<String>) -> Self {
        Self::new(full_text, Vec::new())
    }

    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    pub fn units(&self) -> &[RecognizedTextUnit] {
        &self.units
    }

    /// Mean unit confidence; 1.0 for a text-only result.
    pub fn mean_confidence(&self) -> f64 {
        if self.units.is_empty() {
            return 1.0;
        }
        self.units.iter().map(RecognizedTextUnit::confidence).sum::<f64>() / self.units.len() as f64
    }
}

fn join_units(units: &[RecognizedTextUnit]) -> String {
    units
        .iter()
        .map(RecognizedTextUnit::text)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_normalized_on_construction() {
        let unit = RecognizedTextUnit::new("  EAGLE\nRARE ", BoundingRegion::new(0, 0, 10, 10), 0.9);
        assert_eq!(unit.normalized(), "eagle rare");
        assert_eq!(unit.text(), "  EAGLE\nRARE ");
    }

    #[test]
    fn test_confidence_clamped() {
        let unit = RecognizedTextUnit::new("X", BoundingRegion::new(0, 0, 1, 1), 1.7);
        assert_eq!(unit.confidence(), 1.0);
    }

    #[test]
    fn test_full_text_rebuilt_from_units() {
        let region = BoundingRegion::new(0, 0, 1, 1);
        let result = RecognitionResult::from_units(vec![
            RecognizedTextUnit::new("EAGLE", region, 0.9),
            RecognizedTextUnit::new("RARE", region, 0.8),
        ]);
        assert_eq!(result.full_text(), "EAGLE\nRARE");
        assert!((result.mean_confidence() - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_deserialize_provider_payload() {
        let result: RecognitionResult = serde_json::from_value(serde_json::json!({
            "units": [
                { "text": "45% ALC/VOL", "region": { "x": 4, "y": 8, "width": 90, "height": 12 }, "confidence": 0.97 },
                { "text": "750 mL", "region": { "x": 4, "y": 30, "width": 40, "height": 12 } }
            ]
        }))
        .unwrap();
        assert_eq!(result.units().len(), 2);
        assert_eq!(result.units()[0].normalized(), "45% alc/vol");
        assert_eq!(result.units()[1].confidence(), 1.0);
        assert_eq!(result.full_text(), "45% ALC/VOL\n750 mL");
    }
}
