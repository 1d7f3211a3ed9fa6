//! Recognized label text for end-to-end verification tests

#![allow(dead_code)]

use label_verify_core::ProductCategory;

/// The health warning as printed on a conforming label.
pub const WARNING: &str = "GOVERNMENT WARNING: (1) ACCORDING TO THE SURGEON GENERAL, WOMEN SHOULD NOT
DRINK ALCOHOLIC BEVERAGES DURING PREGNANCY BECAUSE OF THE RISK OF BIRTH
DEFECTS. (2) CONSUMPTION OF ALCOHOLIC BEVERAGES IMPAIRS YOUR ABILITY TO
DRIVE A CAR OR OPERATE MACHINERY, AND MAY CAUSE HEALTH PROBLEMS.";

/// Front and back of a bourbon label, minus the warning.
pub const BOURBON_FRONT: &str = "EAGLE RARE
KENTUCKY STRAIGHT BOURBON WHISKEY
AGED 10 YEARS
45% ALC/VOL (90 PROOF)
750 mL";

pub const WINE_FRONT: &str = "CHATEAU RIDGE
CABERNET SAUVIGNON
ALC. 13.5% BY VOL.
750 ML";

pub const BEER_FRONT: &str = "HOP VALLEY
INDIA PALE ALE
6.5% ALC/VOL
12 FL. OZ.";

/// Expected outcome for one recognized label.
#[derive(Debug, Clone)]
pub struct LabelFixture {
    pub name: &'static str,
    pub category: ProductCategory,
    pub brand: &'static str,
    pub class: &'static str,
    pub abv: f64,
    pub net_contents: &'static str,
    pub label_text: &'static str,
    pub with_warning: bool,
    pub expected_score: u8,
    pub should_pass: bool,
    pub description: &'static str,
}

impl LabelFixture {
    /// Recognized text with the warning appended when the fixture carries one.
    pub fn recognized_text(&self) -> String {
        if self.with_warning {
            format!("{}\n{WARNING}", self.label_text)
        } else {
            self.label_text.to_string()
        }
    }
}

pub const LABEL_FIXTURES: &[LabelFixture] = &[
    LabelFixture {
        name: "bourbon",
        category: ProductCategory::Spirits,
        brand: "Eagle Rare",
        class: "Kentucky Straight Bourbon Whiskey",
        abv: 45.0,
        net_contents: "750 mL",
        label_text: BOURBON_FRONT,
        with_warning: true,
        expected_score: 100,
        should_pass: true,
        description: "Conforming spirits label",
    },
    LabelFixture {
        name: "bourbon_no_warning",
        category: ProductCategory::Spirits,
        brand: "Eagle Rare",
        class: "Kentucky Straight Bourbon Whiskey",
        abv: 45.0,
        net_contents: "750 mL",
        label_text: BOURBON_FRONT,
        with_warning: false,
        expected_score: 80,
        should_pass: false,
        description: "Health warning missing; 160 of 200 points but fails",
    },
    LabelFixture {
        name: "wine",
        category: ProductCategory::Wine,
        brand: "Chateau Ridge",
        class: "Cabernet Sauvignon",
        abv: 13.5,
        net_contents: "750 mL",
        label_text: WINE_FRONT,
        with_warning: true,
        expected_score: 100,
        should_pass: true,
        description: "Wine without sulfites, vintage or appellation declared",
    },
    LabelFixture {
        name: "beer",
        category: ProductCategory::Beer,
        brand: "Hop Valley",
        class: "IPA",
        abv: 6.5,
        net_contents: "12 FL OZ",
        label_text: BEER_FRONT,
        with_warning: true,
        expected_score: 100,
        should_pass: true,
        description: "Class matched through the IPA synonym",
    },
    LabelFixture {
        name: "beer_wrong_brand",
        category: ProductCategory::Beer,
        brand: "Deschutes",
        class: "IPA",
        abv: 6.5,
        net_contents: "12 FL OZ",
        label_text: BEER_FRONT,
        with_warning: true,
        expected_score: 79,
        should_pass: false,
        description: "Brand absent; 150 of 190 points but fails",
    },
];
