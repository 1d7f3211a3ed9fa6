//! TTB regulatory reference data.
//!
//! Based on 27 CFR Part 5 (Distilled Spirits), Part 4 (Wine), Part 7 (Malt
//! Beverages) and Part 16 (Health Warning Statement). Everything here is a
//! compile-time constant; nothing is mutated at runtime.

use crate::models::label::ProductCategory;
use crate::models::verification::FieldId;
use crate::services::text::{contains_phrase, token_text};

// ── Health Warning Statement (27 CFR Part 16) ───────────────────────────

/// Statutory text, verbatim.
pub const GOVERNMENT_WARNING_TEXT: &str = "GOVERNMENT WARNING: (1) According to the Surgeon General, \
women should not drink alcoholic beverages during pregnancy because of the risk of birth defects. \
(2) Consumption of alcoholic beverages impairs your ability to drive a car or operate machinery, \
and may cause health problems.";

/// Phrases every conforming warning contains.
pub const WARNING_KEYWORDS: &[&str] = &[
    "government warning",
    "surgeon general",
    "pregnancy",
    "birth defects",
    "impairs",
    "drive",
];

// ── Standards of Fill ───────────────────────────────────────────────────

/// Distilled spirits standard sizes in mL (27 CFR 5.47a).
pub const SPIRITS_STANDARD_SIZES_ML: &[f64] = &[
    3750.0, 3000.0, 2000.0, 1800.0, 1750.0, 1500.0, 1000.0, 945.0, 900.0, 750.0, 720.0, 710.0,
    700.0, 570.0, 500.0, 475.0, 375.0, 355.0, 350.0, 331.0, 250.0, 200.0, 187.0, 100.0, 50.0,
];

/// Wine standard sizes in mL (27 CFR 4.71).
pub const WINE_STANDARD_SIZES_ML: &[f64] = &[
    3000.0, 2250.0, 1800.0, 1500.0, 1000.0, 750.0, 720.0, 700.0, 620.0, 600.0, 568.0, 550.0,
    500.0, 473.0, 375.0, 360.0, 355.0, 330.0, 300.0, 250.0, 200.0, 187.0, 180.0, 100.0, 50.0,
];

/// Approved container sizes for a category. Malt beverages have no
/// standards of fill (27 CFR 7.70), so every size is approved.
pub fn approved_sizes(category: ProductCategory) -> Option<&'static [f64]> {
    match category {
        ProductCategory::Spirits => Some(SPIRITS_STANDARD_SIZES_ML),
        ProductCategory::Wine => Some(WINE_STANDARD_SIZES_ML),
        ProductCategory::Beer => None,
    }
}

// ── Class/Type Designations ─────────────────────────────────────────────

/// Designations that name the same class. Each group is a strict
/// equivalence: any member on the label satisfies any other member.
pub const CLASS_SYNONYMS: &[&[&str]] = &[
    // Spirits
    &["whiskey", "whisky"],
    &["bourbon", "bourbon whiskey", "bourbon whisky"],
    &["rye whiskey", "rye whisky"],
    &["scotch", "scotch whisky"],
    &["brandy", "grape brandy"],
    &["gin", "dry gin", "london dry gin"],
    &["tequila anejo", "tequila añejo"],
    &["aquavit", "akvavit"],
    &["cachaca", "cachaça"],
    &["liqueur", "cordial"],
    // Wine
    &["shiraz", "syrah"],
    &["rose", "rosé", "rose wine", "rosé wine"],
    &["pinot grigio", "pinot gris"],
    &["cabernet", "cabernet sauvignon"],
    &["hard cider", "cider"],
    &["mead", "honey wine"],
    // Malt beverages
    &["ipa", "india pale ale"],
    &["beer", "malt beverage"],
    &["pilsner", "pilsener", "pils"],
];

/// The declared class plus every spelling reachable by swapping one
/// synonym for another, in token form.
///
/// Within a group the longest member found in the class is the one
/// replaced, so "london dry gin" is never rewritten as "london gin".
pub fn class_variants(product_class: &str) -> Vec<String> {
    let declared = token_text(product_class);
    let mut variants = vec![declared.clone()];

    for group in CLASS_SYNONYMS {
        let mut members: Vec<String> = group.iter().map(|m| token_text(m)).collect();
        members.sort_by_key(|m| std::cmp::Reverse(m.len()));

        let Some(present) = members.iter().find(|m| contains_phrase(&declared, m)) else {
            continue;
        };
        let padded = format!(" {declared} ");
        for other in members.iter().filter(|m| *m != present) {
            let swapped = padded.replacen(&format!(" {present} "), &format!(" {other} "), 1);
            let swapped = swapped.trim().to_string();
            if !variants.contains(&swapped) {
                variants.push(swapped);
            }
        }
    }

    variants
}

// ── Age Statements (27 CFR 5.74) ────────────────────────────────────────

/// Spirit family whose age statement is mandatory below a threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeFamily {
    pub name: &'static str,
    pub class_terms: &'static [&'static str],
    pub threshold_years: f64,
}

pub const AGE_FAMILIES: &[AgeFamily] = &[
    AgeFamily {
        name: "whisky",
        class_terms: &["whiskey", "whisky", "bourbon", "rye", "scotch"],
        threshold_years: 4.0,
    },
    AgeFamily {
        name: "brandy",
        class_terms: &["brandy", "cognac", "armagnac"],
        threshold_years: 2.0,
    },
];

/// Family the declared class belongs to, if any.
pub fn age_family(product_class: &str) -> Option<&'static AgeFamily> {
    let class = token_text(product_class);
    AGE_FAMILIES
        .iter()
        .find(|family| family.class_terms.iter().any(|term| contains_phrase(&class, term)))
}

pub const NUMBER_WORDS: &[(&str, u32)] = &[
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
    ("thirteen", 13),
    ("fourteen", 14),
    ("fifteen", 15),
    ("sixteen", 16),
    ("seventeen", 17),
    ("eighteen", 18),
    ("nineteen", 19),
    ("twenty", 20),
];

// ── Regulatory References ───────────────────────────────────────────────

/// CFR citation attached to a field result.
pub fn cfr_reference(field: FieldId, category: ProductCategory) -> &'static str {
    use ProductCategory::{Beer, Spirits, Wine};

    match (field, category) {
        (FieldId::BrandName, Spirits) => "27 CFR 5.64",
        (FieldId::BrandName, Wine) => "27 CFR 4.33",
        (FieldId::BrandName, Beer) => "27 CFR 7.64",
        (FieldId::ProductClass, Spirits) => "27 CFR 5.35",
        (FieldId::ProductClass, Wine) => "27 CFR 4.34",
        (FieldId::ProductClass, Beer) => "27 CFR 7.24",
        (FieldId::AlcoholContent, Spirits) => "27 CFR 5.65",
        (FieldId::AlcoholContent, Wine) => "27 CFR 4.36",
        (FieldId::AlcoholContent, Beer) => "27 CFR 7.65",
        (FieldId::NetContents, Spirits) => "27 CFR 5.47a",
        (FieldId::NetContents, Wine) => "27 CFR 4.71",
        (FieldId::NetContents, Beer) => "27 CFR 7.70",
        (FieldId::GovernmentWarning, _) => "27 CFR Part 16",
        (FieldId::AgeStatement, _) => "27 CFR 5.74",
        (FieldId::Proof, _) => "27 CFR 5.65",
        (FieldId::Sulfites, _) => "27 CFR 4.32(e)",
        (FieldId::Vintage, _) => "27 CFR 4.27",
        (FieldId::Appellation, _) => "27 CFR 4.25",
        (FieldId::CountryOfOrigin, Spirits) => "27 CFR 5.69",
        (FieldId::CountryOfOrigin, Wine) => "27 CFR 4.35",
        (FieldId::CountryOfOrigin, Beer) => "27 CFR 7.69",
    }
}
