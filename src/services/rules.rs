//! Conditional requirement rules.
//!
//! Decides, from the declaration alone, whether a conditional field has to be
//! verified and how strictly. Fields that are not required are short-circuited
//! by the orchestrator to a synthetic full-credit result.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::label::{ProductCategory, ProductDeclaration};
use crate::services::ttb_standards::{age_family, NUMBER_WORDS};

/// Digits or a spelled-out number up to twenty.
static AGE_NUMBER: LazyLock<String> = LazyLock::new(|| {
    let words: Vec<&str> = NUMBER_WORDS.iter().map(|(word, _)| *word).collect();
    format!(r"(\d+(?:\.\d+)?|{})", words.join("|"))
});

/// Any age reference: optional "aged"/"aged at least", a number and a
/// year/month unit, optional "old".
static AGE_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:aged?\s+(?:at\s+least\s+)?)?{}\s+(years?|yrs?\.?|months?)(?:\s+old)?",
        *AGE_NUMBER
    ))
    .expect("valid age mention regex")
});

/// Accepted age statement phrasings (27 CFR 5.74).
static AGE_TEMPLATES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let n = &*AGE_NUMBER;
    [
        format!(r"(?i)\baged\s+{n}\s+years?\b"),
        format!(r"(?i)\b{n}\s+years?\s+old\b"),
        format!(r"(?i)\b{n}\s+yrs?\.?\s+old\b"),
        format!(r"(?i)\baged\s+{n}\s+months?\b"),
        format!(r"(?i)\baged\s+at\s+least\s+{n}\s+years?\b"),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid age template regex"))
    .collect()
});

/// How strictly a conditional field is verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Must appear on the label; absence is a required-field failure.
    Mandatory,
    /// Declared voluntarily; verified, but absence never counts as a
    /// required-field failure.
    Declared,
    /// Condition does not hold. Carries the reason shown to the operator.
    NotRequired(&'static str),
}

impl Requirement {
    pub fn is_required(self) -> bool {
        !matches!(self, Requirement::NotRequired(_))
    }
}

/// An age reference found in free text.
#[derive(Debug, Clone, PartialEq)]
pub struct AgeMention {
    pub years: f64,
    pub text: String,
}

fn parse_age_number(raw: &str) -> Option<f64> {
    let lower = raw.to_lowercase();
    NUMBER_WORDS
        .iter()
        .find(|(word, _)| *word == lower)
        .map(|(_, n)| f64::from(*n))
        .or_else(|| lower.parse().ok())
}

/// Every age reference in `text`, converted to years.
pub fn age_mentions(text: &str) -> Vec<AgeMention> {
    AGE_MENTION
        .captures_iter(text)
        .filter_map(|caps| {
            let number = parse_age_number(&caps[1])?;
            let years = if caps[2].to_lowercase().starts_with("month") {
                number / 12.0
            } else {
                number
            };
            Some(AgeMention {
                years,
                text: caps[0].trim().to_string(),
            })
        })
        .collect()
}

/// Age in years stated by a declaration's age statement.
pub fn declared_age_years(age_statement: &str) -> Option<f64> {
    age_mentions(age_statement).first().map(|mention| mention.years)
}

pub fn conforms_to_age_template(age_statement: &str) -> bool {
    AGE_TEMPLATES.iter().any(|template| template.is_match(age_statement))
}

/// Whisky under 4 years and brandy under 2 years must carry an age
/// statement; any other declared age is verified leniently.
pub fn age_statement(declaration: &ProductDeclaration) -> Requirement {
    if declaration.category != ProductCategory::Spirits {
        return Requirement::NotRequired("Age statements apply to distilled spirits only");
    }
    let Some(age) = declared_text(&declaration.age_statement) else {
        return Requirement::NotRequired("No age statement declared");
    };

    match (age_family(&declaration.product_class), declared_age_years(age)) {
        (Some(family), Some(years)) if years < family.threshold_years => Requirement::Mandatory,
        _ => Requirement::Declared,
    }
}

pub fn sulfite_declaration(declaration: &ProductDeclaration) -> Requirement {
    match (declaration.category, declaration.contains_sulfites) {
        (ProductCategory::Wine, true) => Requirement::Mandatory,
        (ProductCategory::Wine, false) => Requirement::NotRequired("Product declared free of sulfites"),
        _ => Requirement::NotRequired("Sulfite declarations apply to wine only"),
    }
}

pub fn country_of_origin(declaration: &ProductDeclaration) -> Requirement {
    if declaration.is_imported {
        Requirement::Mandatory
    } else {
        Requirement::NotRequired("Domestic product")
    }
}

pub fn vintage(declaration: &ProductDeclaration) -> Requirement {
    match (declaration.category, declaration.vintage_year) {
        (ProductCategory::Wine, Some(_)) => Requirement::Declared,
        (ProductCategory::Wine, None) => Requirement::NotRequired("No vintage declared"),
        _ => Requirement::NotRequired("Vintage dates apply to wine only"),
    }
}

pub fn appellation(declaration: &ProductDeclaration) -> Requirement {
    match (declaration.category, declared_text(&declaration.appellation)) {
        (ProductCategory::Wine, Some(_)) => Requirement::Declared,
        (ProductCategory::Wine, None) => Requirement::NotRequired("No appellation declared"),
        _ => Requirement::NotRequired("Appellations apply to wine only"),
    }
}

pub fn net_contents(declaration: &ProductDeclaration) -> Requirement {
    match declared_text(&declaration.net_contents) {
        Some(_) => Requirement::Mandatory,
        None => Requirement::NotRequired("No net contents declared"),
    }
}

/// Proof is checked when declared, or when the label states one on its own.
pub fn proof(declaration: &ProductDeclaration, label_states_proof: bool) -> Requirement {
    if declaration.category != ProductCategory::Spirits {
        return Requirement::NotRequired("Proof statements apply to distilled spirits only");
    }
    if declaration.proof.is_some() || label_states_proof {
        Requirement::Declared
    } else {
        Requirement::NotRequired("No proof declared or stated")
    }
}

pub(crate) fn declared_text(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn spirit(class: &str, age: Option<&str>) -> ProductDeclaration {
        let mut decl = ProductDeclaration::new(ProductCategory::Spirits, "Test", class, 40.0);
        decl.age_statement = age.map(str::to_string);
        decl
    }

    #[test_case("Straight Bourbon Whiskey", Some("Aged 3 Years"), Requirement::Mandatory; "young whiskey")]
    #[test_case("Straight Bourbon Whiskey", Some("Aged 10 Years"), Requirement::Declared; "old whiskey")]
    #[test_case("Brandy", Some("18 months old"), Requirement::Mandatory; "young brandy in months")]
    #[test_case("Cognac", Some("Aged Three Years"), Requirement::Declared; "brandy at threshold")]
    #[test_case("Rye Whisky", Some("Two Years Old"), Requirement::Mandatory; "number word")]
    #[test_case("Vodka", Some("Aged 1 Year"), Requirement::Declared; "no family")]
    fn test_age_requirement(class: &str, age: Option<&str>, expected: Requirement) {
        assert_eq!(age_statement(&spirit(class, age)), expected);
    }

    #[test]
    fn test_age_not_required_without_declaration() {
        assert!(!age_statement(&spirit("Bourbon", None)).is_required());
        assert!(!age_statement(&spirit("Bourbon", Some("  "))).is_required());
    }

    #[test]
    fn test_declared_age_years() {
        assert_eq!(declared_age_years("Aged 12 Years"), Some(12.0));
        assert_eq!(declared_age_years("aged six months"), Some(0.5));
        assert_eq!(declared_age_years("4 yrs. old"), Some(4.0));
        assert_eq!(declared_age_years("Extra Old"), None);
    }

    #[test_case("Aged 4 Years", true; "aged n years")]
    #[test_case("4 Years Old", true; "n years old")]
    #[test_case("Four Year Old", true; "number word")]
    #[test_case("4 Yr. Old", true; "abbreviated")]
    #[test_case("Aged 18 Months", true; "months")]
    #[test_case("Aged at least 2 years", true; "at least")]
    #[test_case("Matured for 4 years", false; "unapproved verb")]
    #[test_case("Very Old", false; "no number")]
    fn test_age_templates(statement: &str, expected: bool) {
        assert_eq!(conforms_to_age_template(statement), expected);
    }

    #[test]
    fn test_sulfites_wine_only() {
        let mut wine = ProductDeclaration::new(ProductCategory::Wine, "Test", "Red Wine", 13.5);
        assert!(!sulfite_declaration(&wine).is_required());
        wine.contains_sulfites = true;
        assert_eq!(sulfite_declaration(&wine), Requirement::Mandatory);

        let mut beer = ProductDeclaration::new(ProductCategory::Beer, "Test", "Ale", 5.0);
        beer.contains_sulfites = true;
        assert!(!sulfite_declaration(&beer).is_required());
    }

    #[test]
    fn test_country_follows_import_flag() {
        let mut decl = spirit("Vodka", None);
        assert!(!country_of_origin(&decl).is_required());
        decl.is_imported = true;
        assert_eq!(country_of_origin(&decl), Requirement::Mandatory);
    }

    #[test]
    fn test_proof_requirement() {
        let mut decl = spirit("Vodka", None);
        assert!(!proof(&decl, false).is_required());
        assert!(proof(&decl, true).is_required());
        decl.proof = Some(80.0);
        assert_eq!(proof(&decl, false), Requirement::Declared);
    }
}
