use garde::Validate;
use serde::Deserialize;
use thiserror::Error;

use crate::services::locator::CoveragePolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration from environment: {0}")]
    Env(#[from] envy::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("warning partial coverage {partial} exceeds match coverage {full}")]
    InconsistentThresholds { partial: f64, full: f64 },
}

/// Matching thresholds and numeric tolerances.
///
/// Every value can be overridden with a `LABEL_VERIFY_`-prefixed environment
/// variable, e.g. `LABEL_VERIFY_SHORT_PHRASE_COVERAGE=0.75`.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct VerificationConfig {
    /// Whole-phrase similarity for the locator's full-text comparison.
    #[serde(default = "default_phrase_threshold")]
    #[garde(range(min = 0.0, max = 1.0))]
    pub phrase_threshold: f64,

    /// Per-token similarity for brand, class, country and appellation.
    #[serde(default = "default_token_threshold")]
    #[garde(range(min = 0.0, max = 1.0))]
    pub token_threshold: f64,

    /// Coverage needed to accept a short identifying phrase.
    #[serde(default = "default_short_phrase_coverage")]
    #[garde(range(min = 0.0, max = 1.0))]
    pub short_phrase_coverage: f64,

    /// Warning statement coverage for a match.
    #[serde(default = "default_warning_match_coverage")]
    #[garde(range(min = 0.0, max = 1.0))]
    pub warning_match_coverage: f64,

    /// Warning statement coverage for a partial (warning-status) result.
    #[serde(default = "default_warning_partial_coverage")]
    #[garde(range(min = 0.0, max = 1.0))]
    pub warning_partial_coverage: f64,

    /// Per-token similarity inside the statutory warning text.
    #[serde(default = "default_warning_token_threshold")]
    #[garde(range(min = 0.0, max = 1.0))]
    pub warning_token_threshold: f64,

    /// Per-token similarity for the warning keyword pre-check.
    #[serde(default = "default_keyword_token_threshold")]
    #[garde(range(min = 0.0, max = 1.0))]
    pub keyword_token_threshold: f64,

    /// Allowed ABV difference, percentage points.
    #[serde(default = "default_abv_tolerance")]
    #[garde(range(min = 0.0))]
    pub abv_tolerance: f64,

    /// Allowed proof difference, degrees.
    #[serde(default = "default_proof_tolerance")]
    #[garde(range(min = 0.0))]
    pub proof_tolerance: f64,
}

fn default_phrase_threshold() -> f64 {
    0.90
}

fn default_token_threshold() -> f64 {
    0.75
}

fn default_short_phrase_coverage() -> f64 {
    0.80
}

fn default_warning_match_coverage() -> f64 {
    0.85
}

fn default_warning_partial_coverage() -> f64 {
    0.70
}

fn default_warning_token_threshold() -> f64 {
    0.85
}

fn default_keyword_token_threshold() -> f64 {
    0.80
}

fn default_abv_tolerance() -> f64 {
    0.5
}

fn default_proof_tolerance() -> f64 {
    1.0
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            phrase_threshold: default_phrase_threshold(),
            token_threshold: default_token_threshold(),
            short_phrase_coverage: default_short_phrase_coverage(),
            warning_match_coverage: default_warning_match_coverage(),
            warning_partial_coverage: default_warning_partial_coverage(),
            warning_token_threshold: default_warning_token_threshold(),
            keyword_token_threshold: default_keyword_token_threshold(),
            abv_tolerance: default_abv_tolerance(),
            proof_tolerance: default_proof_tolerance(),
        }
    }
}

impl VerificationConfig {
    /// Load from `.env` and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load from explicit key/value pairs; keys carry the `LABEL_VERIFY_` prefix.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::prefixed("LABEL_VERIFY_").from_iter(vars)?;
        config.check()?;
        Ok(config)
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()
            .map_err(|report| ConfigError::Invalid(report.to_string()))?;
        if self.warning_partial_coverage > self.warning_match_coverage {
            return Err(ConfigError::InconsistentThresholds {
                partial: self.warning_partial_coverage,
                full: self.warning_match_coverage,
            });
        }
        Ok(())
    }

    /// Policy for short identifying phrases.
    pub fn phrase_policy(&self) -> CoveragePolicy {
        CoveragePolicy {
            phrase_threshold: self.phrase_threshold,
            token_threshold: self.token_threshold,
        }
    }

    /// Policy for the statutory warning text.
    pub fn statement_policy(&self) -> CoveragePolicy {
        CoveragePolicy {
            phrase_threshold: self.phrase_threshold,
            token_threshold: self.warning_token_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = VerificationConfig::default();
        assert!(config.check().is_ok());
        assert_eq!(config.short_phrase_coverage, 0.80);
        assert_eq!(config.warning_partial_coverage, 0.70);
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        let config = VerificationConfig::from_vars(Vec::new()).unwrap();
        assert_eq!(config, VerificationConfig::default());
    }

    #[test]
    fn test_prefixed_override() {
        let config = VerificationConfig::from_vars(vars(&[
            ("LABEL_VERIFY_SHORT_PHRASE_COVERAGE", "0.7"),
            ("UNRELATED", "x"),
        ]))
        .unwrap();
        assert_eq!(config.short_phrase_coverage, 0.7);
        assert_eq!(config.abv_tolerance, 0.5);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = VerificationConfig::from_vars(vars(&[("LABEL_VERIFY_TOKEN_THRESHOLD", "1.5")]));
        assert!(matches!(err, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unparseable_rejected() {
        let err = VerificationConfig::from_vars(vars(&[("LABEL_VERIFY_ABV_TOLERANCE", "lots")]));
        assert!(matches!(err, Err(ConfigError::Env(_))));
    }

    #[test]
    fn test_partial_above_match_rejected() {
        let config = VerificationConfig {
            warning_partial_coverage: 0.9,
            ..VerificationConfig::default()
        };
        assert!(matches!(
            config.check(),
            Err(ConfigError::InconsistentThresholds { .. })
        ));
    }
}
