//! TTB Label Verification Core
//!
//! Compares operator-declared label attributes against text recognized from a
//! label photograph and produces per-field verdicts, a weighted compliance
//! score and a letter grade. Recognition itself happens upstream; this crate
//! only consumes its output and is pure and synchronous.

pub mod config;
pub mod models;
pub mod services;

pub use config::{ConfigError, VerificationConfig};
pub use models::label::{ProductCategory, ProductDeclaration};
pub use models::recognition::{BoundingRegion, RecognitionResult, RecognizedTextUnit};
pub use models::verification::{FieldId, FieldResult, FieldStatus, Grade, VerificationResult};
pub use services::validation::{verify_label, VerifyError};
