pub mod label;
pub mod recognition;
pub mod verification;
