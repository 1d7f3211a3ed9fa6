pub mod fields;
pub mod locator;
pub mod rules;
pub mod scoring;
pub mod text;
pub mod ttb_standards;
pub mod validation;
pub mod volume;
