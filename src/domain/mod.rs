//! Domain-level structures shared across the prediction pipeline.

pub mod catalog;
pub mod prediction;

pub use catalog::ClassCatalog;
pub use prediction::{PredictionEntry, PredictionResult, ProbabilityVector};
