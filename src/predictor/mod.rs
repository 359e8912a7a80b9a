//! The prediction pipeline.
//!
//! - `inference_runner` - one forward pass through the shared model
//! - `tta` - test-time augmentation over four fixed variants
//! - `batch` - averaging over caller-supplied images
//! - `ranker` - sorting and naming the final vector

pub mod batch;
pub mod inference_runner;
pub mod ranker;
pub mod tta;

#[cfg(test)]
pub(crate) mod test_support;

pub use batch::BatchEnsembler;
pub use inference_runner::InferenceRunner;
pub use ranker::ResultRanker;
pub use tta::{TtaEnsembler, TtaVariant};
