//! Type definitions for the survival prediction service

mod lax;
pub mod passenger;
pub mod prediction;

pub use passenger::PredictionInput;
pub use prediction::PredictionResult;
