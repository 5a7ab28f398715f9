pub mod classifier;
pub mod config;
pub mod error;
pub mod generation;
pub mod models;
pub mod pipeline;
pub mod service;
pub mod symptoms;

#[cfg(test)]
mod test_support;

pub use classifier::{OnnxRiskModel, RiskClassifier, RiskPredictor};
pub use config::Config;
pub use error::ReportError;
pub use generation::{GenerationSettings, MistralClient, ReportGenerator};
pub use models::*;
pub use pipeline::ReportPipeline;
pub use service::{AppState, build_router, create_app};
