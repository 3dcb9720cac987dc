/// Model provider: a fitted preprocessing + regression pipeline behind a
/// single `predict` call.

pub mod artifact;
pub mod pipeline;
pub mod schema;

use std::path::PathBuf;

pub use pipeline::FittedPipeline;
pub use schema::{FeatureRow, PredictionRequest};

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Missing, unreadable or internally inconsistent artifact.
    #[error("failed to load model from {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    /// The input row (or the artifact) does not match the feature schema.
    #[error("feature schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("inference failed: {0}")]
    Inference(String),
}

/// Anything that turns one row of features into a revenue estimate.
///
/// Implementations hold no per-call state: the same row always yields the
/// same value. Outputs are passed through as-is, negative ones included.
pub trait RevenueModel: Send + Sync {
    /// Short human-readable description of the estimator.
    fn describe(&self) -> String;

    /// Input feature names, in the order rows must supply them.
    fn schema(&self) -> Vec<&str>;

    fn predict(&self, row: &FeatureRow) -> Result<f64, ModelError>;
}
