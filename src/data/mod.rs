/// Data layer: core types, loading, and aggregate queries.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → VideoDataset (validates every row)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ VideoDataset  │  Vec<VideoRecord>, column index
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  group means, correlation, summaries
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod stats;

use std::path::PathBuf;

/// Failures of the dataset provider.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The file is missing, unreadable or malformed. Fatal at startup.
    #[error("failed to load dataset {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("column '{0}' is not numeric")]
    NotNumeric(String),
}
