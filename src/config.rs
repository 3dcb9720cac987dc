use std::path::PathBuf;

/// Environment variable naming the dataset file.
pub const DATASET_ENV: &str = "REVENUE_LENS_DATASET";
/// Environment variable naming the model artifact.
pub const MODEL_ENV: &str = "REVENUE_LENS_MODEL";

pub const DEFAULT_DATASET: &str = "youtube_ad_revenue_dataset.csv";
pub const DEFAULT_MODEL: &str = "best_model_pipeline.json";

/// Locations of the two static inputs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub dataset_path: PathBuf,
    pub model_path: PathBuf,
}

impl AppConfig {
    /// Loads configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `REVENUE_LENS_DATASET`: dataset file (default: `youtube_ad_revenue_dataset.csv`)
    /// - `REVENUE_LENS_MODEL`: model artifact (default: `best_model_pipeline.json`)
    ///
    /// A `.env` file in the working directory is read first, if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map_or_else(|| PathBuf::from(default), PathBuf::from)
        };
        AppConfig {
            dataset_path: path(DATASET_ENV, DEFAULT_DATASET),
            model_path: path(MODEL_ENV, DEFAULT_MODEL),
        }
    }
}
