//! Revenue prediction request flow: form state, submission, and display.

use std::fmt;

use crate::data::DataError;
use crate::data::model::VideoDataset;
use crate::predictor::{ModelError, PredictionRequest, RevenueModel};

// ---------------------------------------------------------------------------
// Form state (`Collecting`)
// ---------------------------------------------------------------------------

/// The nine editable inputs of the prediction view.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionForm {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub watch_time_minutes: f64,
    pub video_length_minutes: f64,
    pub subscribers: u64,
    pub category: String,
    pub device: String,
    pub country: String,
}

/// Choices offered by the three categorical selectors, as observed in the
/// dataset (first-appearance order).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryOptions {
    pub category: Vec<String>,
    pub device: Vec<String>,
    pub country: Vec<String>,
}

impl CategoryOptions {
    pub fn from_dataset(dataset: &VideoDataset) -> Result<Self, DataError> {
        Ok(CategoryOptions {
            category: dataset.category_options("category")?,
            device: dataset.category_options("device")?,
            country: dataset.category_options("country")?,
        })
    }
}

impl PredictionForm {
    /// Numbers start at zero, selectors at the first observed value.
    pub fn with_defaults(options: &CategoryOptions) -> Self {
        let first = |values: &[String]| values.first().cloned().unwrap_or_default();
        PredictionForm {
            views: 0,
            likes: 0,
            comments: 0,
            watch_time_minutes: 0.0,
            video_length_minutes: 0.0,
            subscribers: 0,
            category: first(&options.category),
            device: first(&options.device),
            country: first(&options.country),
        }
    }

    fn validate(&self) -> Result<(), PredictionFailure> {
        for (field, value) in [
            ("watch_time_minutes", self.watch_time_minutes),
            ("video_length_minutes", self.video_length_minutes),
        ] {
            if !value.is_finite() {
                return Err(PredictionFailure::InvalidInput {
                    field,
                    reason: "must be a number".to_string(),
                });
            }
            if value < 0.0 {
                return Err(PredictionFailure::InvalidInput {
                    field,
                    reason: format!("must be >= 0, got {value}"),
                });
            }
        }
        Ok(())
    }

    pub fn to_request(&self) -> PredictionRequest {
        PredictionRequest {
            views: self.views,
            likes: self.likes,
            comments: self.comments,
            watch_time_minutes: self.watch_time_minutes,
            video_length_minutes: self.video_length_minutes,
            subscribers: self.subscribers,
            category: self.category.clone(),
            device: self.device.clone(),
            country: self.country.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// A successful prediction and its display form.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub value: f64,
    pub display: String,
}

impl PredictionResult {
    pub fn new(value: f64) -> Self {
        PredictionResult {
            value,
            display: format_currency(value),
        }
    }
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PredictionFailure {
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Resolution = Result<PredictionResult, PredictionFailure>;

/// Where the prediction view is in its request cycle.
#[derive(Debug, Default)]
pub enum RequestPhase {
    /// User is editing the form.
    #[default]
    Collecting,
    /// Submit pressed; resolved before the next frame is drawn.
    Submitted,
    Resolved(Resolution),
}

impl RequestPhase {
    pub fn resolution(&self) -> Option<&Resolution> {
        match self {
            RequestPhase::Resolved(r) => Some(r),
            _ => None,
        }
    }
}

/// Validate the form, build the request and run the model once. Never
/// retries; the caller keeps the form and may submit again.
pub fn submit(form: &PredictionForm, model: &dyn RevenueModel) -> Resolution {
    form.validate()?;
    let request = form.to_request();
    match model.predict(&request.to_feature_row()) {
        Ok(value) => {
            log::debug!("prediction for {request:?}: {value}");
            Ok(PredictionResult::new(value))
        }
        Err(e) => {
            log::warn!("prediction failed: {e}");
            Err(e.into())
        }
    }
}

// ---------------------------------------------------------------------------
// Currency formatting
// ---------------------------------------------------------------------------

/// `$` + thousands separators + two decimals. The sign, if any, follows the
/// symbol: `-1234.5` → `$-1,234.50`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return format!("${value}");
    }
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // Sign follows the value even when it rounds to zero: -0.001 is "$-0.00".
    let sign = if value.is_sign_negative() { "-" } else { "" };
    format!("${sign}{grouped}.{frac_part}")
}
