use std::fmt;

use serde::{Deserialize, Serialize};

/// Feature schema the revenue pipeline is fitted against, in order.
pub const FEATURE_SCHEMA: [(&str, FeatureKind); 9] = [
    ("views", FeatureKind::Numeric),
    ("likes", FeatureKind::Numeric),
    ("comments", FeatureKind::Numeric),
    ("watch_time_minutes", FeatureKind::Numeric),
    ("video_length_minutes", FeatureKind::Numeric),
    ("subscribers", FeatureKind::Numeric),
    ("category", FeatureKind::Categorical),
    ("device", FeatureKind::Categorical),
    ("country", FeatureKind::Categorical),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Numeric,
    Categorical,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureKind::Numeric => write!(f, "numeric"),
            FeatureKind::Categorical => write!(f, "categorical"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Numeric(f64),
    Categorical(String),
}

impl FeatureValue {
    pub fn kind(&self) -> FeatureKind {
        match self {
            FeatureValue::Numeric(_) => FeatureKind::Numeric,
            FeatureValue::Categorical(_) => FeatureKind::Categorical,
        }
    }
}

/// One named, ordered row of model inputs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureRow {
    pub fields: Vec<(String, FeatureValue)>,
}

impl FeatureRow {
    pub fn push(&mut self, name: &str, value: FeatureValue) {
        self.fields.push((name.to_string(), value));
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// A single video's features, everything but the label.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
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

impl PredictionRequest {
    /// Lay the request out in [`FEATURE_SCHEMA`] order.
    pub fn to_feature_row(&self) -> FeatureRow {
        use FeatureValue::{Categorical, Numeric};

        FeatureRow {
            fields: vec![
                ("views".into(), Numeric(self.views as f64)),
                ("likes".into(), Numeric(self.likes as f64)),
                ("comments".into(), Numeric(self.comments as f64)),
                ("watch_time_minutes".into(), Numeric(self.watch_time_minutes)),
                ("video_length_minutes".into(), Numeric(self.video_length_minutes)),
                ("subscribers".into(), Numeric(self.subscribers as f64)),
                ("category".into(), Categorical(self.category.clone())),
                ("device".into(), Categorical(self.device.clone())),
                ("country".into(), Categorical(self.country.clone())),
            ],
        }
    }
}
