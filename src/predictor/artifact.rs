//! On-disk form of a fitted revenue pipeline.
//!
//! The artifact is produced offline by the training job and only read here.
//! A minimal linear artifact looks like:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "features": [
//!     { "kind": "numeric", "name": "views", "mean": 5000.0, "scale": 2500.0 },
//!     { "kind": "categorical", "name": "category", "categories": ["Gaming", "Music"] }
//!   ],
//!   "regressor": { "type": "linear", "coefficients": [1.2, 0.5, -0.5], "intercept": 3.0 }
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::schema::FeatureKind;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineArtifact {
    pub format_version: u32,
    /// Free-form label of the fitted estimator, shown in the UI.
    #[serde(default)]
    pub name: Option<String>,
    pub features: Vec<FeatureSpec>,
    pub regressor: RegressorSpec,
}

/// Preprocessing step for one input column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureSpec {
    /// Standard scaling: `(x - mean) / scale`.
    Numeric { name: String, mean: f64, scale: f64 },
    /// One-hot encoding over `categories`.
    Categorical {
        name: String,
        categories: Vec<String>,
        #[serde(default)]
        handle_unknown: UnknownCategory,
    },
}

impl FeatureSpec {
    pub fn name(&self) -> &str {
        match self {
            FeatureSpec::Numeric { name, .. } | FeatureSpec::Categorical { name, .. } => name,
        }
    }

    pub fn kind(&self) -> FeatureKind {
        match self {
            FeatureSpec::Numeric { .. } => FeatureKind::Numeric,
            FeatureSpec::Categorical { .. } => FeatureKind::Categorical,
        }
    }

    /// Number of encoded columns this feature expands to.
    pub fn width(&self) -> usize {
        match self {
            FeatureSpec::Numeric { .. } => 1,
            FeatureSpec::Categorical { categories, .. } => categories.len(),
        }
    }
}

/// What to do with a category that was not seen during fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategory {
    /// Encode as all zeros.
    #[default]
    Ignore,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegressorSpec {
    Linear {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    TreeEnsemble {
        trees: Vec<Tree>,
        aggregation: Aggregation,
        #[serde(default)]
        base_score: f64,
    },
}

impl RegressorSpec {
    pub fn label(&self) -> &'static str {
        match self {
            RegressorSpec::Linear { .. } => "linear regression",
            RegressorSpec::TreeEnsemble { aggregation: Aggregation::Mean, .. } => "random forest",
            RegressorSpec::TreeEnsemble { aggregation: Aggregation::Sum, .. } => "gradient boosting",
        }
    }
}

/// How per-tree outputs combine: averaged (bagging) or summed on top of
/// `base_score` (boosting).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    Mean,
    Sum,
}

/// A regression tree as a flat node array; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Go to `left` when `encoded[feature] <= threshold`, else `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}
