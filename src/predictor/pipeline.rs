use std::path::Path;

use anyhow::Context;

use super::artifact::{
    Aggregation, FORMAT_VERSION, FeatureSpec, PipelineArtifact, RegressorSpec, Tree, TreeNode,
    UnknownCategory,
};
use super::schema::{FEATURE_SCHEMA, FeatureRow, FeatureValue};
use super::{ModelError, RevenueModel};

// ---------------------------------------------------------------------------
// FittedPipeline – preprocessing + regressor loaded from an artifact
// ---------------------------------------------------------------------------

/// A validated pipeline artifact, ready for inference.
#[derive(Debug, Clone)]
pub struct FittedPipeline {
    artifact: PipelineArtifact,
    /// Length of the encoded feature vector.
    width: usize,
}

impl FittedPipeline {
    /// Read and validate a JSON artifact. The feature schema is checked here,
    /// so a mismatched artifact never reaches the first prediction.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let artifact = read_artifact(path).map_err(|e| ModelError::Load {
            path: path.to_path_buf(),
            reason: format!("{e:#}"),
        })?;
        let pipeline = Self::from_artifact(artifact, path)?;
        log::info!(
            "Loaded {} from {} ({} encoded features)",
            pipeline.describe(),
            path.display(),
            pipeline.width
        );
        Ok(pipeline)
    }

    /// Validate an already parsed artifact. `source` names where it came
    /// from and is carried by `ModelError::Load`.
    pub fn from_artifact(artifact: PipelineArtifact, source: &Path) -> Result<Self, ModelError> {
        let invalid = |reason: String| ModelError::Load {
            path: source.to_path_buf(),
            reason,
        };

        if artifact.format_version != FORMAT_VERSION {
            return Err(invalid(format!(
                "unsupported format_version {} (expected {FORMAT_VERSION})",
                artifact.format_version
            )));
        }
        check_schema(&artifact.features)?;

        for spec in &artifact.features {
            if let FeatureSpec::Numeric { name, mean, scale } = spec {
                if !mean.is_finite() || !scale.is_finite() {
                    return Err(invalid(format!(
                        "scaler for '{name}' has non-finite parameters"
                    )));
                }
            }
        }

        let width = artifact.features.iter().map(FeatureSpec::width).sum();
        check_regressor(&artifact.regressor, width).map_err(invalid)?;

        Ok(FittedPipeline { artifact, width })
    }

    pub fn artifact(&self) -> &PipelineArtifact {
        &self.artifact
    }

    /// Apply the preprocessing steps to one row.
    fn encode(&self, row: &FeatureRow) -> Result<Vec<f64>, ModelError> {
        if row.fields.len() != self.artifact.features.len() {
            return Err(ModelError::SchemaMismatch(format!(
                "expected {} features, got {}",
                self.artifact.features.len(),
                row.fields.len()
            )));
        }

        let mut encoded = Vec::with_capacity(self.width);
        for (spec, (name, value)) in self.artifact.features.iter().zip(&row.fields) {
            if spec.name() != name {
                return Err(ModelError::SchemaMismatch(format!(
                    "expected feature '{}', got '{name}'",
                    spec.name()
                )));
            }

            match (spec, value) {
                (FeatureSpec::Numeric { mean, scale, .. }, FeatureValue::Numeric(x)) => {
                    if !x.is_finite() {
                        return Err(ModelError::Inference(format!(
                            "'{name}' is not a finite number"
                        )));
                    }
                    let scale = if *scale == 0.0 { 1.0 } else { *scale };
                    encoded.push((x - mean) / scale);
                }
                (
                    FeatureSpec::Categorical {
                        categories,
                        handle_unknown,
                        ..
                    },
                    FeatureValue::Categorical(v),
                ) => {
                    let hit = categories.iter().position(|c| c == v);
                    if hit.is_none() && *handle_unknown == UnknownCategory::Error {
                        return Err(ModelError::Inference(format!(
                            "unknown category '{v}' for '{name}'"
                        )));
                    }
                    encoded.extend((0..categories.len()).map(|i| {
                        if Some(i) == hit { 1.0 } else { 0.0 }
                    }));
                }
                (spec, value) => {
                    return Err(ModelError::SchemaMismatch(format!(
                        "'{name}' must be {}, got {}",
                        spec.kind(),
                        value.kind()
                    )));
                }
            }
        }
        Ok(encoded)
    }
}

impl RevenueModel for FittedPipeline {
    fn describe(&self) -> String {
        match &self.artifact.name {
            Some(name) => format!("{name} ({})", self.artifact.regressor.label()),
            None => self.artifact.regressor.label().to_string(),
        }
    }

    fn schema(&self) -> Vec<&str> {
        self.artifact.features.iter().map(FeatureSpec::name).collect()
    }

    fn predict(&self, row: &FeatureRow) -> Result<f64, ModelError> {
        let x = self.encode(row)?;

        let y = match &self.artifact.regressor {
            RegressorSpec::Linear {
                coefficients,
                intercept,
            } => intercept + coefficients.iter().zip(&x).map(|(w, v)| w * v).sum::<f64>(),
            RegressorSpec::TreeEnsemble {
                trees,
                aggregation,
                base_score,
            } => {
                let mut total = 0.0;
                for (i, tree) in trees.iter().enumerate() {
                    total += eval_tree(tree, &x)
                        .ok_or_else(|| ModelError::Inference(format!("tree {i} has a cycle")))?;
                }
                match aggregation {
                    Aggregation::Mean => base_score + total / trees.len() as f64,
                    Aggregation::Sum => base_score + total,
                }
            }
        };

        if !y.is_finite() {
            return Err(ModelError::Inference(format!("regressor produced {y}")));
        }
        log::debug!("predicted {y:.4} from {} encoded features", x.len());
        Ok(y)
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn read_artifact(path: &Path) -> anyhow::Result<PipelineArtifact> {
    let text = std::fs::read_to_string(path).context("reading model artifact")?;
    serde_json::from_str(&text).context("parsing model artifact")
}

/// The artifact must list exactly the request features, in order and kind.
fn check_schema(features: &[FeatureSpec]) -> Result<(), ModelError> {
    let got: Vec<String> = features
        .iter()
        .map(|f| format!("{}:{}", f.name(), f.kind()))
        .collect();
    let expected: Vec<String> = FEATURE_SCHEMA
        .iter()
        .map(|(name, kind)| format!("{name}:{kind}"))
        .collect();

    if got != expected {
        return Err(ModelError::SchemaMismatch(format!(
            "artifact expects [{}], requests provide [{}]",
            got.join(", "),
            expected.join(", ")
        )));
    }
    Ok(())
}

fn check_regressor(regressor: &RegressorSpec, width: usize) -> Result<(), String> {
    match regressor {
        RegressorSpec::Linear {
            coefficients,
            intercept,
        } => {
            if coefficients.len() != width {
                return Err(format!(
                    "linear model has {} coefficients for {width} encoded features",
                    coefficients.len()
                ));
            }
            if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                return Err("linear model has non-finite parameters".to_string());
            }
        }
        RegressorSpec::TreeEnsemble { trees, .. } => {
            if trees.is_empty() {
                return Err("tree ensemble has no trees".to_string());
            }
            for (t, tree) in trees.iter().enumerate() {
                if tree.nodes.is_empty() {
                    return Err(format!("tree {t} has no nodes"));
                }
                for (n, node) in tree.nodes.iter().enumerate() {
                    if let TreeNode::Split {
                        feature,
                        left,
                        right,
                        ..
                    } = node
                    {
                        if *feature >= width {
                            return Err(format!(
                                "tree {t} node {n} splits on feature {feature} of {width}"
                            ));
                        }
                        if *left >= tree.nodes.len() || *right >= tree.nodes.len() {
                            return Err(format!("tree {t} node {n} points past the node array"));
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

/// Walk one tree from the root. `None` if no leaf is reached within
/// `nodes.len()` steps.
fn eval_tree(tree: &Tree, x: &[f64]) -> Option<f64> {
    let mut idx = 0;
    for _ in 0..tree.nodes.len() {
        match tree.nodes.get(idx)? {
            TreeNode::Leaf { value } => return Some(*value),
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                idx = if x[*feature] <= *threshold { *left } else { *right };
            }
        }
    }
    None
}

#[cfg(test)]
pub(crate) mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::predictor::PredictionRequest;

    /// Numeric features unscaled except `views` (mean 1000, scale 500);
    /// categories: category [Gaming, Music], device [Mobile, TV], country [US, IN].
    pub(crate) fn features() -> Vec<FeatureSpec> {
        let numeric = |name: &str, mean: f64, scale: f64| FeatureSpec::Numeric {
            name: name.to_string(),
            mean,
            scale,
        };
        let categorical = |name: &str, cats: &[&str]| FeatureSpec::Categorical {
            name: name.to_string(),
            categories: cats.iter().map(|c| c.to_string()).collect(),
            handle_unknown: UnknownCategory::Ignore,
        };
        vec![
            numeric("views", 1000.0, 500.0),
            numeric("likes", 0.0, 1.0),
            numeric("comments", 0.0, 1.0),
            numeric("watch_time_minutes", 0.0, 1.0),
            numeric("video_length_minutes", 0.0, 0.0),
            numeric("subscribers", 0.0, 1.0),
            categorical("category", &["Gaming", "Music"]),
            categorical("device", &["Mobile", "TV"]),
            categorical("country", &["US", "IN"]),
        ]
    }

    fn validate(artifact: PipelineArtifact) -> Result<FittedPipeline, ModelError> {
        FittedPipeline::from_artifact(artifact, Path::new("memory.json"))
    }

    pub(crate) fn linear_pipeline() -> FittedPipeline {
        // 6 numeric + 2 + 2 + 2 one-hot columns
        let mut coefficients = vec![2.0, 0.1, 0.0, 0.05, 1.0, 0.0];
        coefficients.extend([0.0, 3.0, 0.0, -1.0, 0.0, 4.0]);
        validate(PipelineArtifact {
            format_version: FORMAT_VERSION,
            name: Some("ridge".into()),
            features: features(),
            regressor: RegressorSpec::Linear {
                coefficients,
                intercept: 1.5,
            },
        })
        .unwrap()
    }

    pub(crate) fn request() -> PredictionRequest {
        PredictionRequest {
            views: 2000,
            likes: 50,
            comments: 5,
            watch_time_minutes: 120.0,
            video_length_minutes: 10.0,
            subscribers: 500,
            category: "Music".into(),
            device: "TV".into(),
            country: "IN".into(),
        }
    }

    #[test]
    fn linear_prediction_matches_hand_computation() {
        let model = linear_pipeline();
        let y = model.predict(&request().to_feature_row()).unwrap();
        // 1.5 + 2*(2000-1000)/500 + 0.1*50 + 0.05*120 + 1*10 + 3 - 1 + 4
        assert_relative_eq!(y, 1.5 + 4.0 + 5.0 + 6.0 + 10.0 + 3.0 - 1.0 + 4.0);
    }

    #[test]
    fn prediction_is_deterministic() {
        let model = linear_pipeline();
        let row = request().to_feature_row();
        let a = model.predict(&row).unwrap();
        let b = model.predict(&row).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn negative_output_is_not_clamped() {
        let mut req = request();
        req.views = 0; // 2*(0-1000)/500 = -4
        req.likes = 0;
        req.watch_time_minutes = 0.0;
        req.video_length_minutes = 0.0;
        req.category = "Gaming".into();
        req.device = "TV".into();
        req.country = "US".into();
        let y = linear_pipeline().predict(&req.to_feature_row()).unwrap();
        assert_relative_eq!(y, 1.5 - 4.0 - 1.0);
        assert!(y < 0.0);
    }

    #[test]
    fn unknown_category_is_ignored_by_default() {
        let mut req = request();
        req.country = "BR".into();
        let known = linear_pipeline().predict(&request().to_feature_row()).unwrap();
        let unknown = linear_pipeline().predict(&req.to_feature_row()).unwrap();
        assert_relative_eq!(known - unknown, 4.0);
    }

    #[test]
    fn unknown_category_can_be_an_inference_error() {
        let mut features = features();
        if let FeatureSpec::Categorical { handle_unknown, .. } = &mut features[8] {
            *handle_unknown = UnknownCategory::Error;
        }
        let model = validate(PipelineArtifact {
            format_version: FORMAT_VERSION,
            name: None,
            features,
            regressor: RegressorSpec::Linear {
                coefficients: vec![0.0; 12],
                intercept: 0.0,
            },
        })
        .unwrap();
        let mut req = request();
        req.country = "BR".into();
        assert!(matches!(
            model.predict(&req.to_feature_row()),
            Err(ModelError::Inference(_))
        ));
    }

    #[test]
    fn renamed_row_field_is_a_schema_mismatch() {
        let mut row = request().to_feature_row();
        row.fields[3].0 = "watch_time".into();
        assert!(matches!(
            linear_pipeline().predict(&row),
            Err(ModelError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn wrong_kind_is_a_schema_mismatch() {
        let mut row = request().to_feature_row();
        row.fields[0].1 = FeatureValue::Categorical("lots".into());
        assert!(matches!(
            linear_pipeline().predict(&row),
            Err(ModelError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn artifact_with_other_schema_is_rejected_at_load() {
        let mut features = features();
        features.swap(0, 1);
        let err = validate(PipelineArtifact {
            format_version: FORMAT_VERSION,
            name: None,
            features,
            regressor: RegressorSpec::Linear {
                coefficients: vec![0.0; 12],
                intercept: 0.0,
            },
        })
        .unwrap_err();
        assert!(matches!(err, ModelError::SchemaMismatch(_)));
    }

    #[test]
    fn coefficient_count_must_match_encoding() {
        let err = validate(PipelineArtifact {
            format_version: FORMAT_VERSION,
            name: None,
            features: features(),
            regressor: RegressorSpec::Linear {
                coefficients: vec![0.0; 9],
                intercept: 0.0,
            },
        })
        .unwrap_err();
        match err {
            ModelError::Load { path, reason } => {
                assert_eq!(path, Path::new("memory.json"));
                assert!(reason.contains("9 coefficients"), "{reason}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn tree_ensemble_averages_or_sums() {
        // Split on encoded column 9 (device == TV).
        let tree = |tv: f64, other: f64| Tree {
            nodes: vec![
                TreeNode::Split {
                    feature: 9,
                    threshold: 0.5,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: other },
                TreeNode::Leaf { value: tv },
            ],
        };
        let build = |aggregation, base_score| {
            validate(PipelineArtifact {
                format_version: FORMAT_VERSION,
                name: None,
                features: features(),
                regressor: RegressorSpec::TreeEnsemble {
                    trees: vec![tree(10.0, 1.0), tree(20.0, 2.0)],
                    aggregation,
                    base_score,
                },
            })
            .unwrap()
        };

        let row = request().to_feature_row();
        assert_relative_eq!(build(Aggregation::Mean, 0.0).predict(&row).unwrap(), 15.0);
        assert_relative_eq!(build(Aggregation::Sum, 0.5).predict(&row).unwrap(), 30.5);

        let mut mobile = request();
        mobile.device = "Mobile".into();
        let y = build(Aggregation::Mean, 0.0)
            .predict(&mobile.to_feature_row())
            .unwrap();
        assert_relative_eq!(y, 1.5);
    }

    #[test]
    fn cyclic_tree_is_an_inference_error() {
        let model = validate(PipelineArtifact {
            format_version: FORMAT_VERSION,
            name: None,
            features: features(),
            regressor: RegressorSpec::TreeEnsemble {
                trees: vec![Tree {
                    nodes: vec![TreeNode::Split {
                        feature: 0,
                        threshold: 0.0,
                        left: 0,
                        right: 0,
                    }],
                }],
                aggregation: Aggregation::Sum,
                base_score: 0.0,
            },
        })
        .unwrap();
        assert!(matches!(
            model.predict(&request().to_feature_row()),
            Err(ModelError::Inference(_))
        ));
    }

    #[test]
    fn load_reports_missing_and_corrupt_files() {
        let missing = FittedPipeline::load(Path::new("/no/such/model.json")).unwrap_err();
        assert!(matches!(missing, ModelError::Load { .. }));

        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"\x80\x04pickle").unwrap();
        assert!(matches!(
            FittedPipeline::load(file.path()),
            Err(ModelError::Load { .. })
        ));
    }

    #[test]
    fn load_reads_a_serialized_artifact() {
        let artifact = linear_pipeline().artifact().clone();
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), serde_json::to_string(&artifact).unwrap()).unwrap();
        let model = FittedPipeline::load(file.path()).unwrap();
        assert_eq!(model.describe(), "ridge (linear regression)");
    }

    #[test]
    fn schema_lists_the_request_features_in_order() {
        let names: Vec<&str> = FEATURE_SCHEMA.iter().map(|(name, _)| *name).collect();
        assert_eq!(linear_pipeline().schema(), names);
    }

    #[test]
    fn load_error_names_the_artifact_path() {
        let missing = Path::new("/no/such/model.json");
        match FittedPipeline::load(missing) {
            Err(ModelError::Load { path, .. }) => assert_eq!(path, missing),
            other => panic!("unexpected result {other:?}"),
        }
    }
}
