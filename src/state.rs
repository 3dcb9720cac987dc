use std::sync::Arc;

use crate::config::AppConfig;
use crate::data::DataError;
use crate::data::loader;
use crate::data::model::{TARGET_COLUMN, VideoDataset};
use crate::data::stats::{self, CorrelationMatrix, NumericSummary};
use crate::prediction::{self, CategoryOptions, PredictionForm, RequestPhase};
use crate::predictor::{FittedPipeline, ModelError, RevenueModel};

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// The four pages of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Overview,
    EdaInsights,
    RevenuePrediction,
    BusinessInsights,
}

impl View {
    pub const ALL: [View; 4] = [
        View::Overview,
        View::EdaInsights,
        View::RevenuePrediction,
        View::BusinessInsights,
    ];

    pub fn label(self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::EdaInsights => "EDA & Insights",
            View::RevenuePrediction => "Revenue Prediction",
            View::BusinessInsights => "Business Insights",
        }
    }
}

/// Columns the revenue bar chart can be grouped by.
pub const GROUP_COLUMNS: [&str; 3] = ["category", "device", "country"];

// ---------------------------------------------------------------------------
// Loaded inputs
// ---------------------------------------------------------------------------

/// Everything loaded at startup. Never mutated afterwards.
pub struct DashboardContext {
    pub dataset: Arc<VideoDataset>,
    /// `Err` when the artifact failed to load; only the prediction view
    /// depends on it.
    pub model: Result<Arc<dyn RevenueModel>, ModelError>,
}

impl DashboardContext {
    /// Load both inputs. A dataset failure is fatal; a model failure is
    /// logged and kept so the rest of the dashboard still works.
    pub fn load(config: &AppConfig) -> Result<Self, DataError> {
        let dataset = loader::load_file(&config.dataset_path)?;

        let model = FittedPipeline::load(&config.model_path)
            .map(|m| Arc::new(m) as Arc<dyn RevenueModel>);
        if let Err(e) = &model {
            log::warn!("Revenue prediction disabled: {e}");
        }

        Ok(DashboardContext {
            dataset: Arc::new(dataset),
            model,
        })
    }
}

/// Aggregates the read-only views draw from, computed once per dataset.
pub struct DatasetInsights {
    pub summaries: Vec<NumericSummary>,
    pub correlation: Result<CorrelationMatrix, DataError>,
    /// One entry per [`GROUP_COLUMNS`] item, same order.
    pub revenue_by: Vec<(&'static str, Result<Vec<(String, f64)>, DataError>)>,
}

impl DatasetInsights {
    pub fn compute(dataset: &VideoDataset) -> Self {
        let numeric = dataset.numeric_columns();
        let summaries = numeric
            .iter()
            .filter_map(|c| stats::describe(dataset, c).ok())
            .collect();
        let correlation = stats::correlation_matrix(dataset, numeric);
        let revenue_by = GROUP_COLUMNS
            .iter()
            .map(|&col| (col, stats::group_mean(dataset, col, TARGET_COLUMN)))
            .collect();

        DatasetInsights {
            summaries,
            correlation,
            revenue_by,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub context: DashboardContext,
    pub insights: DatasetInsights,

    /// Page shown in the central panel.
    pub view: View,

    /// Index into [`GROUP_COLUMNS`] for the revenue bar chart.
    pub group_by: usize,

    pub options: Result<CategoryOptions, DataError>,
    pub form: PredictionForm,
    pub phase: RequestPhase,
}

impl AppState {
    pub fn new(context: DashboardContext) -> Self {
        let insights = DatasetInsights::compute(&context.dataset);
        let options = CategoryOptions::from_dataset(&context.dataset);
        let form = match &options {
            Ok(opts) => PredictionForm::with_defaults(opts),
            Err(_) => PredictionForm::with_defaults(&CategoryOptions::default()),
        };

        Self {
            context,
            insights,
            view: View::default(),
            group_by: 0,
            options,
            form,
            phase: RequestPhase::default(),
        }
    }

    /// Switch page. Selecting the current page is a no-op.
    pub fn select_view(&mut self, view: View) {
        if self.view != view {
            log::debug!("view: {} -> {}", self.view.label(), view.label());
            self.view = view;
        }
    }

    /// Run the prediction for the current form contents.
    pub fn submit_prediction(&mut self) {
        let Ok(model) = &self.context.model else {
            return;
        };
        self.phase = RequestPhase::Submitted;
        let resolution = prediction::submit(&self.form, model.as_ref());
        self.phase = RequestPhase::Resolved(resolution);
    }

    pub fn model_ready(&self) -> bool {
        self.context.model.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::data::model::tests::{dataset, record};
    use crate::predictor::pipeline::tests::linear_pipeline;

    fn state(model: Result<Arc<dyn RevenueModel>, ModelError>) -> AppState {
        let ds = dataset(vec![
            record("Gaming", 10.0),
            record("Music", 30.0),
            record("News", 20.0),
        ]);
        AppState::new(DashboardContext {
            dataset: Arc::new(ds),
            model,
        })
    }

    #[test]
    fn view_selection_is_idempotent() {
        let mut s = state(Ok(Arc::new(linear_pipeline())));
        s.select_view(View::EdaInsights);
        s.select_view(View::EdaInsights);
        assert_eq!(s.view, View::EdaInsights);
        for v in View::ALL {
            s.select_view(v);
            assert_eq!(s.view, v);
        }
    }

    #[test]
    fn insights_cover_scenario_groups() {
        let s = state(Ok(Arc::new(linear_pipeline())));
        let (col, means) = &s.insights.revenue_by[0];
        assert_eq!(*col, "category");
        assert_eq!(
            means.as_ref().unwrap(),
            &vec![
                ("Gaming".to_string(), 10.0),
                ("News".to_string(), 20.0),
                ("Music".to_string(), 30.0),
            ]
        );
        assert!(s.insights.correlation.is_ok());
    }

    #[test]
    fn submission_resolves_with_a_loaded_model() {
        let mut s = state(Ok(Arc::new(linear_pipeline())));
        s.submit_prediction();
        assert!(matches!(s.phase.resolution(), Some(Ok(_))));
    }

    #[test]
    fn missing_model_leaves_other_views_usable() {
        let mut s = state(Err(ModelError::Load {
            path: PathBuf::from("gone.json"),
            reason: "gone".into(),
        }));
        assert!(!s.model_ready());
        s.submit_prediction();
        assert!(matches!(s.phase, RequestPhase::Collecting));
        s.select_view(View::Overview);
        assert!(!s.insights.summaries.is_empty());
    }
}
