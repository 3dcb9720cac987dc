use eframe::egui;

use crate::state::{AppState, DashboardContext, View};
use crate::ui::{eda, forecast, insights, overview, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RevenueLensApp {
    pub state: AppState,
}

impl RevenueLensApp {
    pub fn new(context: DashboardContext) -> Self {
        Self {
            state: AppState::new(context),
        }
    }
}

impl eframe::App for RevenueLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: navigation ----
        egui::SidePanel::left("navigation_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: selected view ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.view {
            View::Overview => overview::overview(ui, &self.state),
            View::EdaInsights => eda::eda(ui, &mut self.state),
            View::RevenuePrediction => forecast::forecast(ui, &mut self.state),
            View::BusinessInsights => insights::business_insights(ui),
        });
    }
}
