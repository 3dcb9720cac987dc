use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{AppState, GROUP_COLUMNS};
use crate::ui::plot;

pub fn eda(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("📈 Exploratory Data Analysis");
            ui.add_space(6.0);

            ui.label(RichText::new("Correlation Heatmap").size(18.0).strong());
            match &state.insights.correlation {
                Ok(matrix) => plot::correlation_heatmap(ui, matrix),
                Err(e) => {
                    ui.label(RichText::new(e.to_string()).color(Color32::RED));
                }
            }
            ui.add_space(10.0);

            egui::Frame::group(ui.style())
                .fill(ui.visuals().faint_bg_color)
                .show(ui, |ui: &mut Ui| {
                    ui.strong("🔍 Key Observations");
                    ui.label("• Watch time and views strongly influence ad revenue");
                    ui.label("• Engagement metrics have moderate impact");
                    ui.label("• Video length alone does not guarantee higher revenue");
                });
            ui.add_space(10.0);

            ui.horizontal(|ui: &mut Ui| {
                ui.label(RichText::new("Average Ad Revenue by").size(18.0).strong());
                egui::ComboBox::from_id_salt("group_by")
                    .selected_text(GROUP_COLUMNS[state.group_by])
                    .show_ui(ui, |ui: &mut Ui| {
                        for (i, col) in GROUP_COLUMNS.iter().enumerate() {
                            ui.selectable_value(&mut state.group_by, i, *col);
                        }
                    });
            });

            let (col, means) = &state.insights.revenue_by[state.group_by];
            match means {
                Ok(means) => plot::revenue_bar_chart(ui, &format!("revenue_by_{col}"), means),
                Err(e) => {
                    ui.label(RichText::new(e.to_string()).color(Color32::RED));
                }
            }
        });
}
