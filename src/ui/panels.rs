use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::{AppState, View};

// ---------------------------------------------------------------------------
// Left side panel – navigation
// ---------------------------------------------------------------------------

/// Render the navigation panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Navigation");
    ui.separator();

    let current = state.view;
    egui::ComboBox::from_id_salt("navigation")
        .selected_text(current.label())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for view in View::ALL {
                if ui.selectable_label(current == view, view.label()).clicked() {
                    state.select_view(view);
                }
            }
        });

    ui.add_space(12.0);
    ui.separator();

    let ds = &state.context.dataset;
    ui.strong("Dataset");
    ui.label(format!("{} videos, {} columns", ds.len(), ds.column_names.len()));

    ui.add_space(6.0);
    ui.strong("Model");
    match &state.context.model {
        Ok(model) => {
            ui.label(model.describe())
                .on_hover_text(format!("inputs: {}", model.schema().join(", ")));
        }
        Err(e) => {
            ui.label(RichText::new("unavailable").color(Color32::RED))
                .on_hover_text(e.to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / title bar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                ui.close_menu();
            }
        });
        ui.menu_button("View", |ui: &mut Ui| {
            for view in View::ALL {
                if ui.button(view.label()).clicked() {
                    state.select_view(view);
                    ui.close_menu();
                }
            }
        });

        ui.separator();
        ui.label(RichText::new("📊 YouTube Ad Revenue Analysis & Prediction").strong());

        if let Err(e) = &state.context.model {
            ui.separator();
            ui.label(RichText::new(format!("Model: {e}")).color(Color32::RED));
        }
    });
}
