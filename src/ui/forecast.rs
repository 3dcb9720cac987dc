use eframe::egui::{self, Color32, DragValue, RichText, Ui};

use crate::prediction::{PredictionForm, RequestPhase};
use crate::state::AppState;

pub fn forecast(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🤖 Ad Revenue Prediction");
    ui.label("Enter video performance details to predict ad revenue.");
    ui.add_space(8.0);

    if let Err(e) = &state.context.model {
        ui.label(RichText::new(format!("Prediction is unavailable: {e}")).color(Color32::RED));
        return;
    }
    let options = match &state.options {
        Ok(options) => options.clone(),
        Err(e) => {
            ui.label(RichText::new(e.to_string()).color(Color32::RED));
            return;
        }
    };

    let form: &mut PredictionForm = &mut state.form;
    let mut edited = false;

    egui::Grid::new("prediction_form")
        .num_columns(3)
        .spacing([24.0, 8.0])
        .show(ui, |ui: &mut Ui| {
            edited |= count_input(ui, "Views", &mut form.views);
            edited |= count_input(ui, "Likes", &mut form.likes);
            edited |= count_input(ui, "Comments", &mut form.comments);
            ui.end_row();

            edited |= minutes_input(ui, "Watch Time (minutes)", &mut form.watch_time_minutes);
            edited |= minutes_input(ui, "Video Length (minutes)", &mut form.video_length_minutes);
            edited |= count_input(ui, "Subscribers", &mut form.subscribers);
            ui.end_row();

            edited |= select(ui, "Category", &options.category, &mut form.category);
            edited |= select(ui, "Device", &options.device, &mut form.device);
            edited |= select(ui, "Country", &options.country, &mut form.country);
            ui.end_row();
        });

    // A result describes the inputs it was computed from.
    if edited && !matches!(state.phase, RequestPhase::Collecting) {
        state.phase = RequestPhase::Collecting;
    }

    ui.add_space(10.0);
    if ui.button("Predict Ad Revenue").clicked() {
        state.submit_prediction();
    }
    ui.add_space(10.0);

    match state.phase.resolution() {
        Some(Ok(result)) => {
            ui.label(
                RichText::new(format!("💰 Predicted Ad Revenue: {result}"))
                    .size(18.0)
                    .color(Color32::from_rgb(40, 160, 80)),
            );
        }
        Some(Err(e)) => {
            ui.label(RichText::new(format!("Prediction failed: {e}")).color(Color32::RED));
        }
        None => {}
    }
}

fn count_input(ui: &mut Ui, label: &str, value: &mut u64) -> bool {
    ui.vertical(|ui: &mut Ui| {
        ui.label(label);
        ui.add(DragValue::new(value).range(0..=u64::MAX).speed(1.0))
            .changed()
    })
    .inner
}

fn minutes_input(ui: &mut Ui, label: &str, value: &mut f64) -> bool {
    ui.vertical(|ui: &mut Ui| {
        ui.label(label);
        ui.add(
            DragValue::new(value)
                .range(0.0..=f64::MAX)
                .speed(0.1)
                .fixed_decimals(2),
        )
        .changed()
    })
    .inner
}

fn select(ui: &mut Ui, label: &str, choices: &[String], value: &mut String) -> bool {
    ui.vertical(|ui: &mut Ui| {
        ui.label(label);
        let mut changed = false;
        egui::ComboBox::from_id_salt(label)
            .selected_text(value.as_str())
            .show_ui(ui, |ui: &mut Ui| {
                for choice in choices {
                    changed |= ui
                        .selectable_value(value, choice.clone(), choice)
                        .changed();
                }
            });
        changed
    })
    .inner
}
