use eframe::egui::{self, Align2, FontId, RichText, Sense, Ui, vec2};
use egui_plot::{Bar, BarChart, Plot};

use crate::color::{diverging, generate_palette, text_on};
use crate::data::stats::CorrelationMatrix;

// ---------------------------------------------------------------------------
// Horizontal bar chart: mean revenue per group
// ---------------------------------------------------------------------------

/// One bar per group, bottom to top in the given (ascending) order.
pub fn revenue_bar_chart(ui: &mut Ui, id: &str, means: &[(String, f64)]) {
    let colors = generate_palette(means.len());
    let bars: Vec<Bar> = means
        .iter()
        .zip(colors)
        .enumerate()
        .map(|(i, ((group, mean), color))| {
            Bar::new(i as f64, *mean)
                .name(group)
                .fill(color)
                .width(0.7)
        })
        .collect();

    let names: Vec<String> = means.iter().map(|(g, _)| g.clone()).collect();

    Plot::new(id)
        .height((means.len() as f32 * 28.0).clamp(160.0, 420.0))
        .x_axis_label("Average Ad Revenue (USD)")
        .y_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            names.get(idx as usize).cloned().unwrap_or_default()
        })
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

// ---------------------------------------------------------------------------
// Annotated correlation heatmap
// ---------------------------------------------------------------------------

/// Grid of coloured cells, each annotated with its coefficient.
pub fn correlation_heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    let n = matrix.columns.len();
    if n == 0 {
        ui.label("No numeric columns.");
        return;
    }
    let cell = ((ui.available_width() - 170.0) / n as f32).clamp(36.0, 80.0);

    egui::Grid::new("correlation_heatmap")
        .spacing(vec2(2.0, 2.0))
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for col in &matrix.columns {
                ui.add_sized(
                    [cell, 20.0],
                    egui::Label::new(RichText::new(short(col)).small()).truncate(),
                )
                .on_hover_text(col);
            }
            ui.end_row();

            for (i, row_name) in matrix.columns.iter().enumerate() {
                ui.label(RichText::new(row_name).small());
                for j in 0..n {
                    let r = matrix.get(i, j);
                    let (rect, response) = ui.allocate_exact_size(vec2(cell, 26.0), Sense::hover());
                    let fill = diverging(r);
                    let painter = ui.painter();
                    painter.rect_filled(rect, 2.0, fill);
                    let text = if r.is_nan() { "nan".to_string() } else { format!("{r:.2}") };
                    painter.text(
                        rect.center(),
                        Align2::CENTER_CENTER,
                        text,
                        FontId::proportional(12.0),
                        text_on(fill),
                    );
                    response.on_hover_text(format!("{row_name} × {}", matrix.columns[j]));
                }
                ui.end_row();
            }
        });
}

/// Column header abbreviation: `watch_time_minutes` → `watch_time_…`.
fn short(name: &str) -> String {
    const MAX: usize = 12;
    if name.chars().count() <= MAX {
        name.to_string()
    } else {
        let head: String = name.chars().take(MAX - 1).collect();
        format!("{head}…")
    }
}

#[cfg(test)]
mod tests {
    use super::short;

    #[test]
    fn short_names_are_kept_and_long_ones_truncated() {
        assert_eq!(short("views"), "views");
        assert_eq!(short("watch_time_minutes"), "watch_time_…");
    }
}
