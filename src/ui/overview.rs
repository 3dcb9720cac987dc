use eframe::egui::{RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::TARGET_COLUMN;
use crate::state::AppState;

const PREVIEW_ROWS: usize = 5;

pub fn overview(ui: &mut Ui, state: &AppState) {
    let ds = &state.context.dataset;

    ui.heading("📌 Project Overview");
    ui.label(
        "This project analyzes YouTube video performance data to understand the \
         factors affecting ad revenue and uses a machine learning pipeline to \
         predict future revenue.",
    );
    ui.add_space(8.0);

    ui.columns(3, |cols| {
        metric(&mut cols[0], "Total Videos", &ds.len().to_string());
        metric(&mut cols[1], "Total Features", &ds.column_names.len().to_string());
        metric(&mut cols[2], "Target Variable", TARGET_COLUMN);
    });
    ui.add_space(12.0);

    ui.heading("📂 Dataset Preview");
    ScrollArea::horizontal()
        .id_salt("preview_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .id_salt("preview")
                .striped(true)
                .columns(Column::auto().at_least(60.0), ds.column_names.len())
                .header(20.0, |mut header| {
                    for name in &ds.column_names {
                        header.col(|ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|mut body| {
                    for row in ds.head(PREVIEW_ROWS) {
                        body.row(18.0, |mut table_row| {
                            for cell in &row {
                                table_row.col(|ui| {
                                    ui.label(cell);
                                });
                            }
                        });
                    }
                });
        });
    ui.add_space(12.0);

    ui.heading("Summary Statistics");
    TableBuilder::new(ui)
        .id_salt("summary")
        .striped(true)
        .column(Column::auto().at_least(160.0))
        .columns(Column::auto().at_least(80.0), 5)
        .header(20.0, |mut header| {
            for title in ["column", "count", "mean", "std", "min", "max"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for s in &state.insights.summaries {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(&s.column);
                    });
                    for v in [s.count as f64, s.mean, s.std, s.min, s.max] {
                        row.col(|ui| {
                            ui.label(format!("{v:.2}"));
                        });
                    }
                });
            }
        });
}

fn metric(ui: &mut Ui, label: &str, value: &str) {
    ui.label(label);
    ui.label(RichText::new(value).size(26.0).strong());
}
