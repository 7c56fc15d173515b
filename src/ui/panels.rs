use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Save PNG…").clicked() {
                save_file_dialog(ui.ctx(), state);
                ui.close_menu();
            }
        });

        ui.separator();

        let chart = &state.chart;
        ui.label(format!(
            "{} rows, {} averages ({} categories × {} metrics)",
            chart.table.len(),
            chart.records.len(),
            chart.config.display_order.len(),
            chart.config.columns_to_average.len()
        ));

        ui.separator();

        if ui
            .selectable_label(state.show_row_traces, "Row traces")
            .clicked()
        {
            state.show_row_traces = !state.show_row_traces;
        }
        if ui
            .selectable_label(state.show_averages, "Averages table")
            .clicked()
        {
            state.show_averages = !state.show_averages;
        }

        if let Some(msg) = &state.status_message {
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                ui.visuals().text_color()
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// Right side panel – averages table
// ---------------------------------------------------------------------------

/// One row per metric, one column per category in display order.
pub fn averages_panel(ui: &mut Ui, state: &AppState) {
    ui.heading("Averages");
    ui.separator();

    let chart = &state.chart;
    let categories = &chart.config.display_order;

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(140.0))
        .columns(Column::auto().at_least(60.0), categories.len())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Metric");
            });
            for category in categories {
                header.col(|ui| {
                    ui.strong(category);
                });
            }
        })
        .body(|mut body| {
            for metric in &chart.config.columns_to_average {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(metric);
                    });
                    for category in categories {
                        let mean = chart.average(category, metric);
                        row.col(|ui| {
                            if mean.is_nan() {
                                ui.label(RichText::new("n/a").color(Color32::GRAY));
                            } else {
                                ui.monospace(format!("{mean:.3}"));
                            }
                        });
                    }
                });
            }
            body.row(18.0, |mut row| {
                row.col(|ui| {
                    ui.label(RichText::new("rows").italics());
                });
                for category in categories {
                    let n = chart.rows_used(category);
                    row.col(|ui| {
                        ui.monospace(n.to_string());
                    });
                }
            });
        });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn save_file_dialog(ctx: &egui::Context, state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save chart")
        .add_filter("PNG", &["png"])
        .set_file_name("gate_trends.png")
        .save_file();

    if let Some(path) = file {
        log::info!("Capturing chart for {}", path.display());
        state.request_export(path);
        ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(Default::default()));
    }
}
