use eframe::egui;

use crate::pipeline::TrendChart;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct GateTrendsApp {
    pub state: AppState,
}

impl GateTrendsApp {
    pub fn new(chart: TrendChart) -> Self {
        Self {
            state: AppState::new(chart),
        }
    }
}

impl eframe::App for GateTrendsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Screenshot requested from File → Save PNG… ----
        let screenshot = ctx.input(|i| {
            i.raw.events.iter().find_map(|e| match e {
                egui::Event::Screenshot { image, .. } => Some(image.clone()),
                _ => None,
            })
        });
        if let Some(image) = screenshot {
            self.state.finish_export(&image);
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Right side panel: averages ----
        if self.state.show_averages {
            egui::SidePanel::right("averages_panel")
                .default_width(320.0)
                .resizable(true)
                .show(ctx, |ui| {
                    panels::averages_panel(ui, &self.state);
                });
        }

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::trend_plot(ui, &self.state);
        });
    }
}
