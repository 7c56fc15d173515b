use std::path::PathBuf;

use eframe::egui::ColorImage;

use crate::pipeline::TrendChart;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Computed once before the window opens.
    pub chart: TrendChart,

    /// Draw the faint per-row lines behind the averages.
    pub show_row_traces: bool,

    /// Show the averages table in the right-hand panel.
    pub show_averages: bool,

    /// Destination of a requested screenshot, until the frame arrives.
    pub pending_export: Option<PathBuf>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(chart: TrendChart) -> Self {
        Self {
            chart,
            show_row_traces: true,
            show_averages: false,
            pending_export: None,
            status_message: None,
        }
    }

    /// Remember where the next screenshot should go.
    pub fn request_export(&mut self, path: PathBuf) {
        self.status_message = None;
        self.pending_export = Some(path);
    }

    /// Save a screenshot if one was requested. Returns whether it was consumed.
    pub fn finish_export(&mut self, image: &ColorImage) -> bool {
        let Some(path) = self.pending_export.take() else {
            return false;
        };
        self.status_message = Some(match crate::export::save_png(&path, image) {
            Ok(()) => format!("Saved {}", path.display()),
            Err(e) => {
                log::error!("Failed to save chart: {e:#}");
                format!("Error: {e:#}")
            }
        });
        true
    }
}
