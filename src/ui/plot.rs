use eframe::egui::{self, Align2, FontId, Painter, Pos2, Rect, Shape, Stroke, Ui, Vec2};
use egui_plot::{GridInput, GridMark, Line, MarkerShape, Plot, PlotPoints, Points};

use crate::color::TRACE_COLOR;
use crate::config::MarkerStyle;
use crate::state::AppState;
use crate::ui::layout::{ChartLayout, LegendEntry};

/// Marker radius in points; roughly matplotlib's `s=100`.
const MARKER_RADIUS: f32 = 5.0;

fn marker_shape(style: MarkerStyle) -> MarkerShape {
    match style {
        MarkerStyle::Circle => MarkerShape::Circle,
        MarkerStyle::Cross => MarkerShape::Cross,
        MarkerStyle::TriangleUp => MarkerShape::Up,
        MarkerStyle::Square => MarkerShape::Square,
        MarkerStyle::Diamond => MarkerShape::Diamond,
        MarkerStyle::Plus => MarkerShape::Plus,
    }
}

// ---------------------------------------------------------------------------
// Trend plot (central panel)
// ---------------------------------------------------------------------------

/// Render the category trend plot in the central panel.
pub fn trend_plot(ui: &mut Ui, state: &AppState) {
    let layout = &state.chart.layout;
    let (x_min, x_max) = layout.x_bounds();

    let tick_positions: Vec<f64> = layout.ticks.iter().map(|(x, _)| *x).collect();
    let tick_labels = layout.ticks.clone();

    // No `.legend(..)`; the legend is painted by hand, keyed by metric.
    let response = Plot::new("trend_plot")
        .x_axis_label(layout.x_label.as_str())
        .y_axis_label(layout.y_label.as_str())
        .show_grid(true)
        .x_grid_spacer(move |_input: GridInput| {
            tick_positions
                .iter()
                .map(|&value| GridMark {
                    value,
                    step_size: 1.0,
                })
                .collect()
        })
        .x_axis_formatter(move |mark, _range| {
            tick_labels
                .iter()
                .find(|(x, _)| (x - mark.value).abs() < 1e-6)
                .map(|(_, label)| label.clone())
                .unwrap_or_default()
        })
        .include_x(x_min)
        .include_x(x_max)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            if state.show_row_traces {
                for trace in &layout.row_traces {
                    for seg in &trace.segments {
                        plot_ui.line(
                            Line::new(PlotPoints::new(seg.clone()))
                                .name(format!("{} row {}", trace.category, trace.row))
                                .color(TRACE_COLOR)
                                .width(1.0),
                        );
                    }
                }
            }

            for trend in &layout.trend_lines {
                for seg in &trend.segments {
                    plot_ui.line(
                        Line::new(PlotPoints::new(seg.clone()))
                            .name(&trend.category)
                            .color(trend.color)
                            .width(1.5),
                    );
                }
            }

            for series in &layout.markers {
                plot_ui.points(
                    Points::new(PlotPoints::new(series.points.clone()))
                        .name(&series.metric)
                        .shape(marker_shape(series.marker))
                        .radius(MARKER_RADIUS)
                        .filled(true)
                        .color(series.color),
                );
            }
        });

    paint_legend(ui, response.response.rect, layout);
}

// ---------------------------------------------------------------------------
// Manual legend
// ---------------------------------------------------------------------------

fn paint_legend(ui: &Ui, plot_rect: Rect, layout: &ChartLayout) {
    if layout.legend.is_empty() {
        return;
    }
    let painter = ui.painter_at(plot_rect);
    let font = FontId::proportional(12.0);
    let text_color = ui.visuals().text_color();
    let row_height = 18.0;
    let swatch = 2.0 * MARKER_RADIUS + 8.0;

    let galleys: Vec<_> = layout
        .legend
        .iter()
        .map(|e| painter.layout_no_wrap(e.label.clone(), font.clone(), text_color))
        .collect();
    let text_width = galleys.iter().map(|g| g.size().x).fold(0.0, f32::max);

    let size = Vec2::new(
        swatch + text_width + 12.0,
        row_height * galleys.len() as f32 + 8.0,
    );
    let frame = Rect::from_min_size(
        Pos2::new(plot_rect.right() - size.x - 8.0, plot_rect.top() + 8.0),
        size,
    );
    painter.rect_filled(frame, 4.0, ui.visuals().extreme_bg_color.gamma_multiply(0.9));
    painter.rect_stroke(
        frame,
        4.0,
        ui.visuals().widgets.noninteractive.bg_stroke,
        egui::StrokeKind::Inside,
    );

    for (i, (entry, galley)) in layout.legend.iter().zip(galleys).enumerate() {
        let y = frame.top() + 4.0 + row_height * (i as f32 + 0.5);
        let center = Pos2::new(frame.left() + 4.0 + swatch / 2.0, y);
        paint_marker(&painter, center, entry);
        let text_pos = Pos2::new(frame.left() + 4.0 + swatch, y);
        let anchor = Align2::LEFT_CENTER.anchor_size(text_pos, galley.size());
        painter.galley(anchor.min, galley, text_color);
    }
}

fn paint_marker(painter: &Painter, c: Pos2, entry: &LegendEntry) {
    let r = MARKER_RADIUS;
    let color = entry.color;
    let stroke = Stroke::new(r * 0.6, color);
    match entry.marker {
        MarkerStyle::Circle => {
            painter.circle_filled(c, r, color);
        }
        MarkerStyle::Square => {
            painter.rect_filled(Rect::from_center_size(c, Vec2::splat(1.6 * r)), 0.0, color);
        }
        MarkerStyle::TriangleUp => {
            let h = r * 0.87;
            let points = vec![
                Pos2::new(c.x, c.y - r),
                Pos2::new(c.x - h, c.y + r * 0.5),
                Pos2::new(c.x + h, c.y + r * 0.5),
            ];
            painter.add(Shape::convex_polygon(points, color, Stroke::NONE));
        }
        MarkerStyle::Diamond => {
            let points = vec![
                Pos2::new(c.x, c.y - r),
                Pos2::new(c.x + r, c.y),
                Pos2::new(c.x, c.y + r),
                Pos2::new(c.x - r, c.y),
            ];
            painter.add(Shape::convex_polygon(points, color, Stroke::NONE));
        }
        MarkerStyle::Cross => {
            let d = r * 0.8;
            painter.line_segment([c + Vec2::new(-d, -d), c + Vec2::new(d, d)], stroke);
            painter.line_segment([c + Vec2::new(-d, d), c + Vec2::new(d, -d)], stroke);
        }
        MarkerStyle::Plus => {
            painter.line_segment([c + Vec2::new(-r, 0.0), c + Vec2::new(r, 0.0)], stroke);
            painter.line_segment([c + Vec2::new(0.0, -r), c + Vec2::new(0.0, r)], stroke);
        }
    }
}
