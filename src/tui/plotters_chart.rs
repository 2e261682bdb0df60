//! Plotters-powered trial chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::Panel;
use crate::plot::axis_range;

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct TrialChart<'a> {
    /// Raw signal samples.
    pub signal: &'a [(f64, f64)],
    /// Fitted segment between the two endpoints, if the fit succeeded.
    pub fit: Option<[(f64, f64); 2]>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
}

impl<'a> TrialChart<'a> {
    pub fn from_panel(panel: &'a Panel) -> Self {
        let (x_bounds, y_bounds) = chart_bounds(panel);
        Self {
            signal: &panel.points,
            fit: panel
                .endpoints
                .map(|e| [(e.start.x, e.start.y), (e.end.x, e.end.y)]),
            x_bounds,
            y_bounds,
            x_label: "time (s)",
            y_label: "position",
        }
    }
}

impl Widget for TrialChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| format!("{v:.2}"))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let signal_color = RGBColor(0, 255, 255); // cyan
            let fit_color = RGBColor(255, 255, 0); // yellow
            let marker_color = RGBColor(255, 0, 0); // red

            chart.draw_series(LineSeries::new(self.signal.iter().copied(), &signal_color))?;

            if let Some(fit) = self.fit {
                chart.draw_series(DashedLineSeries::new(
                    fit.iter().copied(),
                    4,
                    3,
                    fit_color.stroke_width(1),
                ))?;
                // Circle radii come out wrong through the ratatui backend, so
                // endpoints are single colored pixels.
                chart.draw_series(fit.iter().map(|&(x, y)| Pixel::new((x, y), marker_color)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Axis bounds covering the samples and both endpoints, with 5% y padding.
pub fn chart_bounds(panel: &Panel) -> ([f64; 2], [f64; 2]) {
    let endpoints = || {
        panel
            .endpoints
            .iter()
            .flat_map(|e| [(e.start.x, e.start.y), (e.end.x, e.end.y)])
    };
    let (x_min, x_max) =
        axis_range(panel.points.iter().copied().chain(endpoints()).map(|(x, _)| x)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) =
        axis_range(panel.points.iter().copied().chain(endpoints()).map(|(_, y)| y)).unwrap_or((0.0, 1.0));

    let pad = (y_max - y_min) * 0.05;
    ([x_min, x_max], [y_min - pad, y_max + pad])
}
