use eframe::egui::{Color32, Pos2, RichText, Sense, Shape, Stroke, Ui, Vec2};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::chart::spec::{BarSeries, ChartSpec, Region};
use crate::color::{CategoryColors, blues};
use crate::state::{AppState, ChartId};

// ---------------------------------------------------------------------------
// Chart grid (central panel)
// ---------------------------------------------------------------------------

/// Render the five charts: donuts and bar stacked on the left, map and
/// trend line on the right.
pub fn chart_grid(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a dataset to view charts  (File → Open Data…)");
        });
        return;
    }

    let row_height = (ui.available_height() - 32.0) / 3.0;
    ui.columns(2, |cols: &mut [Ui]| {
        for chart in [ChartId::AgeDonut, ChartId::SexDonut, ChartId::AgeSexBar] {
            if let Some(spec) = state.chart(chart) {
                draw_spec(&mut cols[0], spec, row_height);
            }
        }
        if let Some(spec) = state.chart(ChartId::Map) {
            draw_spec(&mut cols[1], spec, row_height * 1.8);
        }
        if let Some(spec) = state.chart(ChartId::Trend) {
            draw_spec(&mut cols[1], spec, row_height * 1.1);
        }
    });
}

fn draw_spec(ui: &mut Ui, spec: &ChartSpec, height: f32) {
    ui.strong(spec.title());

    if spec.is_empty() {
        ui.label(RichText::new("No rows match the current selection.").weak());
        ui.add_space(height * 0.5);
        return;
    }

    match spec {
        ChartSpec::Donut {
            categories, values, ..
        } => draw_donut(ui, categories, values, height - 24.0),
        ChartSpec::GroupedBar {
            x_label,
            y_label,
            categories,
            series,
            ..
        } => draw_grouped_bar(ui, spec.title(), x_label, y_label, categories, series, height - 24.0),
        ChartSpec::Choropleth {
            value_label,
            regions,
            ..
        } => draw_choropleth(ui, value_label, regions, height - 24.0),
        ChartSpec::TrendLine {
            x_label,
            y_label,
            points,
            ..
        } => draw_trend_line(ui, spec.title(), x_label, y_label, points, height - 24.0),
    }
    ui.add_space(8.0);
}

// ---------------------------------------------------------------------------
// Donut
// ---------------------------------------------------------------------------

fn draw_donut(ui: &mut Ui, categories: &[String], values: &[f64], height: f32) {
    let total: f64 = values.iter().sum();
    let colors = CategoryColors::new(categories);

    ui.horizontal(|ui: &mut Ui| {
        let side = height.clamp(60.0, 180.0);
        let (rect, _) = ui.allocate_exact_size(Vec2::splat(side), Sense::hover());
        let painter = ui.painter_at(rect);

        let center = rect.center();
        let outer = side * 0.5 - 2.0;
        let inner = outer * 0.4; // 40% hole

        if total > 0.0 {
            let mut start = -std::f32::consts::FRAC_PI_2;
            for (cat, &val) in categories.iter().zip(values) {
                let sweep = (val / total) as f32 * std::f32::consts::TAU;
                donut_wedge(
                    &painter,
                    center,
                    inner,
                    outer,
                    start,
                    start + sweep,
                    colors.color_for(cat),
                );
                start += sweep;
            }
        }

        ui.vertical(|ui: &mut Ui| {
            for (cat, &val) in categories.iter().zip(values) {
                let pct = if total > 0.0 { val / total * 100.0 } else { 0.0 };
                ui.horizontal(|ui: &mut Ui| {
                    let (swatch, _) =
                        ui.allocate_exact_size(Vec2::new(10.0, 10.0), Sense::hover());
                    ui.painter().rect_filled(swatch, 2.0, colors.color_for(cat));
                    ui.label(format!("{cat}: {pct:.1}%"));
                });
            }
        });
    });
}

/// Fill an annulus sector with small convex quads, one per angular step.
fn donut_wedge(
    painter: &eframe::egui::Painter,
    center: Pos2,
    inner: f32,
    outer: f32,
    start: f32,
    end: f32,
    color: Color32,
) {
    let steps = (((end - start) / 0.12).ceil() as usize).max(1);
    let step = (end - start) / steps as f32;
    let point = |angle: f32, r: f32| center + Vec2::new(angle.cos(), angle.sin()) * r;

    for i in 0..steps {
        let a0 = start + step * i as f32;
        let a1 = a0 + step;
        painter.add(Shape::convex_polygon(
            vec![
                point(a0, inner),
                point(a0, outer),
                point(a1, outer),
                point(a1, inner),
            ],
            color,
            Stroke::NONE,
        ));
    }
}

// ---------------------------------------------------------------------------
// Grouped bar
// ---------------------------------------------------------------------------

fn draw_grouped_bar(
    ui: &mut Ui,
    id: &str,
    x_label: &str,
    y_label: &str,
    categories: &[String],
    series: &[BarSeries],
    height: f32,
) {
    let colors = CategoryColors::new(
        &series.iter().map(|s| s.name.clone()).collect::<Vec<_>>(),
    );
    let n_series = series.len().max(1);
    let bar_width = 0.8 / n_series as f64;

    let ticks = categories.to_vec();
    Plot::new(id.to_string())
        .legend(Legend::default())
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < ticks.len() {
                ticks[idx as usize].clone()
            } else {
                String::new()
            }
        })
        .height(height)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (si, s) in series.iter().enumerate() {
                let offset = (si as f64 - (n_series as f64 - 1.0) / 2.0) * bar_width;
                let bars: Vec<Bar> = s
                    .values
                    .iter()
                    .enumerate()
                    .map(|(ci, &v)| Bar::new(ci as f64 + offset, v).width(bar_width * 0.95))
                    .collect();
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .name(&s.name)
                        .color(colors.color_for(&s.name)),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Choropleth (rendered as a shaded ranking, worst-hit country first)
// ---------------------------------------------------------------------------

fn draw_choropleth(ui: &mut Ui, value_label: &str, regions: &[Region], height: f32) {
    let mut ranked: Vec<&Region> = regions.iter().collect();
    ranked.sort_by(|a, b| b.value.total_cmp(&a.value));

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(140.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::remainder())
        .max_scroll_height(height)
        .header(18.0, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong("Country");
            });
            header.col(|ui: &mut Ui| {
                ui.strong(value_label);
            });
            header.col(|_ui: &mut Ui| {});
        })
        .body(|mut body| {
            for region in ranked {
                body.row(16.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.label(&region.location);
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(format!("{:.0}", region.value));
                    });
                    row.col(|ui: &mut Ui| {
                        let (rect, _) = ui.allocate_exact_size(
                            Vec2::new(ui.available_width(), 12.0),
                            Sense::hover(),
                        );
                        let mut shaded = rect;
                        shaded.set_width(rect.width() * region.intensity as f32);
                        ui.painter().rect_filled(shaded, 2.0, blues(region.intensity));
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Trend line
// ---------------------------------------------------------------------------

fn draw_trend_line(
    ui: &mut Ui,
    id: &str,
    x_label: &str,
    y_label: &str,
    points: &[[f64; 2]],
    height: f32,
) {
    let line_color = Color32::LIGHT_BLUE;

    Plot::new(id.to_string())
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .x_axis_formatter(|mark, _range| format!("{:.0}", mark.value))
        .height(height)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            let line_points: PlotPoints = points.iter().copied().collect();
            plot_ui.line(Line::new(line_points).color(line_color).width(2.0));

            let marker_points: PlotPoints = points.iter().copied().collect();
            plot_ui.points(Points::new(marker_points).color(line_color).radius(2.5));
        });
}
