//! Single-page SVG rendering of a [`Report`] on top of `plotters`.
//!
//! Frames come straight from the report layout (points, top-left origin),
//! so the page opens at A4 size in any browser or vector editor.

use super::ReportRenderer;
use crate::error::{ReportError, ReportResult};
use crate::report::{Chart, ChartData, Panel, Rect, Report, Rgb, Slice, PAGE_HEIGHT, PAGE_WIDTH};
use chrono::{Duration, NaiveDate};
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle};

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

pub struct SvgRenderer {
    page_size: (u32, u32),
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self {
            page_size: (PAGE_WIDTH.round() as u32, PAGE_HEIGHT.round() as u32),
        }
    }

    pub fn render_to_string(&self, report: &Report) -> ReportResult<String> {
        let mut out = String::new();
        {
            let root = SVGBackend::with_string(&mut out, self.page_size).into_drawing_area();
            root.fill(&WHITE).map_err(render_err)?;

            root.draw(&Text::new(
                report.title.clone(),
                (100, 50),
                TextStyle::from(font(16.0, FontStyle::Bold)).pos(Pos::new(HPos::Left, VPos::Bottom)),
            ))
            .map_err(render_err)?;

            for panel in &report.panels {
                draw_panel(&root, panel)?;
            }
            for chart in &report.charts {
                draw_chart(&root, chart)?;
            }

            root.present().map_err(render_err)?;
        }
        Ok(out)
    }
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportRenderer for SvgRenderer {
    fn render(&self, report: &Report) -> ReportResult<Vec<u8>> {
        Ok(self.render_to_string(report)?.into_bytes())
    }

    fn extension(&self) -> &'static str {
        "svg"
    }
}

fn render_err<E: std::fmt::Display>(err: E) -> ReportError {
    ReportError::Render(err.to_string())
}

fn font(size: f64, style: FontStyle) -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, size, style)
}

fn rgb((r, g, b): Rgb) -> RGBColor {
    RGBColor(r, g, b)
}

fn corners(frame: &Rect) -> [(i32, i32); 2] {
    [
        (frame.x.round() as i32, frame.y.round() as i32),
        ((frame.x + frame.width).round() as i32, frame.bottom().round() as i32),
    ]
}

fn sub_area<'a>(root: &Area<'a>, frame: &Rect) -> Area<'a> {
    let [(x0, y0), (x1, y1)] = corners(frame);
    root.clone().shrink((x0, y0), (x1 - x0, y1 - y0))
}

/// Whole days from `start`, the x coordinate of every line chart.
fn day_offset(start: NaiveDate, date: NaiveDate) -> i32 {
    (date - start).num_days() as i32
}

fn draw_panel(root: &Area, panel: &Panel) -> ReportResult<()> {
    root.draw(&Rectangle::new(corners(&panel.frame), BLACK.stroke_width(1)))
        .map_err(render_err)?;

    let x = |offset: f64| (panel.frame.x + offset).round() as i32;
    let baseline = |line: usize| panel.baseline(line).round() as i32;
    let anchor = Pos::new(HPos::Left, VPos::Bottom);

    let mut line = 0;
    if let Some(heading) = &panel.heading {
        root.draw(&Text::new(
            heading.clone(),
            (x(10.0), baseline(line)),
            TextStyle::from(font(12.0, FontStyle::Bold)).pos(anchor),
        ))
        .map_err(render_err)?;
        line += 1;
    }

    for row in &panel.rows {
        let style = if row.bold { FontStyle::Bold } else { FontStyle::Normal };
        for (cell, &offset) in row.cells.iter().zip(&panel.columns) {
            if cell.is_empty() {
                continue;
            }
            root.draw(&Text::new(
                cell.clone(),
                (x(offset), baseline(line)),
                TextStyle::from(font(10.0, style)).pos(anchor),
            ))
            .map_err(render_err)?;
        }
        line += 1;
    }

    Ok(())
}

fn draw_chart(root: &Area, chart: &Chart) -> ReportResult<()> {
    let area = sub_area(root, &chart.frame);
    match &chart.data {
        ChartData::Line { y_label, series } => draw_line_chart(&area, chart, y_label, series),
        ChartData::Pie { slices } => draw_pie_chart(&area, &chart.title, slices),
    }
}

fn draw_line_chart(
    area: &Area,
    chart: &Chart,
    y_label: &str,
    series: &[crate::report::LineSeries],
) -> ReportResult<()> {
    let (Some((min, max)), Some((start, end))) = (chart.value_bounds(), chart.date_bounds()) else {
        area.titled(&chart.title, font(9.0, FontStyle::Bold)).map_err(render_err)?;
        return Ok(());
    };

    let span = day_offset(start, end).max(1);
    let mut plot = ChartBuilder::on(area)
        .caption(&chart.title, font(9.0, FontStyle::Bold))
        .margin(4)
        .x_label_area_size(18)
        .y_label_area_size(28)
        .build_cartesian_2d(0..span, min..max)
        .map_err(render_err)?;

    let date_label = |offset: &i32| (start + Duration::days(*offset as i64)).format("%d/%m/%y").to_string();
    let visits = series.first().map_or(0, |s| s.points.len());
    plot.configure_mesh()
        .disable_mesh()
        .x_labels(visits.clamp(2, 6))
        .x_label_formatter(&date_label)
        .y_labels(3)
        .y_label_formatter(&|v| format!("{:.1}", v))
        .y_desc(y_label)
        .label_style(font(6.0, FontStyle::Normal))
        .axis_desc_style(font(7.0, FontStyle::Normal))
        .draw()
        .map_err(render_err)?;

    for line in series {
        let color = rgb(line.color);
        let points: Vec<(i32, f64)> = line
            .points
            .iter()
            .map(|&(date, value)| (day_offset(start, date), value))
            .collect();

        plot.draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(1)))
            .map_err(render_err)?
            .label(line.name.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], color.stroke_width(1)));
        plot.draw_series(points.iter().map(|&point| Circle::new(point, 2, color.filled())))
            .map_err(render_err)?;
    }

    if series.len() > 1 {
        plot.configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font(font(6.0, FontStyle::Normal))
            .draw()
            .map_err(render_err)?;
    }

    Ok(())
}

fn draw_pie_chart(area: &Area, title: &str, slices: &[Slice]) -> ReportResult<()> {
    let plot = area.titled(title, font(9.0, FontStyle::Bold)).map_err(render_err)?;

    let sizes: Vec<f64> = slices.iter().map(|s| s.value.max(0.0)).collect();
    if sizes.iter().sum::<f64>() <= 0.0 {
        return Ok(());
    }
    let colors: Vec<RGBColor> = slices.iter().map(|s| rgb(s.color)).collect();
    let labels: Vec<&str> = slices.iter().map(|s| s.label.as_str()).collect();

    let (width, height) = plot.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = (width.min(height) as f64 / 2.0 - 8.0).max(1.0);

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(140.0);
    pie.label_style(font(6.0, FontStyle::Normal));
    pie.percentages(font(7.0, FontStyle::Normal));
    plot.draw(&pie).map_err(render_err)
}
