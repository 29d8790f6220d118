pub mod charts;

use crate::config::ReportConfig;
use crate::indicators::{format_amount, format_amount_signed, format_measure, with_unit, IndicatorRow};
use crate::ingest::{VisitRecord, VisitSeries};
use crate::error::{ReportError, ReportResult};
use chrono::NaiveDate;
use serde::Serialize;

pub use charts::*;

/// A4 in PostScript points.
pub const PAGE_WIDTH: f64 = 595.28;
pub const PAGE_HEIGHT: f64 = 841.89;
pub const MARGIN: f64 = 50.0;
pub const LINE_HEIGHT: f64 = 16.0;

const INFO_Y: f64 = 60.0;
const SUMMARY_Y: f64 = 176.0;
const COMPOSITION_Y: f64 = 398.0;
const SUMMARY_COLUMNS: [f64; 5] = [10.0, 140.0, 225.0, 305.0, 385.0];

/// Rectangle with a top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[cfg(test)]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelRow {
    pub cells: Vec<String>,
    pub bold: bool,
}

/// Boxed block of text lines laid out in columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub frame: Rect,
    pub heading: Option<String>,
    /// Column x offsets relative to the frame.
    pub columns: Vec<f64>,
    pub rows: Vec<PanelRow>,
}

impl Panel {
    fn lines(frame: Rect, heading: Option<&str>, lines: Vec<String>) -> Self {
        Self {
            frame,
            heading: heading.map(str::to_string),
            columns: vec![10.0],
            rows: lines
                .into_iter()
                .map(|line| PanelRow { cells: vec![line], bold: false })
                .collect(),
        }
    }

    /// Baseline of line `index`, counting the heading as line 0.
    pub fn baseline(&self, index: usize) -> f64 {
        self.frame.y + LINE_HEIGHT * (index as f64 + 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectInfo {
    pub name: String,
    pub gender: String,
    pub age: u32,
    pub height: f64,
    pub first_visit: NaiveDate,
    pub latest_visit: NaiveDate,
    pub visits: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub title: String,
    pub page: Rect,
    pub subject: SubjectInfo,
    pub summary: Vec<IndicatorRow>,
    pub panels: Vec<Panel>,
    pub charts: Vec<Chart>,
}

pub fn build_report(
    series: &VisitSeries,
    rows: Vec<IndicatorRow>,
    config: &ReportConfig,
) -> ReportResult<Report> {
    let (first, latest) = match (series.first(), series.latest()) {
        (Some(first), Some(latest)) => (first, latest),
        _ => return Err(ReportError::InsufficientData(series.len())),
    };

    let subject = SubjectInfo {
        name: first.name.clone(),
        gender: first.gender.to_string(),
        age: first.age,
        height: first.height,
        first_visit: first.date,
        latest_visit: latest.date,
        visits: series.len(),
    };

    let panels = vec![
        info_panel(&subject),
        summary_panel(&rows),
        composition_panel(latest),
    ];
    let charts = build_charts(series, config.include_body_water);

    Ok(Report {
        title: config.title.clone(),
        page: Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT),
        subject,
        summary: rows,
        panels,
        charts,
    })
}

fn content_width() -> f64 {
    PAGE_WIDTH - 2.0 * MARGIN
}

fn info_panel(subject: &SubjectInfo) -> Panel {
    let lines = vec![
        format!("Nombre: {}", subject.name),
        format!("Genero: {}", subject.gender),
        format!("Edad: {}", subject.age),
        format!("Fecha: {}", subject.latest_visit.format("%Y-%m-%d")),
        format!("Altura: {} cm", subject.height),
    ];
    let frame = Rect::new(MARGIN, INFO_Y, content_width(), LINE_HEIGHT * (lines.len() as f64 + 1.0) + 10.0);
    Panel::lines(frame, None, lines)
}

fn summary_panel(rows: &[IndicatorRow]) -> Panel {
    let mut panel_rows = vec![PanelRow {
        cells: ["Indicador", "Actual", "Ultimo", "General", "Clasificación"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        bold: true,
    }];

    for row in rows {
        panel_rows.push(PanelRow {
            cells: vec![
                row.label.clone(),
                with_unit(format_amount(row.latest), &row.unit),
                with_unit(format_amount_signed(row.delta_prev), &row.unit),
                with_unit(format_amount_signed(row.delta_first), &row.unit),
                row.classification.clone().unwrap_or_default(),
            ],
            bold: false,
        });
    }

    // heading + column header + up to ten indicator rows
    let frame = Rect::new(MARGIN, SUMMARY_Y, content_width(), LINE_HEIGHT * 12.0 + 16.0);
    Panel {
        frame,
        heading: Some("Resumen de las Evaluaciones".to_string()),
        columns: SUMMARY_COLUMNS.to_vec(),
        rows: panel_rows,
    }
}

fn composition_panel(latest: &VisitRecord) -> Panel {
    let mut lines = Vec::new();
    if let Some(water) = latest.body_water_pct {
        lines.push(format!("Agua Corporal: {}%", format_measure(water)));
    }
    lines.push(format!("Grasa Visceral: {}", format_measure(latest.visceral_fat)));
    if let Some(bone) = latest.bone_mass {
        lines.push(format!("Masa Ósea: {} kg", format_measure(bone)));
    }
    lines.push(format!("IMC: {}", format_measure(latest.bmi)));
    if let Some(current) = latest.current_fat_pct {
        lines.push(format!("Grasa Actual: {}%", format_measure(current)));
    }

    let frame = Rect::new(MARGIN, COMPOSITION_Y, content_width(), LINE_HEIGHT * 6.0 + 16.0);
    Panel::lines(frame, Some("Composición Corporal"), lines)
}
