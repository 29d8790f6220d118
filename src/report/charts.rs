use super::{Rect, MARGIN, PAGE_WIDTH};
use crate::ingest::{VisitRecord, VisitSeries};
use chrono::NaiveDate;
use serde::Serialize;

pub const CHART_WIDTH: f64 = 240.0;
pub const CHART_HEIGHT: f64 = 100.0;
const CHART_ROWS: [f64; 3] = [520.0, 625.0, 730.0];

/// RGB 0-255.
pub type Rgb = (u8, u8, u8);

const PRIMARY: Rgb = (31, 119, 180);
const SECONDARY: Rgb = (255, 127, 14);
const PIE_LEAN: Rgb = (255, 153, 153);
const PIE_FAT: Rgb = (102, 179, 255);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub name: String,
    pub color: Rgb,
    pub points: Vec<(NaiveDate, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub value: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartData {
    Line { y_label: String, series: Vec<LineSeries> },
    Pie { slices: Vec<Slice> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    pub frame: Rect,
    pub data: ChartData,
}

impl Chart {
    /// Value range over all line series, widened when flat.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        let series = match &self.data {
            ChartData::Line { series, .. } => series,
            ChartData::Pie { .. } => return None,
        };

        let values = series.iter().flat_map(|s| s.points.iter().map(|&(_, v)| v));
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

        if !min.is_finite() {
            None
        } else if (max - min).abs() < f64::EPSILON {
            Some((min - 1.0, max + 1.0))
        } else {
            Some((min, max))
        }
    }

    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let series = match &self.data {
            ChartData::Line { series, .. } => series,
            ChartData::Pie { .. } => return None,
        };

        let dates: Vec<NaiveDate> = series
            .iter()
            .flat_map(|s| s.points.iter().map(|&(d, _)| d))
            .collect();
        Some((*dates.iter().min()?, *dates.iter().max()?))
    }
}

fn slot(row: usize, right: bool) -> Rect {
    let x = if right { PAGE_WIDTH - MARGIN - CHART_WIDTH } else { MARGIN };
    Rect::new(x, CHART_ROWS[row], CHART_WIDTH, CHART_HEIGHT)
}

fn line_series<F>(records: &[VisitRecord], name: &str, color: Rgb, value: F) -> LineSeries
where
    F: Fn(&VisitRecord) -> Option<f64>,
{
    LineSeries {
        name: name.to_string(),
        color,
        points: records
            .iter()
            .filter_map(|r| value(r).map(|v| (r.date, v)))
            .collect(),
    }
}

pub fn build_charts(series: &VisitSeries, include_body_water: bool) -> Vec<Chart> {
    let records = series.records();
    let mut charts = vec![
        Chart {
            title: "% Grasa Corporal".to_string(),
            frame: slot(0, false),
            data: ChartData::Line {
                y_label: "% Grasa".to_string(),
                series: vec![line_series(records, "Grasa(%)", PRIMARY, |r| Some(r.fat_pct))],
            },
        },
        Chart {
            title: "Peso Corporal".to_string(),
            frame: slot(0, true),
            data: ChartData::Line {
                y_label: "Peso (kg)".to_string(),
                series: vec![line_series(records, "Peso", PRIMARY, |r| Some(r.weight))],
            },
        },
        Chart {
            title: "Masa Magra (%) y Grasa(%)".to_string(),
            frame: slot(1, false),
            data: ChartData::Line {
                y_label: "%".to_string(),
                series: vec![
                    line_series(records, "Masa Magra (%)", PRIMARY, |r| Some(r.lean_mass_pct)),
                    line_series(records, "Grasa(%)", SECONDARY, |r| Some(r.fat_pct)),
                ],
            },
        },
    ];

    if let Some(latest) = series.latest() {
        let mut frame = slot(1, true);
        frame.x += 80.0;
        frame.width -= 80.0;
        charts.push(Chart {
            title: "Último Masa Magra (%) vs Grasa(%)".to_string(),
            frame,
            data: ChartData::Pie {
                slices: vec![
                    Slice { label: "Masa Magra".to_string(), value: latest.lean_mass_pct, color: PIE_LEAN },
                    Slice { label: "Masa Grasa".to_string(), value: latest.fat_pct, color: PIE_FAT },
                ],
            },
        });
    }

    if include_body_water {
        charts.push(Chart {
            title: "% Agua Corporal".to_string(),
            frame: slot(2, false),
            data: ChartData::Line {
                y_label: "% Agua".to_string(),
                series: vec![line_series(records, "Agua (%)", PRIMARY, |r| r.body_water_pct)],
            },
        });
    }

    charts
}
