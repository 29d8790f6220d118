pub mod svg;

use crate::error::{ReportError, ReportResult};
use crate::indicators::{format_amount, format_amount_signed};
use crate::report::Report;
use chrono::NaiveDate;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Svg,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn all() -> Vec<OutputFormat> {
        vec![OutputFormat::Svg, OutputFormat::Csv, OutputFormat::Json]
    }
}

/// Turns a laid-out report into the bytes of one artifact.
pub trait ReportRenderer {
    fn render(&self, report: &Report) -> ReportResult<Vec<u8>>;
    fn extension(&self) -> &'static str;
}

pub fn create_renderer(format: OutputFormat) -> Box<dyn ReportRenderer> {
    match format {
        OutputFormat::Svg => Box::new(svg::SvgRenderer::new()),
        OutputFormat::Csv => Box::new(CsvRenderer),
        OutputFormat::Json => Box::new(JsonRenderer),
    }
}

/// File stem unique to one report generation, so concurrent runs writing
/// into the same directory never share a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportStem(String);

impl ReportStem {
    pub fn generate(date: NaiveDate, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let token: u64 = rng.gen();
        Self(format!("informe-{}-{:016x}", date.format("%Y%m%d"), token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn path_for(&self, dir: &Path, extension: &str) -> PathBuf {
        dir.join(format!("{}.{}", self.0, extension))
    }
}

pub fn save_report<P: AsRef<Path>>(
    report: &Report,
    output_dir: P,
    stem: &ReportStem,
    formats: &[OutputFormat],
) -> ReportResult<Vec<PathBuf>> {
    let output_path = output_dir.as_ref();
    let mut written = Vec::new();
    let mut seen = Vec::new();

    for &format in formats {
        if seen.contains(&format) {
            continue;
        }
        seen.push(format);

        let renderer = create_renderer(format);
        let bytes = renderer.render(report)?;
        let path = stem.path_for(output_path, renderer.extension());
        std::fs::write(&path, bytes)?;
        info!("Wrote {:?}", path);
        written.push(path);
    }

    Ok(written)
}

pub struct CsvRenderer;

impl ReportRenderer for CsvRenderer {
    fn render(&self, report: &Report) -> ReportResult<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        writer.write_record(&[
            "INDICADOR", "ACTUAL", "ULTIMO", "GENERAL", "CLASIFICACION", "UNIDAD"
        ])?;

        for row in &report.summary {
            writer.write_record(&[
                row.label.clone(),
                format_amount(row.latest),
                format_amount_signed(row.delta_prev),
                format_amount_signed(row.delta_first),
                row.classification.clone().unwrap_or_default(),
                row.unit.clone(),
            ])?;
        }

        writer.flush()?;
        writer.into_inner().map_err(|e| ReportError::Io(e.into_error()))
    }

    fn extension(&self) -> &'static str {
        "csv"
    }
}

pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn render(&self, report: &Report) -> ReportResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(report)?)
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}
