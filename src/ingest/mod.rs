pub mod normalize;

use crate::config::IngestConfig;
use crate::error::{ReportError, ReportResult};
use chrono::NaiveDate;
use csv::StringRecord;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;

pub use normalize::*;

pub const COL_NAME: &str = "Nombre";
pub const COL_GENDER: &str = "Genero";
pub const COL_AGE: &str = "Edad";
pub const COL_DATE: &str = "Fecha";
pub const COL_HEIGHT: &str = "Altura";
pub const COL_WEIGHT: &str = "Peso Corporal (Kg)";
pub const COL_MUSCLE: &str = "Masa Muscular (Kg)";
pub const COL_LEAN: &str = "Masa Magra (%)";
pub const COL_FAT: &str = "Grasa(%)";
pub const COL_WATER: &str = "Agua (%)";
pub const COL_WAIST: &str = "CC";
pub const COL_HIP: &str = "CCA";
pub const COL_VISCERAL: &str = "GV";
pub const COL_BMI: &str = "IMC";
pub const COL_BONE: &str = "MO";
pub const COL_CURRENT_FAT: &str = "Grasa Actual (%)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// "M" (any case) is male, anything else is female.
    pub fn from_code(code: &str) -> Self {
        if code.trim().eq_ignore_ascii_case("M") {
            Gender::Male
        } else {
            Gender::Female
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "M"),
            Gender::Female => write!(f, "F"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitRecord {
    pub date: NaiveDate,
    pub name: String,
    pub gender: Gender,
    pub age: u32,
    pub height: f64,
    pub weight: f64,
    pub muscle_mass: f64,
    pub lean_mass_pct: f64,
    pub fat_pct: f64,
    pub body_water_pct: Option<f64>,
    pub waist: f64,
    pub hip: f64,
    pub visceral_fat: f64,
    pub bmi: f64,
    pub bone_mass: Option<f64>,
    pub current_fat_pct: Option<f64>,
}

/// Visits of one subject, ascending by date.
#[derive(Debug, Clone, Serialize)]
pub struct VisitSeries {
    records: Vec<VisitRecord>,
}

impl VisitSeries {
    /// Stable sort by date: visits sharing a date keep their input order.
    pub fn from_records(mut records: Vec<VisitRecord>) -> Self {
        records.sort_by_key(|record| record.date);
        Self { records }
    }

    pub fn records(&self) -> &[VisitRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&VisitRecord> {
        self.records.first()
    }

    pub fn latest(&self) -> Option<&VisitRecord> {
        self.records.last()
    }

    pub fn previous(&self) -> Option<&VisitRecord> {
        self.records.len().checked_sub(2).map(|i| &self.records[i])
    }
}

/// Header positions of the expected columns.
struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        Self { index }
    }

    fn require(&self, column: &str) -> ReportResult<()> {
        if self.index.contains_key(column) {
            Ok(())
        } else {
            Err(ReportError::MissingField(column.to_string()))
        }
    }

    fn cell<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
        self.index.get(column).and_then(|&i| record.get(i))
    }

    fn text<'r>(&self, record: &'r StringRecord, column: &str) -> ReportResult<&'r str> {
        self.cell(record, column)
            .ok_or_else(|| ReportError::MissingField(column.to_string()))
    }

    fn number(&self, record: &StringRecord, column: &str, row: usize) -> ReportResult<f64> {
        parse_decimal(self.text(record, column)?, column, row)
    }

    /// Absent columns and blank cells both read as `None`.
    fn optional_number(&self, record: &StringRecord, column: &str, row: usize) -> ReportResult<Option<f64>> {
        match self.cell(record, column) {
            Some(raw) if !raw.trim().is_empty() => parse_decimal(raw, column, row).map(Some),
            _ => Ok(None),
        }
    }
}

fn required_columns(include_body_water: bool) -> Vec<&'static str> {
    let mut columns = vec![
        COL_NAME, COL_GENDER, COL_AGE, COL_DATE, COL_HEIGHT,
        COL_WEIGHT, COL_MUSCLE, COL_LEAN, COL_FAT,
        COL_WAIST, COL_HIP, COL_VISCERAL, COL_BMI,
    ];
    if include_body_water {
        columns.push(COL_WATER);
    }
    columns
}

pub fn load_visits<P: AsRef<Path>>(
    path: P,
    config: &IngestConfig,
    include_body_water: bool,
) -> ReportResult<VisitSeries> {
    let file = std::fs::File::open(path.as_ref())?;
    info!("Reading visit log from {:?}", path.as_ref());
    read_visits(file, config, include_body_water)
}

pub fn read_visits<R: Read>(
    reader: R,
    config: &IngestConfig,
    include_body_water: bool,
) -> ReportResult<VisitSeries> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter_byte()?)
        .has_headers(true)
        .from_reader(reader);

    let columns = Columns::from_headers(reader.headers()?);
    for column in required_columns(include_body_water) {
        columns.require(column)?;
    }

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        let record = result?;
        records.push(parse_record(&columns, &record, row, config, include_body_water)?);
    }

    info!("Parsed {} visit(s)", records.len());
    let series = VisitSeries::from_records(records);
    check_series(&series);
    Ok(series)
}

fn parse_record(
    columns: &Columns,
    record: &StringRecord,
    row: usize,
    config: &IngestConfig,
    include_body_water: bool,
) -> ReportResult<VisitRecord> {
    // Body water is either required or not read at all.
    let body_water_pct = if include_body_water {
        Some(columns.number(record, COL_WATER, row)?)
    } else {
        None
    };

    let visit = VisitRecord {
        date: parse_date(columns.text(record, COL_DATE)?, &config.date_format, COL_DATE, row)?,
        name: columns.text(record, COL_NAME)?.trim().to_string(),
        gender: Gender::from_code(columns.text(record, COL_GENDER)?),
        age: parse_integer(columns.text(record, COL_AGE)?, COL_AGE, row)?,
        height: columns.number(record, COL_HEIGHT, row)?,
        weight: columns.number(record, COL_WEIGHT, row)?,
        muscle_mass: columns.number(record, COL_MUSCLE, row)?,
        lean_mass_pct: columns.number(record, COL_LEAN, row)?,
        fat_pct: columns.number(record, COL_FAT, row)?,
        body_water_pct,
        waist: columns.number(record, COL_WAIST, row)?,
        hip: columns.number(record, COL_HIP, row)?,
        visceral_fat: columns.number(record, COL_VISCERAL, row)?,
        bmi: columns.number(record, COL_BMI, row)?,
        bone_mass: columns.optional_number(record, COL_BONE, row)?,
        current_fat_pct: columns.optional_number(record, COL_CURRENT_FAT, row)?,
    };

    debug!("Row {}: visit on {} for '{}'", row, visit.date, visit.name);
    Ok(visit)
}

fn check_series(series: &VisitSeries) {
    let records = series.records();

    if let Some(first) = records.first() {
        if records.iter().any(|r| r.name != first.name) {
            warn!("Visit log mixes several subject names; reporting as '{}'", first.name);
        }
    }

    for pair in records.windows(2) {
        if pair[0].date == pair[1].date {
            warn!("Two visits recorded on {}", pair[0].date);
        }
    }
}
