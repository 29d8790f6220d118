pub mod format;

use crate::classification::ClassificationTables;
use crate::error::{ReportError, ReportResult};
use crate::ingest::{self, VisitRecord, VisitSeries};
use log::debug;
use serde::Serialize;

pub use format::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    TimeElapsed,
    Weight,
    BodyFat,
    BodyWater,
    MuscleMass,
    LeanMass,
    Waist,
    Hip,
    VisceralFat,
    Bmi,
}

impl Indicator {
    /// Presentation order of the summary table.
    pub fn ordered(include_body_water: bool) -> Vec<Indicator> {
        let mut order = vec![Indicator::TimeElapsed, Indicator::Weight, Indicator::BodyFat];
        if include_body_water {
            order.push(Indicator::BodyWater);
        }
        order.extend([
            Indicator::MuscleMass,
            Indicator::LeanMass,
            Indicator::Waist,
            Indicator::Hip,
            Indicator::VisceralFat,
            Indicator::Bmi,
        ]);
        order
    }

    pub fn label(&self) -> &'static str {
        match self {
            Indicator::TimeElapsed => "Tiempo",
            Indicator::Weight => "Peso Corporal",
            Indicator::BodyFat => "Grasa (%)",
            Indicator::BodyWater => "Agua (%)",
            Indicator::MuscleMass => "Masa Muscular",
            Indicator::LeanMass => "Masa Magra (%)",
            Indicator::Waist => "Cintura (CC)",
            Indicator::Hip => "Cadera (CCA)",
            Indicator::VisceralFat => "Grasa Visceral",
            Indicator::Bmi => "IMC",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Indicator::TimeElapsed => "días",
            Indicator::Weight | Indicator::MuscleMass => "kg",
            Indicator::BodyFat | Indicator::BodyWater | Indicator::LeanMass => "%",
            Indicator::Waist | Indicator::Hip => "cm",
            Indicator::VisceralFat | Indicator::Bmi => "",
        }
    }

    /// Source column, for error reporting.
    pub fn column(&self) -> &'static str {
        match self {
            Indicator::TimeElapsed => ingest::COL_DATE,
            Indicator::Weight => ingest::COL_WEIGHT,
            Indicator::BodyFat => ingest::COL_FAT,
            Indicator::BodyWater => ingest::COL_WATER,
            Indicator::MuscleMass => ingest::COL_MUSCLE,
            Indicator::LeanMass => ingest::COL_LEAN,
            Indicator::Waist => ingest::COL_WAIST,
            Indicator::Hip => ingest::COL_HIP,
            Indicator::VisceralFat => ingest::COL_VISCERAL,
            Indicator::Bmi => ingest::COL_BMI,
        }
    }

    /// Measured value of a visit; `None` for elapsed time and absent body water.
    pub fn value(&self, record: &VisitRecord) -> Option<f64> {
        match self {
            Indicator::TimeElapsed => None,
            Indicator::Weight => Some(record.weight),
            Indicator::BodyFat => Some(record.fat_pct),
            Indicator::BodyWater => record.body_water_pct,
            Indicator::MuscleMass => Some(record.muscle_mass),
            Indicator::LeanMass => Some(record.lean_mass_pct),
            Indicator::Waist => Some(record.waist),
            Indicator::Hip => Some(record.hip),
            Indicator::VisceralFat => Some(record.visceral_fat),
            Indicator::Bmi => Some(record.bmi),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Amount {
    Measure(f64),
    Days(i64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub indicator: Indicator,
    pub label: String,
    pub unit: String,
    pub latest: Amount,
    pub delta_prev: Amount,
    pub delta_first: Amount,
    pub classification: Option<String>,
}

/// Round to one decimal on the exact binary value, ties to even, folding
/// `-0.0` into `0.0`.
pub fn round1(value: f64) -> f64 {
    let rounded = format!("{:.1}", value).parse::<f64>().unwrap_or(value);
    if rounded == 0.0 { 0.0 } else { rounded }
}

pub fn evaluate(
    series: &VisitSeries,
    tables: &ClassificationTables,
    include_body_water: bool,
) -> ReportResult<Vec<IndicatorRow>> {
    let records = series.records();
    let (first, previous, latest) = match (series.first(), series.previous(), series.latest()) {
        (Some(first), Some(previous), Some(latest)) => (first, previous, latest),
        _ => return Err(ReportError::InsufficientData(records.len())),
    };

    Indicator::ordered(include_body_water)
        .into_iter()
        .map(|indicator| -> ReportResult<IndicatorRow> {
            let row = match indicator {
                Indicator::TimeElapsed => elapsed_row(first, previous, latest),
                _ => measured_row(indicator, first, previous, latest, tables)?,
            };
            debug!(
                "{}: latest {:?}, since previous {:?}, since first {:?}, class {:?}",
                row.label, row.latest, row.delta_prev, row.delta_first, row.classification
            );
            Ok(row)
        })
        .collect()
}

fn elapsed_row(first: &VisitRecord, previous: &VisitRecord, latest: &VisitRecord) -> IndicatorRow {
    let since_first = (latest.date - first.date).num_days();
    let since_previous = (latest.date - previous.date).num_days();

    IndicatorRow {
        indicator: Indicator::TimeElapsed,
        label: Indicator::TimeElapsed.label().to_string(),
        unit: Indicator::TimeElapsed.unit().to_string(),
        latest: Amount::Days(since_first),
        delta_prev: Amount::Days(since_previous),
        delta_first: Amount::Days(since_first),
        classification: None,
    }
}

fn measured_row(
    indicator: Indicator,
    first: &VisitRecord,
    previous: &VisitRecord,
    latest: &VisitRecord,
    tables: &ClassificationTables,
) -> ReportResult<IndicatorRow> {
    let value_of = |record: &VisitRecord| {
        indicator.value(record)
            .ok_or_else(|| ReportError::MissingField(indicator.column().to_string()))
    };

    let latest_value = value_of(latest)?;
    let delta_prev = round1(latest_value - value_of(previous)?);
    let delta_first = round1(latest_value - value_of(first)?);

    // Table selection keys off the subject as recorded at the first visit.
    let table = match indicator {
        Indicator::BodyFat => Some(tables.body_fat(first.gender, first.age)),
        Indicator::BodyWater => Some(tables.body_water()),
        Indicator::Waist => Some(tables.waist(first.gender)),
        Indicator::VisceralFat => Some(tables.visceral_fat()),
        Indicator::Bmi => Some(tables.bmi(first.age)),
        _ => None,
    };

    Ok(IndicatorRow {
        indicator,
        label: indicator.label().to_string(),
        unit: indicator.unit().to_string(),
        latest: Amount::Measure(latest_value),
        delta_prev: Amount::Measure(delta_prev),
        delta_first: Amount::Measure(delta_first),
        classification: table
            .and_then(|t| t.classify(latest_value))
            .map(str::to_string),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ingest::Gender;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    pub(crate) fn visit(date: (i32, u32, u32), weight: f64, fat: f64, bmi: f64) -> VisitRecord {
        VisitRecord {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            name: "Luis".to_string(),
            gender: Gender::Male,
            age: 45,
            height: 178.0,
            weight,
            muscle_mass: 35.0,
            lean_mass_pct: 100.0 - fat,
            fat_pct: fat,
            body_water_pct: Some(55.0),
            waist: 94.0,
            hip: 100.0,
            visceral_fat: 9.0,
            bmi,
            bone_mass: None,
            current_fat_pct: None,
        }
    }

    pub(crate) fn three_visits() -> Vec<VisitRecord> {
        vec![
            visit((2024, 1, 1), 70.0, 18.0, 22.0),
            visit((2024, 3, 1), 75.0, 19.5, 23.5),
            visit((2024, 6, 1), 79.5, 21.2, 24.9),
        ]
    }

    fn row(rows: &[IndicatorRow], indicator: Indicator) -> &IndicatorRow {
        rows.iter().find(|r| r.indicator == indicator).unwrap()
    }

    fn measure(amount: Amount) -> f64 {
        match amount {
            Amount::Measure(v) => v,
            Amount::Days(d) => panic!("expected measure, got {} days", d),
        }
    }

    #[test]
    fn test_bmi_scenario() {
        let series = VisitSeries::from_records(three_visits());
        let rows = evaluate(&series, &ClassificationTables::default(), true).unwrap();
        let bmi = row(&rows, Indicator::Bmi);

        assert_eq!(bmi.latest, Amount::Measure(24.9));
        assert_relative_eq!(measure(bmi.delta_prev), 1.4);
        assert_relative_eq!(measure(bmi.delta_first), 2.9);
        assert_eq!(format_amount_signed(bmi.delta_prev), "+1.4");
        assert_eq!(format_amount_signed(bmi.delta_first), "+2.9");
        assert_eq!(bmi.classification.as_deref(), Some("Peso Normal"));
    }

    #[test]
    fn test_bmi_on_threshold_moves_to_next_bucket() {
        let mut records = three_visits();
        records[2].bmi = 25.0;
        let series = VisitSeries::from_records(records);
        let rows = evaluate(&series, &ClassificationTables::default(), true).unwrap();
        assert_eq!(row(&rows, Indicator::Bmi).classification.as_deref(), Some("Sobrepeso"));
    }

    #[test]
    fn test_delta_formulas() {
        let records = three_visits();
        let series = VisitSeries::from_records(records.clone());
        let rows = evaluate(&series, &ClassificationTables::default(), true).unwrap();

        for r in rows.iter().filter(|r| r.indicator != Indicator::TimeElapsed) {
            let latest = r.indicator.value(&records[2]).unwrap();
            let previous = r.indicator.value(&records[1]).unwrap();
            let first = r.indicator.value(&records[0]).unwrap();
            assert_eq!(r.latest, Amount::Measure(latest));
            assert_eq!(r.delta_prev, Amount::Measure(round1(latest - previous)));
            assert_eq!(r.delta_first, Amount::Measure(round1(latest - first)));
        }
    }

    #[test]
    fn test_elapsed_time_in_days() {
        let series = VisitSeries::from_records(three_visits());
        let rows = evaluate(&series, &ClassificationTables::default(), true).unwrap();
        let elapsed = row(&rows, Indicator::TimeElapsed);

        assert_eq!(elapsed.delta_prev, Amount::Days(92));
        assert_eq!(elapsed.delta_first, Amount::Days(152));
        assert_eq!(elapsed.classification, None);
    }

    #[test]
    fn test_presentation_order() {
        let series = VisitSeries::from_records(three_visits());
        let tables = ClassificationTables::default();

        let with_water: Vec<Indicator> = evaluate(&series, &tables, true).unwrap()
            .iter().map(|r| r.indicator).collect();
        assert_eq!(with_water, Indicator::ordered(true));
        assert_eq!(with_water[0], Indicator::TimeElapsed);
        assert_eq!(with_water[3], Indicator::BodyWater);
        assert_eq!(*with_water.last().unwrap(), Indicator::Bmi);

        let without: Vec<Indicator> = evaluate(&series, &tables, false).unwrap()
            .iter().map(|r| r.indicator).collect();
        assert!(!without.contains(&Indicator::BodyWater));
        assert_eq!(without.len(), with_water.len() - 1);
    }

    #[test]
    fn test_unclassified_indicators_have_no_label() {
        let series = VisitSeries::from_records(three_visits());
        let rows = evaluate(&series, &ClassificationTables::default(), true).unwrap();

        for indicator in [Indicator::MuscleMass, Indicator::LeanMass, Indicator::Hip, Indicator::Weight] {
            assert_eq!(row(&rows, indicator).classification, None);
        }
        for indicator in [Indicator::BodyFat, Indicator::BodyWater, Indicator::Waist, Indicator::VisceralFat] {
            assert!(row(&rows, indicator).classification.is_some());
        }
        // waist 94.0 sits on the male threshold
        assert_eq!(row(&rows, Indicator::Waist).classification.as_deref(), Some("Riesgo Elevado"));
    }

    #[test]
    fn test_reverse_order_gives_identical_rows() {
        let tables = ClassificationTables::default();
        let forward = evaluate(&VisitSeries::from_records(three_visits()), &tables, true).unwrap();

        let mut reversed = three_visits();
        reversed.reverse();
        let backward = evaluate(&VisitSeries::from_records(reversed), &tables, true).unwrap();

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_single_visit_is_insufficient() {
        let series = VisitSeries::from_records(vec![visit((2024, 1, 1), 70.0, 18.0, 22.0)]);
        let result = evaluate(&series, &ClassificationTables::default(), true);
        assert!(matches!(result, Err(ReportError::InsufficientData(1))));

        let empty = VisitSeries::from_records(Vec::new());
        assert!(matches!(
            evaluate(&empty, &ClassificationTables::default(), true),
            Err(ReportError::InsufficientData(0))
        ));
    }

    #[test]
    fn test_missing_body_water_value() {
        let mut records = three_visits();
        records[1].body_water_pct = None;
        let series = VisitSeries::from_records(records);

        match evaluate(&series, &ClassificationTables::default(), true) {
            Err(ReportError::MissingField(column)) => assert_eq!(column, ingest::COL_WATER),
            other => panic!("expected missing field, got {:?}", other),
        }
        assert!(evaluate(&series, &ClassificationTables::default(), false).is_ok());
    }

    #[test]
    fn test_senior_female_tables() {
        let mut records = three_visits();
        for record in &mut records {
            record.gender = Gender::Female;
            record.age = 62;
        }
        records[2].fat_pct = 37.0;
        records[2].waist = 85.0;
        let series = VisitSeries::from_records(records);
        let rows = evaluate(&series, &ClassificationTables::default(), true).unwrap();

        assert_eq!(row(&rows, Indicator::BodyFat).classification.as_deref(), Some("Sobrepeso"));
        assert_eq!(row(&rows, Indicator::Waist).classification.as_deref(), Some("Riesgo Elevado"));
        assert_eq!(row(&rows, Indicator::Bmi).classification.as_deref(), Some("Peso Normal"));
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(1.3999999999999986), 1.4);
        assert_eq!(round1(-0.04), 0.0);
        assert!(round1(-0.04).is_sign_positive());
        assert_eq!(round1(-1.05000001), -1.1);
    }

    #[test]
    fn test_round1_ties_go_to_even() {
        assert_eq!(round1(0.25), 0.2);
        assert_eq!(round1(-0.25), -0.2);
        assert_eq!(round1(0.75), 0.8);
        // 0.15 is stored just below the tie
        assert_eq!(round1(0.15), 0.1);
    }
}
