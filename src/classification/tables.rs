use super::{ClassificationTable, SENIOR_AGE};
use crate::error::ReportResult;
use crate::ingest::Gender;
use serde::{Deserialize, Serialize};

/// Ceiling used as the last threshold of every default table.
pub const CATCH_ALL: f64 = 1e9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationTables {
    pub bmi_adult: ClassificationTable,
    pub bmi_senior: ClassificationTable,
    pub waist_male: ClassificationTable,
    pub waist_female: ClassificationTable,
    pub visceral_fat: ClassificationTable,
    pub fat_male_adult: ClassificationTable,
    pub fat_female_adult: ClassificationTable,
    pub fat_male_senior: ClassificationTable,
    pub fat_female_senior: ClassificationTable,
    pub body_water: ClassificationTable,
}

impl Default for ClassificationTables {
    fn default() -> Self {
        Self {
            bmi_adult: ClassificationTable::new(&[
                (18.5, "Bajo Peso"),
                (25.0, "Peso Normal"),
                (30.0, "Sobrepeso"),
                (35.0, "Obesidad I"),
                (40.0, "Obesidad II"),
                (CATCH_ALL, "Obesidad III"),
            ]),
            bmi_senior: ClassificationTable::new(&[
                (23.0, "Bajo Peso"),
                (28.0, "Peso Normal"),
                (32.0, "Sobrepeso"),
                (CATCH_ALL, "Obesidad"),
            ]),
            waist_male: ClassificationTable::new(&[
                (94.0, "Riesgo Bajo"),
                (102.0, "Riesgo Elevado"),
                (CATCH_ALL, "Riesgo Muy Elevado"),
            ]),
            waist_female: ClassificationTable::new(&[
                (80.0, "Riesgo Bajo"),
                (88.0, "Riesgo Elevado"),
                (CATCH_ALL, "Riesgo Muy Elevado"),
            ]),
            visceral_fat: ClassificationTable::new(&[
                (10.0, "Normal"),
                (15.0, "Alto"),
                (CATCH_ALL, "Muy Alto"),
            ]),
            fat_male_adult: ClassificationTable::new(&[
                (8.0, "Bajo"),
                (20.0, "Saludable"),
                (25.0, "Sobrepeso"),
                (CATCH_ALL, "Obesidad"),
            ]),
            fat_female_adult: ClassificationTable::new(&[
                (21.0, "Bajo"),
                (33.0, "Saludable"),
                (39.0, "Sobrepeso"),
                (CATCH_ALL, "Obesidad"),
            ]),
            fat_male_senior: ClassificationTable::new(&[
                (13.0, "Bajo"),
                (25.0, "Saludable"),
                (30.0, "Sobrepeso"),
                (CATCH_ALL, "Obesidad"),
            ]),
            fat_female_senior: ClassificationTable::new(&[
                (24.0, "Bajo"),
                (36.0, "Saludable"),
                (42.0, "Sobrepeso"),
                (CATCH_ALL, "Obesidad"),
            ]),
            body_water: ClassificationTable::new(&[
                (50.0, "Bajo"),
                (65.0, "Normal"),
                (CATCH_ALL, "Alto"),
            ]),
        }
    }
}

impl ClassificationTables {
    pub fn bmi(&self, age: u32) -> &ClassificationTable {
        if age < SENIOR_AGE {
            &self.bmi_adult
        } else {
            &self.bmi_senior
        }
    }

    pub fn waist(&self, gender: Gender) -> &ClassificationTable {
        match gender {
            Gender::Male => &self.waist_male,
            Gender::Female => &self.waist_female,
        }
    }

    pub fn body_fat(&self, gender: Gender, age: u32) -> &ClassificationTable {
        match (gender, age < SENIOR_AGE) {
            (Gender::Male, true) => &self.fat_male_adult,
            (Gender::Female, true) => &self.fat_female_adult,
            (Gender::Male, false) => &self.fat_male_senior,
            (Gender::Female, false) => &self.fat_female_senior,
        }
    }

    pub fn visceral_fat(&self) -> &ClassificationTable {
        &self.visceral_fat
    }

    pub fn body_water(&self) -> &ClassificationTable {
        &self.body_water
    }

    pub fn validate(&self) -> ReportResult<()> {
        let named = [
            ("bmi_adult", &self.bmi_adult),
            ("bmi_senior", &self.bmi_senior),
            ("waist_male", &self.waist_male),
            ("waist_female", &self.waist_female),
            ("visceral_fat", &self.visceral_fat),
            ("fat_male_adult", &self.fat_male_adult),
            ("fat_female_adult", &self.fat_female_adult),
            ("fat_male_senior", &self.fat_male_senior),
            ("fat_female_senior", &self.fat_female_senior),
            ("body_water", &self.body_water),
        ];

        for (name, table) in named {
            table.validate(name)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_are_valid() {
        assert!(ClassificationTables::default().validate().is_ok());
    }

    #[test]
    fn test_bmi_table_selection_by_age() {
        let tables = ClassificationTables::default();
        assert_eq!(tables.bmi(45).classify(26.0), Some("Sobrepeso"));
        assert_eq!(tables.bmi(59).classify(24.9), Some("Peso Normal"));
        assert_eq!(tables.bmi(60).classify(24.9), Some("Peso Normal"));
        assert_eq!(tables.bmi(60).classify(22.0), Some("Bajo Peso"));
        assert_eq!(tables.bmi(45).classify(22.0), Some("Peso Normal"));
    }

    #[test]
    fn test_bmi_adult_boundary() {
        let tables = ClassificationTables::default();
        assert_eq!(tables.bmi(30).classify(24.9), Some("Peso Normal"));
        assert_eq!(tables.bmi(30).classify(25.0), Some("Sobrepeso"));
        assert_eq!(tables.bmi(30).classify(18.5), Some("Peso Normal"));
    }

    #[test]
    fn test_waist_table_selection_by_gender() {
        let tables = ClassificationTables::default();
        assert_eq!(tables.waist(Gender::Male).classify(90.0), Some("Riesgo Bajo"));
        assert_eq!(tables.waist(Gender::Female).classify(90.0), Some("Riesgo Muy Elevado"));
    }

    #[test]
    fn test_body_fat_uses_four_tables() {
        let tables = ClassificationTables::default();
        let value = 22.0;
        assert_eq!(tables.body_fat(Gender::Male, 40).classify(value), Some("Sobrepeso"));
        assert_eq!(tables.body_fat(Gender::Female, 40).classify(value), Some("Saludable"));
        assert_eq!(tables.body_fat(Gender::Male, 65).classify(value), Some("Saludable"));
        assert_eq!(tables.body_fat(Gender::Female, 65).classify(value), Some("Bajo"));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tables: ClassificationTables =
            serde_json::from_str(r#"{"visceral_fat": [[12.0, "Normal"], [1e9, "Alto"]]}"#).unwrap();
        assert_eq!(tables.visceral_fat().classify(11.0), Some("Normal"));
        assert_eq!(tables.body_water(), &ClassificationTables::default().body_water);
    }
}
