use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::classification::ClassificationTables;
use crate::error::{ReportError, ReportResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ingest: IngestConfig,
    pub report: ReportConfig,
    pub tables: ClassificationTables,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub delimiter: char,
    pub date_format: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            date_format: "%d/%m/%Y".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    pub include_body_water: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Control Corporal (Método: Bioimpedancia)".to_string(),
            include_body_water: true,
        }
    }
}

impl IngestConfig {
    /// Delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> ReportResult<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(ReportError::Config(format!(
                "Delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            )))
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> ReportResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ReportResult<()> {
        self.ingest.delimiter_byte()?;

        if self.ingest.date_format.trim().is_empty() {
            return Err(ReportError::Config(
                "Date format must not be empty".to_string()
            ));
        }

        if self.report.title.trim().is_empty() {
            return Err(ReportError::Config(
                "Report title must not be empty".to_string()
            ));
        }

        self.tables.validate()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ingest.delimiter_byte().unwrap(), b',');
        assert!(config.report.include_body_water);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"ingest": {"delimiter": ";"}, "report": {"include_body_water": false}}"#,
        ).unwrap();

        assert_eq!(config.ingest.delimiter, ';');
        assert_eq!(config.ingest.date_format, "%d/%m/%Y");
        assert!(!config.report.include_body_water);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_ascii_delimiter() {
        let mut config = Config::default();
        config.ingest.delimiter = '→';
        assert!(matches!(config.validate(), Err(ReportError::Config(_))));
    }

    #[test]
    fn test_from_file_rejects_bad_table() {
        let path = std::env::temp_dir().join(format!(
            "bodycomp-config-{}.json",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"tables": {{"bmi_adult": [[25.0, "A"], [18.5, "B"]]}}}}"#).unwrap();
        drop(file);

        let result = Config::from_file(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(ReportError::Config(_))));
    }
}
