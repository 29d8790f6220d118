pub mod tables;

use crate::error::{ReportError, ReportResult};
use serde::{Deserialize, Serialize};

pub use tables::*;

/// Age (in years, at the first visit) from which the senior tables apply.
pub const SENIOR_AGE: u32 = 60;

/// Ordered `(upper_bound, label)` brackets.
///
/// A value belongs to the first bracket whose upper bound is strictly
/// greater than it, so a value sitting exactly on a threshold falls into
/// the next bracket. The last bound is a catch-all ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassificationTable {
    brackets: Vec<(f64, String)>,
}

impl ClassificationTable {
    pub fn new(brackets: &[(f64, &str)]) -> Self {
        Self {
            brackets: brackets
                .iter()
                .map(|&(upper, label)| (upper, label.to_string()))
                .collect(),
        }
    }

    pub fn classify(&self, value: f64) -> Option<&str> {
        self.brackets
            .iter()
            .find(|(upper, _)| value < *upper)
            .map(|(_, label)| label.as_str())
    }

    /// Position of `label` in the table's bracket ordering.
    #[cfg(test)]
    pub fn rank(&self, label: &str) -> Option<usize> {
        self.brackets.iter().position(|(_, l)| l == label)
    }

    #[cfg(test)]
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.brackets.iter().map(|(_, label)| label.as_str())
    }

    pub fn validate(&self, name: &str) -> ReportResult<()> {
        if self.brackets.is_empty() {
            return Err(ReportError::Config(format!(
                "Classification table '{}' has no brackets",
                name
            )));
        }

        let last = self.brackets.len() - 1;
        for (i, (upper, label)) in self.brackets.iter().enumerate() {
            // Only the catch-all ceiling may be infinite.
            let usable = if i == last { !upper.is_nan() } else { upper.is_finite() };
            if !usable {
                return Err(ReportError::Config(format!(
                    "Classification table '{}' has a non-finite threshold {} for '{}'",
                    name, upper, label
                )));
            }
            if label.trim().is_empty() {
                return Err(ReportError::Config(format!(
                    "Classification table '{}' has an empty label at threshold {}",
                    name, upper
                )));
            }
        }

        for pair in self.brackets.windows(2) {
            if pair[1].0 <= pair[0].0 {
                return Err(ReportError::Config(format!(
                    "Classification table '{}' thresholds must be strictly ascending ({} then {})",
                    name, pair[0].0, pair[1].0
                )));
            }
        }

        Ok(())
    }
}
