use super::Amount;

/// Positive deltas get an explicit `+`; zero and negatives print as-is.
pub fn format_delta(delta: f64) -> String {
    if delta > 0.0 {
        format!("+{:.1}", delta)
    } else {
        format!("{:.1}", delta)
    }
}

pub fn format_days_delta(days: i64) -> String {
    if days > 0 {
        format!("+{}", days)
    } else {
        days.to_string()
    }
}

/// Measured value as recorded: shortest exact form, whole numbers keep `.0`.
pub fn format_measure(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

pub fn format_amount(amount: Amount) -> String {
    match amount {
        Amount::Measure(value) => format_measure(value),
        Amount::Days(days) => days.to_string(),
    }
}

pub fn format_amount_signed(amount: Amount) -> String {
    match amount {
        Amount::Measure(value) => format_delta(value),
        Amount::Days(days) => format_days_delta(days),
    }
}

/// Amount followed by its unit, e.g. `70.5kg` or `152 días`.
pub fn with_unit(text: String, unit: &str) -> String {
    match unit {
        "" => text,
        "%" | "kg" => format!("{}{}", text, unit),
        _ => format!("{} {}", text, unit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_formatting() {
        assert_eq!(format_delta(2.3), "+2.3");
        assert_eq!(format_delta(-1.0), "-1.0");
        assert_eq!(format_delta(0.0), "0.0");
    }

    #[test]
    fn test_days_formatting() {
        assert_eq!(format_days_delta(59), "+59");
        assert_eq!(format_days_delta(0), "0");
        assert_eq!(format_amount(Amount::Days(152)), "152");
    }

    #[test]
    fn test_measures_keep_recorded_precision() {
        assert_eq!(format_amount(Amount::Measure(70.25)), "70.25");
        assert_eq!(format_amount(Amount::Measure(70.0)), "70.0");
        assert_eq!(format_amount(Amount::Measure(24.9)), "24.9");
        assert_eq!(format_measure(3.125), "3.125");
    }

    #[test]
    fn test_units() {
        assert_eq!(with_unit(format_amount(Amount::Measure(70.5)), "kg"), "70.5kg");
        assert_eq!(with_unit(format_amount_signed(Amount::Measure(-0.4)), "%"), "-0.4%");
        assert_eq!(with_unit("92".to_string(), "cm"), "92 cm");
        assert_eq!(with_unit("24.9".to_string(), ""), "24.9");
    }
}
