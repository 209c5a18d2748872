//! Cell formatters for report tables
//!
//! Every report column goes through exactly one of these functions, so the
//! same value always renders the same way in every report.

use crate::config::EMPTY_CELL;

/// Text cell; blank or missing text renders as the placeholder.
pub fn text_cell(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => EMPTY_CELL.to_string(),
    }
}

/// Numeric cell: whole numbers without decimals, otherwise one decimal.
pub fn number_cell(value: f64) -> String {
    if !value.is_finite() {
        return EMPTY_CELL.to_string();
    }

    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

pub fn optional_number_cell(value: Option<f64>) -> String {
    value.map(number_cell).unwrap_or_else(|| EMPTY_CELL.to_string())
}

pub fn integer_cell(value: Option<i64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| EMPTY_CELL.to_string())
}

/// Percentage with two decimals and a trailing `%`.
pub fn percentage_cell(value: f64) -> String {
    if !value.is_finite() {
        return EMPTY_CELL.to_string();
    }
    format!("{:.2}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_cell() {
        assert_eq!(percentage_cell(87.5), "87.50%");
        assert_eq!(percentage_cell(0.0), "0.00%");
        assert_eq!(percentage_cell(100.0 / 3.0), "33.33%");
    }

    #[test]
    fn test_number_cell() {
        assert_eq!(number_cell(20.0), "20");
        assert_eq!(number_cell(20.5), "20.5");
        assert_eq!(number_cell(12.34), "12.3");
        assert_eq!(number_cell(0.0), "0");
        assert_eq!(number_cell(f64::NAN), "-");
    }

    #[test]
    fn test_number_cell_beyond_integer_range() {
        assert_eq!(number_cell(1e20), "100000000000000000000");
        assert_eq!(number_cell(-3.0), "-3");
    }

    #[test]
    fn test_missing_values_render_placeholder() {
        assert_eq!(text_cell(None), "-");
        assert_eq!(text_cell(Some("")), "-");
        assert_eq!(text_cell(Some("   ")), "-");
        assert_eq!(text_cell(Some("A+")), "A+");
        assert_eq!(optional_number_cell(None), "-");
        assert_eq!(integer_cell(None), "-");
        assert_eq!(integer_cell(Some(2021)), "2021");
    }
}
