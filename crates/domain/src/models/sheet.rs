//! Read-only tabular input for resource ingestion.
//!
//! The ingestion engine does not open files. Callers decode an upload into
//! something implementing [`TabularSheet`] and hand it over.

use chrono::NaiveDateTime;

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Coerces the cell to a trimmed string. Empty cells and cells that are
    /// blank after trimming yield `None`.
    pub fn to_trimmed_string(&self) -> Option<String> {
        let value = match self {
            CellValue::Empty => return None,
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Int(n) => n.to_string(),
            CellValue::Float(f) => format_float(*f),
            CellValue::Bool(b) => b.to_string(),
            CellValue::DateTime(dt) => {
                if dt.time() == chrono::NaiveTime::MIN {
                    dt.format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
        };

        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

/// Integral floats print without a fractional part, since spreadsheet
/// numbers such as personnel numbers are stored as floats.
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}

/// Row/column access to a worksheet. Row 0 is the header row.
pub trait TabularSheet: Sync {
    fn row_count(&self) -> usize;

    /// Cells of the given row; rows may have different widths.
    fn row(&self, index: usize) -> Option<&[CellValue]>;
}

/// In-memory worksheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// Builds a sheet of text cells; empty strings become empty cells.
    pub fn from_text_rows(rows: &[&[&str]]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| CellValue::from(*cell)).collect())
                .collect(),
        }
    }
}

impl TabularSheet for Sheet {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.rows.get(index).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_text_cells_are_trimmed() {
        assert_eq!(
            CellValue::Text("  Jane Doe ".into()).to_trimmed_string(),
            Some("Jane Doe".to_string())
        );
        assert_eq!(CellValue::Text("   ".into()).to_trimmed_string(), None);
        assert_eq!(CellValue::Empty.to_trimmed_string(), None);
    }

    #[test]
    fn test_numeric_cells() {
        assert_eq!(CellValue::Int(42).to_trimmed_string(), Some("42".into()));
        assert_eq!(
            CellValue::Float(10203040.0).to_trimmed_string(),
            Some("10203040".into())
        );
        assert_eq!(CellValue::Float(2.5).to_trimmed_string(), Some("2.5".into()));
        assert_eq!(CellValue::Bool(true).to_trimmed_string(), Some("true".into()));
    }

    #[test]
    fn test_date_cells() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            CellValue::DateTime(date).to_trimmed_string(),
            Some("2025-03-01".into())
        );

        let with_time = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(
            CellValue::DateTime(with_time).to_trimmed_string(),
            Some("2025-03-01 09:30:00".into())
        );
    }

    #[test]
    fn test_sheet_access() {
        let sheet = Sheet::from_text_rows(&[&["NAME", "EMAIL"], &["Jane", ""]]);
        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.row(1).unwrap()[1], CellValue::Empty);
        assert!(sheet.row(2).is_none());
    }
}
