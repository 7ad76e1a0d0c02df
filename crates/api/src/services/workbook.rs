//! Decodes uploaded workbooks into a [`Sheet`] for ingestion.
//!
//! Only the first worksheet is read. Cell positions stay absolute, so a
//! range starting below row 1 is padded with empty rows.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use domain::models::{CellValue, Sheet};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("Unreadable workbook: {0}")]
    Unreadable(String),

    #[error("Workbook has no worksheets")]
    NoWorksheet,
}

/// Reads the first worksheet of an xlsx/xls/ods payload.
pub fn decode_first_sheet(bytes: &[u8]) -> Result<Sheet, WorkbookError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| WorkbookError::Unreadable(e.to_string()))?;

    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(WorkbookError::NoWorksheet)?;

    let range = workbook
        .worksheet_range(&first)
        .map_err(|e| WorkbookError::Unreadable(e.to_string()))?;

    let (row_offset, col_offset) = range
        .start()
        .map(|(row, col)| (row as usize, col as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; col_offset];
        cells.extend(row.iter().map(to_cell));
        rows.push(cells);
    }

    tracing::debug!(sheet = %first, rows = rows.len(), "Workbook decoded");
    Ok(Sheet::from_rows(rows))
}

fn to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Int(n) => CellValue::Int(*n),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => serial_to_datetime(dt.as_f64())
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Float(dt.as_f64())),
    }
}

/// Spreadsheet serial dates count days from 1900-01-01 as serial 1, but
/// keep Lotus' phantom 1900-02-29 as serial 60. Serials past it are shifted
/// back a day and the phantom day itself has no date.
fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = if serial < 60.0 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else if serial < 61.0 {
        return None;
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    let epoch = epoch.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_is_unreadable() {
        let err = decode_first_sheet(b"definitely not a spreadsheet").unwrap_err();
        assert!(matches!(err, WorkbookError::Unreadable(_)));
    }

    #[test]
    fn test_empty_payload_is_unreadable() {
        assert!(decode_first_sheet(&[]).is_err());
    }

    #[test]
    fn test_serial_dates() {
        let date = serial_to_datetime(45_658.0).unwrap();
        assert_eq!(date.date(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());

        let noon = serial_to_datetime(45_658.5).unwrap();
        assert_eq!(noon.format("%H:%M").to_string(), "12:00");

        assert!(serial_to_datetime(-1.0).is_none());
        assert!(serial_to_datetime(f64::NAN).is_none());
    }

    #[test]
    fn test_serial_dates_around_phantom_leap_day() {
        let date = |serial: f64| serial_to_datetime(serial).map(|dt| dt.date());
        assert_eq!(date(1.0), NaiveDate::from_ymd_opt(1900, 1, 1));
        assert_eq!(date(59.0), NaiveDate::from_ymd_opt(1900, 2, 28));
        assert_eq!(date(61.0), NaiveDate::from_ymd_opt(1900, 3, 1));
        assert!(serial_to_datetime(60.0).is_none());
        assert!(serial_to_datetime(60.5).is_none());
    }

    #[test]
    fn test_cell_conversion() {
        assert_eq!(to_cell(&Data::Empty), CellValue::Empty);
        assert_eq!(
            to_cell(&Data::String("Jane".into())),
            CellValue::Text("Jane".into())
        );
        assert_eq!(to_cell(&Data::Int(7)), CellValue::Int(7));
        assert_eq!(to_cell(&Data::Float(1.5)), CellValue::Float(1.5));
        assert_eq!(to_cell(&Data::Bool(true)), CellValue::Bool(true));
    }
}
