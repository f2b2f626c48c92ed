use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;
use thiserror::Error;

use super::model::{CellValue, Column, Table};

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Everything that can go wrong while loading a file. The session is only
/// replaced on success, so any of these leaves the current table untouched.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file type: .{0}")]
    Unsupported(String),
    #[error("reading CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("reading spreadsheet: {0}")]
    Excel(#[from] calamine::Error),
    #[error("{0}")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`           – delimited text with a header row
/// * `.xlsx` / `.xls` – first worksheet, first row as headers
pub fn load_file(path: &Path) -> Result<Table, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "xlsx" | "xls" => load_excel(path),
        other => Err(LoadError::Unsupported(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const NULL_TOKENS: &[&str] = &["na", "n/a", "nan", "null"];

/// Parse one raw text cell into the narrowest matching value.
fn parse_cell(raw: &str) -> CellValue {
    let s = raw.trim();
    if s.is_empty() || NULL_TOKENS.contains(&s.to_ascii_lowercase().as_str()) {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return CellValue::Date(d.format("%Y-%m-%d").to_string());
        }
    }
    CellValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
/// Short records pad with nulls; fields beyond the header width are dropped.
fn load_csv(path: &Path) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() {
        return Err(LoadError::Malformed("CSV has no header row".into()));
    }

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];
    for result in reader.records() {
        let record = result?;
        for (idx, col) in cells.iter_mut().enumerate() {
            col.push(parse_cell(record.get(idx).unwrap_or("")));
        }
    }

    Ok(build_table(headers, cells))
}

// ---------------------------------------------------------------------------
// Excel loader
// ---------------------------------------------------------------------------

/// Read the first worksheet of an `.xlsx` / `.xls` workbook.
fn load_excel(path: &Path) -> Result<Table, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| LoadError::Malformed("workbook has no sheets".into()))?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| LoadError::Malformed(format!("sheet '{sheet_name}' is empty")))?
        .iter()
        .map(|c| c.to_string().trim().to_string())
        .collect();

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (idx, col) in cells.iter_mut().enumerate() {
            col.push(row.get(idx).map_or(CellValue::Null, excel_cell));
        }
    }

    Ok(build_table(headers, cells))
}

fn excel_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        // Typed text still goes through inference so dates and numbers
        // entered as text behave like their CSV counterparts.
        Data::String(s) => parse_cell(s),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => CellValue::Date(ndt.date().format("%Y-%m-%d").to_string()),
            None => CellValue::Null,
        },
        Data::DateTimeIso(s) => CellValue::Date(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(format!("{e:?}")),
    }
}

fn build_table(headers: Vec<String>, cells: Vec<Vec<CellValue>>) -> Table {
    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::from_cells(name, values))
        .collect();
    Table::new(columns)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ColumnType;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_well_formed_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "sales.csv",
            "Region,Sales,When\nNorth,100,2024-01-01\nSouth,200,2024-01-02\n",
        );

        let table = load_file(&path).unwrap();
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.n_cols(), 3);
        assert_eq!(table.columns[0].dtype, ColumnType::Text);
        assert_eq!(table.columns[1].dtype, ColumnType::Integer);
        assert_eq!(table.columns[2].dtype, ColumnType::Date);
        assert_eq!(table.columns[1].values[1], CellValue::Integer(200));
    }

    #[test]
    fn reloading_yields_identical_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "again.csv", "a,b\n1,x\n2,y\n");

        let first = load_file(&path).unwrap();
        let second = load_file(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_fields_and_null_tokens_become_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "gaps.csv", "a,b\n1,\nNA,y\n3,z\n");

        let table = load_file(&path).unwrap();
        assert_eq!(table.columns[0].missing(), 1);
        assert_eq!(table.columns[1].missing(), 1);
        // Numeric column with a gap widens to float.
        assert_eq!(table.columns[0].dtype, ColumnType::Float);
    }

    #[test]
    fn short_records_pad_with_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "ragged.csv", "a,b,c\n1,2\n4,5,6\n");

        let table = load_file(&path).unwrap();
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.columns[2].missing(), 1);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_file(Path::new("data.txt")).unwrap_err();
        assert!(matches!(err, LoadError::Unsupported(ext) if ext == "txt"));
    }

    #[test]
    fn missing_file_reports_load_error() {
        let err = load_file(Path::new("definitely_not_here.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Csv(_)));
    }
}
