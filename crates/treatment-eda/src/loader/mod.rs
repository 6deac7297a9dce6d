//! Workbook loading.
//!
//! Reads the first worksheet of an `.xlsx` / `.xls` workbook into a
//! `DataFrame`. The first row is the header. A column is stored as `Float64`
//! when every non-empty cell is a number, and as `String` otherwise.

use crate::error::{EdaError, Result, ResultExt};
use calamine::{Data, Reader, open_workbook_auto};
use polars::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Extensions accepted by [`load_workbook`], compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xls"];

static EMPTY_CELL: Data = Data::Empty;

/// Check that `path` names a spreadsheet workbook.
pub fn check_extension(path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    if SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(EdaError::UnsupportedFormat(format!(".{}", extension)))
    }
}

/// Load the first worksheet of the workbook at `path`.
pub fn load_workbook(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(EdaError::InputNotFound(path.to_path_buf()));
    }
    check_extension(path)?;

    let mut workbook = open_workbook_auto(path)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| EdaError::EmptyWorkbook(path.to_path_buf()))?;
    debug!("Reading sheet '{}' from {}", sheet, path.display());

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(EdaError::from)
        .context(format!("Reading sheet '{}'", sheet))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| EdaError::EmptyWorkbook(path.to_path_buf()))?;
    let names = header_names(header);
    let body: Vec<&[Data]> = rows.collect();

    let columns: Vec<Column> = names
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: Vec<&Data> = body
                .iter()
                .map(|row| row.get(idx).unwrap_or(&EMPTY_CELL))
                .collect();
            cells_to_series(name, &cells).into_column()
        })
        .collect();

    let df = DataFrame::new(columns).context("Building table from worksheet")?;

    info!(
        "Loaded {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    info!("Columns: {}", names.join(", "));

    Ok(df)
}

/// Header cells as unique column names.
///
/// Blank headers become `column_<n>`; repeated names get a `.<k>` suffix.
fn header_names(header: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    header
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let base = match cell_text(cell) {
                Some(text) => text,
                None => format!("column_{}", idx),
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}

/// Text of a cell, `None` for empty cells and blank strings.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}

fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(i) => Some(*i as f64),
        Data::Float(f) => Some(*f),
        _ => None,
    }
}

/// Build a Series from one worksheet column.
fn cells_to_series(name: &str, cells: &[&Data]) -> Series {
    let observed: Vec<&&Data> = cells.iter().filter(|c| cell_text(c).is_some()).collect();
    let numeric = !observed.is_empty() && observed.iter().all(|c| cell_number(c).is_some());

    if numeric {
        let values: Vec<Option<f64>> = cells.iter().map(|c| cell_number(c)).collect();
        Series::new(name.into(), values)
    } else {
        let values: Vec<Option<String>> = cells.iter().map(|c| cell_text(c)).collect();
        Series::new(name.into(), values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_check_extension() {
        assert!(check_extension(Path::new("data/cases.xlsx")).is_ok());
        assert!(check_extension(Path::new("data/cases.XLS")).is_ok());

        let err = check_extension(Path::new("data/cases.csv")).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
        assert!(check_extension(Path::new("data/cases")).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = load_workbook(&PathBuf::from("does/not/exist.xlsx")).unwrap_err();
        assert!(matches!(err, EdaError::InputNotFound(_)));
    }

    #[test]
    fn test_numeric_column_inference() {
        let cells = [Data::Int(3), Data::Empty, Data::Float(4.5)];
        let refs: Vec<&Data> = cells.iter().collect();
        let series = cells_to_series("Yas", &refs);

        assert_eq!(series.dtype(), &DataType::Float64);
        assert_eq!(series.null_count(), 1);
        assert_eq!(series.f64().unwrap().get(0), Some(3.0));
    }

    #[test]
    fn test_mixed_column_is_text() {
        let cells = [
            Data::String("5 Seans".to_string()),
            Data::Float(15.0),
            Data::String("  ".to_string()),
        ];
        let refs: Vec<&Data> = cells.iter().collect();
        let series = cells_to_series("TedaviSuresi", &refs);

        assert_eq!(series.dtype(), &DataType::String);
        assert_eq!(series.str().unwrap().get(0), Some("5 Seans"));
        assert_eq!(series.str().unwrap().get(1), Some("15"));
        assert_eq!(series.null_count(), 1);
    }

    #[test]
    fn test_empty_column_is_text() {
        let cells = [Data::Empty, Data::Empty];
        let refs: Vec<&Data> = cells.iter().collect();
        let series = cells_to_series("Alerji", &refs);

        assert_eq!(series.dtype(), &DataType::String);
        assert_eq!(series.null_count(), 2);
    }

    #[test]
    fn test_header_names() {
        let header = [
            Data::String("Yas".to_string()),
            Data::Empty,
            Data::String("Yas".to_string()),
        ];
        assert_eq!(header_names(&header), vec!["Yas", "column_1", "Yas.1"]);
    }
}
