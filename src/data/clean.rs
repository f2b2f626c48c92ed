use std::collections::HashSet;

use super::model::{CellValue, Table};
use super::stats;

// ---------------------------------------------------------------------------
// Cleaning: duplicate removal + missing-value imputation
// ---------------------------------------------------------------------------

/// What one cleaning pass did, for the user-facing summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanSummary {
    pub rows_before: usize,
    pub rows_after: usize,
    pub duplicates_removed: usize,
    pub values_filled: usize,
}

/// Clean the table in place: drop exact duplicate rows, then impute missing
/// values (median for numeric columns, most frequent value otherwise).
/// Idempotent on already-clean data.
pub fn clean(table: &mut Table) -> CleanSummary {
    let rows_before = table.n_rows();
    let duplicates_removed = drop_duplicates(table);
    let values_filled = fill_missing(table);
    CleanSummary {
        rows_before,
        rows_after: table.n_rows(),
        duplicates_removed,
        values_filled,
    }
}

/// Remove rows whose full cell sequence was already seen, keeping the first
/// occurrence. Returns the number of rows removed.
pub fn drop_duplicates(table: &mut Table) -> usize {
    let n = table.n_rows();
    let mut seen: HashSet<Vec<CellValue>> = HashSet::with_capacity(n);
    let keep: Vec<bool> = (0..n)
        .map(|i| {
            let row: Vec<CellValue> =
                table.columns.iter().map(|c| c.values[i].clone()).collect();
            seen.insert(row)
        })
        .collect();

    let removed = keep.iter().filter(|k| !**k).count();
    if removed > 0 {
        for col in &mut table.columns {
            let mut flags = keep.iter();
            col.values.retain(|_| *flags.next().expect("keep mask covers every row"));
        }
    }
    removed
}

/// Impute missing cells column by column. Numeric columns take the median of
/// their remaining values, all other columns the most frequent value (ties
/// broken by first encounter). A column with no non-missing values has
/// neither, so it is skipped and left as-is. Returns the cells filled.
pub fn fill_missing(table: &mut Table) -> usize {
    let mut filled = 0;
    for col in &mut table.columns {
        if col.missing() == 0 {
            continue;
        }
        let replacement = if col.is_numeric() {
            stats::median(col).map(CellValue::Float)
        } else {
            stats::mode(col)
        };
        match replacement {
            Some(value) => {
                for cell in &mut col.values {
                    if cell.is_null() {
                        *cell = value.clone();
                        filled += 1;
                    }
                }
            }
            None => {
                log::warn!("column '{}' is entirely missing, left unfilled", col.name);
            }
        }
    }
    filled
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
