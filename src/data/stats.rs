use std::collections::hash_map::Entry;
use std::collections::HashMap;

use super::model::{CellValue, Column, Table};

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

/// Summary of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1); NaN when fewer than two values.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Describe a numeric column over its non-missing, finite values.
/// Returns `None` when nothing is left to summarize.
pub fn describe(column: &Column) -> Option<NumericSummary> {
    let mut vals = column.numeric_values();
    vals.retain(|v| v.is_finite());
    if vals.is_empty() {
        return None;
    }
    vals.sort_by(f64::total_cmp);

    let count = vals.len();
    let mean = vals.iter().sum::<f64>() / count as f64;
    let std = if count > 1 {
        (vals.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64).sqrt()
    } else {
        f64::NAN
    };

    Some(NumericSummary {
        count,
        mean,
        std,
        min: vals[0],
        q25: quantile(&vals, 0.25),
        median: quantile(&vals, 0.5),
        q75: quantile(&vals, 0.75),
        max: vals[count - 1],
    })
}

/// Median of the non-missing values, or `None` for an all-missing column.
pub fn median(column: &Column) -> Option<f64> {
    let mut vals = column.numeric_values();
    vals.retain(|v| v.is_finite());
    if vals.is_empty() {
        return None;
    }
    vals.sort_by(f64::total_cmp);
    Some(quantile(&vals, 0.5))
}

/// Quantile by linear interpolation between closest ranks. Input sorted.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (pos - lo as f64) * (sorted[hi] - sorted[lo])
    }
}

// ---------------------------------------------------------------------------
// Frequencies
// ---------------------------------------------------------------------------

/// Value frequencies in descending order of count. Missing cells are skipped;
/// ties keep first-encountered row order (the sort is stable over it).
pub fn value_counts(column: &Column) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for v in &column.values {
        if v.is_null() {
            continue;
        }
        match counts.entry(v.to_string()) {
            Entry::Occupied(mut seen) => *seen.get_mut() += 1,
            Entry::Vacant(slot) => {
                order.push(slot.key().clone());
                slot.insert(1);
            }
        }
    }
    let mut out: Vec<(String, usize)> = order
        .into_iter()
        .map(|k| {
            let c = counts[&k];
            (k, c)
        })
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

/// Most frequent non-missing value, ties broken by first encounter.
/// `None` for an all-missing column.
pub fn mode(column: &Column) -> Option<CellValue> {
    let mut order: Vec<CellValue> = Vec::new();
    let mut counts: HashMap<CellValue, usize> = HashMap::new();
    for v in &column.values {
        if v.is_null() {
            continue;
        }
        match counts.entry(v.clone()) {
            Entry::Occupied(mut seen) => *seen.get_mut() += 1,
            Entry::Vacant(slot) => {
                order.push(slot.key().clone());
                slot.insert(1);
            }
        }
    }
    // Strictly-greater replacement keeps the earliest value on ties.
    let mut best: Option<(CellValue, usize)> = None;
    for v in order {
        let c = counts[&v];
        if best.as_ref().map_or(true, |(_, bc)| c > *bc) {
            best = Some((v, c));
        }
    }
    best.map(|(v, _)| v)
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation over all numeric columns: column names plus the
/// symmetric matrix. `None` when fewer than two numeric columns exist.
pub fn correlation_matrix(table: &Table) -> Option<(Vec<String>, Vec<Vec<f64>>)> {
    let numeric = table.numeric_columns();
    if numeric.len() < 2 {
        return None;
    }

    let names: Vec<String> = numeric.iter().map(|c| c.name.clone()).collect();
    let data: Vec<Vec<f64>> = numeric
        .iter()
        .map(|c| {
            c.values
                .iter()
                .map(|v| v.as_f64().unwrap_or(f64::NAN))
                .collect()
        })
        .collect();

    let n = data.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&data[i], &data[j]);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    Some((names, matrix))
}

/// Pearson r over the rows where both values are present and finite.
/// NaN when fewer than two such rows exist or either side is constant.
fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(&a, &b)| (a, b))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        f64::NAN
    } else {
        cov / denom
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn int_column(name: &str, values: &[i64]) -> Column {
        Column::from_cells(
            name,
            values.iter().map(|&v| CellValue::Integer(v)).collect(),
        )
    }

    fn text_column(name: &str, values: &[&str]) -> Column {
        Column::from_cells(
            name,
            values
                .iter()
                .map(|&v| CellValue::Text(v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn describe_one_to_five() {
        let s = describe(&int_column("n", &[1, 2, 3, 4, 5])).unwrap();
        assert_eq!(s.count, 5);
        assert_eq!(s.mean, 3.0);
        assert!((s.std - 2.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.q25, 2.0);
        assert_eq!(s.median, 3.0);
        assert_eq!(s.q75, 4.0);
        assert_eq!(s.max, 5.0);
    }

    #[test]
    fn quartiles_interpolate() {
        let s = describe(&int_column("n", &[1, 2, 3, 4])).unwrap();
        assert_eq!(s.q25, 1.75);
        assert_eq!(s.median, 2.5);
        assert_eq!(s.q75, 3.25);
    }

    #[test]
    fn describe_skips_missing() {
        let col = Column::from_cells(
            "n",
            vec![
                CellValue::Integer(10),
                CellValue::Null,
                CellValue::Integer(20),
            ],
        );
        let s = describe(&col).unwrap();
        assert_eq!(s.count, 2);
        assert_eq!(s.mean, 15.0);
    }

    #[test]
    fn describe_all_missing_is_none() {
        // A numeric-typed column can still be drained to nothing.
        let col = Column {
            name: "n".into(),
            dtype: crate::data::model::ColumnType::Float,
            values: vec![CellValue::Null, CellValue::Null],
        };
        assert!(describe(&col).is_none());
        assert!(median(&col).is_none());
    }

    #[test]
    fn single_value_std_is_nan() {
        let s = describe(&int_column("n", &[7])).unwrap();
        assert!(s.std.is_nan());
        assert_eq!(s.median, 7.0);
    }

    #[test]
    fn value_counts_sorted_with_stable_ties() {
        let col = text_column("r", &["b", "a", "a", "c", "b", "a"]);
        let counts = value_counts(&col);
        // "b" and "c"... "a" has 3, "b" has 2, "c" has 1.
        assert_eq!(
            counts,
            vec![
                ("a".to_string(), 3),
                ("b".to_string(), 2),
                ("c".to_string(), 1)
            ]
        );

        // Tie between "x" and "y": "x" appears first in row order.
        let tied = text_column("t", &["x", "y", "y", "x"]);
        assert_eq!(
            value_counts(&tied),
            vec![("x".to_string(), 2), ("y".to_string(), 2)]
        );
    }

    #[test]
    fn mode_prefers_first_encountered_on_tie() {
        let col = text_column("t", &["south", "north", "north", "south"]);
        assert_eq!(mode(&col), Some(CellValue::Text("south".into())));

        let empty = Column::from_cells("e", vec![CellValue::Null]);
        assert_eq!(mode(&empty), None);
    }

    #[test]
    fn pearson_detects_linear_relationships() {
        let up = int_column("up", &[1, 2, 3, 4, 5]);
        let down = int_column("down", &[10, 8, 6, 4, 2]);
        let table = Table::new(vec![up, down]);

        let (names, matrix) = correlation_matrix(&table).unwrap();
        assert_eq!(names, vec!["up".to_string(), "down".to_string()]);
        assert!((matrix[0][0] - 1.0).abs() < 1e-12);
        assert!((matrix[0][1] + 1.0).abs() < 1e-12);
        assert!((matrix[1][0] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_column_correlation_is_nan() {
        let a = int_column("a", &[1, 2, 3]);
        let b = int_column("b", &[5, 5, 5]);
        let (_, matrix) = correlation_matrix(&Table::new(vec![a, b])).unwrap();
        assert!(matrix[0][1].is_nan());
    }

    #[test]
    fn single_numeric_column_has_no_matrix() {
        let table = Table::new(vec![int_column("only", &[1, 2, 3])]);
        assert!(correlation_matrix(&table).is_none());
    }
}
