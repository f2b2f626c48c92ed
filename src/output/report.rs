use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;

use crate::data::model::{Column, Table};
use crate::data::stats::{self, NumericSummary};

/// Fixed report filename, relative to the working directory.
pub const REPORT_FILE: &str = "analysis_report.txt";

const BANNER_WIDTH: usize = 60;
const HEAD_ROWS: usize = 5;
const TOP_VALUES: usize = 5;

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

/// A section banner: ruler, title, ruler.
pub fn banner(title: &str) -> String {
    let ruler = "=".repeat(BANNER_WIDTH);
    format!("{ruler}\n{title}\n{ruler}\n")
}

/// Render the first `limit` rows as a right-aligned text grid with a leading
/// row-index column, pandas-style.
pub fn render_head(table: &Table, limit: usize) -> String {
    let n = table.n_rows().min(limit);

    let headers: Vec<String> = std::iter::once(String::new())
        .chain(table.columns.iter().map(|c| c.name.clone()))
        .collect();
    let rows: Vec<Vec<String>> = (0..n)
        .map(|i| {
            std::iter::once(i.to_string())
                .chain(table.row(i).into_iter().map(|v| v.to_string()))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(c, header)| {
            rows.iter()
                .map(|row| row[c].len())
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect();

    let mut out = String::new();
    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(header, w)| format!("{:>width$}", header, width = *w))
        .collect();
    out.push_str(header_line.join("  ").trim_end());
    out.push('\n');

    for row in &rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:>width$}", cell, width = *w))
            .collect();
        out.push_str(&line.join("  "));
        out.push('\n');
    }
    out
}

/// One `name  dtype` line per column.
pub fn render_dtypes(table: &Table) -> String {
    let width = table
        .columns
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for col in &table.columns {
        let _ = writeln!(out, "{:<w$}  {}", col.name, col.dtype, w = width);
    }
    out
}

// ---------------------------------------------------------------------------
// Describe grid
// ---------------------------------------------------------------------------

const STAT_LABELS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

fn fmt_stat(v: f64) -> String {
    if v.is_nan() {
        "NaN".into()
    } else {
        format!("{v:.2}")
    }
}

fn stat_cell(summary: &Option<NumericSummary>, row: usize) -> String {
    let Some(s) = summary else {
        return "NaN".into();
    };
    match row {
        0 => s.count.to_string(),
        1 => fmt_stat(s.mean),
        2 => fmt_stat(s.std),
        3 => fmt_stat(s.min),
        4 => fmt_stat(s.q25),
        5 => fmt_stat(s.median),
        6 => fmt_stat(s.q75),
        _ => fmt_stat(s.max),
    }
}

/// Describe grid: one column per numeric column, one row per statistic.
pub fn render_describe_grid(columns: &[&Column]) -> String {
    let summaries: Vec<Option<NumericSummary>> =
        columns.iter().map(|c| stats::describe(c)).collect();

    let label_width = STAT_LABELS.iter().map(|l| l.len()).max().unwrap_or(0);
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(ci, c)| {
            (0..STAT_LABELS.len())
                .map(|r| stat_cell(&summaries[ci], r).len())
                .max()
                .unwrap_or(0)
                .max(c.name.len())
        })
        .collect();

    let mut out = String::new();
    let _ = write!(out, "{:<w$}", "", w = label_width);
    for (col, w) in columns.iter().zip(&widths) {
        let _ = write!(out, "  {:>width$}", col.name, width = *w);
    }
    out.push('\n');

    for (r, label) in STAT_LABELS.iter().enumerate() {
        let _ = write!(out, "{:<w$}", label, w = label_width);
        for (ci, w) in widths.iter().enumerate() {
            let _ = write!(out, "  {:>width$}", stat_cell(&summaries[ci], r), width = *w);
        }
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// Terminal views
// ---------------------------------------------------------------------------

/// Dataset overview: shape, column types, head, missing counts.
pub fn render_overview(table: &Table, source_name: &str) -> String {
    let mut out = banner("DATASET OVERVIEW");
    let _ = writeln!(out, "\nFile: {source_name}");
    let _ = writeln!(
        out,
        "Rows: {} | Columns: {}",
        table.n_rows(),
        table.n_cols()
    );

    out.push_str("\n--- Column Information ---\n");
    out.push_str(&render_dtypes(table));

    out.push_str("\n--- First 5 Rows ---\n");
    out.push_str(&render_head(table, HEAD_ROWS));

    out.push_str("\n--- Missing Values ---\n");
    if table.total_missing() == 0 {
        out.push_str("No missing values found\n");
    } else {
        let missing: Vec<(&str, usize)> = table
            .columns
            .iter()
            .map(|c| (c.name.as_str(), c.missing()))
            .filter(|(_, m)| *m > 0)
            .collect();
        let width = missing.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
        for (name, count) in missing {
            let _ = writeln!(out, "{:<w$}  {}", name, count, w = width);
        }
    }
    out
}

/// Statistical summary: describe grid for numeric columns, top value
/// frequencies for text columns. Either block disappears when no qualifying
/// column exists.
pub fn render_statistics(table: &Table) -> String {
    let mut out = banner("STATISTICAL SUMMARY");

    let numeric = table.numeric_columns();
    if !numeric.is_empty() {
        out.push_str("\n--- Numeric Columns ---\n");
        out.push_str(&render_describe_grid(&numeric));
    }

    let categorical = table.categorical_columns();
    if !categorical.is_empty() {
        out.push_str("\n--- Categorical Columns ---\n");
        for col in categorical {
            let _ = writeln!(out, "\n{}:", col.name);
            for (value, count) in stats::value_counts(col).into_iter().take(TOP_VALUES) {
                let _ = writeln!(out, "  {value:<16} {count}");
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Report export
// ---------------------------------------------------------------------------

/// Render the full text report, stamped with the generation time.
pub fn render_report(table: &Table, source_name: &str) -> String {
    let mut out = banner("DATA ANALYSIS REPORT");
    let _ = writeln!(out, "\nDataset: {source_name}");
    let _ = writeln!(
        out,
        "Generated: {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let _ = writeln!(out, "\n--- DATASET OVERVIEW ---");
    let _ = writeln!(out, "Rows: {}", table.n_rows());
    let _ = writeln!(out, "Columns: {}", table.n_cols());

    out.push_str("\n--- COLUMN TYPES ---\n");
    out.push_str(&render_dtypes(table));

    out.push_str("\n--- STATISTICAL SUMMARY ---\n");
    let numeric = table.numeric_columns();
    if numeric.is_empty() {
        out.push_str("No numeric columns\n");
    } else {
        out.push_str(&render_describe_grid(&numeric));
    }

    out.push_str("\n--- TOP 5 ROWS ---\n");
    out.push_str(&render_head(table, HEAD_ROWS));
    out
}

/// Write the report to `path`, overwriting any previous one.
pub fn write_report(table: &Table, source_name: &str, path: &Path) -> Result<()> {
    fs::write(path, render_report(table, source_name))
        .with_context(|| format!("writing report to {}", path.display()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
