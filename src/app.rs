use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::data::loader::{self, LoadError};
use crate::data::model::Table;
use crate::data::{clean, sample};
use crate::output::{dashboard, report};
use crate::session::Session;

// ---------------------------------------------------------------------------
// Interactive application
// ---------------------------------------------------------------------------

/// The interactive analyzer: owns the session and runs the menu loop.
pub struct AnalyzerApp {
    pub session: Session,
}

impl Default for AnalyzerApp {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyzerApp {
    pub fn new() -> Self {
        AnalyzerApp {
            session: Session::default(),
        }
    }

    /// Run the menu loop against stdin until exit or end of input.
    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        self.run_with(stdin.lock())
    }

    /// Menu loop over any line-based input, so tests can drive it.
    pub fn run_with<R: BufRead>(&mut self, input: R) -> Result<()> {
        let mut lines = input.lines();

        println!("\nRusty Analyst - load a dataset, inspect it, chart it.");
        loop {
            print_menu();
            let Some(choice) = prompt(&mut lines, "\nEnter your choice (1-8): ")? else {
                break;
            };
            match choice.as_str() {
                "1" => {
                    let Some(path) = prompt(&mut lines, "Enter file path: ")? else {
                        break;
                    };
                    self.load_path(Path::new(&path));
                }
                "2" => self.load_sample(),
                "3" => self.show_overview(),
                "4" => self.show_statistics(),
                "5" => self.clean_data(),
                "6" => self.create_visualizations(),
                "7" => self.export_report(),
                "8" => {
                    println!("\nGoodbye.");
                    break;
                }
                other => println!("\nInvalid choice '{other}'. Enter a number between 1 and 8."),
            }
        }
        Ok(())
    }

    // ---- Commands 1 & 2: loading -----------------------------------------

    fn load_path(&mut self, path: &Path) {
        match loader::load_file(path) {
            Ok(table) => {
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("dataset")
                    .to_string();
                log::info!(
                    "loaded {name}: {} rows, {} columns",
                    table.n_rows(),
                    table.n_cols()
                );
                println!(
                    "\nLoaded {name}: {} rows x {} columns",
                    table.n_rows(),
                    table.n_cols()
                );
                self.session.set_table(table, name);
            }
            Err(LoadError::Unsupported(ext)) => {
                println!("\nUnsupported file type: .{ext} (expected .csv, .xlsx or .xls)");
            }
            Err(e) => {
                log::error!("failed to load {}: {e}", path.display());
                println!("\nError loading file: {e}");
            }
        }
    }

    fn load_sample(&mut self) {
        let table = sample::sample_sales();
        println!(
            "\nSample dataset created ({} rows x {} columns)",
            table.n_rows(),
            table.n_cols()
        );
        self.session.set_table(table, sample::SAMPLE_NAME);
    }

    // ---- Commands 3 & 4: inspection --------------------------------------

    fn show_overview(&self) {
        let Some(table) = self.require_table() else {
            return;
        };
        print!("\n{}", report::render_overview(table, &self.session.source_name));
    }

    fn show_statistics(&self) {
        let Some(table) = self.require_table() else {
            return;
        };
        print!("\n{}", report::render_statistics(table));
    }

    // ---- Command 5: cleaning ---------------------------------------------

    fn clean_data(&mut self) {
        let Some(table) = self.session.table.as_mut() else {
            print_no_data();
            return;
        };

        let summary = clean::clean(table);
        print!("\n{}", report::banner("DATA CLEANING"));
        if summary.duplicates_removed > 0 {
            println!("Removed {} duplicate rows", summary.duplicates_removed);
        } else {
            println!("No duplicate rows found");
        }
        if summary.values_filled > 0 {
            println!("Filled {} missing values", summary.values_filled);
        } else {
            println!("No missing values found");
        }
        println!(
            "\nRows before: {} | Rows after: {}",
            summary.rows_before, summary.rows_after
        );
    }

    // ---- Command 6: visualization ----------------------------------------

    fn create_visualizations(&self) {
        let Some(table) = self.require_table() else {
            return;
        };
        match dashboard::render_dashboard(
            table,
            &self.session.source_name,
            Path::new(dashboard::DASHBOARD_FILE),
        ) {
            Ok(()) => println!("\nDashboard saved to: {}", dashboard::DASHBOARD_FILE),
            Err(e) => {
                log::error!("dashboard rendering failed: {e:#}");
                println!("\nError creating visualizations: {e:#}");
            }
        }
    }

    // ---- Command 7: report export ----------------------------------------

    fn export_report(&self) {
        let Some(table) = self.require_table() else {
            return;
        };
        match report::write_report(
            table,
            &self.session.source_name,
            Path::new(report::REPORT_FILE),
        ) {
            Ok(()) => println!("\nReport exported to: {}", report::REPORT_FILE),
            Err(e) => {
                log::error!("report export failed: {e:#}");
                println!("\nError exporting report: {e:#}");
            }
        }
    }

    /// The no-data guard shared by commands 3-7.
    fn require_table(&self) -> Option<&Table> {
        if !self.session.is_loaded() {
            print_no_data();
        }
        self.session.table.as_ref()
    }
}

fn print_no_data() {
    println!("\nNo data loaded. Load a file first (option 1 or 2).");
}

fn print_menu() {
    let ruler = "=".repeat(60);
    println!("\n{ruler}");
    println!("DATA ANALYZER - Main Menu");
    println!("{ruler}");
    println!("1. Load CSV/Excel file");
    println!("2. Use sample dataset");
    println!("3. Show dataset overview");
    println!("4. Show statistics");
    println!("5. Clean data");
    println!("6. Create visualizations");
    println!("7. Export report");
    println!("8. Exit");
    println!("{ruler}");
}

/// Print `msg`, then read one trimmed line. `None` means end of input.
fn prompt<R: BufRead>(lines: &mut io::Lines<R>, msg: &str) -> Result<Option<String>> {
    print!("{msg}");
    io::stdout().flush().context("flushing stdout")?;
    match lines.next() {
        Some(line) => Ok(Some(line.context("reading input")?.trim().to_string())),
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn sample_then_exit_loads_the_session() {
        let mut app = AnalyzerApp::new();
        app.run_with(Cursor::new("2\n8\n")).unwrap();

        assert!(app.session.is_loaded());
        assert_eq!(app.session.source_name, sample::SAMPLE_NAME);
        let table = app.session.table.as_ref().unwrap();
        assert_eq!(table.n_rows(), 100);
        assert_eq!(table.n_cols(), 6);
    }

    #[test]
    fn invalid_choices_keep_the_loop_alive() {
        let mut app = AnalyzerApp::new();
        app.run_with(Cursor::new("0\nnine\n\n99\n2\n8\n")).unwrap();
        assert!(app.session.is_loaded());
    }

    #[test]
    fn end_of_input_terminates_the_loop() {
        let mut app = AnalyzerApp::new();
        app.run_with(Cursor::new("")).unwrap();
        assert!(!app.session.is_loaded());
    }

    #[test]
    fn inspection_without_data_is_a_no_op() {
        let mut app = AnalyzerApp::new();
        // Overview, statistics, and clean all hit the no-data guard.
        app.run_with(Cursor::new("3\n4\n5\n8\n")).unwrap();
        assert!(!app.session.is_loaded());
    }

    #[test]
    fn failed_load_keeps_session_unchanged() {
        let mut app = AnalyzerApp::new();
        app.run_with(Cursor::new("1\nno_such_file.csv\n1\ndata.txt\n8\n"))
            .unwrap();
        assert!(!app.session.is_loaded());
        assert_eq!(app.session.source_name, "");
    }

    #[test]
    fn cleaning_the_sample_reports_idempotent_state() {
        let mut app = AnalyzerApp::new();
        app.run_with(Cursor::new("2\n5\n5\n8\n")).unwrap();
        // The sample has no duplicates or gaps, so cleaning changes nothing.
        let table = app.session.table.as_ref().unwrap();
        assert_eq!(table.n_rows(), 100);
        assert_eq!(table.total_missing(), 0);
    }
}
