/// Output layer, split by audience:
///
/// * `report`    – plain-text summaries for the terminal and the exported
///   `analysis_report.txt`
/// * `dashboard` – the 2×2 chart grid rendered to `analysis_dashboard.png`
pub mod dashboard;
pub mod report;
