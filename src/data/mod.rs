/// Data layer: core types, loading, cleaning, and statistics.
///
/// Architecture:
/// ```text
///  .csv / .xlsx / .xls        built-in sample
///        │                         │
///        ▼                         ▼
///   ┌──────────┐             ┌──────────┐
///   │  loader   │             │  sample  │
///   └──────────┘             └──────────┘
///        │                         │
///        └───────────┬─────────────┘
///                    ▼
///              ┌──────────┐
///              │  Table    │  Vec<Column>, typed cells
///              └──────────┘
///                │        │
///                ▼        ▼
///           ┌────────┐ ┌────────┐
///           │ clean  │ │ stats  │  dedup + impute / describe, corr
///           └────────┘ └────────┘
/// ```
pub mod clean;
pub mod loader;
pub mod model;
pub mod sample;
pub mod stats;
