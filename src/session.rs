use crate::data::model::Table;

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// The current dataset and where it came from, independent of any I/O.
/// At most one table is held at a time; a successful load replaces it.
#[derive(Debug, Default)]
pub struct Session {
    /// Loaded dataset (None until the user loads a file or the sample).
    pub table: Option<Table>,

    /// Display name of the data source, shown in reports and chart titles.
    pub source_name: String,
}

impl Session {
    /// Ingest a newly loaded table, replacing whatever was there.
    pub fn set_table(&mut self, table: Table, source_name: impl Into<String>) {
        self.table = Some(table);
        self.source_name = source_name.into();
    }

    pub fn is_loaded(&self) -> bool {
        self.table.is_some()
    }
}
