use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value covering the scalar types the loader infers.
/// Manual `Eq`/`Hash` (floats via `to_bits`) so whole rows can be hashed for
/// duplicate detection and values counted for frequency tables.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date kept as text; validated by the loader.
    Date(String),
    Null,
}

impl Eq for CellValue {}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) | CellValue::Date(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => {
                if v.is_finite() && v.fract() == 0.0 {
                    write!(f, "{v:.1}")
                } else {
                    write!(f, "{v}")
                }
            }
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` for numeric operations.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// ColumnType – the declared type of a column
// ---------------------------------------------------------------------------

/// Column type inferred after parsing all cells of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Bool,
    Date,
    Text,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Bool => "bool",
            ColumnType::Date => "date",
            ColumnType::Text => "text",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Column – one named, typed column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub dtype: ColumnType,
    pub values: Vec<CellValue>,
}

impl Column {
    /// Build a column from parsed cells: infer the type, then widen or
    /// re-render cells so every non-null cell matches the declared type.
    pub fn from_cells(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        let dtype = infer_dtype(&values);
        let values = normalize(dtype, values);
        Column {
            name: name.into(),
            dtype,
            values,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.dtype, ColumnType::Integer | ColumnType::Float)
    }

    /// Number of missing cells.
    pub fn missing(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Non-null cells as `f64`, in row order.
    pub fn numeric_values(&self) -> Vec<f64> {
        self.values.iter().filter_map(|v| v.as_f64()).collect()
    }
}

/// Infer the column type from the parsed cells.
///
/// Integer cells mixed with floats widen to `Float`, and an integer column
/// containing missing values is also declared `Float` (the missing entries
/// can only be imputed with a fractional median). Any other mixture, or an
/// all-null column, falls back to `Text`.
fn infer_dtype(values: &[CellValue]) -> ColumnType {
    let (mut ints, mut floats, mut bools, mut dates, mut texts, mut nulls) =
        (0usize, 0usize, 0usize, 0usize, 0usize, 0usize);
    for v in values {
        match v {
            CellValue::Integer(_) => ints += 1,
            CellValue::Float(_) => floats += 1,
            CellValue::Bool(_) => bools += 1,
            CellValue::Date(_) => dates += 1,
            CellValue::Text(_) => texts += 1,
            CellValue::Null => nulls += 1,
        }
    }

    if ints + floats + bools + dates == 0 || texts > 0 {
        return ColumnType::Text;
    }
    if bools == 0 && dates == 0 {
        if floats > 0 || nulls > 0 {
            ColumnType::Float
        } else {
            ColumnType::Integer
        }
    } else if ints + floats == 0 && dates == 0 {
        ColumnType::Bool
    } else if ints + floats == 0 && bools == 0 {
        ColumnType::Date
    } else {
        ColumnType::Text
    }
}

/// Rewrite cells so they agree with the declared column type.
fn normalize(dtype: ColumnType, values: Vec<CellValue>) -> Vec<CellValue> {
    match dtype {
        ColumnType::Float => values
            .into_iter()
            .map(|v| match v {
                CellValue::Integer(i) => CellValue::Float(i as f64),
                other => other,
            })
            .collect(),
        ColumnType::Text => values
            .into_iter()
            .map(|v| match v {
                CellValue::Null => CellValue::Null,
                CellValue::Text(s) => CellValue::Text(s),
                other => CellValue::Text(other.to_string()),
            })
            .collect(),
        _ => values,
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// An ordered set of equal-length columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        debug_assert!(
            columns
                .windows(2)
                .all(|w| w[0].values.len() == w[1].values.len()),
            "columns must have equal lengths"
        );
        Table { columns }
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Borrow row `idx` across all columns.
    pub fn row(&self, idx: usize) -> Vec<&CellValue> {
        self.columns.iter().map(|c| &c.values[idx]).collect()
    }

    pub fn numeric_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_numeric()).collect()
    }

    /// Text columns, the ones frequency statistics and the bar chart use.
    pub fn categorical_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| c.dtype == ColumnType::Text)
            .collect()
    }

    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|c| c.missing()).sum()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_column_stays_integer() {
        let col = Column::from_cells("n", vec![CellValue::Integer(1), CellValue::Integer(2)]);
        assert_eq!(col.dtype, ColumnType::Integer);
        assert_eq!(col.missing(), 0);
    }

    #[test]
    fn integer_with_float_widens_to_float() {
        let col = Column::from_cells("n", vec![CellValue::Integer(1), CellValue::Float(2.5)]);
        assert_eq!(col.dtype, ColumnType::Float);
        assert_eq!(col.values[0], CellValue::Float(1.0));
    }

    #[test]
    fn integer_with_nulls_widens_to_float() {
        let col = Column::from_cells(
            "n",
            vec![CellValue::Integer(1), CellValue::Null, CellValue::Integer(3)],
        );
        assert_eq!(col.dtype, ColumnType::Float);
        assert_eq!(col.missing(), 1);
        assert_eq!(col.numeric_values(), vec![1.0, 3.0]);
    }

    #[test]
    fn mixed_cells_fall_back_to_text() {
        let col = Column::from_cells(
            "m",
            vec![
                CellValue::Integer(7),
                CellValue::Text("seven".into()),
                CellValue::Null,
            ],
        );
        assert_eq!(col.dtype, ColumnType::Text);
        assert_eq!(col.values[0], CellValue::Text("7".into()));
        assert!(col.values[2].is_null());
    }

    #[test]
    fn all_null_column_is_text() {
        let col = Column::from_cells("empty", vec![CellValue::Null, CellValue::Null]);
        assert_eq!(col.dtype, ColumnType::Text);
        assert_eq!(col.missing(), 2);
    }

    #[test]
    fn date_column_detected() {
        let col = Column::from_cells(
            "d",
            vec![
                CellValue::Date("2024-01-01".into()),
                CellValue::Date("2024-01-02".into()),
            ],
        );
        assert_eq!(col.dtype, ColumnType::Date);
    }

    #[test]
    fn rows_hash_equal_when_cells_equal() {
        use std::collections::HashSet;

        let row_a = vec![CellValue::Text("North".into()), CellValue::Integer(100)];
        let row_b = vec![CellValue::Text("North".into()), CellValue::Integer(100)];
        let mut seen = HashSet::new();
        assert!(seen.insert(row_a));
        assert!(!seen.insert(row_b));
    }

    #[test]
    fn table_shape_and_rows() {
        let table = Table::new(vec![
            Column::from_cells("a", vec![CellValue::Integer(1), CellValue::Integer(2)]),
            Column::from_cells("b", vec![CellValue::Text("x".into()), CellValue::Null]),
        ]);
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.n_cols(), 2);
        assert_eq!(table.total_missing(), 1);
        assert_eq!(
            table.row(0),
            vec![&CellValue::Integer(1), &CellValue::Text("x".into())]
        );
        assert_eq!(table.numeric_columns().len(), 1);
        assert_eq!(table.categorical_columns().len(), 1);
    }
}
