use chrono::{Days, NaiveDate};

use super::model::{CellValue, Column, Table};

/// Display name used when the sample dataset is loaded.
pub const SAMPLE_NAME: &str = "sample_sales_data";

const SAMPLE_ROWS: usize = 100;
const SAMPLE_SEED: u64 = 42;

// ---------------------------------------------------------------------------
// Deterministic PRNG
// ---------------------------------------------------------------------------

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform integer in `[lo, hi)`.
    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_u64() % (hi - lo) as u64) as i64
    }

    fn choice<'a, T>(&mut self, options: &'a [T]) -> &'a T {
        &options[(self.next_u64() % options.len() as u64) as usize]
    }
}

// ---------------------------------------------------------------------------
// Sample dataset
// ---------------------------------------------------------------------------

/// Generate the built-in demonstration dataset: 100 rows of daily sales with
/// region, product, sales amount, unit count, and derived unit price.
/// Fixed seed, so every invocation produces the identical table.
pub fn sample_sales() -> Table {
    let mut rng = SimpleRng::new(SAMPLE_SEED);
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid start date");

    let regions = ["North", "South", "East", "West"];
    let products = ["Product A", "Product B", "Product C"];

    let mut dates = Vec::with_capacity(SAMPLE_ROWS);
    let mut region_cells = Vec::with_capacity(SAMPLE_ROWS);
    let mut product_cells = Vec::with_capacity(SAMPLE_ROWS);
    let mut sales_cells = Vec::with_capacity(SAMPLE_ROWS);
    let mut unit_cells = Vec::with_capacity(SAMPLE_ROWS);
    let mut price_cells = Vec::with_capacity(SAMPLE_ROWS);

    for i in 0..SAMPLE_ROWS {
        let date = start + Days::new(i as u64);
        let sales = rng.range(1000, 10000);
        let units = rng.range(10, 100);
        let price = ((sales as f64 / units as f64) * 100.0).round() / 100.0;

        dates.push(CellValue::Date(date.format("%Y-%m-%d").to_string()));
        region_cells.push(CellValue::Text((*rng.choice(&regions)).to_string()));
        product_cells.push(CellValue::Text((*rng.choice(&products)).to_string()));
        sales_cells.push(CellValue::Integer(sales));
        unit_cells.push(CellValue::Integer(units));
        price_cells.push(CellValue::Float(price));
    }

    Table::new(vec![
        Column::from_cells("Date", dates),
        Column::from_cells("Region", region_cells),
        Column::from_cells("Product", product_cells),
        Column::from_cells("Sales", sales_cells),
        Column::from_cells("Units", unit_cells),
        Column::from_cells("Price", price_cells),
    ])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ColumnType;

    #[test]
    fn sample_has_expected_shape() {
        let table = sample_sales();
        assert_eq!(table.n_rows(), 100);
        assert_eq!(table.n_cols(), 6);
        assert_eq!(table.total_missing(), 0);

        let dtypes: Vec<ColumnType> = table.columns.iter().map(|c| c.dtype).collect();
        assert_eq!(
            dtypes,
            vec![
                ColumnType::Date,
                ColumnType::Text,
                ColumnType::Text,
                ColumnType::Integer,
                ColumnType::Integer,
                ColumnType::Float,
            ]
        );
    }

    #[test]
    fn sample_is_deterministic() {
        assert_eq!(sample_sales(), sample_sales());
    }

    #[test]
    fn price_is_sales_over_units_rounded() {
        let table = sample_sales();
        for i in 0..table.n_rows() {
            let sales = table.columns[3].values[i].as_f64().unwrap();
            let units = table.columns[4].values[i].as_f64().unwrap();
            let price = table.columns[5].values[i].as_f64().unwrap();
            let expected = (sales / units * 100.0).round() / 100.0;
            assert_eq!(price, expected, "row {i}");
        }
    }

    #[test]
    fn dates_are_consecutive_days() {
        let table = sample_sales();
        assert_eq!(table.columns[0].values[0], CellValue::Date("2024-01-01".into()));
        assert_eq!(table.columns[0].values[99], CellValue::Date("2024-04-09".into()));
    }

    #[test]
    fn value_ranges_hold() {
        let table = sample_sales();
        for i in 0..table.n_rows() {
            let sales = table.columns[3].values[i].as_f64().unwrap();
            let units = table.columns[4].values[i].as_f64().unwrap();
            assert!((1000.0..10000.0).contains(&sales));
            assert!((10.0..100.0).contains(&units));
        }
    }
}
