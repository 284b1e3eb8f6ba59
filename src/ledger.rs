//! Per-row order records and the grand total derived from them.
//!
//! The DOM only mirrors this state: row sums and the total are written to the
//! page after every update but never read back.

use serde::Serialize;

use crate::numeric::{coerce_quantity, format_number, to_number};
use crate::template::RowInstance;

/// State of one rendered row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowRecord {
    /// Rendered identifier text.
    pub id: Option<String>,
    /// Price text as rendered into the row.
    pub price_text: String,
    /// Numeric price (NaN if the text is not a number).
    pub price: f64,
    /// Last accepted non-zero quantity.
    pub quantity: Option<f64>,
    /// Last computed row sum.
    pub sum: Option<f64>,
}

impl RowRecord {
    /// A fresh record from the id and price text rendered into a row.
    #[must_use]
    pub fn new(id: Option<String>, price_text: impl Into<String>) -> Self {
        let price_text = price_text.into();
        Self {
            id,
            price: to_number(&price_text),
            price_text,
            quantity: None,
            sum: None,
        }
    }
}

/// Result of one quantity edit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantityUpdate {
    /// Text to write back into the input.
    pub display: String,
    /// Coerced quantity.
    pub quantity: f64,
    /// New row sum; `None` when a zero quantity skipped recomputation.
    pub row_sum: Option<f64>,
    /// New grand total; `None` when a zero quantity skipped recomputation.
    pub total: Option<f64>,
}

/// All rows of one calculator instance.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Ledger {
    rows: Vec<RowRecord>,
    only_integer: bool,
}

impl Ledger {
    #[must_use]
    pub fn new(rows: Vec<RowRecord>, only_integer: bool) -> Self {
        Self { rows, only_integer }
    }

    /// Records for a plain column layout, where the id and price slots show
    /// exactly fields `id_column` and `price_column`. A missing price field
    /// reads as empty text.
    #[must_use]
    pub fn from_columns(
        rows: &[RowInstance],
        id_column: usize,
        price_column: usize,
        only_integer: bool,
    ) -> Self {
        let records = rows
            .iter()
            .map(|row| {
                RowRecord::new(
                    row.field(id_column).map(str::to_string),
                    row.field(price_column).unwrap_or_default(),
                )
            })
            .collect();
        Self::new(records, only_integer)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn rows(&self) -> &[RowRecord] {
        &self.rows
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<&RowRecord> {
        self.rows.get(index)
    }

    /// Last computed sum of row `index`; `None` if the row was never
    /// given a non-zero quantity or does not exist.
    #[must_use]
    pub fn row_sum(&self, index: usize) -> Option<f64> {
        self.rows.get(index)?.sum
    }

    /// Sum of every row sum that is a number. Rows never edited count as 0.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.rows
            .iter()
            .filter_map(|r| r.sum)
            .filter(|s| !s.is_nan())
            .sum()
    }

    /// Apply a raw quantity entry to row `index`.
    ///
    /// A quantity that coerces to zero (including non-numeric input) leaves
    /// the row sum and the total as they were, even if the row previously
    /// held a non-zero quantity.
    ///
    /// Returns `None` if `index` is out of range.
    pub fn apply_quantity(&mut self, index: usize, raw: &str) -> Option<QuantityUpdate> {
        let quantity = coerce_quantity(raw, self.only_integer);
        let display = format_number(quantity);

        let row = self.rows.get_mut(index)?;
        if quantity == 0.0 {
            tracing::debug!(row = index, "zero quantity, totals unchanged");
            return Some(QuantityUpdate {
                display,
                quantity,
                row_sum: None,
                total: None,
            });
        }

        let sum = quantity * row.price;
        row.quantity = Some(quantity);
        row.sum = Some(sum);

        let total = self.total();
        tracing::debug!(row = index, sum, total, "quantity applied");
        Some(QuantityUpdate {
            display,
            quantity,
            row_sum: Some(sum),
            total: Some(total),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn record(id: &str, price: &str) -> RowRecord {
        RowRecord::new(Some(id.to_string()), price)
    }

    fn fruit_ledger() -> Ledger {
        Ledger::new(vec![record("1", "10"), record("2", "20")], true)
    }

    #[test]
    fn test_row_sum_and_total() {
        let mut ledger = fruit_ledger();
        let update = ledger.apply_quantity(0, "3").unwrap();
        assert_eq!(update.display, "3");
        assert_eq!(update.row_sum, Some(30.0));
        assert_eq!(update.total, Some(30.0));
    }

    #[test]
    fn test_total_accumulates() {
        let mut ledger = fruit_ledger();
        ledger.apply_quantity(0, "2").unwrap();
        let update = ledger.apply_quantity(1, "3").unwrap();
        assert_eq!(update.row_sum, Some(60.0));
        assert_eq!(update.total, Some(80.0));
        assert_eq!(ledger.total(), 80.0);
    }

    #[test]
    fn test_zero_keeps_previous_contribution() {
        let mut ledger = fruit_ledger();
        ledger.apply_quantity(0, "2").unwrap();
        let update = ledger.apply_quantity(0, "0").unwrap();
        assert_eq!(update.display, "0");
        assert_eq!(update.row_sum, None);
        assert_eq!(update.total, None);
        assert_eq!(ledger.row(0).unwrap().sum, Some(20.0));
        assert_eq!(ledger.total(), 20.0);
    }

    #[test]
    fn test_non_numeric_is_zero() {
        let mut ledger = fruit_ledger();
        ledger.apply_quantity(1, "1").unwrap();
        let update = ledger.apply_quantity(1, "many").unwrap();
        assert_eq!(update.display, "0");
        assert_eq!(update.total, None);
        assert_eq!(ledger.total(), 20.0);
    }

    #[test]
    fn test_fullwidth_quantity() {
        let mut ledger = fruit_ledger();
        let update = ledger.apply_quantity(0, "１２").unwrap();
        assert_eq!(update.display, "12");
        assert_eq!(update.row_sum, Some(120.0));
    }

    #[test]
    fn test_nan_price_excluded_from_total() {
        let mut ledger = Ledger::new(vec![record("a", "ask"), record("b", "5")], true);
        let update = ledger.apply_quantity(0, "2").unwrap();
        assert!(update.row_sum.unwrap().is_nan());
        assert_eq!(update.total, Some(0.0));
        let update = ledger.apply_quantity(1, "2").unwrap();
        assert_eq!(update.total, Some(10.0));
    }

    #[test]
    fn test_float_quantities() {
        let mut ledger = Ledger::new(vec![record("1", "10")], false);
        let update = ledger.apply_quantity(0, "1.5").unwrap();
        assert_eq!(update.display, "1.5");
        assert_eq!(update.row_sum, Some(15.0));
    }

    #[test]
    fn test_out_of_range() {
        let mut ledger = fruit_ledger();
        assert!(ledger.apply_quantity(5, "1").is_none());
        assert_eq!(ledger.row_sum(5), None);
    }

    #[test]
    fn test_row_sum_tracks_last_nonzero_edit() {
        let mut ledger = fruit_ledger();
        assert_eq!(ledger.row_sum(1), None);
        ledger.apply_quantity(1, "3").unwrap();
        assert_eq!(ledger.row_sum(1), Some(60.0));
        ledger.apply_quantity(1, "0").unwrap();
        assert_eq!(ledger.row_sum(1), Some(60.0));
        assert_eq!(ledger.row_sum(0), None);
    }

    #[test]
    fn test_price_text_with_surrounding_markup_text() {
        // Rendered text of a price cell that wraps its ordinal cell.
        let mut ledger = Ledger::new(vec![record("1", " 10 ")], true);
        assert_eq!(ledger.row(0).unwrap().price, 10.0);
        assert_eq!(ledger.apply_quantity(0, "3").unwrap().row_sum, Some(30.0));
    }

    #[test]
    fn test_from_columns() {
        let rows = vec![
            RowInstance {
                fields: vec!["1".into(), "Apple".into(), "10".into()],
                input_name: Some("1".into()),
            },
            RowInstance {
                fields: vec!["2".into()],
                input_name: Some("2".into()),
            },
        ];
        let ledger = Ledger::from_columns(&rows, 0, 2, true);
        assert_eq!(ledger.row(0).unwrap().price, 10.0);
        assert_eq!(ledger.row(1).unwrap().id.as_deref(), Some("2"));
        assert_eq!(ledger.row(1).unwrap().price_text, "");
    }

    #[test]
    fn test_missing_price_is_zero() {
        let mut ledger = Ledger::new(vec![RowRecord::new(None, "")], true);
        assert_eq!(ledger.apply_quantity(0, "3").unwrap().row_sum, Some(0.0));
    }
}
