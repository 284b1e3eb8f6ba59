//! Typed binding for the row template markup.
//!
//! The host page marks up one repeatable row:
//!
//! ```html
//! <table id="order">
//!   <tr data-csvcalc-repeat>
//!     <td data-csvcalc-cell="0" data-csvcalc-id></td>
//!     <td data-csvcalc-cell="1"></td>
//!     <td data-csvcalc-price><span data-csvcalc-cell="2"></span> JPY</td>
//!     <td><input data-csvcalc-input></td>
//!     <td data-csvcalc-sum></td>
//!   </tr>
//!   <tr><td>Total</td><td data-csvcalc-total></td></tr>
//! </table>
//! ```
//!
//! [`TemplateBinding`] captures what the DOM layer reads from the untouched
//! template, and [`TemplateBinding::materialize`] turns each CSV row into the
//! values a cloned row receives. The id and price slots are not planned here:
//! their text depends on the markup around the cells, so the DOM layer reads
//! it back from each clone once the fields are in place.

use serde::Serialize;

use crate::csv::CsvDocument;

/// Marks the row template.
pub const REPEAT_ATTR: &str = "data-csvcalc-repeat";
/// Ordinal field slot, value is the column index.
pub const CELL_ATTR: &str = "data-csvcalc-cell";
/// Identifier slot; receives the rendered id text as its value.
pub const ID_ATTR: &str = "data-csvcalc-id";
/// Price slot; receives the rendered price text as its value.
pub const PRICE_ATTR: &str = "data-csvcalc-price";
/// Quantity input.
pub const INPUT_ATTR: &str = "data-csvcalc-input";
/// Per-row sum output.
pub const SUM_ATTR: &str = "data-csvcalc-sum";
/// Grand total output, one per component.
pub const TOTAL_ATTR: &str = "data-csvcalc-total";

/// CSS attribute selector for a marker attribute.
#[must_use]
pub fn selector(attr: &str) -> String {
    format!("[{attr}]")
}

/// Selector for the cell slot with ordinal `index`.
#[must_use]
pub fn cell_selector(index: usize) -> String {
    format!("[{CELL_ATTR}=\"{index}\"]")
}

/// Parse a cell ordinal. Only the canonical decimal form matches a slot, so
/// `"01"` or `" 1"` are not ordinals.
#[must_use]
pub fn parse_cell_marker(value: &str) -> Option<usize> {
    let index = value.parse::<usize>().ok()?;
    (index.to_string() == value).then_some(index)
}

/// What the untouched template says about its slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TemplateBinding {
    /// Cell ordinal on the id element; that column names the quantity input.
    pub id_column: Option<usize>,
}

/// What one cloned row receives before its slots are read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowInstance {
    /// Field `n` goes to every `[data-csvcalc-cell="n"]` in the clone.
    pub fields: Vec<String>,
    /// `name` for the quantity input; left untouched when `None`.
    pub input_name: Option<String>,
}

impl RowInstance {
    /// Field `col`, if the row is long enough.
    #[must_use]
    pub fn field(&self, col: usize) -> Option<&str> {
        self.fields.get(col).map(String::as_str)
    }
}

impl TemplateBinding {
    /// Plan one row instance per document row, in order.
    #[must_use]
    pub fn materialize(&self, doc: &CsvDocument) -> Vec<RowInstance> {
        doc.rows
            .iter()
            .map(|fields| RowInstance {
                fields: fields.clone(),
                input_name: self.id_column.and_then(|col| fields.get(col)).cloned(),
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::csv::parse_document;
    use crate::options::CalcOptions;

    #[test]
    fn test_materialize_rows() {
        let doc = parse_document(
            "id,name,price\n1,Apple,10\n2,Banana,20\n",
            &CalcOptions::default(),
        );
        let binding = TemplateBinding { id_column: Some(0) };
        let rows = binding.materialize(&doc);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].input_name.as_deref(), Some("2"));
        assert_eq!(rows[1].fields, vec!["2", "Banana", "20"]);
        assert_eq!(rows[0].field(2), Some("10"));
        assert_eq!(rows[0].field(3), None);
    }

    #[test]
    fn test_short_row_has_no_input_name() {
        let binding = TemplateBinding { id_column: Some(1) };
        let doc = CsvDocument {
            rows: vec![vec!["7".to_string()]],
        };
        let rows = binding.materialize(&doc);
        assert_eq!(rows[0].input_name, None);
    }

    #[test]
    fn test_id_without_ordinal_leaves_name() {
        let doc = CsvDocument {
            rows: vec![vec!["1".to_string(), "x".to_string()]],
        };
        let rows = TemplateBinding::default().materialize(&doc);
        assert_eq!(rows[0].input_name, None);
        assert_eq!(rows[0].fields.len(), 2);
    }

    #[test]
    fn test_parse_cell_marker() {
        assert_eq!(parse_cell_marker("0"), Some(0));
        assert_eq!(parse_cell_marker("12"), Some(12));
        assert_eq!(parse_cell_marker("01"), None);
        assert_eq!(parse_cell_marker(" 1"), None);
        assert_eq!(parse_cell_marker("id"), None);
    }

    #[test]
    fn test_selectors() {
        assert_eq!(selector(REPEAT_ATTR), "[data-csvcalc-repeat]");
        assert_eq!(cell_selector(3), "[data-csvcalc-cell=\"3\"]");
    }
}
