//! Minimal CSV splitter producing a [`CsvDocument`].
//!
//! Fields are separated by bare commas. There is no quoting: a comma inside
//! a field always starts a new field.

use serde::{Deserialize, Serialize};

use crate::options::CalcOptions;

/// Field separator.
const SEPARATOR: char = ',';

/// Parsed CSV rows in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvDocument {
    pub rows: Vec<Vec<String>>,
}

impl CsvDocument {
    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Field `col` of row `row`, if the row is long enough.
    #[must_use]
    pub fn field(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

/// Split `text` into rows and fields.
///
/// With `ignore_first_line` the first line is dropped before field
/// splitting; with `ignore_last_line` the final line is dropped afterwards,
/// whether or not it is empty. Malformed lines are kept as-is.
#[must_use]
pub fn parse_document(text: &str, options: &CalcOptions) -> CsvDocument {
    let delim = options.line_endings.as_char();

    let mut lines: Vec<&str> = text.split(delim).collect();
    if options.ignore_first_line && !lines.is_empty() {
        lines.remove(0);
    }

    let mut rows: Vec<Vec<String>> = lines.into_iter().map(split_line).collect();

    if options.ignore_last_line {
        rows.pop();
    }

    tracing::debug!(rows = rows.len(), "parsed csv");
    CsvDocument { rows }
}

/// Split one line on commas. Fields are kept verbatim, so in LF mode a
/// CR+LF file leaves its `'\r'` on the last field.
fn split_line(line: &str) -> Vec<String> {
    line.split(SEPARATOR).map(str::to_string).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn opts(first: bool, last: bool) -> CalcOptions {
        CalcOptions {
            ignore_first_line: first,
            ignore_last_line: last,
            ..CalcOptions::default()
        }
    }

    #[test]
    fn test_parse_csv_basic() {
        let doc = parse_document("id,name,price\n1,Apple,10\n2,Banana,20\n", &opts(true, true));
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.rows[0], vec!["1", "Apple", "10"]);
        assert_eq!(doc.field(1, 1), Some("Banana"));
        assert_eq!(doc.field(1, 3), None);
    }

    #[test]
    fn test_flags_shift_row_count() {
        let text = "h\na\nb\n";
        assert_eq!(parse_document(text, &opts(true, true)).len(), 2);
        assert_eq!(parse_document(text, &opts(false, true)).len(), 3);
        assert_eq!(parse_document(text, &opts(true, false)).len(), 3);
        assert_eq!(parse_document(text, &opts(false, false)).len(), 4);
    }

    #[test]
    fn test_last_line_dropped_even_if_not_blank() {
        let doc = parse_document("h\n1,a\n2,b", &opts(true, true));
        assert_eq!(doc.rows, vec![vec!["1".to_string(), "a".to_string()]]);
    }

    #[test]
    fn test_crlf_in_lf_mode_keeps_cr() {
        let doc = parse_document("h\r\n1,Apple,10\r\n", &opts(true, true));
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.rows[0], vec!["1", "Apple", "10\r"]);
    }

    #[test]
    fn test_cr_mode() {
        use crate::options::LineEnding;

        let options = CalcOptions {
            line_endings: LineEnding::Cr,
            ..CalcOptions::default()
        };
        let doc = parse_document("h\r1,a\r2,b\r", &options);
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.field(1, 0), Some("2"));
    }

    #[test]
    fn test_no_quote_handling() {
        let doc = parse_document("\"a,b\",c", &opts(false, false));
        assert_eq!(doc.rows[0], vec!["\"a", "b\"", "c"]);
    }

    #[test]
    fn test_short_rows_kept() {
        let doc = parse_document("h\n1\n1,2,3\n", &opts(true, true));
        assert_eq!(doc.rows[0].len(), 1);
        assert_eq!(doc.rows[1].len(), 3);
    }

    #[test]
    fn test_empty_csv() {
        assert!(parse_document("", &opts(true, true)).is_empty());
        assert_eq!(parse_document("", &opts(false, false)).rows, vec![vec![String::new()]]);
    }
}
