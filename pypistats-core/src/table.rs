//! Tabular results and raw-row parsing
//!
//! The warehouse hands back mixed-type cells (strings, numbers, nulls).
//! Everything downstream works on a uniform table of string cells, so
//! conversion happens once, here.

use serde_json::Value;

use crate::error::{Error, Result};

/// A uniform table of string cells.
///
/// Invariant: every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl StatsTable {
    /// Build a table, enforcing the fixed-width row invariant.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(Error::RaggedRow {
                    line: i + 1,
                    expected: headers.len(),
                    found: row.len(),
                });
            }
        }
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Position of a column by its header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Outcome of a query or CSV ingestion.
///
/// A result with headers but zero data rows is a valid, distinguished
/// outcome, not an error; callers must branch on it instead of pivoting
/// or plotting nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Data(StatsTable),
    /// The warehouse answered with a header row only
    Empty { headers: Vec<String> },
}

/// Convert raw warehouse rows into a uniform string table, detecting the
/// headers-only empty result by row count.
pub fn parse(headers: Vec<String>, raw_rows: Vec<Vec<Value>>) -> Result<QueryOutcome> {
    if raw_rows.is_empty() {
        return Ok(QueryOutcome::Empty { headers });
    }

    let rows: Vec<Vec<String>> = raw_rows
        .into_iter()
        .map(|row| row.into_iter().map(cell_to_string).collect())
        .collect();

    Ok(QueryOutcome::Data(StatsTable::new(headers, rows)?))
}

/// String representation of one raw cell; nulls become the empty string.
fn cell_to_string(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        // Nested values should not appear in aggregation results; keep
        // their JSON text rather than dropping data
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn headers(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_headers_only_is_the_empty_outcome() {
        let outcome = parse(headers(&["a"]), vec![]).unwrap();
        assert_eq!(
            outcome,
            QueryOutcome::Empty {
                headers: headers(&["a"])
            }
        );
    }

    #[test]
    fn test_rows_match_header_width() {
        let outcome = parse(
            headers(&["download_date", "download_count"]),
            vec![
                vec![json!("2021-01-01"), json!(17)],
                vec![json!("2021-01-02"), json!(4)],
            ],
        )
        .unwrap();

        let table = match outcome {
            QueryOutcome::Data(table) => table,
            other => panic!("unexpected outcome: {other:?}"),
        };
        for row in table.rows() {
            assert_eq!(row.len(), table.headers().len());
        }
    }

    #[test]
    fn test_cells_become_strings() {
        assert_eq!(cell_to_string(json!(null)), "");
        assert_eq!(cell_to_string(json!("US")), "US");
        assert_eq!(cell_to_string(json!(42)), "42");
        assert_eq!(cell_to_string(json!(true)), "true");
    }

    #[test]
    fn test_ragged_row_is_rejected() {
        let err = parse(
            headers(&["a", "b"]),
            vec![vec![json!("x"), json!("y")], vec![json!("z")]],
        )
        .unwrap_err();

        match err {
            Error::RaggedRow {
                line,
                expected,
                found,
            } => {
                assert_eq!(line, 2);
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_column_index() {
        let table = StatsTable::new(headers(&["date", "country"]), vec![]).unwrap();
        assert_eq!(table.column_index("country"), Some(1));
        assert_eq!(table.column_index("missing"), None);
    }
}
