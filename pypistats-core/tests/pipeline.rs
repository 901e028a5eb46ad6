//! Integration tests for the fetch -> parse -> pivot pipeline
//!
//! These tests drive the whole pipeline through a mock warehouse executor,
//! the way the CLI drives it with the real one.

use pypistats_core::warehouse::{QueryExecutor, RawQueryResult};
use pypistats_core::{
    aggregate, FetchRequest, FieldCatalog, InstallerFilter, QueryOutcome, Result, StatsFetcher,
};
use serde_json::{json, Value};

/// Replays a canned warehouse result.
struct CannedExecutor {
    headers: Vec<&'static str>,
    rows: Vec<Vec<Value>>,
}

impl QueryExecutor for CannedExecutor {
    fn execute(&self, _query: &str, _timeout_secs: u64) -> Result<RawQueryResult> {
        Ok(RawQueryResult {
            headers: self.headers.iter().map(|s| s.to_string()).collect(),
            rows: self.rows.clone(),
        })
    }
}

fn request(fields: &[&str]) -> FetchRequest {
    FetchRequest {
        package: "requests".to_string(),
        fields: fields.iter().map(|s| s.to_string()).collect(),
        limit: None,
        days: 30,
        installers: InstallerFilter::All,
        timeout_ms: 120_000,
    }
}

#[test]
fn test_fetch_then_pivot() {
    pypistats_core::logging::init_test();

    let executor = CannedExecutor {
        headers: vec!["download_date", "country", "download_count"],
        rows: vec![
            vec![json!("2021-01-01"), json!("US"), json!(10)],
            vec![json!("2021-01-02"), json!("US"), json!(5)],
            vec![json!("2021-01-01"), json!("FR"), json!(2)],
        ],
    };
    let catalog = FieldCatalog::new();
    let fetcher = StatsFetcher::new(&catalog, executor);

    let outcome = fetcher.fetch(&request(&["date", "country"])).unwrap();
    let table = match outcome {
        QueryOutcome::Data(table) => table,
        other => panic!("unexpected outcome: {other:?}"),
    };

    // The resolved field order defines the header order
    assert_eq!(
        table.headers(),
        ["download_date", "country", "download_count"]
    );

    let series = aggregate(&table, "country", "download_date", "download_count").unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].category, "US");
    assert_eq!(
        series[0].points,
        vec![
            ("2021-01-01".to_string(), 10),
            ("2021-01-02".to_string(), 5)
        ]
    );
    // FR is zero-filled on the date it never appeared
    assert_eq!(series[1].category, "FR");
    assert_eq!(
        series[1].points,
        vec![("2021-01-01".to_string(), 2), ("2021-01-02".to_string(), 0)]
    );
}

#[test]
fn test_headers_only_fetch_is_empty_not_a_table() {
    let executor = CannedExecutor {
        headers: vec!["download_date", "download_count"],
        rows: vec![],
    };
    let catalog = FieldCatalog::new();
    let fetcher = StatsFetcher::new(&catalog, executor);

    let outcome = fetcher.fetch(&request(&["date"])).unwrap();
    match outcome {
        QueryOutcome::Empty { headers } => {
            assert_eq!(headers, vec!["download_date", "download_count"]);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn test_null_cells_pivot_as_empty_category() {
    // Warehouse nulls (e.g. unknown country) become "" and still bucket
    let executor = CannedExecutor {
        headers: vec!["download_date", "country", "download_count"],
        rows: vec![
            vec![json!("2021-01-01"), json!(null), json!(3)],
            vec![json!("2021-01-01"), json!("US"), json!(1)],
        ],
    };
    let catalog = FieldCatalog::new();
    let fetcher = StatsFetcher::new(&catalog, executor);

    let outcome = fetcher.fetch(&request(&["date", "country"])).unwrap();
    let table = match outcome {
        QueryOutcome::Data(table) => table,
        other => panic!("unexpected outcome: {other:?}"),
    };

    let series = aggregate(&table, "country", "download_date", "download_count").unwrap();
    assert_eq!(series[0].category, "");
    assert_eq!(series[0].points, vec![("2021-01-01".to_string(), 3)]);
}
