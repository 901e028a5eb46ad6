//! Warehouse access: the executor capability and the fetch pipeline
//!
//! [`StatsFetcher`] is the only component that touches the warehouse. It
//! validates field names, builds the aggregation query, runs it exactly
//! once through the injected [`QueryExecutor`], and parses the raw rows.
//! Queries are billable, so executor failures surface unchanged instead
//! of being retried.

pub mod bigquery;

use serde_json::Value;

use crate::error::Result;
use crate::fields::FieldCatalog;
use crate::query::{self, InstallerFilter, QuerySpec};
use crate::table::{self, QueryOutcome};

/// Raw result of a warehouse query: column names plus untyped cells.
#[derive(Debug, Clone)]
pub struct RawQueryResult {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Capability to run one aggregation query against the download warehouse.
///
/// Implementations make a single attempt per call. The timeout arrives in
/// whole seconds.
pub trait QueryExecutor {
    fn execute(&self, query: &str, timeout_secs: u64) -> Result<RawQueryResult>;
}

/// Parameters for one stats fetch.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub package: String,
    /// User-facing field names, in output column order
    pub fields: Vec<String>,
    pub limit: Option<u32>,
    /// Days of history; 0 means all time
    pub days: u32,
    pub installers: InstallerFilter,
    /// Callers supply milliseconds; the executor receives whole seconds
    /// (integer division, sub-second remainder truncated)
    pub timeout_ms: u64,
}

/// Orchestrates field resolution, query building, execution and parsing.
pub struct StatsFetcher<'a, E> {
    catalog: &'a FieldCatalog,
    executor: E,
}

impl<'a, E: QueryExecutor> StatsFetcher<'a, E> {
    pub fn new(catalog: &'a FieldCatalog, executor: E) -> Self {
        Self { catalog, executor }
    }

    /// Fetch download stats for one package.
    ///
    /// Field validation happens before any query text is built, so an
    /// unsupported name never reaches the warehouse.
    pub fn fetch(&self, request: &FetchRequest) -> Result<QueryOutcome> {
        let fields = self.catalog.resolve(&request.fields)?;
        let spec = QuerySpec {
            package: query::normalize_package(&request.package),
            fields,
            limit: request.limit,
            days: request.days,
            installers: request.installers,
        };
        let sql = query::build(&spec);

        tracing::debug!(package = %spec.package, days = spec.days, "running download stats query");
        let raw = self.executor.execute(&sql, request.timeout_ms / 1000)?;

        let outcome = table::parse(raw.headers, raw.rows)?;
        if matches!(outcome, QueryOutcome::Empty { .. }) {
            tracing::warn!(package = %spec.package, "no data returned, check the package name");
        }
        Ok(outcome)
    }
}
