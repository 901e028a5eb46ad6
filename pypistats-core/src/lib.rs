//! # pypistats-core
//!
//! Core library for pypistats - fetching and reshaping PyPI download
//! statistics.
//!
//! This library provides:
//! - A field catalog mapping user-facing names to warehouse columns
//! - Deterministic aggregation-query construction
//! - Raw-result parsing with a distinguished headers-only empty outcome
//! - A pivot aggregator producing aligned per-category time series
//! - A plain CSV surface and the chart-renderer interface
//!
//! ## Architecture
//!
//! The pipeline is linear and synchronous, with exactly one blocking call:
//! - **Fetch:** validated field names become one aggregation query, run a
//!   single time through a [`warehouse::QueryExecutor`]
//! - **Parse:** raw mixed-type rows become a uniform string table
//! - **Pivot:** table rows become zero-filled, date-sorted series per
//!   category, ready for a [`chart::ChartRenderer`] or CSV output
//!
//! ## Example
//!
//! ```rust,no_run
//! use pypistats_core::{Config, FieldCatalog};
//!
//! // Load configuration
//! let config = Config::load().expect("failed to load config");
//!
//! // The catalog is built once and passed to the components that need it
//! let catalog = FieldCatalog::new();
//! let fields = catalog
//!     .resolve(&config.query.fields)
//!     .expect("unsupported field in config");
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use fields::{FieldCatalog, FieldSpec};
pub use pivot::{aggregate, PivotSeries};
pub use query::InstallerFilter;
pub use table::{QueryOutcome, StatsTable};
pub use warehouse::{FetchRequest, QueryExecutor, RawQueryResult, StatsFetcher};

// Public modules
pub mod chart;
pub mod config;
pub mod csv;
pub mod error;
pub mod fields;
pub mod logging;
pub mod pivot;
pub mod query;
pub mod table;
pub mod warehouse;
