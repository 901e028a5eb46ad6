//! Reshaping a stats table into per-category time series
//!
//! One series per category value, every series covering the same set of
//! date buckets so chart axes line up across categories.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::table::StatsTable;

/// One chart line: a category and its (date, count) points, sorted
/// ascending by calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotSeries {
    pub category: String,
    pub points: Vec<(String, i64)>,
}

/// Pivot a table into one series per value of `category_field`, summing
/// `measure_field` per `date_field` bucket.
///
/// Missing (category, date) buckets are filled with 0; duplicate ones
/// accumulate by summation. Categories come out in first-seen row order.
pub fn aggregate(
    table: &StatsTable,
    category_field: &str,
    date_field: &str,
    measure_field: &str,
) -> Result<Vec<PivotSeries>> {
    let category_idx = column(table, category_field)?;
    let date_idx = column(table, date_field)?;
    let measure_idx = column(table, measure_field)?;

    // Zero-fill basis: every distinct date in the table, in calendar order
    let mut buckets: Vec<String> = table
        .rows()
        .iter()
        .map(|row| row[date_idx].clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    buckets.sort_by(|a, b| compare_dates(a, b));

    let mut seen_order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, HashMap<String, i64>> = HashMap::new();

    for row in table.rows() {
        let category = &row[category_idx];
        let measure: i64 =
            row[measure_idx]
                .trim()
                .parse()
                .map_err(|_| Error::MalformedMeasure {
                    value: row[measure_idx].clone(),
                })?;

        if !sums.contains_key(category) {
            seen_order.push(category.clone());
        }
        *sums
            .entry(category.clone())
            .or_default()
            .entry(row[date_idx].clone())
            .or_insert(0) += measure;
    }

    let series = seen_order
        .into_iter()
        .map(|category| {
            let by_date = &sums[&category];
            let points = buckets
                .iter()
                .map(|date| (date.clone(), by_date.get(date).copied().unwrap_or(0)))
                .collect();
            PivotSeries { category, points }
        })
        .collect();

    Ok(series)
}

fn column(table: &StatsTable, name: &str) -> Result<usize> {
    table.column_index(name).ok_or_else(|| Error::UnknownField {
        field: name.to_string(),
    })
}

/// Calendar-date comparison. Values that do not parse as dates order
/// lexically after the ones that do, which keeps `YYYY-MM` and `YYYY`
/// buckets in calendar order among themselves.
fn compare_dates(a: &str, b: &str) -> Ordering {
    match (parse_date(a), parse_date(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}
