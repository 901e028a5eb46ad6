//! Plain CSV writing and ingestion
//!
//! Cells are joined with bare commas and never quoted. A cell that itself
//! contains a comma will not survive a round trip: on re-read it splits
//! into extra cells and fails the fixed-width row check. Download stats
//! cells (dates, country codes, counts) are comma-free in practice.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};
use crate::table::{QueryOutcome, StatsTable};

/// Write a table as CSV lines, optionally preceded by the header line.
pub fn write_csv<W: Write>(out: &mut W, table: &StatsTable, include_header: bool) -> Result<()> {
    if include_header {
        writeln!(out, "{}", table.headers().join(","))?;
    }
    for row in table.rows() {
        writeln!(out, "{}", row.join(","))?;
    }
    Ok(())
}

/// Read a previously saved CSV file in place of a live fetch.
///
/// The first line is the header row; the rest are data rows. No type
/// coercion happens here beyond what the downstream pipeline already does.
pub fn read_csv(path: &Path) -> Result<QueryOutcome> {
    let content = fs::read_to_string(path)?;
    let mut lines = content.lines();

    let headers: Vec<String> = match lines.next() {
        Some(line) if !line.trim().is_empty() => split_line(line),
        _ => {
            return Err(Error::Csv(format!(
                "{} has no header line",
                path.display()
            )))
        }
    };

    let rows: Vec<Vec<String>> = lines
        .filter(|line| !line.is_empty())
        .map(split_line)
        .collect();

    if rows.is_empty() {
        return Ok(QueryOutcome::Empty { headers });
    }
    Ok(QueryOutcome::Data(StatsTable::new(headers, rows)?))
}

fn split_line(line: &str) -> Vec<String> {
    line.split(',').map(str::to_string).collect()
}
