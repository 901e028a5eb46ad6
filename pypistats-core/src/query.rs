//! Aggregation query construction for the public PyPI download table
//!
//! `build` is a pure function of its [`QuerySpec`]: the same spec always
//! yields the same query text.

use crate::fields::{FieldSpec, DOWNLOAD_COUNT};

/// The public download-events table.
const DOWNLOAD_TABLE: &str = "bigquery-public-data.pypi.file_downloads";

/// Which installer tools count toward the totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstallerFilter {
    /// Downloads from every installer tool
    #[default]
    All,
    /// Only pip-originated downloads
    PipOnly,
}

/// Everything needed to build one aggregation query.
///
/// Built once per fetch call and discarded after use.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    pub package: String,
    pub fields: Vec<FieldSpec>,
    pub limit: Option<u32>,
    /// Days of history to include; 0 means no lower date bound.
    pub days: u32,
    pub installers: InstallerFilter,
}

/// Normalize a package name per PEP 503: lowercase, with runs of `-`, `_`
/// and `.` collapsed to a single `-`.
pub fn normalize_package(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for ch in name.chars() {
        if matches!(ch, '-' | '_' | '.') {
            in_separator = true;
        } else {
            if in_separator {
                out.push('-');
                in_separator = false;
            }
            out.extend(ch.to_lowercase());
        }
    }
    out
}

/// Build the Standard SQL text grouping download events by the spec's
/// dimension fields and summing the download-count measure.
pub fn build(spec: &QuerySpec) -> String {
    let dimensions: Vec<&FieldSpec> = spec.fields.iter().filter(|f| !f.aggregate).collect();

    let mut sql = String::from("SELECT\n");
    for field in &dimensions {
        sql.push_str(&format!("  {} AS {},\n", field.expr, field.column));
    }
    sql.push_str(&format!(
        "  {} AS {}\n",
        DOWNLOAD_COUNT.expr, DOWNLOAD_COUNT.column
    ));
    sql.push_str(&format!("FROM `{DOWNLOAD_TABLE}`\n"));
    sql.push_str(&format!("WHERE file.project = \"{}\"\n", spec.package));
    if spec.days > 0 {
        sql.push_str(&format!(
            "  AND timestamp >= TIMESTAMP_SUB(CURRENT_TIMESTAMP(), INTERVAL {} DAY)\n",
            spec.days
        ));
    }
    if spec.installers == InstallerFilter::PipOnly {
        sql.push_str("  AND details.installer.name = \"pip\"\n");
    }
    if !dimensions.is_empty() {
        let columns: Vec<&str> = dimensions.iter().map(|f| f.column).collect();
        sql.push_str(&format!("GROUP BY\n  {}\n", columns.join(", ")));
    }
    sql.push_str(&format!("ORDER BY\n  {} DESC", DOWNLOAD_COUNT.column));
    if let Some(limit) = spec.limit {
        sql.push_str(&format!("\nLIMIT {limit}"));
    }
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldCatalog;

    fn spec(fields: &[&str]) -> QuerySpec {
        let catalog = FieldCatalog::new();
        let names: Vec<String> = fields.iter().map(|s| s.to_string()).collect();
        QuerySpec {
            package: "pandas".to_string(),
            fields: catalog.resolve(&names).unwrap(),
            limit: None,
            days: 0,
            installers: InstallerFilter::All,
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let spec = spec(&["date", "country"]);
        assert_eq!(build(&spec), build(&spec));
    }

    #[test]
    fn test_full_query_shape() {
        let mut spec = spec(&["date", "country"]);
        spec.days = 30;
        spec.limit = Some(100);
        spec.installers = InstallerFilter::PipOnly;

        let expected = "\
SELECT
  FORMAT_TIMESTAMP(\"%Y-%m-%d\", timestamp) AS download_date,
  country_code AS country,
  COUNT(*) AS download_count
FROM `bigquery-public-data.pypi.file_downloads`
WHERE file.project = \"pandas\"
  AND timestamp >= TIMESTAMP_SUB(CURRENT_TIMESTAMP(), INTERVAL 30 DAY)
  AND details.installer.name = \"pip\"
GROUP BY
  download_date, country
ORDER BY
  download_count DESC
LIMIT 100";
        assert_eq!(build(&spec), expected);
    }

    #[test]
    fn test_zero_days_means_no_lower_bound() {
        let sql = build(&spec(&["country"]));
        assert!(!sql.contains("TIMESTAMP_SUB"));
    }

    #[test]
    fn test_all_installers_means_no_installer_clause() {
        let sql = build(&spec(&["country"]));
        assert!(!sql.contains("details.installer.name = \"pip\""));
    }

    #[test]
    fn test_no_limit_clause_without_limit() {
        let sql = build(&spec(&["country"]));
        assert!(!sql.contains("LIMIT"));
        assert!(sql.ends_with("download_count DESC"));
    }

    #[test]
    fn test_requested_measure_is_not_grouped() {
        // download_count among the requested fields must not be selected
        // twice or appear in GROUP BY
        let sql = build(&spec(&["country", "download_count"]));
        assert_eq!(sql.matches("COUNT(*)").count(), 1);
        assert!(sql.contains("GROUP BY\n  country\n"));
    }

    #[test]
    fn test_field_order_defines_column_order() {
        let sql = build(&spec(&["country", "date"]));
        let country = sql.find("country_code AS country").unwrap();
        let date = sql.find("AS download_date").unwrap();
        assert!(country < date);
    }

    #[test]
    fn test_normalize_package() {
        assert_eq!(normalize_package("Django"), "django");
        assert_eq!(normalize_package("zope.interface"), "zope-interface");
        assert_eq!(normalize_package("foo__bar..baz"), "foo-bar-baz");
        assert_eq!(normalize_package("requests"), "requests");
    }
}
