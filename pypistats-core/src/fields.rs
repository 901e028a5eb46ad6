//! User-facing field names and their warehouse columns
//!
//! The catalog is the single owned mapping from the names users type
//! (`country`, `date`, `system-release`, ...) to the column each one comes
//! back under and the SQL expression that produces it. It is constructed
//! once at startup and passed explicitly to the components that need it.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// One resolvable field: user-facing name, the column identifier the
/// warehouse returns it under, and the select expression producing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub column: &'static str,
    pub expr: &'static str,
    /// True for the one aggregate (measure) field; aggregates are never
    /// part of the GROUP BY clause.
    pub aggregate: bool,
}

const fn dimension(name: &'static str, column: &'static str, expr: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        column,
        expr,
        aggregate: false,
    }
}

/// The download-count measure, always summed per result group.
pub const DOWNLOAD_COUNT: FieldSpec = FieldSpec {
    name: "download_count",
    column: "download_count",
    expr: "COUNT(*)",
    aggregate: true,
};

/// Every field the pipeline knows how to query.
const FIELDS: &[FieldSpec] = &[
    dimension("country", "country", "country_code"),
    dimension(
        "date",
        "download_date",
        r#"FORMAT_TIMESTAMP("%Y-%m-%d", timestamp)"#,
    ),
    dimension(
        "month",
        "download_month",
        r#"FORMAT_TIMESTAMP("%Y-%m", timestamp)"#,
    ),
    dimension(
        "year",
        "download_year",
        r#"FORMAT_TIMESTAMP("%Y", timestamp)"#,
    ),
    dimension("project", "project", "file.project"),
    dimension("version", "version", "file.version"),
    dimension(
        "file",
        "file_type",
        r#"REGEXP_EXTRACT(file.filename, r"\.([^\.]+)$")"#,
    ),
    dimension(
        "pyversion",
        "python_version",
        r#"REGEXP_EXTRACT(details.python, r"^([^\.]+\.[^\.]+)")"#,
    ),
    dimension("impl", "implementation", "details.implementation.name"),
    dimension(
        "impl-version",
        "implementation_version",
        r#"REGEXP_EXTRACT(details.implementation.version, r"^([^\.]+\.[^\.]+)")"#,
    ),
    dimension("installer", "installer_name", "details.installer.name"),
    dimension(
        "installer-version",
        "installer_version",
        "details.installer.version",
    ),
    dimension("system", "system_name", "details.system.name"),
    dimension("system-release", "system_release", "details.system.release"),
    dimension("distro", "distro_name", "details.distro.name"),
    dimension("distro-version", "distro_version", "details.distro.version"),
    dimension("cpu", "cpu", "details.cpu"),
    dimension("libc", "libc_name", "details.libc.lib"),
    dimension("libc-version", "libc_version", "details.libc.version"),
    DOWNLOAD_COUNT,
];

/// Catalog of supported fields.
///
/// Lookup is O(1); user names are unique. An unknown name is always a
/// [`Error::UnsupportedField`], never silently dropped.
#[derive(Debug)]
pub struct FieldCatalog {
    by_name: HashMap<&'static str, FieldSpec>,
}

impl FieldCatalog {
    pub fn new() -> Self {
        let by_name = FIELDS.iter().map(|f| (f.name, *f)).collect();
        Self { by_name }
    }

    /// Look up a single field by its user-facing name.
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.by_name.get(name)
    }

    /// Resolve a list of user-facing names, preserving input order.
    ///
    /// Order matters: it defines the output column order of the query.
    pub fn resolve(&self, names: &[String]) -> Result<Vec<FieldSpec>> {
        names
            .iter()
            .map(|name| {
                self.by_name
                    .get(name.as_str())
                    .copied()
                    .ok_or_else(|| Error::UnsupportedField {
                        field: name.clone(),
                    })
            })
            .collect()
    }
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self::new()
    }
}
