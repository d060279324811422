//! Embedded SQL
//!
//! Two foreign formatters can handle SQL, each for its own set of dialects.
//! The identifier names the dialect (`sql`, `mysql`, `postgresql`, ...).
//! The preferred backend is tried first, then the other one; if neither
//! knows the dialect, the closest earlier identifier in the language's list
//! that some backend knows stands in for it.

use super::{EmbeddedLanguage, Request};
use crate::error::EmbedError;
use crate::options::Options;
use crate::rehydrate::Rehydration;
use crate::whitespace::Layout;
use serde::Deserialize;
use serde_json::Value;

/// SQL formatting backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SqlBackend {
    #[default]
    SqlFormatter,
    NodeSqlParser,
}

const SQL_FORMATTER_DIALECTS: &[&str] = &[
    "sql",
    "bigquery",
    "db2",
    "db2i",
    "hive",
    "mariadb",
    "mysql",
    "n1ql",
    "plsql",
    "postgresql",
    "redshift",
    "singlestoredb",
    "snowflake",
    "spark",
    "sqlite",
    "tidb",
    "transactsql",
    "trino",
    "tsql",
];

/// Lower-case identifier and the database name the backend expects.
const NODE_SQL_PARSER_DIALECTS: &[(&str, &str)] = &[
    ("athena", "Athena"),
    ("bigquery", "BigQuery"),
    ("db2", "DB2"),
    ("flinksql", "FlinkSQL"),
    ("hive", "Hive"),
    ("mariadb", "MariaDB"),
    ("mysql", "MySQL"),
    ("noql", "Noql"),
    ("postgresql", "PostgresQL"),
    ("redshift", "Redshift"),
    ("snowflake", "Snowflake"),
    ("sqlite", "Sqlite"),
    ("transactsql", "TransactSQL"),
    ("trino", "Trino"),
];

impl SqlBackend {
    /// Name the backend's formatter is registered under.
    pub fn formatter(self) -> &'static str {
        match self {
            SqlBackend::SqlFormatter => "sql-formatter",
            SqlBackend::NodeSqlParser => "node-sql-parser",
        }
    }

    /// Option key that carries the dialect.
    pub fn dialect_key(self) -> &'static str {
        match self {
            SqlBackend::SqlFormatter => "language",
            SqlBackend::NodeSqlParser => "database",
        }
    }

    /// The backend's own name for `identifier`, matched case-insensitively.
    pub fn dialect(self, identifier: &str) -> Option<&'static str> {
        let lower = identifier.to_ascii_lowercase();
        match self {
            SqlBackend::SqlFormatter => SQL_FORMATTER_DIALECTS
                .iter()
                .copied()
                .find(|dialect| *dialect == lower),
            SqlBackend::NodeSqlParser => NODE_SQL_PARSER_DIALECTS
                .iter()
                .find(|(name, _)| *name == lower)
                .map(|(_, database)| *database),
        }
    }

    fn other(self) -> Self {
        match self {
            SqlBackend::SqlFormatter => SqlBackend::NodeSqlParser,
            SqlBackend::NodeSqlParser => SqlBackend::SqlFormatter,
        }
    }
}

/// Backend and dialect chosen for a literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dialect {
    pub backend: SqlBackend,
    pub name: &'static str,
}

fn supported(identifier: &str, preferred: SqlBackend) -> Option<Dialect> {
    [preferred, preferred.other()]
        .into_iter()
        .find_map(|backend| backend.dialect(identifier).map(|name| Dialect { backend, name }))
}

/// Picks the backend and dialect for `identifier`.
///
/// `siblings` is the SQL identifier list in configured order. When no
/// backend supports `identifier`, identifiers before it are tried from the
/// nearest backwards.
pub fn select_dialect(
    identifier: &str,
    preferred: SqlBackend,
    siblings: &[String],
) -> Result<Dialect, EmbedError> {
    if let Some(dialect) = supported(identifier, preferred) {
        return Ok(dialect);
    }
    let position = siblings.iter().position(|s| s == identifier).unwrap_or(0);
    siblings[..position]
        .iter()
        .rev()
        .find_map(|sibling| {
            let dialect = supported(sibling, preferred)?;
            tracing::debug!(identifier, stand_in = %sibling, "inheriting SQL dialect");
            Some(dialect)
        })
        .ok_or_else(|| EmbedError::UnsupportedDialect {
            identifier: identifier.to_string(),
        })
}

pub struct Sql;

impl EmbeddedLanguage for Sql {
    fn name(&self) -> &'static str {
        "sql"
    }

    fn default_identifiers(&self) -> &'static [&'static str] {
        &[
            "sql",
            "athena",
            "bigquery",
            "db2",
            "db2i",
            "flinksql",
            "hive",
            "mariadb",
            "mysql",
            "n1ql",
            "noql",
            "plsql",
            "postgresql",
            "redshift",
            "singlestoredb",
            "snowflake",
            "spark",
            "sqlite",
            "tidb",
            "transactsql",
            "trino",
            "tsql",
        ]
    }

    fn rehydration(&self) -> Rehydration {
        Rehydration::LineNormalizing
    }

    fn layout(&self, _options: &Options) -> Layout {
        Layout::Binary
    }

    fn prepare(&self, request: &Request<'_>, options: &mut Options) -> Result<String, EmbedError> {
        let dialect = select_dialect(request.identifier, request.sql_backend, request.siblings)?;
        options.insert(
            dialect.backend.dialect_key().to_string(),
            Value::from(dialect.name),
        );
        Ok(dialect.backend.formatter().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn preferred_backend_wins_when_it_knows_the_dialect() {
        let siblings = ids(&["sql", "mysql"]);
        assert_eq!(
            select_dialect("mysql", SqlBackend::NodeSqlParser, &siblings).unwrap(),
            Dialect {
                backend: SqlBackend::NodeSqlParser,
                name: "MySQL"
            }
        );
        assert_eq!(
            select_dialect("mysql", SqlBackend::SqlFormatter, &siblings).unwrap(),
            Dialect {
                backend: SqlBackend::SqlFormatter,
                name: "mysql"
            }
        );
    }

    #[test]
    fn other_backend_is_the_fallback() {
        let siblings = ids(&["sql", "athena", "plsql"]);
        assert_eq!(
            select_dialect("athena", SqlBackend::SqlFormatter, &siblings).unwrap().backend,
            SqlBackend::NodeSqlParser
        );
        assert_eq!(
            select_dialect("plsql", SqlBackend::NodeSqlParser, &siblings).unwrap().backend,
            SqlBackend::SqlFormatter
        );
    }

    #[test]
    fn unknown_identifier_inherits_from_the_nearest_earlier_sibling() {
        let siblings = ids(&["sql", "postgresql", "pg", "warehouse"]);
        assert_eq!(
            select_dialect("warehouse", SqlBackend::NodeSqlParser, &siblings).unwrap(),
            Dialect {
                backend: SqlBackend::NodeSqlParser,
                name: "PostgresQL"
            }
        );
    }

    #[test]
    fn nothing_to_inherit_is_an_error_naming_the_identifier() {
        let siblings = ids(&["legacy", "sql"]);
        let err = select_dialect("legacy", SqlBackend::SqlFormatter, &siblings).unwrap_err();
        assert!(matches!(err, EmbedError::UnsupportedDialect { ref identifier } if identifier == "legacy"));
        assert!(err.to_string().contains("`legacy`"));
    }

    #[test]
    fn prepare_sets_the_backend_specific_key() {
        let siblings = ids(&["sql", "mysql"]);
        let request = Request {
            identifier: "mysql",
            siblings: &siblings,
            parser: None,
            sql_backend: SqlBackend::NodeSqlParser,
        };
        let mut options = Options::new();
        assert_eq!(Sql.prepare(&request, &mut options).unwrap(), "node-sql-parser");
        assert_eq!(options["database"], Value::from("MySQL"));
        assert!(!options.contains_key("language"));
    }

    #[test]
    fn backend_names_deserialize_in_kebab_case() {
        let backend: SqlBackend = serde_json::from_str("\"node-sql-parser\"").unwrap();
        assert_eq!(backend, SqlBackend::NodeSqlParser);
    }
}
