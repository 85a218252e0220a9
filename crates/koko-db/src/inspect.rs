//! Fixed introspection queries over `information_schema`.

use crate::DbError;
use crate::executor::{Database, row_to_json};
use log::debug;
use regex::Regex;
use serde_json::{Map, Value};
use sqlx::Row;
use std::sync::LazyLock;

/// Default row cap for distinct-value listings.
pub const DEFAULT_DISTINCT_LIMIT: i64 = 50;
/// Hard cap for distinct-value listings.
const MAX_DISTINCT_LIMIT: i64 = 500;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern"));

/// Schema inspection modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaMode {
    /// Enumerate table names.
    Tables,
    /// Enumerate columns, optionally scoped to one table.
    Columns,
    /// List distinct values of one column in one table.
    Distinct,
}

impl SchemaMode {
    /// Parse a mode from its wire string.
    pub fn parse(value: &str) -> Result<Self, DbError> {
        match value {
            "tables" => Ok(SchemaMode::Tables),
            "columns" => Ok(SchemaMode::Columns),
            "distinct" => Ok(SchemaMode::Distinct),
            other => Err(DbError::UnknownMode(other.to_string())),
        }
    }
}

/// Check a table or column name against the strict identifier allow-list.
///
/// Distinct-value queries splice these names into SQL text, so this check is
/// load-bearing: anything outside `[A-Za-z_][A-Za-z0-9_]*` is rejected.
pub fn validate_identifier(name: &str) -> Result<(), DbError> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(DbError::UnsafeIdentifier(name.to_string()))
    }
}

impl Database {
    /// List table names in the public schema.
    pub async fn list_tables(&self) -> Result<Vec<String>, DbError> {
        let mut conn = self.connect().await?;
        let rows = sqlx::query(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = 'public' ORDER BY table_name",
        )
        .fetch_all(&mut conn)
        .await
        .map_err(|err| DbError::Query(err.to_string()))?;
        rows.iter()
            .map(|row| {
                row.try_get::<String, _>(0)
                    .map_err(|err| DbError::Decode(err.to_string()))
            })
            .collect()
    }

    /// List columns in the public schema, optionally scoped to one table.
    pub async fn list_columns(
        &self,
        table: Option<&str>,
    ) -> Result<Vec<Map<String, Value>>, DbError> {
        if let Some(table) = table {
            validate_identifier(table)?;
        }
        let mut conn = self.connect().await?;
        let rows = sqlx::query(
            "SELECT table_name, column_name, data_type FROM information_schema.columns \
             WHERE table_schema = 'public' AND ($1::text IS NULL OR table_name = $1) \
             ORDER BY table_name, ordinal_position",
        )
        .bind(table)
        .fetch_all(&mut conn)
        .await
        .map_err(|err| DbError::Query(err.to_string()))?;
        rows.iter().map(row_to_json).collect()
    }

    /// List distinct non-null values of one column in one table.
    pub async fn distinct_values(
        &self,
        table: &str,
        column: &str,
        limit: i64,
    ) -> Result<Vec<Value>, DbError> {
        validate_identifier(table)?;
        validate_identifier(column)?;
        let limit = limit.clamp(1, MAX_DISTINCT_LIMIT);
        debug!(
            "listing distinct values (table={}, column={}, limit={})",
            table, column, limit
        );
        // The only place identifiers reach SQL text; both are validated above.
        let sql = format!(
            "SELECT DISTINCT {column} FROM {table} WHERE {column} IS NOT NULL \
             ORDER BY {column} LIMIT {limit}"
        );
        let mut conn = self.connect().await?;
        let rows = sqlx::query(&sql)
            .fetch_all(&mut conn)
            .await
            .map_err(|err| DbError::Query(err.to_string()))?;
        rows.iter()
            .map(|row| {
                row_to_json(row).map(|object| {
                    object
                        .into_iter()
                        .next()
                        .map(|(_, value)| value)
                        .unwrap_or(Value::Null)
                })
            })
            .collect()
    }
}
