//! Read-only statement execution over a fresh connection per call.

use crate::guard::ensure_read_only;
use crate::DbError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use koko_config::DatabaseConfig;
use log::{debug, info};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Map, Number, Value, json};
use sqlx::postgres::{PgColumn, PgConnectOptions, PgRow, PgSslMode};
use sqlx::{Column, ConnectOptions, PgConnection, Row, TypeInfo, ValueRef};

/// Postgres access handle.
///
/// Holds only the connection settings; every call opens and closes its own
/// connection. There is no pooling and no transaction spanning statements.
#[derive(Debug, Clone)]
pub struct Database {
    config: DatabaseConfig,
}

impl Database {
    /// Create a handle from the database configuration.
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    /// Open a fresh connection using the configured settings.
    pub(crate) async fn connect(&self) -> Result<PgConnection, DbError> {
        let ssl_mode = if self.config.require_tls {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };
        let mut options = PgConnectOptions::new()
            .host(&self.config.host)
            .port(self.config.port)
            .database(&self.config.dbname)
            .username(&self.config.user)
            .ssl_mode(ssl_mode);
        if let Some(password) = self.config.password.as_deref() {
            options = options.password(password);
        }
        debug!(
            "opening database connection (host={}, dbname={})",
            self.config.host, self.config.dbname
        );
        options
            .connect()
            .await
            .map_err(|err| DbError::Connect(err.to_string()))
    }

    /// Run a validated read-only statement and return all rows as JSON
    /// objects.
    pub async fn execute(&self, sql: &str) -> Result<Vec<Map<String, Value>>, DbError> {
        ensure_read_only(sql)?;
        let mut conn = self.connect().await?;
        let rows = sqlx::query(sql)
            .fetch_all(&mut conn)
            .await
            .map_err(|err| DbError::Query(err.to_string()))?;
        info!("query executed (rows={})", rows.len());
        rows.iter().map(row_to_json).collect()
    }

    /// Liveness probe: the database's current time.
    pub async fn current_time(&self) -> Result<String, DbError> {
        let mut conn = self.connect().await?;
        let row = sqlx::query("SELECT NOW()")
            .fetch_one(&mut conn)
            .await
            .map_err(|err| DbError::Query(err.to_string()))?;
        let now: DateTime<Utc> = row
            .try_get(0)
            .map_err(|err| DbError::Decode(err.to_string()))?;
        Ok(now.to_rfc3339())
    }
}

/// Convert a row to a JSON object keyed by column name.
pub(crate) fn row_to_json(row: &PgRow) -> Result<Map<String, Value>, DbError> {
    let mut object = Map::with_capacity(row.columns().len());
    for (index, column) in row.columns().iter().enumerate() {
        let value = decode_column(row, index, column)?;
        object.insert(column.name().to_string(), value);
    }
    Ok(object)
}

/// Decode one column to JSON: temporal types as ISO-8601 strings, numerics as
/// floats, uuids as strings, bytea as best-effort text.
fn decode_column(row: &PgRow, index: usize, column: &PgColumn) -> Result<Value, DbError> {
    let raw = row
        .try_get_raw(index)
        .map_err(|err| DbError::Decode(err.to_string()))?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let type_name = raw.type_info().name().to_uppercase();

    let decoded = match type_name.as_str() {
        "BOOL" => row.try_get::<bool, _>(index).map(Value::Bool),
        "INT2" => row.try_get::<i16, _>(index).map(|v| json!(v)),
        "INT4" => row.try_get::<i32, _>(index).map(|v| json!(v)),
        "INT8" => row.try_get::<i64, _>(index).map(|v| json!(v)),
        "FLOAT4" => row.try_get::<f32, _>(index).map(|v| float_value(v as f64)),
        "FLOAT8" => row.try_get::<f64, _>(index).map(float_value),
        "NUMERIC" => row
            .try_get::<Decimal, _>(index)
            .map(|v| float_value(v.to_f64().unwrap_or(0.0))),
        "DATE" => row
            .try_get::<NaiveDate, _>(index)
            .map(|v| Value::String(v.format("%Y-%m-%d").to_string())),
        "TIME" => row
            .try_get::<NaiveTime, _>(index)
            .map(|v| Value::String(v.format("%H:%M:%S%.f").to_string())),
        "TIMESTAMP" => row
            .try_get::<NaiveDateTime, _>(index)
            .map(|v| Value::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string())),
        "TIMESTAMPTZ" => row
            .try_get::<DateTime<Utc>, _>(index)
            .map(|v| Value::String(v.to_rfc3339())),
        "UUID" => row
            .try_get::<sqlx::types::Uuid, _>(index)
            .map(|v| Value::String(v.to_string())),
        "BYTEA" => row
            .try_get::<Vec<u8>, _>(index)
            .map(|v| Value::String(String::from_utf8_lossy(&v).into_owned())),
        "JSON" | "JSONB" => row.try_get::<Value, _>(index),
        _ => {
            // Unknown types fall back to their text representation.
            return Ok(row
                .try_get::<String, _>(index)
                .map(Value::String)
                .unwrap_or(Value::Null));
        }
    };
    decoded.map_err(|err| {
        DbError::Decode(format!(
            "column {} ({}): {err}",
            column.name(),
            type_name
        ))
    })
}

/// JSON number for a float, null for NaN/infinity.
fn float_value(value: f64) -> Value {
    Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::{Database, float_value};
    use crate::DbError;
    use koko_config::DatabaseConfig;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    #[tokio::test]
    async fn execute_rejects_non_select_without_connecting() {
        // Unroutable host: reaching the network would fail differently.
        let database = Database::new(DatabaseConfig {
            host: "db.invalid".to_string(),
            ..DatabaseConfig::default()
        });
        let err = database
            .execute("DELETE FROM branchclients")
            .await
            .expect_err("rejected");
        match err {
            DbError::NotReadOnly(keyword) => assert_eq!(keyword, "DELETE"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn execute_rejects_placeholders_without_connecting() {
        let database = Database::new(DatabaseConfig {
            host: "db.invalid".to_string(),
            ..DatabaseConfig::default()
        });
        let err = database
            .execute("SELECT * FROM branchclients WHERE branch = $1")
            .await
            .expect_err("rejected");
        match err {
            DbError::Placeholder(token) => assert_eq!(token, "$1"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn float_value_guards_non_finite() {
        assert_eq!(float_value(1.5), json!(1.5));
        assert_eq!(float_value(f64::NAN), Value::Null);
        assert_eq!(float_value(f64::INFINITY), Value::Null);
    }
}
