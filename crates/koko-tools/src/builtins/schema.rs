//! Built-in tool for schema introspection.

use crate::builtins::utils::parse_args;
use crate::{Tool, ToolContext};
use async_trait::async_trait;
use koko_db::{DEFAULT_DISTINCT_LIMIT, Database, SchemaMode};
use koko_protocol::ToolError;
use log::info;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

/// Tool answering "what tables/columns/values exist".
#[derive(Debug, Clone)]
pub struct GetSchemaTool {
    database: Arc<Database>,
}

impl GetSchemaTool {
    /// Build the tool over a database handle.
    pub fn new(database: Arc<Database>) -> Self {
        Self { database }
    }
}

/// Arguments for GetSchemaTool.
#[derive(Debug, Deserialize)]
struct GetSchemaArgs {
    mode: String,
    #[serde(default)]
    table: Option<String>,
    #[serde(default)]
    column: Option<String>,
    #[serde(default)]
    limit: Option<i64>,
}

#[async_trait]
impl Tool for GetSchemaTool {
    fn name(&self) -> &str {
        "get_schema"
    }

    fn description(&self) -> &str {
        "Inspect the database schema: list tables, list columns, or list distinct values of a column"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "mode": {
                    "type": "string",
                    "enum": ["tables", "columns", "distinct"],
                    "description": "What to inspect."
                },
                "table": {
                    "type": "string",
                    "description": "Table name; required for distinct, optional for columns."
                },
                "column": {
                    "type": "string",
                    "description": "Column name; required for distinct."
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum distinct values to return (default 50)."
                }
            },
            "required": ["mode"]
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: GetSchemaArgs = parse_args(args)?;
        let mode = SchemaMode::parse(&input.mode)
            .map_err(|err| ToolError::InvalidArguments(err.to_string()))?;
        info!(
            "inspecting schema (session_id={}, mode={})",
            ctx.session_id, input.mode
        );
        match mode {
            SchemaMode::Tables => {
                let tables = self
                    .database
                    .list_tables()
                    .await
                    .map_err(|err| ToolError::ExecutionFailed(err.to_string()))?;
                Ok(json!({ "tables": tables }))
            }
            SchemaMode::Columns => {
                let columns = self
                    .database
                    .list_columns(input.table.as_deref())
                    .await
                    .map_err(|err| ToolError::ExecutionFailed(err.to_string()))?;
                Ok(json!({ "columns": columns }))
            }
            SchemaMode::Distinct => {
                let table = input.table.as_deref().ok_or_else(|| {
                    ToolError::InvalidArguments("distinct mode requires a table".to_string())
                })?;
                let column = input.column.as_deref().ok_or_else(|| {
                    ToolError::InvalidArguments("distinct mode requires a column".to_string())
                })?;
                let limit = input.limit.unwrap_or(DEFAULT_DISTINCT_LIMIT);
                let values = self
                    .database
                    .distinct_values(table, column, limit)
                    .await
                    .map_err(|err| ToolError::ExecutionFailed(err.to_string()))?;
                Ok(json!({
                    "table": table,
                    "column": column,
                    "values": values,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::GetSchemaTool;
    use crate::{Tool, ToolContext};
    use koko_config::DatabaseConfig;
    use koko_db::Database;
    use koko_protocol::ToolError;
    use serde_json::json;
    use std::sync::Arc;

    fn tool() -> GetSchemaTool {
        GetSchemaTool::new(Arc::new(Database::new(DatabaseConfig {
            host: "db.invalid".to_string(),
            ..DatabaseConfig::default()
        })))
    }

    #[tokio::test]
    async fn rejects_unknown_mode() {
        let ctx = ToolContext::default();
        let err = tool()
            .call(&ctx, json!({ "mode": "everything" }))
            .await
            .expect_err("rejected");
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn distinct_requires_table_and_column() {
        let ctx = ToolContext::default();
        let err = tool()
            .call(&ctx, json!({ "mode": "distinct" }))
            .await
            .expect_err("no table");
        assert!(matches!(err, ToolError::InvalidArguments(_)));

        let err = tool()
            .call(&ctx, json!({ "mode": "distinct", "table": "branchclients" }))
            .await
            .expect_err("no column");
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn distinct_rejects_unsafe_identifiers_before_connecting() {
        let ctx = ToolContext::default();
        let err = tool()
            .call(
                &ctx,
                json!({
                    "mode": "distinct",
                    "table": "branchclients",
                    "column": "branch; DROP TABLE x"
                }),
            )
            .await
            .expect_err("rejected");
        let ToolError::ExecutionFailed(message) = err else {
            panic!("expected execution failure");
        };
        assert!(message.contains("unsafe identifier"));
    }
}
