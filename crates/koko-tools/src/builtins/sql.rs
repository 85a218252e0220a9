//! Built-in tool for ad-hoc read-only SQL.

use crate::builtins::utils::parse_args;
use crate::{Tool, ToolContext};
use async_trait::async_trait;
use koko_db::{Database, rewrite};
use koko_protocol::ToolError;
use log::info;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

/// Tool running a model-generated SELECT against Postgres.
#[derive(Debug, Clone)]
pub struct QuerySqlTool {
    database: Arc<Database>,
}

impl QuerySqlTool {
    /// Build the tool over a database handle.
    pub fn new(database: Arc<Database>) -> Self {
        Self { database }
    }
}

/// Arguments for QuerySqlTool.
#[derive(Debug, Deserialize)]
struct QuerySqlArgs {
    query: String,
}

#[async_trait]
impl Tool for QuerySqlTool {
    fn name(&self) -> &str {
        "query_sql"
    }

    fn description(&self) -> &str {
        "Run a read-only SQL SELECT against the Postgres database and return the rows"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "A single SELECT statement to execute."
                }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: QuerySqlArgs = parse_args(args)?;
        if input.query.trim().is_empty() {
            return Err(ToolError::InvalidArguments(
                "query cannot be empty".to_string(),
            ));
        }
        let adjusted = rewrite(&input.query, &ctx.utterance);
        info!(
            "running tool query (session_id={}, query_len={}, rewritten={})",
            ctx.session_id,
            input.query.len(),
            adjusted != input.query
        );
        let rows = self
            .database
            .execute(&adjusted)
            .await
            .map_err(|err| ToolError::ExecutionFailed(err.to_string()))?;
        let row_count = rows.len();
        Ok(json!({
            "rows": rows,
            "row_count": row_count,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::QuerySqlTool;
    use crate::{Tool, ToolContext};
    use koko_config::DatabaseConfig;
    use koko_db::Database;
    use koko_protocol::ToolError;
    use serde_json::json;
    use std::sync::Arc;

    fn tool() -> QuerySqlTool {
        QuerySqlTool::new(Arc::new(Database::new(DatabaseConfig {
            host: "db.invalid".to_string(),
            ..DatabaseConfig::default()
        })))
    }

    #[tokio::test]
    async fn rejects_missing_and_empty_query() {
        let ctx = ToolContext::default();
        let err = tool().call(&ctx, json!({})).await.expect_err("missing");
        assert!(matches!(err, ToolError::InvalidArguments(_)));

        let err = tool()
            .call(&ctx, json!({ "query": "  " }))
            .await
            .expect_err("empty");
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn surfaces_guard_rejection_as_execution_failure() {
        let ctx = ToolContext::default();
        let err = tool()
            .call(&ctx, json!({ "query": "DROP TABLE branchclients" }))
            .await
            .expect_err("rejected");
        let ToolError::ExecutionFailed(message) = err else {
            panic!("expected execution failure");
        };
        assert!(message.contains("SELECT"));
    }
}
