//! Built-in tools declared to the model.

mod schema;
mod sql;
mod utils;

pub use schema::GetSchemaTool;
pub use sql::QuerySqlTool;

use crate::registry::ToolRegistry;
use koko_db::Database;
use std::sync::Arc;

/// Register the built-in tools against a database handle.
pub fn register_builtin_tools(registry: &ToolRegistry, database: Arc<Database>) {
    registry.register(Arc::new(QuerySqlTool::new(database.clone())));
    registry.register(Arc::new(GetSchemaTool::new(database)));
}

/// Build a registry pre-populated with the built-in tools.
pub fn builtin_tool_registry(database: Arc<Database>) -> ToolRegistry {
    let registry = ToolRegistry::new();
    register_builtin_tools(&registry, database);
    registry
}
