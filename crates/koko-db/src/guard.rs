//! Lexical guard applied to every statement before execution.

use crate::DbError;
use regex::Regex;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\d+").expect("placeholder pattern"));

/// Whether the statement lexically begins with `select`.
///
/// This matches the raw text only; string literals are not stripped first.
pub fn is_select(sql: &str) -> bool {
    sql.trim_start().to_lowercase().starts_with("select")
}

/// Reject statements that are not read-only selects or that carry `$n`
/// positional placeholder tokens.
pub fn ensure_read_only(sql: &str) -> Result<(), DbError> {
    if !is_select(sql) {
        let keyword = sql
            .trim_start()
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_string();
        return Err(DbError::NotReadOnly(keyword));
    }
    if let Some(found) = PLACEHOLDER.find(sql) {
        return Err(DbError::Placeholder(found.as_str().to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ensure_read_only, is_select};
    use crate::DbError;
    use pretty_assertions::assert_eq;

    #[test]
    fn select_detection_ignores_case_and_whitespace() {
        assert!(is_select("SELECT 1"));
        assert!(is_select("  select * from t"));
        assert!(is_select("\n\tSeLeCt now()"));
        assert!(!is_select("DELETE FROM t"));
        assert!(!is_select("with t as (select 1) select * from t"));
    }

    #[test]
    fn guard_rejects_non_select() {
        let err = ensure_read_only("DROP TABLE users").expect_err("rejected");
        match err {
            DbError::NotReadOnly(keyword) => assert_eq!(keyword, "DROP"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn guard_rejects_positional_placeholders() {
        let err = ensure_read_only("SELECT * FROM t WHERE id = $1").expect_err("rejected");
        match err {
            DbError::Placeholder(token) => assert_eq!(token, "$1"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn guard_accepts_plain_select() {
        ensure_read_only("SELECT branch, month FROM branchclients").expect("allowed");
    }
}
