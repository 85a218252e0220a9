//! Heuristic normalization of model-generated SQL.
//!
//! These are best-effort text transforms, not a parser: they patch the
//! comparison patterns the model gets wrong most often (branch name casing,
//! exact-date month filters) and inject a month filter when the user asked
//! for one but the statement has none. Tests pin exact input/output pairs.

use crate::guard::is_select;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

/// Table the month-filter injection applies to.
const MONTH_FILTER_TABLE: &str = "branchclients";

static BRANCH_EQ: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b((?:[a-z_][a-z0-9_]*\.)?[a-z0-9_]*branch[a-z0-9_]*)\s*=\s*'([^']*)'")
        .expect("branch equality pattern")
});

static BRANCH_ILIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b((?:[a-z_][a-z0-9_]*\.)?[a-z0-9_]*branch[a-z0-9_]*)\s+ilike\s+'([^']*)'")
        .expect("branch ilike pattern")
});

static MONTH_EQ: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b((?:[a-z_][a-z0-9_]*\.)?[a-z0-9_]*month[a-z0-9_]*)\s*=\s*'(\d{4}-\d{2}-\d{2})'")
        .expect("month equality pattern")
});

static MONTH_NAME_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december)\s+(\d{4})\b",
    )
    .expect("month name pattern")
});

static NUMERIC_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})[-/](\d{1,2})\b").expect("numeric month pattern"));

static TAIL_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(group\s+by|order\s+by|limit|offset)\b").expect("tail keyword pattern")
});

static FROM_TARGET_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\bfrom\s+{MONTH_FILTER_TABLE}\b")).expect("from table pattern")
});

static WHERE_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bwhere\b").expect("where pattern"));

/// Normalize a candidate SQL statement against the user utterance.
///
/// Rules, applied in order:
/// 1. Non-select input passes through unchanged.
/// 2. `branch = 'X'` comparisons become case/whitespace-insensitive.
/// 3. `branch ILIKE 'X'` comparisons become whitespace-trimmed.
/// 4. Exact-date equality on a month column becomes month-truncated.
/// 5. A month named in the utterance is injected as a filter when the
///    statement reads the client table without one.
pub fn rewrite(sql: &str, utterance: &str) -> String {
    if !is_select(sql) {
        return sql.to_string();
    }

    let mut out = BRANCH_EQ
        .replace_all(sql, |caps: &regex::Captures<'_>| {
            format!("UPPER(TRIM({})) = UPPER(TRIM('{}'))", &caps[1], &caps[2])
        })
        .to_string();

    out = BRANCH_ILIKE
        .replace_all(&out, |caps: &regex::Captures<'_>| {
            format!("TRIM({}) ILIKE TRIM('{}')", &caps[1], &caps[2])
        })
        .to_string();

    out = MONTH_EQ
        .replace_all(&out, |caps: &regex::Captures<'_>| {
            format!(
                "DATE_TRUNC('month', {}) = DATE_TRUNC('month', DATE '{}')",
                &caps[1], &caps[2]
            )
        })
        .to_string();

    if let Some(month_start) = month_from_utterance(utterance)
        && FROM_TARGET_TABLE.is_match(&out)
        && !out.to_lowercase().contains("month")
    {
        out = inject_month_filter(&out, month_start);
    }

    out
}

/// Extract the month a user utterance refers to, as the first day of that
/// month. Recognizes full month names with a year ("December 2024") and the
/// numeric `YYYY-MM` / `YYYY/MM` forms.
pub fn month_from_utterance(utterance: &str) -> Option<NaiveDate> {
    if let Some(caps) = MONTH_NAME_YEAR.captures(utterance) {
        let month = month_number(&caps[1])?;
        let year: i32 = caps[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1);
    }
    for caps in NUMERIC_MONTH.captures_iter(utterance) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        if (1..=12).contains(&month)
            && let Some(date) = NaiveDate::from_ymd_opt(year, month, 1)
        {
            return Some(date);
        }
    }
    None
}

fn month_number(name: &str) -> Option<u32> {
    let number = match name.to_lowercase().as_str() {
        "january" => 1,
        "february" => 2,
        "march" => 3,
        "april" => 4,
        "may" => 5,
        "june" => 6,
        "july" => 7,
        "august" => 8,
        "september" => 9,
        "october" => 10,
        "november" => 11,
        "december" => 12,
        _ => return None,
    };
    Some(number)
}

/// Splice a month filter before the leftmost trailing clause keyword, or at
/// the end of the statement if none exists.
fn inject_month_filter(sql: &str, month_start: NaiveDate) -> String {
    let connector = if WHERE_KEYWORD.is_match(sql) {
        "AND"
    } else {
        "WHERE"
    };
    let clause = format!(
        "{connector} month = DATE '{}'",
        month_start.format("%Y-%m-%d")
    );
    match TAIL_KEYWORD.find(sql) {
        Some(tail) => {
            let head = sql[..tail.start()].trim_end();
            format!("{head} {clause} {}", &sql[tail.start()..])
        }
        None => {
            let head = sql.trim_end().trim_end_matches(';').trim_end();
            format!("{head} {clause}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{month_from_utterance, rewrite};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn non_select_passes_through_unchanged() {
        let sql = "UPDATE branchclients SET branch = 'X'";
        assert_eq!(rewrite(sql, "anything"), sql);
        let sql = "explain select * from branchclients";
        assert_eq!(rewrite(sql, "anything"), sql);
    }

    #[test]
    fn branch_equality_becomes_case_insensitive() {
        assert_eq!(
            rewrite("SELECT * FROM branchclients WHERE branch = 'Nairobi '", ""),
            "SELECT * FROM branchclients WHERE UPPER(TRIM(branch)) = UPPER(TRIM('Nairobi '))"
        );
    }

    #[test]
    fn qualified_branch_columns_are_rewritten() {
        assert_eq!(
            rewrite("SELECT * FROM branchclients b WHERE b.branch_name = 'west'", ""),
            "SELECT * FROM branchclients b WHERE UPPER(TRIM(b.branch_name)) = UPPER(TRIM('west'))"
        );
    }

    #[test]
    fn non_branch_equality_is_untouched() {
        let sql = "SELECT * FROM branchclients WHERE client = 'Acme'";
        assert_eq!(rewrite(sql, ""), sql);
    }

    #[test]
    fn branch_ilike_becomes_trimmed() {
        assert_eq!(
            rewrite("SELECT * FROM branchclients WHERE branch ILIKE 'nai%'", ""),
            "SELECT * FROM branchclients WHERE TRIM(branch) ILIKE TRIM('nai%')"
        );
    }

    #[test]
    fn month_equality_becomes_month_truncated() {
        assert_eq!(
            rewrite("SELECT * FROM branchclients WHERE month = '2024-12-15'", ""),
            "SELECT * FROM branchclients WHERE DATE_TRUNC('month', month) = DATE_TRUNC('month', DATE '2024-12-15')"
        );
    }

    #[test]
    fn month_filter_appends_at_end() {
        assert_eq!(
            rewrite("SELECT * FROM branchclients", "sales for December 2024"),
            "SELECT * FROM branchclients WHERE month = DATE '2024-12-01'"
        );
    }

    #[test]
    fn month_filter_lands_before_order_by() {
        assert_eq!(
            rewrite(
                "SELECT * FROM branchclients ORDER BY branch",
                "2024-12 report"
            ),
            "SELECT * FROM branchclients WHERE month = DATE '2024-12-01' ORDER BY branch"
        );
    }

    #[test]
    fn month_filter_lands_before_the_leftmost_tail_keyword() {
        assert_eq!(
            rewrite(
                "SELECT branch, SUM(amount) FROM branchclients GROUP BY branch ORDER BY branch",
                "2024-12 report"
            ),
            "SELECT branch, SUM(amount) FROM branchclients WHERE month = DATE '2024-12-01' GROUP BY branch ORDER BY branch"
        );
    }

    #[test]
    fn month_filter_uses_and_after_existing_where() {
        assert_eq!(
            rewrite(
                "SELECT * FROM branchclients WHERE client = 'Acme' LIMIT 10",
                "march 2025"
            ),
            "SELECT * FROM branchclients WHERE client = 'Acme' AND month = DATE '2025-03-01' LIMIT 10"
        );
    }

    #[test]
    fn month_filter_skips_statements_that_mention_month() {
        let sql = "SELECT * FROM branchclients WHERE month = DATE '2024-11-01'";
        assert_eq!(rewrite(sql, "December 2024"), sql);
    }

    #[test]
    fn month_filter_skips_other_tables() {
        let sql = "SELECT * FROM clients";
        assert_eq!(rewrite(sql, "December 2024"), sql);
    }

    #[test]
    fn utterance_month_detection_covers_supported_forms() {
        assert_eq!(
            month_from_utterance("show me sales for December 2024"),
            NaiveDate::from_ymd_opt(2024, 12, 1)
        );
        assert_eq!(
            month_from_utterance("the 2024-12 report"),
            NaiveDate::from_ymd_opt(2024, 12, 1)
        );
        assert_eq!(
            month_from_utterance("totals for 2025/3"),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
        assert_eq!(month_from_utterance("latest totals"), None);
        assert_eq!(month_from_utterance("code 2024-13 is not a month"), None);
    }
}
