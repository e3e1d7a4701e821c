use rusqlite::Connection;

use crate::core::limits::PageRequest;
use crate::core::query;
use crate::core::types::CheckResult;
use crate::error::{AppError, AppResult};
use crate::rewrite::{add_formula_column, contains_formula};

/// Name of the column the formula evaluates into.
pub const TOKEN_COLUMN: &str = "token";

/// Runs a student answer with the exercise formula appended and picks the token out of
/// the first row.
///
/// A missing token is not an error: it is how a wrong answer (or an answer the rewriter
/// could not extend) shows up.
pub fn check_solution(conn: &Connection, sql: &str, formula: &str, page: PageRequest) -> AppResult<CheckResult> {
    if formula.trim().is_empty() {
        return Err(AppError::InvalidRequest("no formula to check against".into()));
    }

    let sql = if contains_formula(sql, formula) {
        sql.to_string()
    } else {
        add_formula_column(sql, formula)
    };
    let result = query::run_query_page(conn, &sql, page)?;

    let token = result
        .column_index(TOKEN_COLUMN)
        .and_then(|i| result.rows.first().and_then(|row| row.get(i)).cloned())
        .filter(|v| !v.is_null());
    tracing::debug!(found = token.is_some(), "solution checked");

    // Students see the same columns as in `execute_query`: verification hashes stay hidden.
    let result = result.without_hash_columns();
    Ok(CheckResult { sql, result, token })
}
