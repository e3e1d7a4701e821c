//! Formula-column rewriting.
//!
//! Checking an exercise answer means running the student's query with one more column
//! appended to every SELECT list: the formula, whose value the adventure database turns
//! into a progression token. The rewrite is best effort. A statement the parser rejects
//! is handled by a pattern match on `SELECT ... FROM`, and a statement neither approach
//! understands goes through untouched; the check then simply finds no token.

mod fallback;
mod structural;

use structural::SelectShape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Insertion point taken from the parsed SELECT list.
    Structural,
    /// Insertion point taken from the `SELECT ... FROM` pattern.
    Pattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteOutcome {
    Rewritten(Strategy),
    AlreadyPresent,
    NotSelect,
    NoFromClause,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementRewrite {
    /// Statement text without its terminating `;`.
    pub sql: String,
    pub outcome: RewriteOutcome,
}

/// Splits on every `;`, trimming and dropping blank pieces.
///
/// Semicolons inside string literals or comments split too.
pub fn split_statements(sql_text: &str) -> Vec<&str> {
    sql_text
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Case-insensitive substring test.
pub fn contains_formula(text: &str, formula: &str) -> bool {
    text.to_lowercase().contains(&formula.to_lowercase())
}

/// Appends `formula` to the column list of every SELECT in `sql_text`.
///
/// The result has one `;`-terminated statement per line, in input order.
pub fn add_formula_column(sql_text: &str, formula: &str) -> String {
    rewrite_statements(sql_text, formula)
        .into_iter()
        .map(|s| format!("{};", s.sql))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Same as [`add_formula_column`], statement by statement, with the path each one took.
pub fn rewrite_statements(sql_text: &str, formula: &str) -> Vec<StatementRewrite> {
    split_statements(sql_text)
        .into_iter()
        .map(|stmt| rewrite_statement(stmt, formula))
        .collect()
}

fn rewrite_statement(stmt: &str, formula: &str) -> StatementRewrite {
    let unchanged = |outcome| StatementRewrite {
        sql: stmt.to_string(),
        outcome,
    };

    if contains_formula(stmt, formula) {
        return unchanged(RewriteOutcome::AlreadyPresent);
    }

    match structural::locate_select_list(stmt) {
        SelectShape::ListEndsAt(at) => StatementRewrite {
            sql: format!("{}, {formula}{}", &stmt[..at], &stmt[at..]),
            outcome: RewriteOutcome::Rewritten(Strategy::Structural),
        },
        SelectShape::NotSelect => unchanged(RewriteOutcome::NotSelect),
        SelectShape::NoFrom => unchanged(RewriteOutcome::NoFromClause),
        SelectShape::Unparsed => match fallback::append_column(stmt, formula) {
            Some(sql) => {
                tracing::debug!(statement = stmt, "formula placed by pattern fallback");
                StatementRewrite {
                    sql,
                    outcome: RewriteOutcome::Rewritten(Strategy::Pattern),
                }
            }
            None => unchanged(RewriteOutcome::NoFromClause),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_expansion() {
        assert_eq!(add_formula_column("SELECT * FROM t", "x"), "SELECT *, x FROM t;");
    }

    #[test]
    fn column_append() {
        assert_eq!(add_formula_column("SELECT a, b FROM t", "x"), "SELECT a, b, x FROM t;");
    }

    #[test]
    fn select_without_from_passes_through() {
        assert_eq!(add_formula_column("SELECT 1+1", "x"), "SELECT 1+1;");
        assert_eq!(
            rewrite_statements("SELECT 1+1", "x")[0].outcome,
            RewriteOutcome::NoFromClause
        );
    }

    #[test]
    fn formula_already_present_is_skipped() {
        assert_eq!(add_formula_column("SELECT a, X FROM t", "X"), "SELECT a, X FROM t;");
        assert_eq!(add_formula_column("select a, x from t", "X"), "select a, x from t;");
        assert_eq!(
            rewrite_statements("select a, x from t", "X")[0].outcome,
            RewriteOutcome::AlreadyPresent
        );
    }

    #[test]
    fn rewriting_twice_changes_nothing() {
        let f = "hash(a, b)";
        for sql in [
            "SELECT a, b FROM t",
            "SELECT * FROM t; UPDATE t SET a = 1;",
            "select name, count(*) from t group by name",
            "SELECT a FROM t WHERE",
            "SELECT 1",
        ] {
            let once = add_formula_column(sql, f);
            assert_eq!(add_formula_column(&once, f), once, "input: {sql}");
        }
    }

    #[test]
    fn statement_count_is_preserved() {
        let out = add_formula_column("  SELECT a FROM t ;; \n ;UPDATE t SET a = 1; SELECT * FROM u;  ", "x");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec!["SELECT a, x FROM t;", "UPDATE t SET a = 1;", "SELECT *, x FROM u;"]
        );
    }

    #[test]
    fn parse_failures_fall_back_to_the_pattern() {
        let report = rewrite_statements("SELECT * FROM t LIMIT", "x");
        assert_eq!(report[0].sql, "SELECT *, x FROM t LIMIT");
        assert_eq!(report[0].outcome, RewriteOutcome::Rewritten(Strategy::Pattern));

        let report = rewrite_statements("SELECT a, b FROM t WHERE", "x");
        assert_eq!(report[0].sql, "SELECT a, b, x FROM t WHERE");
    }

    #[test]
    fn structural_path_keeps_function_calls_whole() {
        let report = rewrite_statements("SELECT name, COUNT(*) FROM t GROUP BY name", "x");
        assert_eq!(report[0].sql, "SELECT name, COUNT(*), x FROM t GROUP BY name");
        assert_eq!(report[0].outcome, RewriteOutcome::Rewritten(Strategy::Structural));
    }

    #[test]
    fn set_operations_only_extend_the_leftmost_select() {
        let report = rewrite_statements("SELECT name FROM t UNION SELECT name FROM u", "x");
        assert_eq!(report[0].sql, "SELECT name, x FROM t UNION SELECT name FROM u");
        assert_eq!(report[0].outcome, RewriteOutcome::Rewritten(Strategy::Structural));
    }

    #[test]
    fn non_select_statements_are_untouched() {
        let report = rewrite_statements("INSERT INTO t VALUES (1)", "x");
        assert_eq!(report[0].sql, "INSERT INTO t VALUES (1)");
        assert_eq!(report[0].outcome, RewriteOutcome::NotSelect);
    }

    #[test]
    fn semicolons_in_literals_still_split() {
        assert_eq!(split_statements("SELECT 'a;b' FROM t"), vec!["SELECT 'a", "b' FROM t"]);
        assert!(split_statements(" ; \n ;").is_empty());
    }
}
