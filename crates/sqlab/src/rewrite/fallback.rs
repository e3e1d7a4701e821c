use std::sync::OnceLock;

use regex::Regex;

/// Pattern rewrite for statements the parser could not handle: everything between the
/// first `SELECT` and the first following `FROM` is taken as the column list.
///
/// Returns `None` when there is no `SELECT ... FROM` to anchor on.
pub(crate) fn append_column(stmt: &str, formula: &str) -> Option<String> {
    static SELECT_FROM: OnceLock<Regex> = OnceLock::new();
    let re = SELECT_FROM
        .get_or_init(|| Regex::new(r"(?is)\bSELECT\s+(.+?)\s+FROM\b").expect("valid select/from regex"));

    let cols = re.captures(stmt)?.get(1)?;
    let (head, tail) = (&stmt[..cols.start()], &stmt[cols.end()..]);
    if cols.as_str().trim() == "*" {
        Some(format!("{head}*, {formula}{tail}"))
    } else {
        Some(format!("{}, {formula}{tail}", &stmt[..cols.end()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_gets_the_formula_after_it() {
        assert_eq!(
            append_column("select *   from t where", "f(x)").as_deref(),
            Some("select *, f(x)   from t where")
        );
    }

    #[test]
    fn column_list_is_extended_before_from() {
        assert_eq!(
            append_column("SELECT a,\n b\nFROM t LIMIT", "x").as_deref(),
            Some("SELECT a,\n b, x\nFROM t LIMIT")
        );
    }

    #[test]
    fn stops_at_the_first_from() {
        // Known limitation of the pattern: a subquery in the list cuts it short.
        assert_eq!(
            append_column("SELECT (SELECT 1 FROM u) FROM t", "x").as_deref(),
            Some("SELECT (SELECT 1, x FROM u) FROM t")
        );
    }

    #[test]
    fn no_from_means_no_rewrite() {
        assert_eq!(append_column("SELECT 1+1", "x"), None);
        assert_eq!(append_column("DELETE FROM t", "x"), None);
    }
}
