use rusqlite::{params, types::ValueRef, Connection, Rows, Statement};

use crate::core::limits::PageRequest;
use crate::core::schema;
use crate::core::types::{Cell, QueryResult};
use crate::error::{AppError, AppResult};
use crate::rewrite::split_statements;

/// Runs every statement of `sql_text` in order and returns the last one's full result.
pub fn run_query(conn: &Connection, sql_text: &str) -> AppResult<QueryResult> {
    let (last, before) = statements(sql_text)?;
    for stmt in before {
        run_statement(conn, stmt)?;
    }
    run_statement(conn, last)
}

/// Like [`run_query`], but the last statement is served one window at a time.
pub fn run_query_page(conn: &Connection, sql_text: &str, page: PageRequest) -> AppResult<QueryResult> {
    let (last, before) = statements(sql_text)?;
    for stmt in before {
        run_statement(conn, stmt)?;
    }
    paginate(conn, last, page)
}

pub fn run_table_page(conn: &Connection, table: &str, page: PageRequest) -> AppResult<QueryResult> {
    schema::ensure_table_ref(table)?;
    let mut qr = paginate(conn, &format!("SELECT * FROM {table}"), page)?;
    qr.table_name = Some(table.to_string());
    Ok(qr)
}

fn statements(sql_text: &str) -> AppResult<(&str, Vec<&str>)> {
    let mut stmts = split_statements(sql_text);
    let last = stmts
        .pop()
        .ok_or_else(|| AppError::InvalidRequest("Query cannot be empty".into()))?;
    Ok((last, stmts))
}

fn run_statement(conn: &Connection, sql: &str) -> AppResult<QueryResult> {
    let mut stmt = conn.prepare(sql)?;
    let columns = column_names(&stmt);
    if columns.is_empty() {
        stmt.execute([])?;
        return Ok(QueryResult::unpaginated(Vec::new(), Vec::new()));
    }

    let rows = collect_rows(stmt.query([])?, columns.len())?;
    Ok(QueryResult::unpaginated(columns, rows))
}

/// Count, then fetch the window. The two reads are not in one transaction, so a writer
/// in between can leave `total` out of step with `rows`.
fn paginate(conn: &Connection, source: &str, page: PageRequest) -> AppResult<QueryResult> {
    // Column names come from the unwindowed statement so that an out-of-range page still
    // reports them.
    let columns = column_names(&conn.prepare(source)?);
    if columns.is_empty() {
        conn.execute(source, [])?;
        return Ok(QueryResult::page(Vec::new(), Vec::new(), 0, page));
    }

    // The closing paren goes on its own line so a trailing `--` comment cannot swallow it.
    let total: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM ({source}\n)"), [], |r| r.get(0))?;

    let mut stmt = conn.prepare(&format!("SELECT * FROM ({source}\n) LIMIT ?1 OFFSET ?2"))?;
    let rows = collect_rows(
        stmt.query(params![page.limit as i64, page.offset as i64])?,
        columns.len(),
    )?;

    tracing::debug!(total, offset = page.offset, limit = page.limit, returned = rows.len(), "page read");
    Ok(QueryResult::page(columns, rows, total.max(0) as usize, page))
}

fn column_names(stmt: &Statement<'_>) -> Vec<String> {
    stmt.column_names().iter().map(|s| s.to_string()).collect()
}

fn collect_rows(mut rows: Rows<'_>, width: usize) -> AppResult<Vec<Vec<Cell>>> {
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(width);
        for i in 0..width {
            cells.push(cell_value(row.get_ref(i)?));
        }
        out.push(cells);
    }
    Ok(out)
}

fn cell_value(v: ValueRef<'_>) -> Cell {
    match v {
        ValueRef::Null => Cell::Null,
        ValueRef::Integer(x) => Cell::from(x),
        ValueRef::Real(x) => Cell::from(x),
        ValueRef::Text(t) => Cell::from(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Cell::from(hex::encode(b)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn seeded(rows: usize) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE item(id INTEGER PRIMARY KEY, label TEXT, price REAL, raw BLOB)")
            .unwrap();
        for i in 1..=rows {
            conn.execute(
                "INSERT INTO item(id, label, price, raw) VALUES (?1, ?2, ?3, NULL)",
                params![i as i64, format!("item-{i}"), i as f64 / 2.0],
            )
            .unwrap();
        }
        conn
    }

    #[test]
    fn table_page_echoes_window_and_total() {
        let conn = seeded(25);
        let qr = run_table_page(&conn, "item", PageRequest { offset: 20, limit: 10 }).unwrap();

        assert_eq!(qr.columns, vec!["id", "label", "price", "raw"]);
        assert_eq!(qr.total, Some(25));
        assert_eq!(qr.offset, Some(20));
        assert_eq!(qr.limit, Some(10));
        assert_eq!(qr.table_name.as_deref(), Some("item"));
        assert_eq!(qr.rows.len(), 5);
        assert_eq!(qr.rows[0], vec![json!(21), json!("item-21"), json!(10.5), json!(null)]);
    }

    #[test]
    fn out_of_range_page_still_has_columns() {
        let conn = seeded(3);
        let qr = run_table_page(&conn, "item", PageRequest { offset: 50, limit: 10 }).unwrap();
        assert!(qr.rows.is_empty());
        assert_eq!(qr.columns.len(), 4);
        assert_eq!(qr.total, Some(3));
    }

    #[test]
    fn unknown_table_is_a_database_error() {
        let conn = seeded(0);
        let err = run_table_page(&conn, "nope", PageRequest::default()).unwrap_err();
        assert_eq!(err.code(), "SQL_ERROR");
        assert!(err.to_string().contains("no such table"), "{err}");

        let err = run_table_page(&conn, "item; DROP TABLE item", PageRequest::default()).unwrap_err();
        assert_eq!(err.code(), "INVALID_REQUEST");
    }

    #[test]
    fn query_page_counts_the_whole_result() {
        let conn = seeded(12);
        let qr = run_query_page(
            &conn,
            "SELECT id FROM item WHERE id > 2 ORDER BY id;",
            PageRequest { offset: 0, limit: 4 },
        )
        .unwrap();
        assert_eq!(qr.total, Some(10));
        assert_eq!(qr.rows, vec![vec![json!(3)], vec![json!(4)], vec![json!(5)], vec![json!(6)]]);
    }

    #[test]
    fn earlier_statements_run_before_the_paged_one() {
        let conn = seeded(1);
        let qr = run_query_page(
            &conn,
            "INSERT INTO item(id, label) VALUES (2, 'two'); SELECT label FROM item ORDER BY id",
            PageRequest::default(),
        )
        .unwrap();
        assert_eq!(qr.total, Some(2));
        assert_eq!(qr.rows[1], vec![json!("two")]);
    }

    #[test]
    fn trailing_line_comment_does_not_break_paging() {
        let conn = seeded(3);
        let sql = "SELECT label FROM item WHERE id = 2 -- my answer";
        let qr = run_query_page(&conn, sql, PageRequest::default()).unwrap();
        assert_eq!(qr.total, Some(1));
        assert_eq!(qr.rows, vec![vec![json!("item-2")]]);
        assert_eq!(run_query(&conn, sql).unwrap().rows, qr.rows);
    }

    #[test]
    fn statements_without_rows_give_an_empty_page() {
        let conn = seeded(1);
        let qr = run_query_page(&conn, "DELETE FROM item", PageRequest::default()).unwrap();
        assert_eq!(qr.total, Some(0));
        assert!(qr.columns.is_empty());
        let left: i64 = conn.query_row("SELECT COUNT(*) FROM item", [], |r| r.get(0)).unwrap();
        assert_eq!(left, 0);
    }

    #[test]
    fn unpaginated_query_reports_row_count_and_blobs_as_hex() {
        let conn = seeded(0);
        conn.execute("INSERT INTO item(id, raw) VALUES (1, x'00ff')", []).unwrap();
        let qr = run_query(&conn, "SELECT id, raw FROM item").unwrap();
        assert_eq!(qr.rows, vec![vec![json!(1), json!("00ff")]]);
        assert_eq!(qr.total_rows, Some(1));
        assert_eq!(qr.total, None);
    }

    #[test]
    fn empty_query_is_rejected() {
        let conn = seeded(0);
        let err = run_query(&conn, " ;  ").unwrap_err();
        assert_eq!(err.to_string(), "invalid request: Query cannot be empty");
    }
}
