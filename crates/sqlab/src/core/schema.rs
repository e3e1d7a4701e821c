use std::path::Path;

use rusqlite::Connection;

use crate::core::types::DatabaseInfo;
use crate::error::{AppError, AppResult};

/// Prefix of the engine's own bookkeeping tables, and of adventure database names.
pub const SYSTEM_PREFIX: &str = "sqlab_";

pub fn list_tables(conn: &Connection, include_system: bool) -> AppResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;
    let rows = stmt
        .query_map([], |r| r.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows
        .into_iter()
        .filter(|name| include_system || !name.starts_with(SYSTEM_PREFIX))
        .collect())
}

pub fn database_info(db_path: &Path) -> DatabaseInfo {
    let name = db_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let adventure = format_adventure_name(&name);
    DatabaseInfo {
        name,
        path: db_path.to_path_buf(),
        adventure,
    }
}

/// `sqlab_island` reads as `Island`; other names are shown as they are.
pub fn format_adventure_name(db_name: &str) -> String {
    if db_name.is_empty() {
        return "Unknown".to_string();
    }
    let has_prefix = db_name
        .get(..SYSTEM_PREFIX.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(SYSTEM_PREFIX));
    if !has_prefix {
        return db_name.to_string();
    }

    let rest = &db_name[SYSTEM_PREFIX.len()..];
    let mut chars = rest.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) fn ensure_table_ref(table: &str) -> AppResult<()> {
    // Table names are spliced into SQL text, so only plain identifiers get through.
    if is_safe_table_ref(table) {
        Ok(())
    } else {
        Err(AppError::InvalidRequest(format!("invalid table identifier: {table}")))
    }
}

pub(crate) fn is_safe_identifier(s: &str) -> bool {
    // [A-Za-z_][A-Za-z0-9_]*
    let mut chars = s.chars();
    let Some(first) = chars.next() else { return false };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn is_safe_table_ref(s: &str) -> bool {
    // `table` or `schema.table`.
    let mut parts = s.split('.');
    let Some(first) = parts.next() else { return false };
    if !is_safe_identifier(first) {
        return false;
    }
    match parts.next() {
        None => true,
        Some(second) => parts.next().is_none() && is_safe_identifier(second),
    }
}
