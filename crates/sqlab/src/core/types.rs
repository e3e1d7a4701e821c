use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::limits::PageRequest;

/// One cell: string, number or null.
pub type Cell = serde_json::Value;

/// Envelope shared by every data endpoint.
///
/// `columns` and `rows` are mandatory on the wire; the pagination fields are only
/// present when the result came from a paginated source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<usize>,
}

impl QueryResult {
    pub fn unpaginated(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let total_rows = rows.len();
        Self {
            columns,
            rows,
            total: None,
            offset: None,
            limit: None,
            table_name: None,
            total_rows: Some(total_rows),
        }
    }

    pub fn page(columns: Vec<String>, rows: Vec<Vec<Cell>>, total: usize, req: PageRequest) -> Self {
        Self {
            columns,
            rows,
            total: Some(total),
            offset: Some(req.offset),
            limit: Some(req.limit),
            table_name: None,
            total_rows: None,
        }
    }

    /// `total` when the source was paginated, otherwise the row count itself.
    pub fn effective_total(&self) -> usize {
        self.total.unwrap_or(self.rows.len())
    }

    /// Drops every column whose name ends in `hash` (any case), from the header and
    /// from each row.
    pub fn without_hash_columns(mut self) -> Self {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !c.to_lowercase().ends_with("hash"))
            .collect();
        if keep.iter().all(|k| *k) {
            return self;
        }

        self.columns = retain_by_mask(std::mem::take(&mut self.columns), &keep);
        self.rows = std::mem::take(&mut self.rows)
            .into_iter()
            .map(|row| retain_by_mask(row, &keep))
            .collect();
        self
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }
}

fn retain_by_mask<T>(items: Vec<T>, keep: &[bool]) -> Vec<T> {
    items
        .into_iter()
        .zip(keep.iter())
        .filter_map(|(item, k)| k.then_some(item))
        .collect()
}

/// Outcome of `check_solution`: the page that was run plus the verification token, if the
/// rewritten query produced one.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// The SQL actually executed, after rewriting.
    pub sql: String,
    #[serde(flatten)]
    pub result: QueryResult,
    pub token: Option<Cell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub name: String,
    pub path: PathBuf,
    pub adventure: String,
}
