use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_PAGE_OFFSET: usize = 0;
pub const DEFAULT_PAGE_LIMIT: usize = 10;

/// Pagination window after coercion; what the server actually applies and echoes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: DEFAULT_PAGE_OFFSET,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PageRequest {
    /// Builds a window from raw request values, which may be numbers, numeric strings or
    /// garbage. Nothing here rejects: unparsable values take the default, a negative offset
    /// becomes 0, a non-positive limit takes the default, and the limit never exceeds
    /// `max_rows`.
    pub fn coerce(offset: Option<&Value>, limit: Option<&Value>, default_limit: usize, max_rows: usize) -> Self {
        let offset = offset
            .and_then(parse_int)
            .map(|n| n.max(0) as usize)
            .unwrap_or(DEFAULT_PAGE_OFFSET);
        let limit = limit
            .and_then(parse_int)
            .filter(|n| *n > 0)
            .map(|n| n as usize)
            .unwrap_or(default_limit);
        Self {
            offset,
            limit: effective_limit(limit, max_rows),
        }
    }

    /// 1-based page this window starts on.
    pub fn page_number(&self) -> usize {
        self.offset / self.limit.max(1) + 1
    }

    /// Window for a 1-based page number.
    pub fn for_page(page: usize, limit: usize) -> Self {
        Self {
            offset: page.saturating_sub(1) * limit,
            limit,
        }
    }
}

pub fn effective_limit(requested: usize, max_rows: usize) -> usize {
    requested.min(max_rows).max(1)
}

/// Integer-prefix parse: `"12abc"` is 12, `"3.7"` is 3, `"abc"` is nothing.
fn parse_int(v: &Value) -> Option<i64> {
    static INT_PREFIX: OnceLock<Regex> = OnceLock::new();
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let re = INT_PREFIX.get_or_init(|| Regex::new(r"^\s*([+-]?\d+)").expect("valid regex"));
            re.captures(s)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<i64>().ok())
        }
        _ => None,
    }
}
