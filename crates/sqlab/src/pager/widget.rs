use async_trait::async_trait;

use crate::core::connection::ConnectionPool;
use crate::core::limits::{PageRequest, DEFAULT_PAGE_LIMIT, DEFAULT_PAGE_OFFSET};
use crate::core::types::QueryResult;
use crate::error::{AppError, AppResult};

use super::{render_page, RenderedPage};

/// Anything that can serve one window of a result set.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, offset: usize, limit: usize) -> AppResult<QueryResult>;
}

/// Rows of one table.
pub struct TableSource {
    pool: ConnectionPool,
    table: String,
}

impl TableSource {
    pub fn new(pool: ConnectionPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }
}

#[async_trait]
impl PageSource for TableSource {
    async fn fetch(&self, offset: usize, limit: usize) -> AppResult<QueryResult> {
        let conn = self.pool.get_connection().await?;
        conn.table_page(self.table.clone(), PageRequest { offset, limit }).await
    }
}

/// Rows of an arbitrary query, re-run for every window.
pub struct QuerySource {
    pool: ConnectionPool,
    sql: String,
}

impl QuerySource {
    pub fn new(pool: ConnectionPool, sql: impl Into<String>) -> Self {
        Self { pool, sql: sql.into() }
    }
}

#[async_trait]
impl PageSource for QuerySource {
    async fn fetch(&self, offset: usize, limit: usize) -> AppResult<QueryResult> {
        let conn = self.pool.get_connection().await?;
        conn.query_page(self.sql.clone(), PageRequest { offset, limit }).await
    }
}

/// Window the widget is currently showing, or about to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub current_offset: usize,
    pub current_limit: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            current_offset: DEFAULT_PAGE_OFFSET,
            current_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

#[derive(Debug, Clone)]
pub enum WidgetState {
    Idle,
    Loading { offset: usize, limit: usize },
    Displaying(RenderedPage),
    Error(AppError),
}

/// Fetch/render cycle for one table or query.
///
/// `Idle -> Loading` on open, `Loading -> Displaying | Error` when the fetch settles,
/// `Displaying -> Loading` on a page click. A widget belongs to one source; opening a
/// different table means building a new widget. Nothing orders overlapping fetches, the
/// last one to settle is what stays on screen.
pub struct PaginationWidget<S> {
    source: S,
    pagination: PaginationState,
    state: WidgetState,
}

impl<S: PageSource> PaginationWidget<S> {
    pub fn new(source: S, limit: usize) -> Self {
        Self {
            source,
            pagination: PaginationState {
                current_offset: DEFAULT_PAGE_OFFSET,
                current_limit: limit.max(1),
            },
            state: WidgetState::Idle,
        }
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn pagination(&self) -> PaginationState {
        self.pagination
    }

    /// Loads the first page.
    pub async fn open(&mut self) -> &WidgetState {
        let limit = self.pagination.current_limit;
        self.load(DEFAULT_PAGE_OFFSET, limit).await;
        &self.state
    }

    /// Moves to `page` (1-based) if the displayed page has such a button and it is not the
    /// active one; otherwise nothing is fetched.
    pub async fn click_page(&mut self, page: usize) -> &WidgetState {
        let mut requested = None;
        if let WidgetState::Displaying(view) = &self.state {
            view.click(page, |offset, limit| requested = Some((offset, limit)));
        }
        if let Some((offset, limit)) = requested {
            self.load(offset, limit).await;
        }
        &self.state
    }

    async fn load(&mut self, offset: usize, limit: usize) {
        self.state = WidgetState::Loading { offset, limit };
        match self.source.fetch(offset, limit).await {
            Ok(data) => {
                self.pagination = PaginationState {
                    current_offset: data.offset.unwrap_or(offset),
                    current_limit: data.limit.unwrap_or(limit),
                };
                self.state = WidgetState::Displaying(render_page(&data));
            }
            Err(e) => {
                tracing::warn!(error = %e, offset, limit, "page fetch failed");
                self.state = WidgetState::Error(e);
            }
        }
    }
}
