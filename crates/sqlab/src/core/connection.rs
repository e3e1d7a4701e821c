use std::{
    ops::Deref,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    thread,
};

use rusqlite::{Connection, OpenFlags};
use tokio::sync::{oneshot, OwnedSemaphorePermit, Semaphore};

use crate::{
    core::{check, limits::PageRequest, query, schema, types::CheckResult, types::QueryResult},
    error::{AppError, AppResult},
};

/// Bounded set of database workers, one SQLite connection each.
///
/// Callers take a worker with [`ConnectionPool::get_connection`] and hand it back by
/// dropping the guard, whatever the outcome of the work done with it.
#[derive(Debug, Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

#[derive(Debug)]
struct PoolInner {
    idle: Mutex<Vec<WorkerHandle>>,
    permits: Arc<Semaphore>,
    db_path: PathBuf,
}

impl ConnectionPool {
    pub fn open(db_path: &Path, size: usize, busy_timeout_ms: u64) -> AppResult<Self> {
        let db_path = canonicalize_lossy(db_path)?;
        let size = size.max(1);
        let workers = (0..size)
            .map(|_| WorkerHandle::spawn(db_path.clone(), busy_timeout_ms))
            .collect::<Vec<_>>();
        tracing::info!(path = %db_path.display(), size, "connection pool ready");

        Ok(Self {
            inner: Arc::new(PoolInner {
                idle: Mutex::new(workers),
                permits: Arc::new(Semaphore::new(size)),
                db_path,
            }),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.inner.db_path
    }

    /// Waits for a free worker.
    pub async fn get_connection(&self) -> AppResult<PooledConnection> {
        let permit = self
            .inner
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| AppError::Internal("connection pool closed".into()))?;
        let worker = self
            .inner
            .idle
            .lock()
            .map_err(|_| AppError::Internal("poisoned lock".into()))?
            .pop()
            .ok_or_else(|| AppError::Internal("no idle worker behind a free permit".into()))?;

        Ok(PooledConnection {
            worker: Some(worker),
            pool: self.inner.clone(),
            _permit: permit,
        })
    }

    /// Number of workers currently waiting in the pool.
    pub fn idle_count(&self) -> usize {
        self.inner.idle.lock().map(|g| g.len()).unwrap_or(0)
    }
}

/// A worker on loan from the pool.
#[derive(Debug)]
pub struct PooledConnection {
    worker: Option<WorkerHandle>,
    pool: Arc<PoolInner>,
    // Dropped after `drop` has put the worker back.
    _permit: OwnedSemaphorePermit,
}

impl Deref for PooledConnection {
    type Target = WorkerHandle;

    fn deref(&self) -> &WorkerHandle {
        // Only `drop` takes the worker out.
        self.worker.as_ref().expect("worker present until drop")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            match self.pool.idle.lock() {
                Ok(mut idle) => idle.push(worker),
                Err(_) => tracing::error!("poisoned pool lock; worker dropped"),
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkerHandle {
    tx: std::sync::mpsc::Sender<DbTask>,
}

impl WorkerHandle {
    fn spawn(db_path: PathBuf, busy_timeout_ms: u64) -> Self {
        let (tx, rx) = std::sync::mpsc::channel::<DbTask>();
        thread::spawn(move || db_worker_main(db_path, busy_timeout_ms, rx));
        Self { tx }
    }

    async fn call<T>(&self, task: impl FnOnce(oneshot::Sender<AppResult<T>>) -> DbTask) -> AppResult<T> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(task(tx))
            .map_err(|_| AppError::Internal("db worker unavailable".into()))?;
        rx.await
            .map_err(|_| AppError::Internal("db worker dropped response".into()))?
    }

    /// Runs SQL text to completion, no pagination.
    pub async fn execute(&self, sql: String) -> AppResult<QueryResult> {
        self.call(|respond_to| DbTask::Execute { sql, respond_to }).await
    }

    pub async fn query_page(&self, sql: String, page: PageRequest) -> AppResult<QueryResult> {
        self.call(|respond_to| DbTask::QueryPage { sql, page, respond_to })
            .await
    }

    pub async fn table_page(&self, table: String, page: PageRequest) -> AppResult<QueryResult> {
        self.call(|respond_to| DbTask::TablePage {
            table,
            page,
            respond_to,
        })
        .await
    }

    pub async fn check_solution(&self, sql: String, formula: String, page: PageRequest) -> AppResult<CheckResult> {
        self.call(|respond_to| DbTask::Check {
            sql,
            formula,
            page,
            respond_to,
        })
        .await
    }

    pub async fn tables(&self, include_system: bool) -> AppResult<Vec<String>> {
        self.call(|respond_to| DbTask::Tables {
            include_system,
            respond_to,
        })
        .await
    }
}

enum DbTask {
    Execute {
        sql: String,
        respond_to: oneshot::Sender<AppResult<QueryResult>>,
    },
    QueryPage {
        sql: String,
        page: PageRequest,
        respond_to: oneshot::Sender<AppResult<QueryResult>>,
    },
    TablePage {
        table: String,
        page: PageRequest,
        respond_to: oneshot::Sender<AppResult<QueryResult>>,
    },
    Check {
        sql: String,
        formula: String,
        page: PageRequest,
        respond_to: oneshot::Sender<AppResult<CheckResult>>,
    },
    Tables {
        include_system: bool,
        respond_to: oneshot::Sender<AppResult<Vec<String>>>,
    },
}

fn db_worker_main(db_path: PathBuf, busy_timeout_ms: u64, rx: std::sync::mpsc::Receiver<DbTask>) {
    let conn = match open_conn(&db_path, busy_timeout_ms) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error=%e, path=%db_path.display(), "failed to open db in worker; dropping tasks");
            while let Ok(task) = rx.recv() {
                respond_err(task, e.clone());
            }
            return;
        }
    };

    while let Ok(task) = rx.recv() {
        match task {
            DbTask::Execute { sql, respond_to } => {
                let _ = respond_to.send(query::run_query(&conn, &sql));
            }
            DbTask::QueryPage { sql, page, respond_to } => {
                let _ = respond_to.send(query::run_query_page(&conn, &sql, page));
            }
            DbTask::TablePage {
                table,
                page,
                respond_to,
            } => {
                let _ = respond_to.send(query::run_table_page(&conn, &table, page));
            }
            DbTask::Check {
                sql,
                formula,
                page,
                respond_to,
            } => {
                let _ = respond_to.send(check::check_solution(&conn, &sql, &formula, page));
            }
            DbTask::Tables {
                include_system,
                respond_to,
            } => {
                let _ = respond_to.send(schema::list_tables(&conn, include_system));
            }
        }
    }
}

fn respond_err(task: DbTask, err: AppError) {
    match task {
        DbTask::Execute { respond_to, .. }
        | DbTask::QueryPage { respond_to, .. }
        | DbTask::TablePage { respond_to, .. } => {
            let _ = respond_to.send(Err(err));
        }
        DbTask::Check { respond_to, .. } => {
            let _ = respond_to.send(Err(err));
        }
        DbTask::Tables { respond_to, .. } => {
            let _ = respond_to.send(Err(err));
        }
    }
}

fn open_conn(path: &Path, busy_timeout_ms: u64) -> AppResult<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE;
    let conn = Connection::open_with_flags(path, flags).map_err(|source| AppError::DbOpenFailed {
        path: path.to_path_buf(),
        source,
    })?;
    let _ = conn.busy_timeout(std::time::Duration::from_millis(busy_timeout_ms));
    Ok(conn)
}

fn canonicalize_lossy(path: &Path) -> AppResult<PathBuf> {
    // canonicalize requires the file to exist; SQLite creates it on open.
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let cwd = std::env::current_dir()?;
        Ok(cwd.join(path))
    }
}
