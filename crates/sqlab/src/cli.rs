use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "sqlab", about = "SQLab console backend: query rewriting and paginated browsing")]
pub struct Args {
    /// SQLite database file to serve.
    #[arg(long)]
    pub db: PathBuf,

    /// Logging level (stderr). Also supports RUST_LOG.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Upper bound on any page size, whatever the client asks for.
    #[arg(long, default_value_t = 1000)]
    pub max_rows: usize,

    /// Page size used when a request omits `limit`.
    #[arg(long, default_value_t = 10)]
    pub page_size: usize,

    /// Number of pooled database connections.
    #[arg(long, default_value_t = 5)]
    pub connection_limit: usize,

    /// SQLite busy timeout per connection.
    #[arg(long, default_value_t = 2_000)]
    pub busy_timeout_ms: u64,

    /// Print one page of a table and exit instead of serving the bridge.
    #[arg(long, conflicts_with = "browse_query")]
    pub browse: Option<String>,

    /// Print one page of a query result and exit.
    #[arg(long)]
    pub browse_query: Option<String>,

    /// Page to show in browse mode (1-based).
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}
