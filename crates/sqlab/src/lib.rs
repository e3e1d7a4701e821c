//! SQLab console backend.
//!
//! Serves a SQL learning console: paginated table and query browsing over SQLite, and
//! the formula-column rewrite used to check exercise answers.

pub mod adapters;
pub mod cli;
pub mod core;
pub mod error;
pub mod logging;
pub mod pager;
pub mod rewrite;
