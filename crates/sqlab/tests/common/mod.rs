#![allow(dead_code)]

use std::path::PathBuf;

use clap::Parser;
use rusqlite::{params, Connection};
use tempfile::TempDir;

use sqlab::cli::Args;
use sqlab::core::connection::ConnectionPool;

/// Temporary adventure database: 25 villagers, one metadata table, one table with a hash
/// column.
pub fn adventure_db(temp_dir: &TempDir) -> PathBuf {
    let path = temp_dir.path().join("sqlab_island.db");
    let conn = Connection::open(&path).expect("create db");
    conn.execute_batch(
        r#"
        CREATE TABLE villager (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            job TEXT
        );
        CREATE TABLE sqlab_info (name TEXT, value TEXT);
        INSERT INTO sqlab_info VALUES ('title', 'The Island');
        CREATE TABLE secret (id INTEGER, answer TEXT, answer_hash TEXT);
        INSERT INTO secret VALUES (1, 'forty-two', 'a1b2');
        "#,
    )
    .expect("create schema");

    for i in 1..=25 {
        let job: Option<&str> = if i % 5 == 0 { None } else { Some("fisher") };
        conn.execute(
            "INSERT INTO villager(id, name, job) VALUES (?1, ?2, ?3)",
            params![i, format!("villager-{i}"), job],
        )
        .expect("insert villager");
    }
    path
}

pub fn args_for(db: &PathBuf, extra: &[&str]) -> Args {
    let mut argv = vec!["sqlab", "--db", db.to_str().expect("utf-8 temp path")];
    argv.extend_from_slice(extra);
    Args::parse_from(argv)
}

pub fn pool_for(db: &PathBuf, size: usize) -> ConnectionPool {
    ConnectionPool::open(db, size, 2_000).expect("open pool")
}
