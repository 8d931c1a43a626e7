use std::fs;
use std::path::Path;

use rusqlite::types::Type;
use rusqlite::{params, Connection};

use crate::error::Result;
use crate::record::JobRecord;

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS jobs (
            id          INTEGER PRIMARY KEY,
            title       TEXT NOT NULL,
            descrip     TEXT NOT NULL,
            url         TEXT,
            tags        TEXT NOT NULL DEFAULT '[]',
            inserted_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_jobs_url ON jobs(url);
        ",
    )?;
    Ok(())
}

/// SQLite has no TRUNCATE; an unqualified DELETE takes the same fast path.
pub fn truncate_jobs(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("DELETE FROM jobs", [])?)
}

/// Insert one job in its own transaction. Tags are stored as a JSON array.
pub fn insert_job(conn: &Connection, job: &JobRecord) -> Result<i64> {
    let tags = serde_json::to_string(&job.tags).unwrap_or_else(|_| "[]".to_string());
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO jobs (title, descrip, url, tags) VALUES (?1, ?2, ?3, ?4)",
        params![job.title, job.descrip, job.url, tags],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;
    Ok(id)
}

pub fn count_jobs(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM jobs", [], |row| row.get(0))?)
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobRow {
    pub id: i64,
    pub title: String,
    pub url: Option<String>,
    pub tags: Vec<String>,
}

pub fn fetch_jobs(conn: &Connection) -> Result<Vec<JobRow>> {
    let mut stmt = conn.prepare("SELECT id, title, url, tags FROM jobs ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| {
            let tags: String = row.get(3)?;
            let tags = serde_json::from_str(&tags)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;
            Ok(JobRow {
                id: row.get(0)?,
                title: row.get(1)?,
                url: row.get(2)?,
                tags,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}
