use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::db;
use crate::error::{Error, Result};
use crate::record::{JobRecord, RawJob};

/// Tag appended to every freshly loaded job when requested.
pub const NEW_TAG: &str = "new";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub truncated: usize,
    pub inserted: usize,
    pub unreadable: usize,
}

/// All `*.json` files directly inside `dir`, sorted by path.
pub fn files_in_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}

/// A JSON array of file paths, as produced by the scraper step.
pub fn files_from_reader<R: Read>(reader: R) -> Result<Vec<PathBuf>> {
    serde_json::from_reader(reader).map_err(Error::InvalidInput)
}

pub fn read_record_file(path: &Path) -> Result<JobRecord> {
    let raw = fs::read_to_string(path)?;
    let job: RawJob = serde_json::from_str(&raw).map_err(|source| Error::InvalidRecordFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(job.into())
}

/// Replace the `jobs` table contents with one row per record file.
///
/// Files that cannot be opened are logged and skipped; a file that opens but
/// is not a job record aborts the load. Rows already committed stay.
pub fn load_files(conn: &Connection, files: &[PathBuf], tag_new: bool) -> Result<LoadStats> {
    let mut stats = LoadStats {
        truncated: db::truncate_jobs(conn)?,
        ..LoadStats::default()
    };
    info!(rows = stats.truncated, "Truncated jobs");

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    for path in files {
        pb.inc(1);
        let mut job = match read_record_file(path) {
            Ok(job) => job,
            Err(Error::Io(e)) => {
                warn!(path = %path.display(), error = %e, "JSON file error");
                stats.unreadable += 1;
                continue;
            }
            Err(e) => {
                pb.abandon();
                return Err(e);
            }
        };
        if tag_new {
            job.tags.push(NEW_TAG.to_string());
        }
        db::insert_job(conn, &job)?;
        stats.inserted += 1;
        info!(title = %job.title, "Inserted");
    }

    pb.finish_and_clear();
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    fn memory() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn dir_listing_is_sorted_json_only() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.json", "{}");
        write(dir.path(), "a.json", "{}");
        write(dir.path(), "notes.txt", "");
        let files = files_in_dir(dir.path()).unwrap();
        let names: Vec<_> = files.iter().map(|p| p.file_name().unwrap().to_str().unwrap()).collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[test]
    fn file_list_from_stdin() {
        let files = files_from_reader(r#"["output/a.json", "output/b.json"]"#.as_bytes()).unwrap();
        assert_eq!(files, vec![PathBuf::from("output/a.json"), PathBuf::from("output/b.json")]);
    }

    #[test]
    fn load_replaces_rows_and_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(
            dir.path(),
            "a.json",
            r#"{"title": "Rust Dev", "descrip": "Remote in EU", "url": "https://a", "tags": ["rust"]}"#,
        );
        let b = write(dir.path(), "b.json", r#"{"title": "Go Dev", "descrip": "Onsite", "url": "https://b"}"#);
        let missing = dir.path().join("gone.json");

        let conn = memory();
        db::insert_job(&conn, &JobRecord::new("stale", "old")).unwrap();

        let stats = load_files(&conn, &[a, missing, b], true).unwrap();
        assert_eq!(
            stats,
            LoadStats {
                truncated: 1,
                inserted: 2,
                unreadable: 1,
            }
        );

        let rows = db::fetch_jobs(&conn).unwrap();
        let titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Rust Dev", "Go Dev"]);
        assert_eq!(rows[0].tags, vec!["rust", "new"]);
        assert_eq!(rows[1].tags, vec!["new"]);
    }

    #[test]
    fn malformed_record_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(dir.path(), "a.json", r#"{"title": "A", "descrip": "a"}"#);
        let bad = write(dir.path(), "b.json", r#"{"title": "B"}"#);

        let conn = memory();
        let err = load_files(&conn, &[good, bad], false).unwrap_err();
        assert!(matches!(err, Error::InvalidRecordFile { .. }));
        assert_eq!(db::count_jobs(&conn).unwrap(), 1);
    }
}
