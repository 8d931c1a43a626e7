use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

const DEFAULT_DB_PATH: &str = "data/jobs.sqlite";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// SQLite database holding the `jobs` table.
    pub db_path: PathBuf,
    /// Extra gazetteer entries for the annotator.
    pub lexicon_path: Option<PathBuf>,
    /// Enrich records on the rayon pool.
    pub parallel: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            lexicon_path: None,
            parallel: false,
        }
    }
}

impl Settings {
    /// `jobmeta.toml` (optional) overlaid by `JOBMETA_*` environment variables.
    pub fn load() -> Result<Self> {
        Self::from_sources("jobmeta", "JOBMETA")
    }

    fn from_sources(file_stem: &str, env_prefix: &str) -> Result<Self> {
        let defaults = Settings::default();
        Config::builder()
            .set_default("db_path", defaults.db_path.to_string_lossy().to_string())?
            .set_default("parallel", defaults.parallel)?
            .add_source(File::with_name(file_stem).required(false))
            .add_source(Environment::with_prefix(env_prefix).try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize())
            .context("Failed to load settings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_sources() {
        let s = Settings::from_sources("does-not-exist", "JOBMETA_TEST_UNSET").unwrap();
        assert_eq!(s.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert!(s.lexicon_path.is_none());
        assert!(!s.parallel);
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let stem = dir.path().join("settings");
        std::fs::write(
            dir.path().join("settings.toml"),
            "db_path = \"/tmp/other.sqlite\"\nlexicon_path = \"lex.json\"\nparallel = true\n",
        )
        .unwrap();
        let s = Settings::from_sources(stem.to_str().unwrap(), "JOBMETA_TEST_UNSET").unwrap();
        assert_eq!(s.db_path, PathBuf::from("/tmp/other.sqlite"));
        assert_eq!(s.lexicon_path, Some(PathBuf::from("lex.json")));
        assert!(s.parallel);
    }
}
