use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Open key/value metadata as delivered by the scrapers.
pub type Metadata = Map<String, Value>;

/// A job as it arrives from a scraper, before validation.
///
/// `title` and `descrip` are required; everything else may be missing or
/// `null` depending on which scraper produced the record. The scraper's
/// `file` field and any other extra keys are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawJob {
    pub title: String,
    pub descrip: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

/// A validated job record, and the shape written back out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRecord {
    pub title: String,
    pub descrip: String,
    pub url: Option<String>,
    pub tags: Vec<String>,
    pub metadata: Metadata,
}

impl From<RawJob> for JobRecord {
    fn from(raw: RawJob) -> Self {
        JobRecord {
            title: raw.title,
            descrip: raw.descrip,
            url: raw.url,
            tags: raw.tags.unwrap_or_default(),
            metadata: raw.metadata.unwrap_or_default(),
        }
    }
}

impl JobRecord {
    pub fn new(title: &str, descrip: &str) -> Self {
        JobRecord {
            title: title.to_string(),
            descrip: descrip.to_string(),
            url: None,
            tags: Vec::new(),
            metadata: Metadata::new(),
        }
    }
}

#[cfg(test)]
impl JobRecord {
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Parse a JSON array of jobs. One malformed record rejects the whole batch.
pub fn read_batch<R: Read>(reader: R) -> Result<Vec<JobRecord>> {
    let raw: Vec<RawJob> = serde_json::from_reader(reader).map_err(Error::InvalidInput)?;
    Ok(raw.into_iter().map(JobRecord::from).collect())
}

pub fn write_batch<W: Write>(mut writer: W, jobs: &[JobRecord]) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, jobs).map_err(Error::Output)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
