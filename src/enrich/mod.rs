pub mod matcher;

use std::collections::BTreeSet;

use itertools::Itertools;
use serde_json::Value;
use tracing::{debug, info};

/// Target of the per-record discovery log, kept at `info` by the CLI
/// whatever `RUST_LOG` says.
pub const DIAGNOSTIC_TARGET: &str = "jobmeta::diagnostic";

use crate::annotate::Annotator;
use crate::record::JobRecord;
use matcher::{context_window, find_cues, find_locations, WINDOW};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Metadata key this stage fills in.
pub const REMOTE_KEY: &str = "remote";

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The scraper already supplied `remote`; left untouched.
    Skipped,
    NoCue,
    CueWithoutLocation,
    /// `remote` was set to the contained value.
    Enriched(String),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EnrichStats {
    pub total: usize,
    pub skipped: usize,
    pub no_cue: usize,
    pub no_location: usize,
    pub enriched: usize,
}

impl EnrichStats {
    fn tally(&mut self, outcome: &Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Skipped => self.skipped += 1,
            Outcome::NoCue => self.no_cue += 1,
            Outcome::CueWithoutLocation => self.no_location += 1,
            Outcome::Enriched(_) => self.enriched += 1,
        }
    }
}

/// Fills the `remote` metadata key from locations mentioned near the word
/// "remote" in a job description.
pub struct RemoteEnricher {
    annotator: Box<dyn Annotator>,
}

impl RemoteEnricher {
    pub fn new(annotator: Box<dyn Annotator>) -> Self {
        RemoteEnricher { annotator }
    }

    /// Locations found within reach of any cue, trimmed and deduplicated.
    /// `None` when the description has no cue at all.
    pub fn discover(&self, description: &str) -> Option<BTreeSet<String>> {
        let units = self.annotator.annotate(description);
        let cues = find_cues(&units);
        if cues.is_empty() {
            return None;
        }

        // Overlapping windows are scanned separately; the set absorbs repeats.
        let locations = cues
            .into_iter()
            .flat_map(|m| find_locations(context_window(&units, m, WINDOW)))
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        Some(locations)
    }

    pub fn enrich(&self, job: &mut JobRecord) -> Outcome {
        if job.metadata.contains_key(REMOTE_KEY) {
            debug!(title = %job.title, "Scraper already set remote, skipping");
            return Outcome::Skipped;
        }

        let Some(locations) = self.discover(&job.descrip) else {
            return Outcome::NoCue;
        };
        if locations.is_empty() {
            return Outcome::CueWithoutLocation;
        }

        info!(target: DIAGNOSTIC_TARGET, title = %job.title, ?locations, "New remote location found");
        let value = normalize(&locations);
        job.metadata
            .insert(REMOTE_KEY.to_string(), Value::String(value.clone()));
        Outcome::Enriched(value)
    }

    pub fn enrich_batch(&self, jobs: &mut [JobRecord], parallel: bool) -> EnrichStats {
        let outcomes = if parallel {
            self.enrich_parallel(jobs)
        } else {
            jobs.iter_mut().map(|job| self.enrich(job)).collect()
        };

        let mut stats = EnrichStats::default();
        for outcome in &outcomes {
            stats.tally(outcome);
        }
        info!(
            total = stats.total,
            enriched = stats.enriched,
            skipped = stats.skipped,
            no_cue = stats.no_cue,
            no_location = stats.no_location,
            "Enrichment finished"
        );
        stats
    }

    #[cfg(feature = "rayon")]
    fn enrich_parallel(&self, jobs: &mut [JobRecord]) -> Vec<Outcome> {
        jobs.par_iter_mut().map(|job| self.enrich(job)).collect()
    }

    #[cfg(not(feature = "rayon"))]
    fn enrich_parallel(&self, jobs: &mut [JobRecord]) -> Vec<Outcome> {
        jobs.iter_mut().map(|job| self.enrich(job)).collect()
    }
}

/// Sorted, space-joined rendering of a location set.
pub fn normalize(locations: &BTreeSet<String>) -> String {
    locations.iter().join(" ").trim().to_string()
}
