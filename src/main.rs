mod annotate;
mod db;
mod enrich;
mod error;
mod loader;
mod record;
mod settings;

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use itertools::Itertools;
use tracing::info;
use tracing_subscriber::EnvFilter;

use annotate::{Annotator, LexiconAnnotator};
use enrich::{Outcome, RemoteEnricher, DIAGNOSTIC_TARGET};
use settings::Settings;

#[derive(Parser)]
#[command(name = "jobmeta", about = "Enrich scraped job listings with metadata inferred from their descriptions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a JSON job batch, fill in missing `remote` metadata, write it back out
    Enrich {
        /// Read the batch from this file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Write the batch to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Enrich records in parallel
        #[arg(long)]
        parallel: bool,
    },
    /// Show how a text is annotated and which remote locations it yields
    Annotate {
        text: String,
    },
    /// Replace the jobs table with scraped record files
    Load {
        /// Folder of *.json record files (default: JSON array of paths on stdin)
        #[arg(long)]
        from: Option<PathBuf>,
        /// Append the "new" tag to every loaded job
        #[arg(long)]
        tag_new: bool,
    },
    /// Show database statistics
    Stats,
}

fn init_tracing() {
    // The discovery log stays on even when RUST_LOG quiets everything else.
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("{directives},{DIAGNOSTIC_TARGET}=info")))
        .with_writer(io::stderr)
        .try_init();
}

fn load_annotator(settings: &Settings) -> Result<LexiconAnnotator> {
    LexiconAnnotator::load(settings.lexicon_path.as_deref()).context("Annotator unavailable")
}

fn main() -> Result<()> {
    init_tracing();
    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?;
    info!(settings_loaded = ?settings, msg = "Starting jobmeta");

    match cli.command {
        Commands::Enrich {
            input,
            output,
            parallel,
        } => {
            let enricher = RemoteEnricher::new(Box::new(load_annotator(&settings)?));

            let mut jobs = match &input {
                Some(path) => {
                    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
                    record::read_batch(BufReader::new(file))?
                }
                None => record::read_batch(io::stdin().lock())?,
            };
            info!(records = jobs.len(), "Loaded job batch");

            enricher.enrich_batch(&mut jobs, parallel || settings.parallel);

            match &output {
                Some(path) => {
                    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
                    record::write_batch(BufWriter::new(file), &jobs)?;
                }
                None => record::write_batch(io::stdout().lock(), &jobs)?,
            }
        }
        Commands::Annotate { text } => {
            let annotator = load_annotator(&settings)?;
            for unit in annotator.annotate(&text) {
                let labels = if unit.categories.is_empty() {
                    "-".to_string()
                } else {
                    unit.categories.iter().join(",")
                };
                println!("{:>4}..{:<4} {:<20} {}", unit.start, unit.end, unit.text, labels);
            }

            let enricher = RemoteEnricher::new(Box::new(annotator));
            let mut job = record::JobRecord::new("annotate", &text);
            match enricher.enrich(&mut job) {
                Outcome::Enriched(remote) => println!("\nremote: {}", remote),
                Outcome::CueWithoutLocation => println!("\nRemote cue without location."),
                Outcome::NoCue | Outcome::Skipped => println!("\nNo remote cue."),
            }
        }
        Commands::Load { from, tag_new } => {
            let files = match &from {
                Some(dir) => loader::files_in_dir(dir).with_context(|| format!("Failed to list {:?}", dir))?,
                None => loader::files_from_reader(io::stdin().lock())?,
            };
            let conn = db::connect(&settings.db_path)
                .with_context(|| format!("Failed to open {:?}", settings.db_path))?;
            db::init_schema(&conn)?;

            println!("Loading {} record files into {:?}...", files.len(), settings.db_path);
            let stats = loader::load_files(&conn, &files, tag_new)?;
            println!(
                "Inserted {} jobs ({} replaced, {} unreadable files).",
                stats.inserted, stats.truncated, stats.unreadable
            );
        }
        Commands::Stats => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let rows = db::fetch_jobs(&conn)?;
            let tagged_new = rows.iter().filter(|r| r.tags.iter().any(|t| t == loader::NEW_TAG)).count();
            println!("Database:  {:?}", settings.db_path);
            println!("Jobs:      {}", db::count_jobs(&conn)?);
            println!("Tagged new: {}", tagged_new);
            for row in rows.iter().rev().take(5) {
                println!("  #{} {} {}", row.id, row.title, row.url.as_deref().unwrap_or("-"));
            }
        }
    }

    info!(elapsed_ms = t0.elapsed().as_millis() as u64, "Done");
    Ok(())
}
