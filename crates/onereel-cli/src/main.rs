//! OneReel CLI: describe media with Gemini and search a six-slot gallery.
//!
//! Set GEMINI_API_KEY (and optionally the other variables read by
//! `onereel_core::Config::from_env`). Logs go to stderr; control with RUST_LOG.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use onereel_cli::session::{fill_slots, run_session};
use onereel_cli::{render_matches, report, FileMediaSource};
use onereel_core::constants::GALLERY_SLOTS;
use onereel_core::{Config, MediaKind, MediaRef};
use onereel_infra::{init_telemetry, shutdown_telemetry};
use onereel_services::{filter_gallery, MediaPipeline, PipelineError, SearchQuery};

#[derive(Parser)]
#[command(name = "onereel", about = "Describe photos and videos, then search them")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Describe a single image or video and print the description
    Describe {
        /// Path to the media file
        path: PathBuf,
        /// Override kind detection: image or video
        #[arg(long)]
        kind: Option<MediaKind>,
    },
    /// Fill slots 0..N with the given files, then print the ones matching QUERY
    Search {
        /// Case-insensitive pattern; empty matches everything
        query: String,
        /// Up to six media files, one per slot
        #[arg(required = true, num_args = 1..=GALLERY_SLOTS)]
        paths: Vec<PathBuf>,
    },
    /// Interactive gallery session reading commands from stdin
    Session,
}

/// Report `err` to the user and hand it back for the exit status.
fn alert(err: PipelineError) -> anyhow::Error {
    report(&err, None);
    err.into()
}

async fn describe(
    pipeline: &MediaPipeline,
    path: PathBuf,
    kind: Option<MediaKind>,
) -> anyhow::Result<()> {
    let source = FileMediaSource::new(path, pipeline.ingestor().validator(), kind)
        .map_err(|err| alert(err.into()))?;

    let item = pipeline
        .describe_media(MediaRef::new(source.path()), source.kind())
        .await
        .map_err(alert)?;

    println!("{}", item.description());
    Ok(())
}

async fn search(pipeline: &MediaPipeline, query: String, paths: Vec<PathBuf>) -> anyhow::Result<()> {
    let validator = pipeline.ingestor().validator();
    let mut sources = Vec::with_capacity(paths.len());
    for (slot, path) in paths.into_iter().enumerate() {
        match FileMediaSource::new(path, validator, None) {
            Ok(source) => sources.push((slot, source)),
            Err(err) => report(&PipelineError::from(err), Some(slot)),
        }
    }

    for (slot, result) in fill_slots(pipeline, sources).await {
        if let Err(err) = result {
            report(&err, Some(slot));
        }
    }

    let snapshot = pipeline.gallery().snapshot().await;
    let hits = filter_gallery(&snapshot, &SearchQuery::new(&query));
    print!("{}", render_matches(&hits));
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_telemetry("onereel=info,warn")
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(description = ?config.description, "Configuration loaded");

    let pipeline = MediaPipeline::from_config(&config)
        .map_err(alert)
        .context("Failed to initialize media pipeline")?;

    let result = match cli.command {
        Commands::Describe { path, kind } => describe(&pipeline, path, kind).await,
        Commands::Search { query, paths } => search(&pipeline, query, paths).await,
        Commands::Session => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            run_session(&pipeline, stdin).await
        }
    };

    shutdown_telemetry().await;
    result
}
