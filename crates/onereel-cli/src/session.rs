//! Interactive gallery session over stdin.

use anyhow::{anyhow, bail, Context};
use std::fmt::Write as _;
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinSet;

use onereel_core::constants::GALLERY_SLOTS;
use onereel_core::{MediaItem, MediaKind};
use onereel_processing::MediaValidator;
use onereel_services::{
    filter_gallery, GallerySnapshot, MediaPipeline, PickOutcome, PipelineError, SearchQuery,
};

use crate::alert::report;
use crate::source::FileMediaSource;
use crate::truncate_string;

const DESCRIPTION_WIDTH: usize = 72;

pub const HELP: &str = "\
Commands:
  pick <slot> <path>   describe a file into slot 0-5 (runs in the background)
  clear <slot>         empty a slot
  search [query]       list slots whose description matches (regex, case-insensitive)
  show                 list all slots
  help                 show this help
  quit                 leave, dropping picks still in flight";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Pick { slot: usize, path: String },
    Clear { slot: usize },
    Search { query: String },
    Show,
    Help,
    Quit,
}

fn parse_slot(raw: Option<&str>) -> anyhow::Result<usize> {
    let raw = raw.ok_or_else(|| anyhow!("missing slot number"))?;
    raw.parse()
        .with_context(|| format!("'{}' is not a slot number", raw))
}

impl FromStr for SessionCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_lowercase().as_str() {
            "pick" => {
                let (slot, path) = match rest.split_once(char::is_whitespace) {
                    Some((slot, path)) => (slot, path.trim()),
                    None => (rest, ""),
                };
                let slot = parse_slot(Some(slot).filter(|s| !s.is_empty()))?;
                if path.is_empty() {
                    bail!("usage: pick <slot> <path>");
                }
                Ok(SessionCommand::Pick {
                    slot,
                    path: path.to_string(),
                })
            }
            "clear" => Ok(SessionCommand::Clear {
                slot: parse_slot(rest.split_whitespace().next())?,
            }),
            "search" | "/" => Ok(SessionCommand::Search {
                query: rest.to_string(),
            }),
            "show" | "ls" => Ok(SessionCommand::Show),
            "help" | "?" => Ok(SessionCommand::Help),
            "quit" | "exit" => Ok(SessionCommand::Quit),
            other => bail!("unknown command '{}'; type 'help'", other),
        }
    }
}

fn describe_entry(out: &mut String, index: usize, item: &MediaItem) {
    let name = item
        .source_ref()
        .path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| item.source_ref().to_string());
    let _ = writeln!(
        out,
        "[{}] {} {}  {}",
        index,
        item.kind(),
        name,
        truncate_string(item.description(), DESCRIPTION_WIDTH)
    );
}

/// All six slots, empty ones included.
pub fn render_gallery(snapshot: &GallerySnapshot) -> String {
    let mut out = String::new();
    for index in 0..GALLERY_SLOTS {
        match snapshot.get(index) {
            Some(item) => describe_entry(&mut out, index, item),
            None => {
                let _ = writeln!(out, "[{}] (empty)", index);
            }
        }
    }
    out
}

/// Search results, or the empty-state line when nothing matched.
pub fn render_matches(hits: &[(usize, Arc<MediaItem>)]) -> String {
    if hits.is_empty() {
        return "No matching results.\n".to_string();
    }
    let mut out = String::new();
    for (index, item) in hits {
        describe_entry(&mut out, *index, item);
    }
    out
}

/// Print what happened to one pick.
pub fn announce(slot: usize, result: Result<PickOutcome, PipelineError>) {
    match result {
        Ok(PickOutcome::Stored(item)) => {
            let mut out = String::new();
            describe_entry(&mut out, slot, &item);
            print!("{}", out);
        }
        Ok(PickOutcome::Cancelled) => println!("[{}] pick cancelled", slot),
        Ok(PickOutcome::Superseded) => {
            println!("[{}] replaced by a newer pick before finishing", slot)
        }
        Err(err) => report(&err, Some(slot)),
    }
}

/// Start a pick in the background so several can overlap.
fn spawn_pick(
    picks: &mut JoinSet<()>,
    pipeline: &MediaPipeline,
    validator: &MediaValidator,
    slot: usize,
    path: String,
) {
    let source = match FileMediaSource::new(path, validator, None::<MediaKind>) {
        Ok(source) => source,
        Err(err) => {
            report(&PipelineError::from(err), Some(slot));
            return;
        }
    };

    println!("[{}] describing {} ...", slot, source.path().display());
    let pipeline = pipeline.clone();
    picks.spawn(async move {
        let result = pipeline.pick_into_slot(slot, &source).await;
        announce(slot, result);
    });
}

/// Run one pick per `(slot, source)` concurrently; results come back in slot
/// order.
pub async fn fill_slots(
    pipeline: &MediaPipeline,
    sources: Vec<(usize, FileMediaSource)>,
) -> Vec<(usize, Result<PickOutcome, PipelineError>)> {
    let mut picks = JoinSet::new();
    for (slot, source) in sources {
        let pipeline = pipeline.clone();
        picks.spawn(async move { (slot, pipeline.pick_into_slot(slot, &source).await) });
    }

    let mut results = Vec::with_capacity(picks.len());
    while let Some(joined) = picks.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(err) => tracing::error!(error = %err, "Pick task failed to complete"),
        }
    }
    results.sort_by_key(|(slot, _)| *slot);
    results
}

/// Read commands from `input` until `quit` or end of input.
///
/// At end of input, picks still running are awaited; `quit` drops them.
pub async fn run_session<R>(pipeline: &MediaPipeline, input: R) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let validator = pipeline.ingestor().validator().clone();
    let mut lines = input.lines();
    let mut picks = JoinSet::new();

    println!("{}", HELP);
    loop {
        // Reap finished picks so the set doesn't grow without bound.
        while picks.try_join_next().is_some() {}

        let Some(line) = lines.next_line().await.context("Failed to read command")? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<SessionCommand>() {
            Ok(command) => command,
            Err(err) => {
                eprintln!("{:#}", err);
                continue;
            }
        };
        tracing::debug!(?command, "Session command");

        match command {
            SessionCommand::Pick { slot, path } => {
                spawn_pick(&mut picks, pipeline, &validator, slot, path)
            }
            SessionCommand::Clear { slot } => match pipeline.gallery().clear(slot).await {
                Ok(()) => println!("[{}] cleared", slot),
                Err(err) => report(&PipelineError::from(err), Some(slot)),
            },
            SessionCommand::Search { query } => {
                let snapshot = pipeline.gallery().snapshot().await;
                let hits = filter_gallery(&snapshot, &SearchQuery::new(&query));
                print!("{}", render_matches(&hits));
            }
            SessionCommand::Show => {
                print!("{}", render_gallery(&pipeline.gallery().snapshot().await));
            }
            SessionCommand::Help => println!("{}", HELP),
            SessionCommand::Quit => {
                if !picks.is_empty() {
                    tracing::info!(in_flight = picks.len(), "Dropping unfinished picks");
                }
                picks.shutdown().await;
                return Ok(());
            }
        }
    }

    while picks.join_next().await.is_some() {}
    print!("{}", render_gallery(&pipeline.gallery().snapshot().await));
    Ok(())
}
