//! Ingest command for drop events read from stdin.
//!
//! Each input line is one [`IngestEvent`]: a drop or a kill-count
//! announcement. Drops are stored and collected into the session view, whose
//! summary is printed once input ends.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use chrono::Utc;
use ll_core::{ActivityRegistry, IngestEvent, Ingestor, LogGroup, summarize};
use ll_store::RecordStore;

use crate::Config;
use crate::commands::util::write_summary;

/// Counts reported after an ingest run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    pub stored: usize,
    /// Valid drops that could not be written.
    pub unsaved: usize,
    pub rejected: usize,
}

pub fn run<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    store: &RecordStore,
    registry: &ActivityRegistry,
    config: &Config,
) -> Result<IngestStats> {
    let mut ingestor = Ingestor::new(registry);
    let mut session = LogGroup::session();
    let mut stats = IngestStats::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line.context("failed to read ingest input")?;
        if line.trim().is_empty() {
            continue;
        }

        let event: IngestEvent = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(line = index + 1, error = %e, "skipping malformed event");
                stats.rejected += 1;
                continue;
            }
        };

        let record = match ingestor.handle(event, Utc::now()) {
            Ok(Some(record)) => record,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(line = index + 1, error = %e, "skipping invalid drop");
                stats.rejected += 1;
                continue;
            }
        };

        if store.append(&record) {
            stats.stored += 1;
        } else {
            stats.unsaved += 1;
        }
        session.apply(record);
    }

    session.recompute_uniques(config.include_minions);
    write_summary(writer, &summarize(&session, config.summary_options()))?;
    writeln!(
        writer,
        "Stored {} records ({} unsaved, {} rejected).",
        stats.stored, stats.unsaved, stats.rejected
    )?;

    tracing::info!(?stats, "ingest finished");
    Ok(stats)
}
