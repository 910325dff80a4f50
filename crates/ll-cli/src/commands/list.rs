//! List command for activities that have stored records.

use std::io::Write;

use anyhow::Result;
use ll_core::{ActivityRegistry, RewardType};
use ll_store::RecordStore;
use serde::Serialize;

/// One stored log, with its resolved identity when known.
#[derive(Debug, Serialize)]
pub struct ListedLog {
    pub reward_type: RewardType,
    /// File name without extension.
    pub file: String,
    pub name: String,
    pub category: Option<String>,
}

pub fn listed_logs(store: &RecordStore, registry: &ActivityRegistry) -> Vec<ListedLog> {
    store
        .list_known_activities()
        .into_iter()
        .flat_map(|(reward_type, files)| {
            files.into_iter().map(move |file| {
                let identity = registry.resolve(&file);
                ListedLog {
                    reward_type,
                    name: identity.map_or_else(|| file.clone(), |i| i.name.clone()),
                    category: identity.map(|i| i.category.clone()),
                    file,
                }
            })
        })
        .collect()
}

pub fn run<W: Write>(
    writer: &mut W,
    store: &RecordStore,
    registry: &ActivityRegistry,
    json: bool,
) -> Result<()> {
    let logs = listed_logs(store, registry);

    if json {
        serde_json::to_writer_pretty(&mut *writer, &logs)?;
        writeln!(writer)?;
        return Ok(());
    }

    if logs.is_empty() {
        writeln!(writer, "No logs recorded.")?;
        return Ok(());
    }

    let mut current = None;
    for log in &logs {
        if current != Some(log.reward_type) {
            writeln!(writer, "{}", log.reward_type)?;
            current = Some(log.reward_type);
        }
        match &log.category {
            Some(category) => writeln!(writer, "  {} ({category})", log.name)?,
            None => writeln!(writer, "  {}", log.name)?,
        }
    }
    Ok(())
}
