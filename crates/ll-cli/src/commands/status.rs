//! Status command for showing the active player and stored logs.

use std::io::Write;

use anyhow::Result;
use ll_store::RecordStore;

pub fn run<W: Write>(writer: &mut W, store: &RecordStore) -> Result<()> {
    let known = store.list_known_activities();

    writeln!(writer, "Loot logger status")?;
    writeln!(
        writer,
        "Player: {}",
        store.active_player().unwrap_or_default()
    )?;
    writeln!(writer, "Data: {}", store.root().display())?;

    if known.is_empty() {
        writeln!(writer, "No logs recorded.")?;
        return Ok(());
    }

    writeln!(writer, "Logs:")?;
    for (reward_type, names) in &known {
        writeln!(writer, "- {}: {}", reward_type.folder_name(), names.len())?;
    }
    Ok(())
}
