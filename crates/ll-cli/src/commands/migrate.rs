//! Migrate command for moving a legacy player folder.
//!
//! Runs against an unscoped store: activating the player first would create
//! the destination folder and block the move.

use std::io::Write;

use anyhow::{Context, Result};
use ll_store::{MigrationOutcome, RecordStore};

pub fn run<W: Write>(writer: &mut W, store: &RecordStore, legacy: &str, key: &str) -> Result<()> {
    let outcome = store
        .try_migrate_player_folder(legacy, key)
        .with_context(|| format!("failed to migrate {legacy} to {key}"))?;
    store.set_active_player(key);

    let message = match outcome {
        MigrationOutcome::AlreadyMigrated => format!("Nothing to migrate from {legacy}."),
        MigrationOutcome::LayoutOnly => format!("Checked layout of {key}."),
        MigrationOutcome::Moved => format!("Moved {legacy} to {key}."),
    };
    writeln!(writer, "{message}")?;
    Ok(())
}
