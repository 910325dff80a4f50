//! One-time reorganisations of player folders.
//!
//! Two migrations exist: moving a legacy player folder (keyed by display name)
//! to a stable key, and splitting a flat folder of `<name>.log` files into the
//! reward type subfolders.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::PoisonError;

use ll_core::{Record, RewardType};

use crate::{
    RecordStore, StoreError, append_records, decode_log, has_log_extension, validate_component,
};

/// What a player folder migration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The legacy folder no longer exists.
    AlreadyMigrated,
    /// Legacy and new keys name the same folder; only its layout was checked.
    LayoutOnly,
    /// The folder was renamed to the new key.
    Moved,
}

impl RecordStore {
    /// Renames the `legacy` player folder to `key`, then migrates its layout.
    ///
    /// Idempotent: once the legacy folder is gone this is a no-op. Refuses to
    /// merge into an existing destination and leaves both folders untouched.
    pub fn try_migrate_player_folder(
        &self,
        legacy: &str,
        key: &str,
    ) -> Result<MigrationOutcome, StoreError> {
        let (legacy, key) = (legacy.trim(), key.trim());
        validate_component(legacy)?;
        validate_component(key)?;

        let source = self.root().join(legacy);
        let destination = self.root().join(key);

        if legacy.eq_ignore_ascii_case(key) {
            if destination.is_dir() {
                self.split_flat_logs(&destination)?;
            }
            return Ok(MigrationOutcome::LayoutOnly);
        }
        if !source.is_dir() {
            return Ok(MigrationOutcome::AlreadyMigrated);
        }
        if destination.exists() {
            return Err(StoreError::DestinationExists(destination));
        }

        fs::rename(&source, &destination).map_err(|e| StoreError::io(&source, e))?;
        tracing::info!(from = %source.display(), to = %destination.display(), "moved player folder");
        self.split_flat_logs(&destination)?;
        Ok(MigrationOutcome::Moved)
    }

    /// Logging wrapper around [`Self::try_migrate_player_folder`].
    pub fn migrate_player_folder(&self, legacy: &str, key: &str) -> bool {
        match self.try_migrate_player_folder(legacy, key) {
            Ok(outcome) => {
                tracing::debug!(?outcome, legacy, key, "player folder migration");
                true
            }
            Err(e) => {
                tracing::warn!(legacy, key, error = %e, "player folder migration failed");
                false
            }
        }
    }

    /// Moves flat `<name>.log` files of a player folder into type subfolders.
    pub fn migrate_layout(&self, key: &str) -> bool {
        if let Err(e) = validate_component(key.trim()) {
            tracing::warn!(error = %e, "cannot migrate layout");
            return false;
        }
        match self.split_flat_logs(&self.root().join(key.trim())) {
            Ok(moved) => {
                if moved > 0 {
                    tracing::info!(player = key, files = moved, "migrated flat logs");
                }
                true
            }
            Err(e) => {
                tracing::warn!(player = key, error = %e, "layout migration failed");
                false
            }
        }
    }

    /// Splits flat logs by reward type. Returns how many flat files were handled.
    ///
    /// A file whose records share one type is moved as-is when its destination
    /// is free; otherwise its records are appended per type and the flat file
    /// removed. A file with any undecodable line is left where it is.
    fn split_flat_logs(&self, folder: &Path) -> Result<usize, StoreError> {
        let entries = match fs::read_dir(folder) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(StoreError::io(folder, e)),
        };

        let flat: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && has_log_extension(path))
            .collect();

        let mut handled = 0;
        for path in &flat {
            let Some(file_name) = path.file_name() else {
                continue;
            };

            let decoded = decode_log(path);
            if decoded.skipped > 0 {
                tracing::warn!(
                    file = %path.display(),
                    skipped = decoded.skipped,
                    "leaving flat log with undecodable lines in place"
                );
                continue;
            }

            let mut by_type: BTreeMap<RewardType, Vec<Record>> = BTreeMap::new();
            for record in decoded.records {
                by_type.entry(record.reward_type).or_default().push(record);
            }

            if by_type.len() == 1 {
                if let Some(&reward_type) = by_type.keys().next() {
                    let dir = folder.join(reward_type.folder_name());
                    let target = dir.join(file_name);
                    let lock = self.file_lock(&target);
                    let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
                    if !target.exists() {
                        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
                        fs::rename(path, &target).map_err(|e| StoreError::io(path, e))?;
                        handled += 1;
                        continue;
                    }
                }
            }

            for (reward_type, records) in &by_type {
                let target = folder.join(reward_type.folder_name()).join(file_name);
                let lock = self.file_lock(&target);
                let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
                append_records(&target, records)?;
            }
            fs::remove_file(path).map_err(|e| StoreError::io(path, e))?;
            handled += 1;
        }

        Ok(handled)
    }
}
