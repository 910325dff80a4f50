//! Storage layer for the loot logger.
//!
//! Persists drop records as JSON Lines, one file per activity.
//!
//! # Layout
//!
//! ```text
//! <root>/
//!   <player>/
//!     npc/zulrah.log
//!     event/tempoross.log
//!     ...
//! ```
//!
//! One folder per player key, one subfolder per reward type (lower-case), one
//! file per activity named after the trimmed, lower-cased activity name. Each
//! line is one encoded [`Record`]; blank lines are tolerated.
//!
//! # Failure semantics
//!
//! Nothing here panics or returns an error past the [`RecordStore`] surface.
//! Appends, rewrites and deletes report success as a `bool`; reads return an
//! empty or partial sequence. Every failure is logged with `tracing::warn!`.
//! Lines that do not decode are skipped so one bad line never hides the rest
//! of a log.
//!
//! # Concurrency
//!
//! Writes to a given file are serialized by an in-process mutex per path and
//! an exclusive `fs2` lock on the file itself. Read-modify-write operations
//! such as reclaiming an item hold the path lock across the read and the
//! rewrite. Different files proceed independently.

mod activity;
mod migrate;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use fs2::FileExt;
use ll_core::{Record, RewardType};
use thiserror::Error;

pub use migrate::MigrationOutcome;

/// Extension of activity log files.
pub const LOG_EXTENSION: &str = "log";

/// Profile name that does not get a suffix in the player key.
const STANDARD_PROFILE: &str = "standard";

/// Store errors. Only visible through the `try_` migration entry point; the
/// rest of the surface logs these and reports failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no active player folder")]
    NoActivePlayer,
    #[error("invalid name for a log or player folder: {0:?}")]
    InvalidName(String),
    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode record for {activity}")]
    Encode {
        activity: String,
        #[source]
        source: serde_json::Error,
    },
    /// Migration would overwrite an existing player folder.
    #[error("destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Clone)]
struct ActivePlayer {
    key: String,
    folder: PathBuf,
}

/// Per-player record storage rooted at a data directory.
#[derive(Debug)]
pub struct RecordStore {
    root: PathBuf,
    active: RwLock<Option<ActivePlayer>>,
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

/// Builds the folder key for a player.
///
/// Standard profiles use the account key alone; others get a `-<Profile>` suffix.
pub fn player_key(account: &str, profile: Option<&str>) -> String {
    match profile.map(str::trim) {
        Some(profile) if !profile.is_empty() && !profile.eq_ignore_ascii_case(STANDARD_PROFILE) => {
            format!("{account}-{profile}")
        }
        _ => account.to_string(),
    }
}

/// File name for an activity log: trimmed, lower-cased, with the log extension.
pub fn log_file_name(activity: &str) -> Result<String, StoreError> {
    let name = activity.trim().to_lowercase();
    validate_component(&name)?;
    Ok(format!("{name}.{LOG_EXTENSION}"))
}

fn validate_component(name: &str) -> Result<(), StoreError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

impl RecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            active: RwLock::new(None),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn active_player(&self) -> Option<String> {
        self.read_active().map(|p| p.key)
    }

    pub fn player_folder(&self) -> Option<PathBuf> {
        self.read_active().map(|p| p.folder)
    }

    fn read_active(&self) -> Option<ActivePlayer> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Scopes the store to a player's folder, creating it and its reward type
    /// subfolders when missing.
    ///
    /// Returns whether the active player changed. Keys are compared
    /// case-insensitively.
    pub fn set_active_player(&self, key: &str) -> bool {
        let key = key.trim();
        if let Err(e) = validate_component(key) {
            tracing::warn!(error = %e, "refusing to switch player");
            return false;
        }

        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        if active
            .as_ref()
            .is_some_and(|current| current.key.eq_ignore_ascii_case(key))
        {
            return false;
        }

        let folder = self.root.join(key);
        for reward_type in RewardType::ALL {
            let dir = folder.join(reward_type.folder_name());
            if let Err(e) = fs::create_dir_all(&dir) {
                tracing::warn!(dir = %dir.display(), error = %e, "failed to create log folder");
            }
        }

        tracing::debug!(player = key, folder = %folder.display(), "active player changed");
        *active = Some(ActivePlayer {
            key: key.to_string(),
            folder,
        });
        true
    }

    /// Path of an activity's log for the active player.
    pub fn log_path(&self, reward_type: RewardType, activity: &str) -> Result<PathBuf, StoreError> {
        let folder = self.player_folder().ok_or(StoreError::NoActivePlayer)?;
        Ok(folder
            .join(reward_type.folder_name())
            .join(log_file_name(activity)?))
    }

    fn file_lock(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(path.to_path_buf()).or_default())
    }

    /// Appends one record to its activity's log.
    ///
    /// A failed append leaves earlier lines untouched; the record is then
    /// observed but not persisted.
    pub fn append(&self, record: &Record) -> bool {
        match self.try_append(record) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(activity = %record.activity, error = %e, "failed to append record");
                false
            }
        }
    }

    fn try_append(&self, record: &Record) -> Result<(), StoreError> {
        let path = self.log_path(record.reward_type, &record.activity)?;
        let lock = self.file_lock(&path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        append_records(&path, std::slice::from_ref(record))
    }

    /// Every record in an activity's log, in file order.
    ///
    /// A missing file is an empty log.
    pub fn load_all(&self, reward_type: RewardType, activity: &str) -> Vec<Record> {
        let path = match self.log_path(reward_type, activity) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(activity, error = %e, "cannot locate log");
                return Vec::new();
            }
        };
        let lock = self.file_lock(&path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        read_records(&path)
    }

    /// Replaces an activity's log with `records`, in order.
    pub fn rewrite(&self, reward_type: RewardType, activity: &str, records: &[Record]) -> bool {
        match self.try_rewrite(reward_type, activity, records) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(activity, error = %e, "failed to rewrite log");
                false
            }
        }
    }

    fn try_rewrite(
        &self,
        reward_type: RewardType,
        activity: &str,
        records: &[Record],
    ) -> Result<(), StoreError> {
        let path = self.log_path(reward_type, activity)?;
        let lock = self.file_lock(&path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        write_records(&path, records)
    }

    /// Activities with a log, per reward type, by file name without extension.
    pub fn list_known_activities(&self) -> BTreeMap<RewardType, BTreeSet<String>> {
        let mut known = BTreeMap::new();
        let Some(folder) = self.player_folder() else {
            return known;
        };

        for reward_type in RewardType::ALL {
            let dir = folder.join(reward_type.folder_name());
            let names = log_names_in(&dir);
            if !names.is_empty() {
                known.insert(reward_type, names);
            }
        }
        known
    }

    /// Deletes an activity's log. Returns `false` if it did not exist or could
    /// not be removed.
    pub fn delete(&self, reward_type: RewardType, activity: &str) -> bool {
        let path = match self.log_path(reward_type, activity) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(activity, error = %e, "cannot locate log");
                return false;
            }
        };
        let lock = self.file_lock(&path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(file = %path.display(), "deleted log");
                true
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "failed to delete log");
                false
            }
        }
    }
}

/// Stems of the `.log` files directly inside `dir`. A missing folder is empty.
fn log_names_in(dir: &Path) -> BTreeSet<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return BTreeSet::new(),
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "failed to list logs");
            return BTreeSet::new();
        }
    };

    entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_log_extension(path))
        .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
        .collect()
}

fn has_log_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == LOG_EXTENSION)
}

fn encode_lines(records: &[Record]) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    for record in records {
        serde_json::to_writer(&mut buf, record).map_err(|source| StoreError::Encode {
            activity: record.activity.clone(),
            source,
        })?;
        buf.push(b'\n');
    }
    Ok(buf)
}

/// Appends encoded records with a single write under an exclusive file lock.
fn append_records(path: &Path, records: &[Record]) -> Result<(), StoreError> {
    let buf = encode_lines(records)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StoreError::io(path, e))?;
    file.lock_exclusive().map_err(|e| StoreError::io(path, e))?;
    file.write_all(&buf).map_err(|e| StoreError::io(path, e))
}

/// Replaces a file's contents under an exclusive file lock.
///
/// Callers hold the path's in-process lock.
fn write_records(path: &Path, records: &[Record]) -> Result<(), StoreError> {
    let buf = encode_lines(records)?;
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
        .map_err(|e| StoreError::io(path, e))?;
    file.lock_exclusive().map_err(|e| StoreError::io(path, e))?;
    file.set_len(0).map_err(|e| StoreError::io(path, e))?;
    file.write_all(&buf).map_err(|e| StoreError::io(path, e))?;
    file.sync_data().map_err(|e| StoreError::io(path, e))
}

/// Result of decoding one log file.
#[derive(Debug, Default)]
struct DecodedLog {
    records: Vec<Record>,
    /// Non-blank lines that did not decode.
    skipped: usize,
}

fn read_records(path: &Path) -> Vec<Record> {
    decode_log(path).records
}

/// Decodes a log file line by line.
///
/// Lines are split on raw bytes, so a line that is not valid UTF-8 is skipped
/// like any other undecodable line. Only a read error ends the log early.
fn decode_log(path: &Path) -> DecodedLog {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return DecodedLog::default(),
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "failed to open log");
            return DecodedLog::default();
        }
    };

    let mut decoded = DecodedLog::default();
    for (index, line) in BufReader::new(file).split(b'\n').enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(file = %path.display(), line = index + 1, error = %e, "failed to read log");
                break;
            }
        };
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        match serde_json::from_slice::<Record>(&line) {
            Ok(record) => decoded.records.push(record),
            Err(e) => {
                decoded.skipped += 1;
                tracing::warn!(file = %path.display(), line = index + 1, error = %e, "skipping undecodable record");
            }
        }
    }
    decoded
}
