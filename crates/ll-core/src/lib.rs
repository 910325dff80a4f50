//! Core domain logic for the loot logger.
//!
//! This crate contains the fundamental types and logic for:
//! - Activities: resolving reported names and aliases to one identity
//! - Aggregation: consolidating drop records into per-item totals and unique progress
//! - Playback: replaying a stored log through the single-writer view queue

pub mod activity;
mod clue;
pub mod date;
pub mod ingest;
pub mod loot_log;
pub mod playback;
pub mod summary;
pub mod types;
pub mod uniques;
pub mod viewer;

pub use activity::{
    ActivityIdentity, ActivityRegistry, AliasConflict, RegistryError, boss_name_for_kill_count,
};
pub use clue::{canonical_clue_id, clue_item_name};
pub use ingest::{DropEvent, DropItem, IngestEvent, Ingestor, ItemNames, KillCounts};
pub use loot_log::{Applied, GroupMode, ItemSort, LogGroup, LootLog, SESSION_NAME};
pub use playback::{Pacing, PlaybackController, PlaybackOutcome, PlaybackState, Toggled};
pub use summary::{LogSummary, SummaryOptions, UniquesPlacement, summarize};
pub use types::{
    ItemEntry, ItemId, Record, RewardType, UNKNOWN_KILL_COUNT, UnknownRewardType, ValidationError,
};
pub use uniques::{Pet, UniqueCatalog, UniqueItem, pet_for_boss};
pub use viewer::{LogViewer, ViewJob, ViewSnapshot, ViewerHandle, spawn_viewer};
