//! CLI subcommand implementations.

pub mod activities;
pub mod clear;
pub mod ingest;
pub mod list;
pub mod migrate;
pub mod playback;
pub mod reclaim;
pub mod show;
pub mod status;
pub mod util;
