//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ll_core::{ItemId, RewardType};

/// Loot record store and aggregation.
///
/// Persists drop records per player and activity, and summarizes them into
/// consolidated totals and unique-item progress.
#[derive(Debug, Parser)]
#[command(name = "lootlog", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the active player and how many logs exist.
    Status,

    /// List activities that have stored records.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Browse known activities by category.
    Activities {
        /// Only list identities in this category.
        #[arg(long)]
        category: Option<String>,
    },

    /// Show consolidated totals and unique progress for an activity.
    Show {
        /// Activity name or alias.
        name: String,

        /// Reward type folder (npc, player, event, pickpocket, unknown).
        #[arg(long = "type")]
        reward_type: Option<RewardType>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Read drop events as JSON Lines from stdin and store them.
    Ingest,

    /// Add an item that was awarded after the kill it belongs to.
    Reclaim {
        /// Activity name, exactly as stored.
        name: String,

        #[arg(long)]
        item_id: ItemId,

        /// Item name; looked up when omitted.
        #[arg(long)]
        item_name: Option<String>,

        #[arg(long, default_value_t = 1)]
        quantity: i64,

        #[arg(long, default_value_t = 0)]
        price: i64,

        /// Combat level for a newly created record.
        #[arg(long, default_value_t = 0)]
        level: i32,

        #[arg(long = "type")]
        reward_type: Option<RewardType>,
    },

    /// Delete stored records for an activity and all its aliases.
    Clear {
        name: String,

        /// Only clear this reward type; defaults to every type.
        #[arg(long = "type")]
        reward_type: Option<RewardType>,
    },

    /// Move a legacy player folder to the configured player key.
    Migrate {
        /// Folder name the player's logs were stored under before.
        legacy: String,
    },

    /// Replay an activity's records at the configured pace.
    Playback {
        name: String,

        #[arg(long = "type")]
        reward_type: Option<RewardType>,
    },
}
