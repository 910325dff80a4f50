//! Configuration loading and management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use ll_core::{ItemSort, Pacing, SummaryOptions, UniquesPlacement};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root of all player folders.
    pub data_dir: PathBuf,
    /// Account key of the active player.
    pub player: Option<String>,
    /// Game profile; non-standard profiles get their own folder.
    pub profile: Option<String>,
    pub include_minions: bool,
    /// Playback frame rate ceiling.
    pub updates_per_second: u32,
    /// Minimum playback pause after a record with a unique, in milliseconds.
    pub unique_pause_ms: u64,
    pub item_sort: ItemSort,
    pub uniques_placement: UniquesPlacement,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: dirs_data_path().unwrap_or_else(|| PathBuf::from(".")),
            player: None,
            profile: None,
            include_minions: true,
            updates_per_second: 4,
            unique_pause_ms: 1000,
            item_sort: ItemSort::Value,
            uniques_placement: UniquesPlacement::Both,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // LOOTLOG_DATA_DIR, LOOTLOG_PLAYER, ...
        figment = figment.merge(Env::prefixed("LOOTLOG_"));

        figment.extract()
    }

    pub fn summary_options(&self) -> SummaryOptions {
        SummaryOptions {
            include_minions: self.include_minions,
            sort: self.item_sort,
            placement: self.uniques_placement,
        }
    }

    pub fn pacing(&self) -> Pacing {
        Pacing::from_rate(
            self.updates_per_second,
            Duration::from_millis(self.unique_pause_ms),
        )
    }
}

/// Returns the platform-specific config directory for lootlog.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("lootlog"))
}

/// Returns the platform-specific data directory for lootlog.
///
/// On Linux: `~/.local/share/lootlog`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("lootlog"))
}
