//! Shared utilities for CLI commands.

use std::io::Write;

use anyhow::{Context, Result};
use ll_core::{ActivityRegistry, LogSummary, RewardType};
use ll_store::{RecordStore, player_key};

use crate::Config;

/// Opens the store scoped to the configured player.
pub fn open_store(config: &Config) -> Result<RecordStore> {
    let Some(account) = config.player.as_deref() else {
        anyhow::bail!("no player configured; set `player` in config.toml or LOOTLOG_PLAYER");
    };
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("failed to create {}", config.data_dir.display()))?;

    let store = RecordStore::new(&config.data_dir);
    let key = player_key(account, config.profile.as_deref());
    if !store.set_active_player(&key) {
        anyhow::bail!("invalid player key: {key:?}");
    }
    Ok(store)
}

/// The reward type to use for `name`: the explicit one, else the resolved
/// identity's, else NPC.
pub fn reward_type_for(
    registry: &ActivityRegistry,
    name: &str,
    explicit: Option<RewardType>,
) -> RewardType {
    explicit
        .or_else(|| registry.resolve(name).map(|identity| identity.reward_type))
        .unwrap_or(RewardType::Npc)
}

/// Human-readable summary.
pub fn write_summary<W: Write>(writer: &mut W, summary: &LogSummary) -> Result<()> {
    writeln!(writer, "{} ({})", summary.name, summary.reward_type)?;
    writeln!(writer, "Kills: {}", summary.kills)?;
    writeln!(writer, "Total value: {} gp", summary.total_value)?;

    if summary.items.is_empty() {
        writeln!(writer, "No items.")?;
    } else {
        writeln!(writer, "Items:")?;
        for item in &summary.items {
            writeln!(
                writer,
                "  {} x{} @ {} = {}",
                item.name,
                item.quantity,
                item.price,
                item.total()
            )?;
        }
    }

    if !summary.uniques.is_empty() {
        writeln!(writer, "Uniques:")?;
        for unique in &summary.uniques {
            let mark = if unique.collected > 0 { "x" } else { " " };
            writeln!(
                writer,
                "  [{mark}] {} ({})",
                unique.name, unique.collected
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_type_prefers_explicit_then_identity() {
        let registry = ActivityRegistry::builtin();
        assert_eq!(
            reward_type_for(registry, "Tempoross", Some(RewardType::Npc)),
            RewardType::Npc
        );
        assert_eq!(reward_type_for(registry, "tempoross", None), RewardType::Event);
        assert_eq!(reward_type_for(registry, "Goblin", None), RewardType::Npc);
    }

    #[test]
    fn test_open_store_requires_player() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: temp.path().to_path_buf(),
            ..Config::default()
        };
        assert!(open_store(&config).is_err());

        let config = Config {
            player: Some("12345".to_string()),
            profile: Some("Beta".to_string()),
            ..config
        };
        let store = open_store(&config).unwrap();
        assert_eq!(store.active_player().as_deref(), Some("12345-Beta"));
    }
}
