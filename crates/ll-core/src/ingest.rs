//! Turning incoming drop notifications into storable records.
//!
//! The event source reports drops and kill-count announcements separately.
//! [`Ingestor`] remembers the latest kill count per boss so a later drop can be
//! stamped with it, fills in item names, and appends pets.

use std::collections::HashMap;

use chrono::{DateTime, Local, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::{ActivityRegistry, boss_name_for_kill_count};
use crate::clue;
use crate::types::{ItemEntry, ItemId, Record, RewardType, UNKNOWN_KILL_COUNT, ValidationError};
use crate::uniques::{UniqueCatalog, pet_for_boss};

/// One line of ingest input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IngestEvent {
    Drop(DropEvent),
    /// A chat announcement such as "Your Zulrah kill count is: 12".
    KillCount { name: String, count: i32 },
}

/// A drop as reported by the event source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropEvent {
    pub activity: String,
    #[serde(default)]
    pub combat_level: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kill_count: Option<i32>,
    #[serde(default)]
    pub reward_type: RewardType,
    #[serde(default)]
    pub items: Vec<DropItem>,
    /// The drop included the activity's pet.
    #[serde(default)]
    pub pet: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropItem {
    pub id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub price: i64,
}

/// Source of item display names.
pub trait ItemNames {
    fn item_name(&self, id: ItemId) -> Option<String>;
}

/// Names known to the unique catalogue and the clue tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinItemNames;

impl ItemNames for BuiltinItemNames {
    fn item_name(&self, id: ItemId) -> Option<String> {
        UniqueCatalog::builtin()
            .item_name(id)
            .or_else(|| clue::clue_item_name(id))
            .map(str::to_string)
    }
}

impl ItemNames for HashMap<ItemId, String> {
    fn item_name(&self, id: ItemId) -> Option<String> {
        self.get(&id).cloned()
    }
}

/// Latest announced kill count per boss, keyed by lower-cased boss name.
#[derive(Debug, Clone, Default)]
pub struct KillCounts {
    counts: HashMap<String, i32>,
}

impl KillCounts {
    /// Records an announcement, applying the kill-count spelling overrides.
    pub fn record(&mut self, announced: &str, count: i32) {
        let boss = boss_name_for_kill_count(announced.trim());
        tracing::debug!(boss, count, "kill count updated");
        self.counts.insert(boss.to_lowercase(), count);
    }

    /// Count for a drop, trying the drop's own name and then every alias.
    ///
    /// Returns `-1` when nothing positive is known.
    pub fn lookup(&self, registry: &ActivityRegistry, activity: &str) -> i32 {
        std::iter::once(activity.to_string())
            .chain(registry.spellings(activity))
            .filter_map(|name| self.counts.get(&name.to_lowercase()).copied())
            .find(|&count| count > 0)
            .unwrap_or(UNKNOWN_KILL_COUNT)
    }
}

pub struct Ingestor<'a, N = BuiltinItemNames> {
    registry: &'a ActivityRegistry,
    names: N,
    kill_counts: KillCounts,
}

impl<'a> Ingestor<'a> {
    pub fn new(registry: &'a ActivityRegistry) -> Self {
        Self::with_names(registry, BuiltinItemNames)
    }
}

impl<'a, N: ItemNames> Ingestor<'a, N> {
    pub fn with_names(registry: &'a ActivityRegistry, names: N) -> Self {
        Self {
            registry,
            names,
            kill_counts: KillCounts::default(),
        }
    }

    pub const fn kill_counts(&self) -> &KillCounts {
        &self.kill_counts
    }

    /// Feeds one ingest line. Drops yield a record; announcements yield `None`.
    pub fn handle(
        &mut self,
        event: IngestEvent,
        now: DateTime<Utc>,
    ) -> Result<Option<Record>, ValidationError> {
        match event {
            IngestEvent::Drop(drop) => self.to_record(drop, now).map(Some),
            IngestEvent::KillCount { name, count } => {
                self.kill_counts.record(&name, count);
                Ok(None)
            }
        }
    }

    /// Builds the record for a drop.
    ///
    /// Unknown reward types are taken from the resolved identity. Timestamps
    /// are stored as local wall-clock time with whole seconds; `now` is used
    /// when the event carries none.
    pub fn to_record(&self, drop: DropEvent, now: DateTime<Utc>) -> Result<Record, ValidationError> {
        let identity = self.registry.resolve(&drop.activity);

        let reward_type = match (drop.reward_type, identity) {
            (RewardType::Unknown, Some(identity)) => identity.reward_type,
            (reward_type, _) => reward_type,
        };
        let kill_count = drop
            .kill_count
            .unwrap_or_else(|| self.kill_counts.lookup(self.registry, &drop.activity));

        let mut items: Vec<ItemEntry> = drop
            .items
            .into_iter()
            .map(|item| {
                let name = item
                    .name
                    .or_else(|| self.names.item_name(item.id))
                    .unwrap_or_else(|| format!("Unknown item {}", item.id));
                ItemEntry::new(name, item.id, item.quantity, item.price)
            })
            .collect();

        if drop.pet {
            let pet = pet_for_boss(&drop.activity)
                .or_else(|| identity.and_then(|identity| pet_for_boss(&identity.name)));
            match pet {
                Some(pet) => items.push(ItemEntry::new(pet.name, pet.item_id, 1, 0)),
                None => tracing::warn!(activity = %drop.activity, "pet drop for activity without a known pet"),
            }
        }

        let timestamp = drop
            .timestamp
            .unwrap_or(now)
            .with_timezone(&Local)
            .naive_local()
            .trunc_subsecs(0);

        Record::new(
            drop.activity,
            drop.combat_level,
            kill_count,
            reward_type,
            items,
            timestamp,
        )
    }
}
