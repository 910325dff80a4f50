//! Core record types with validation.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Game item identifier as reported by the event source.
pub type ItemId = i32;

/// Kill count stored when the count was never announced.
pub const UNKNOWN_KILL_COUNT: i32 = -1;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// An item quantity was zero or negative.
    #[error("quantity for item {item_id} must be positive, got {quantity}")]
    NonPositiveQuantity { item_id: ItemId, quantity: i64 },
}

/// How a drop was awarded.
///
/// Doubles as the name of the per-type subfolder a log lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum RewardType {
    /// Loot received when an NPC dies.
    Npc,
    /// Loot received from killing another player.
    Player,
    /// Scheduled events, chests and reward caskets.
    Event,
    /// Loot received from pickpocketing.
    Pickpocket,
    /// Placeholder used before the first record for an activity exists.
    #[default]
    Unknown,
}

impl RewardType {
    /// Every reward type, in folder creation order.
    pub const ALL: [Self; 5] = [
        Self::Npc,
        Self::Player,
        Self::Event,
        Self::Pickpocket,
        Self::Unknown,
    ];

    /// Upper-case name used inside serialized records.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Npc => "NPC",
            Self::Player => "PLAYER",
            Self::Event => "EVENT",
            Self::Pickpocket => "PICKPOCKET",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Lower-case name of the subfolder holding logs of this type.
    #[must_use]
    pub const fn folder_name(&self) -> &'static str {
        match self {
            Self::Npc => "npc",
            Self::Player => "player",
            Self::Event => "event",
            Self::Pickpocket => "pickpocket",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RewardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RewardType {
    type Err = UnknownRewardType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "npc" => Ok(Self::Npc),
            "player" => Ok(Self::Player),
            "event" => Ok(Self::Event),
            "pickpocket" => Ok(Self::Pickpocket),
            "unknown" => Ok(Self::Unknown),
            _ => Err(UnknownRewardType(s.to_string())),
        }
    }
}

impl Serialize for RewardType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RewardType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown reward type strings.
#[derive(Debug, Clone)]
pub struct UnknownRewardType(String);

impl fmt::Display for UnknownRewardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown reward type: {}", self.0)
    }
}

impl std::error::Error for UnknownRewardType {}

/// Older logs may carry `"type": null`, which is read as [`RewardType::Unknown`].
fn nullable_reward_type<'de, D>(deserializer: D) -> Result<RewardType, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RewardType>::deserialize(deserializer)?.unwrap_or_default())
}

const fn unknown_kill_count() -> i32 {
    UNKNOWN_KILL_COUNT
}

/// One stack of an item inside a drop.
///
/// Consolidated entries are mutated in place: quantity accumulates and the
/// price is replaced by the most recent observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemEntry {
    pub name: String,
    pub id: ItemId,
    pub quantity: i64,
    /// Unit price at the time the drop was observed.
    #[serde(default)]
    pub price: i64,
}

impl ItemEntry {
    pub fn new(name: impl Into<String>, id: ItemId, quantity: i64, price: i64) -> Self {
        Self {
            name: name.into(),
            id,
            quantity,
            price,
        }
    }

    /// Value of the whole stack.
    #[must_use]
    pub const fn total(&self) -> i64 {
        self.price.saturating_mul(self.quantity)
    }
}

/// One persisted drop event for an activity.
///
/// Field names on disk follow the historical log format, so existing files
/// keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Activity name exactly as reported by the event source.
    #[serde(rename = "name")]
    pub activity: String,

    #[serde(rename = "level", default)]
    pub combat_level: i32,

    /// `-1` when the kill count was not known.
    #[serde(rename = "killCount", default = "unknown_kill_count")]
    pub kill_count: i32,

    #[serde(rename = "type", default, deserialize_with = "nullable_reward_type")]
    pub reward_type: RewardType,

    #[serde(rename = "drops", default)]
    pub items: Vec<ItemEntry>,

    #[serde(rename = "date", default, with = "crate::date")]
    pub timestamp: Option<NaiveDateTime>,
}

impl Record {
    /// Creates a record after validating the activity name and item quantities.
    pub fn new(
        activity: impl Into<String>,
        combat_level: i32,
        kill_count: i32,
        reward_type: RewardType,
        items: Vec<ItemEntry>,
        timestamp: NaiveDateTime,
    ) -> Result<Self, ValidationError> {
        let activity = activity.into();
        if activity.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "activity name",
            });
        }
        if let Some(bad) = items.iter().find(|item| item.quantity <= 0) {
            return Err(ValidationError::NonPositiveQuantity {
                item_id: bad.id,
                quantity: bad.quantity,
            });
        }

        Ok(Self {
            activity,
            combat_level,
            kill_count,
            reward_type,
            items,
            timestamp: Some(timestamp),
        })
    }

    /// Appends an item to an already stored drop.
    ///
    /// Only the retroactive reclaim workflow uses this; everything else treats
    /// records as immutable.
    pub fn push_item(&mut self, item: ItemEntry) {
        self.items.push(item);
    }

    /// Whether any item in this drop matches one of `ids`.
    pub fn contains_any(&self, ids: &std::collections::HashSet<ItemId>) -> bool {
        self.items.iter().any(|item| ids.contains(&item.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn reward_type_roundtrip_all_variants() {
        for variant in RewardType::ALL {
            let parsed: RewardType = variant.to_string().parse().expect("should parse");
            assert_eq!(parsed, variant);
            let from_folder: RewardType = variant.folder_name().parse().expect("should parse");
            assert_eq!(from_folder, variant);
        }
    }

    #[test]
    fn unknown_reward_type_errors() {
        let err = "boss".parse::<RewardType>().unwrap_err();
        assert_eq!(err.to_string(), "unknown reward type: boss");
    }

    #[test]
    fn record_serializes_with_log_field_names() {
        let record = Record::new(
            "Zulrah",
            725,
            5,
            RewardType::Npc,
            vec![ItemEntry::new("Zulrah's scales", 12934, 100, 150)],
            at(15, 4, 5),
        )
        .unwrap();

        let json = serde_json::to_string(&record).unwrap();
        insta::assert_snapshot!(json, @r#"{"name":"Zulrah","level":725,"killCount":5,"type":"NPC","drops":[{"name":"Zulrah's scales","id":12934,"quantity":100,"price":150}],"date":"Jan 5, 2024, 3:04:05 PM"}"#);
    }

    #[test]
    fn record_roundtrip() {
        let record = Record::new(
            "Vorkath",
            732,
            UNKNOWN_KILL_COUNT,
            RewardType::Npc,
            vec![
                ItemEntry::new("Dragon bones", 536, 2, 2400),
                ItemEntry::new("Blue dragonhide", 1751, 2, 1800),
            ],
            at(0, 30, 0),
        )
        .unwrap();

        let json = serde_json::to_string(&record).unwrap();
        let parsed: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn record_defaults_missing_fields() {
        let json = r#"{"name":"Barrows","type":null,"drops":[],"date":null}"#;
        let parsed: Record = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.reward_type, RewardType::Unknown);
        assert_eq!(parsed.kill_count, UNKNOWN_KILL_COUNT);
        assert_eq!(parsed.combat_level, 0);
        assert!(parsed.timestamp.is_none());
    }

    #[test]
    fn record_rejects_empty_activity() {
        let result = Record::new("  ", 0, 1, RewardType::Npc, vec![], at(1, 0, 0));
        assert_eq!(
            result.unwrap_err(),
            ValidationError::Empty {
                field: "activity name"
            }
        );
    }

    #[test]
    fn record_rejects_zero_quantity() {
        let result = Record::new(
            "Zulrah",
            0,
            1,
            RewardType::Npc,
            vec![ItemEntry::new("Coins", 995, 0, 1)],
            at(1, 0, 0),
        );
        assert!(matches!(
            result,
            Err(ValidationError::NonPositiveQuantity { item_id: 995, .. })
        ));
    }

    #[test]
    fn item_total_is_price_times_quantity() {
        assert_eq!(ItemEntry::new("Coins", 995, 3, 1200).total(), 3600);
    }
}
