//! Presentation-ready snapshot of a [`LogGroup`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::loot_log::{ItemSort, LogGroup};
use crate::types::{ItemEntry, RewardType};
use crate::uniques::UniqueItem;

/// Where unique items are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniquesPlacement {
    /// Only in the item breakdown.
    ItemBreakdown,
    /// Only in the uniques panel; unique ids are hidden from the breakdown.
    UniquesPanel,
    #[default]
    Both,
}

impl UniquesPlacement {
    pub const fn shows_panel(self) -> bool {
        matches!(self, Self::UniquesPanel | Self::Both)
    }

    pub const fn shows_in_breakdown(self) -> bool {
        matches!(self, Self::ItemBreakdown | Self::Both)
    }
}

impl fmt::Display for UniquesPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ItemBreakdown => "item_breakdown",
            Self::UniquesPanel => "uniques_panel",
            Self::Both => "both",
        };
        write!(f, "{s}")
    }
}

impl FromStr for UniquesPlacement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "item_breakdown" => Ok(Self::ItemBreakdown),
            "uniques_panel" => Ok(Self::UniquesPanel),
            "both" => Ok(Self::Both),
            _ => Err(format!("unknown uniques placement: {s}")),
        }
    }
}

/// Display options applied when summarizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    pub include_minions: bool,
    pub sort: ItemSort,
    pub placement: UniquesPlacement,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            include_minions: true,
            sort: ItemSort::default(),
            placement: UniquesPlacement::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogSummary {
    pub name: String,
    pub reward_type: RewardType,
    pub kills: usize,
    pub total_value: i64,
    pub items: Vec<ItemEntry>,
    /// Empty when the uniques panel is hidden.
    pub uniques: Vec<UniqueItem>,
}

/// Summarizes a group. Unique counts are taken as last recomputed.
pub fn summarize(group: &LogGroup, options: SummaryOptions) -> LogSummary {
    let mut items = group.merged_entries(options.include_minions, options.sort);
    if !options.placement.shows_in_breakdown() {
        items.retain(|item| !group.unique_ids().contains(&item.id));
    }

    let uniques = if options.placement.shows_panel() {
        group.uniques().to_vec()
    } else {
        Vec::new()
    };

    LogSummary {
        name: group.name().to_string(),
        reward_type: group.parent().reward_type(),
        kills: group.kills(options.include_minions),
        total_value: group.total_value(options.include_minions),
        items,
        uniques,
    }
}
