//! Clue scroll and reward casket id normalization.
//!
//! The event source reports clue items under whichever of their many ids the
//! game used. Consolidation needs one id per tier and kind.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{ItemEntry, ItemId};

/// Pre-compiled regex for the tier token in `Clue scroll (hard)`.
static TIER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((\w*)\)").unwrap());

pub const CLUE_SCROLL_EASY: ItemId = 2677;
pub const CLUE_SCROLL_MEDIUM: ItemId = 2801;
pub const CLUE_SCROLL_HARD: ItemId = 2722;
pub const CLUE_SCROLL_ELITE: ItemId = 12073;
pub const CASKET_EASY: ItemId = 2714;
pub const CASKET_MEDIUM: ItemId = 2802;
pub const CASKET_HARD: ItemId = 2724;
pub const CASKET_ELITE: ItemId = 12074;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClueKind {
    Scroll,
    Casket,
}

impl ClueKind {
    fn from_name(lowercased: &str) -> Option<Self> {
        if lowercased.starts_with("clue scroll") {
            Some(Self::Scroll)
        } else if lowercased.starts_with("casket ") {
            Some(Self::Casket)
        } else {
            None
        }
    }
}

/// Canonical id for a clue item, or `None` if the name is not a clue item
/// with an ambiguous tier.
///
/// Beginner and master clues only ever have one id and are left alone.
pub fn canonical_clue_id(name: &str) -> Option<ItemId> {
    let kind = ClueKind::from_name(&name.to_lowercase())?;
    let tier = TIER_RE.captures(name)?.get(1)?.as_str().to_lowercase();

    let id = match (tier.as_str(), kind) {
        ("easy", ClueKind::Scroll) => CLUE_SCROLL_EASY,
        ("easy", ClueKind::Casket) => CASKET_EASY,
        ("medium", ClueKind::Scroll) => CLUE_SCROLL_MEDIUM,
        ("medium", ClueKind::Casket) => CASKET_MEDIUM,
        ("hard", ClueKind::Scroll) => CLUE_SCROLL_HARD,
        ("hard", ClueKind::Casket) => CASKET_HARD,
        ("elite", ClueKind::Scroll) => CLUE_SCROLL_ELITE,
        ("elite", ClueKind::Casket) => CASKET_ELITE,
        _ => return None,
    };
    Some(id)
}

/// Returns the entry keyed under its consolidation id.
pub fn normalize(entry: &ItemEntry) -> ItemEntry {
    let mut normalized = entry.clone();
    if let Some(id) = canonical_clue_id(&entry.name) {
        normalized.id = id;
    }
    normalized
}

/// Display name for the canonical clue ids.
pub fn clue_item_name(id: ItemId) -> Option<&'static str> {
    let name = match id {
        CLUE_SCROLL_EASY => "Clue scroll (easy)",
        CLUE_SCROLL_MEDIUM => "Clue scroll (medium)",
        CLUE_SCROLL_HARD => "Clue scroll (hard)",
        CLUE_SCROLL_ELITE => "Clue scroll (elite)",
        CASKET_EASY => "Casket (easy)",
        CASKET_MEDIUM => "Casket (medium)",
        CASKET_HARD => "Casket (hard)",
        CASKET_ELITE => "Casket (elite)",
        _ => return None,
    };
    Some(name)
}
