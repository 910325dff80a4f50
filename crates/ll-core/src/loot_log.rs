//! Aggregation of drop records into consolidated per-item totals.
//!
//! A [`LootLog`] consolidates the records of a single activity. A [`LogGroup`]
//! pairs a parent log with the logs of its minions (or, in session mode, with
//! one log per activity seen this run) and tracks unique-item progress.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::clue;
use crate::types::{ItemEntry, ItemId, Record, RewardType};
use crate::uniques::{UniqueCatalog, UniqueItem};

/// Name of the pseudo-activity that aggregates the current run.
pub const SESSION_NAME: &str = "Current Session Data";

/// Consolidated view of one activity's records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LootLog {
    name: String,
    reward_type: RewardType,
    records: Vec<Record>,
    consolidated: HashMap<ItemId, ItemEntry>,
}

impl LootLog {
    /// Builds a log from stored records.
    ///
    /// The reward type is taken from the first record, or
    /// [`RewardType::Unknown`] when there are none.
    pub fn new(name: impl Into<String>, records: Vec<Record>) -> Self {
        let reward_type = records
            .first()
            .map_or(RewardType::Unknown, |r| r.reward_type);
        let mut log = Self {
            name: name.into(),
            reward_type,
            records: Vec::with_capacity(records.len()),
            consolidated: HashMap::new(),
        };
        for record in records {
            log.add_record(record);
        }
        log
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn reward_type(&self) -> RewardType {
        self.reward_type
    }

    pub const fn set_reward_type(&mut self, reward_type: RewardType) {
        self.reward_type = reward_type;
    }

    /// Records in application order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn consolidated(&self) -> &HashMap<ItemId, ItemEntry> {
        &self.consolidated
    }

    pub fn entry(&self, id: ItemId) -> Option<&ItemEntry> {
        self.consolidated.get(&id)
    }

    pub fn quantity_of(&self, id: ItemId) -> i64 {
        self.entry(id).map_or(0, |e| e.quantity)
    }

    /// Keeps the record and folds its items into the totals.
    pub fn add_record(&mut self, record: Record) {
        self.consolidate(&record);
        self.records.push(record);
    }

    /// Folds a record's items into the consolidated totals.
    ///
    /// Each record must be applied exactly once. Prices follow the most
    /// recently applied record; quantities add up.
    pub fn consolidate(&mut self, record: &Record) {
        for item in &record.items {
            let item = clue::normalize(item);
            self.consolidated
                .entry(item.id)
                .and_modify(|existing| {
                    existing.price = item.price;
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                })
                .or_insert(item);
        }
    }

    /// Sum of `price * quantity` over every consolidated entry.
    pub fn value(&self) -> i64 {
        self.consolidated
            .values()
            .map(ItemEntry::total)
            .fold(0, i64::saturating_add)
    }

    pub fn sorted_entries(&self, sort: ItemSort) -> Vec<&ItemEntry> {
        let mut entries: Vec<&ItemEntry> = self.consolidated.values().collect();
        sort.sort(&mut entries);
        entries
    }
}

/// Ordering for the item breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemSort {
    /// Stack value, highest first.
    #[default]
    Value,
    /// Unit price, highest first.
    Price,
    /// Item id, lowest first.
    ItemId,
    Alphabetical,
}

impl ItemSort {
    /// Sorts entries; ties fall back to alphabetical order.
    pub fn sort(self, entries: &mut [&ItemEntry]) {
        entries.sort_by(|a, b| {
            let primary = match self {
                Self::Value => b.total().cmp(&a.total()),
                Self::Price => b.price.cmp(&a.price),
                Self::ItemId => a.id.cmp(&b.id),
                Self::Alphabetical => std::cmp::Ordering::Equal,
            };
            primary.then_with(|| a.name.cmp(&b.name))
        });
    }
}

impl fmt::Display for ItemSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Value => "value",
            Self::Price => "price",
            Self::ItemId => "item_id",
            Self::Alphabetical => "alphabetical",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ItemSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "value" => Ok(Self::Value),
            "price" => Ok(Self::Price),
            "item_id" | "id" => Ok(Self::ItemId),
            "alphabetical" | "name" => Ok(Self::Alphabetical),
            _ => Err(format!("unknown item sort: {s}")),
        }
    }
}

/// Whether a group follows one activity or the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupMode {
    Activity,
    /// Every activity seen this run becomes a lazily created sub-log.
    Session,
}

/// Where a record ended up when applied to a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Parent,
    Minion,
    /// The record belongs to neither the parent nor a known minion.
    Ignored,
}

/// A parent log plus its minion logs, keyed by lower-cased minion name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogGroup {
    mode: GroupMode,
    parent: LootLog,
    parent_spellings: HashSet<String>,
    minions: BTreeMap<String, LootLog>,
    uniques: Vec<UniqueItem>,
    unique_ids: HashSet<ItemId>,
}

impl LogGroup {
    /// Group for a named activity, with uniques from the builtin catalogue.
    pub fn activity(parent: LootLog) -> Self {
        let uniques = UniqueCatalog::builtin().for_activity(parent.name());
        let mut group = Self {
            mode: GroupMode::Activity,
            parent_spellings: HashSet::from([parent.name().to_lowercase()]),
            parent,
            minions: BTreeMap::new(),
            uniques: Vec::new(),
            unique_ids: HashSet::new(),
        };
        group.set_uniques(uniques);
        group
    }

    /// Empty session group.
    pub fn session() -> Self {
        Self {
            mode: GroupMode::Session,
            ..Self::activity(LootLog::empty(SESSION_NAME))
        }
    }

    /// Replaces the tracked uniques, sorted by display position.
    #[must_use]
    pub fn with_uniques(mut self, uniques: Vec<UniqueItem>) -> Self {
        self.set_uniques(uniques);
        self
    }

    /// Other spellings whose records land in the parent log.
    #[must_use]
    pub fn with_spellings<S: AsRef<str>>(mut self, spellings: &[S]) -> Self {
        self.parent_spellings
            .extend(spellings.iter().map(|s| s.as_ref().to_lowercase()));
        self
    }

    /// Attaches a minion log, replacing any log of the same name.
    #[must_use]
    pub fn with_minion(mut self, log: LootLog) -> Self {
        self.minions.insert(log.name().to_lowercase(), log);
        self
    }

    fn set_uniques(&mut self, mut uniques: Vec<UniqueItem>) {
        uniques.sort_by_key(|u| u.position);
        self.unique_ids = uniques.iter().flat_map(|u| u.ids()).collect();
        self.uniques = uniques;
    }

    pub const fn mode(&self) -> GroupMode {
        self.mode
    }

    pub fn name(&self) -> &str {
        self.parent.name()
    }

    pub const fn parent(&self) -> &LootLog {
        &self.parent
    }

    pub const fn parent_mut(&mut self) -> &mut LootLog {
        &mut self.parent
    }

    pub fn minion(&self, name: &str) -> Option<&LootLog> {
        self.minions.get(&name.to_lowercase())
    }

    pub fn minions(&self) -> impl Iterator<Item = &LootLog> {
        self.minions.values()
    }

    /// Logs counted for totals: the parent, plus minions when requested.
    pub fn logs(&self, include_minions: bool) -> impl Iterator<Item = &LootLog> {
        std::iter::once(&self.parent).chain(
            self.minions
                .values()
                .filter(move |_| include_minions),
        )
    }

    /// Routes a record to the parent or a minion log.
    ///
    /// In session mode, records for an unseen activity open a new sub-log.
    pub fn apply(&mut self, record: Record) -> Applied {
        let key = record.activity.to_lowercase();
        if self.parent_spellings.contains(&key) {
            self.parent.add_record(record);
            return Applied::Parent;
        }
        if let Some(minion) = self.minions.get_mut(&key) {
            minion.add_record(record);
            return Applied::Minion;
        }
        match self.mode {
            GroupMode::Session => {
                self.minions
                    .insert(key, LootLog::new(record.activity.clone(), vec![record]));
                Applied::Minion
            }
            GroupMode::Activity => Applied::Ignored,
        }
    }

    /// Removes one session sub-log. Returns whether it existed.
    pub fn remove_minion(&mut self, name: &str) -> bool {
        self.minions.remove(&name.to_lowercase()).is_some()
    }

    /// Recounts every unique from the consolidated totals.
    pub fn recompute_uniques(&mut self, include_minions: bool) {
        let logs: Vec<&LootLog> =
            std::iter::once(&self.parent)
                .chain(self.minions.values().filter(|_| include_minions))
                .collect();

        for unique in &mut self.uniques {
            unique.collected = unique
                .ids()
                .map(|id| {
                    logs.iter()
                        .map(|log| log.quantity_of(id))
                        .fold(0, i64::saturating_add)
                })
                .fold(0, i64::saturating_add);
        }
    }

    /// Uniques sorted by display position, with their last computed counts.
    pub fn uniques(&self) -> &[UniqueItem] {
        &self.uniques
    }

    /// Uniques grouped by shared display slot.
    pub fn unique_slots(&self) -> BTreeMap<u32, Vec<&UniqueItem>> {
        let mut slots: BTreeMap<u32, Vec<&UniqueItem>> = BTreeMap::new();
        for unique in &self.uniques {
            slots.entry(unique.position).or_default().push(unique);
        }
        slots
    }

    /// Every id that counts towards some unique of this activity.
    pub const fn unique_ids(&self) -> &HashSet<ItemId> {
        &self.unique_ids
    }

    pub fn total_value(&self, include_minions: bool) -> i64 {
        self.logs(include_minions)
            .map(LootLog::value)
            .fold(0, i64::saturating_add)
    }

    /// Number of records (kills) across the counted logs.
    pub fn kills(&self, include_minions: bool) -> usize {
        self.logs(include_minions).map(|log| log.records().len()).sum()
    }

    /// Per-item totals merged across the counted logs.
    pub fn merged_entries(&self, include_minions: bool, sort: ItemSort) -> Vec<ItemEntry> {
        let mut merged: HashMap<ItemId, ItemEntry> = HashMap::new();
        for log in self.logs(include_minions) {
            for entry in log.consolidated().values() {
                merged
                    .entry(entry.id)
                    .and_modify(|existing| {
                        existing.quantity = existing.quantity.saturating_add(entry.quantity);
                    })
                    .or_insert_with(|| entry.clone());
            }
        }
        let mut entries: Vec<&ItemEntry> = merged.values().collect();
        sort.sort(&mut entries);
        entries.into_iter().cloned().collect()
    }

    /// Empty copy used as the starting point of a replay.
    ///
    /// Keeps the name, reward type, spellings and uniques; drops all records
    /// and minion logs.
    #[must_use]
    pub fn fresh(&self) -> Self {
        let mut parent = LootLog::empty(self.parent.name());
        parent.set_reward_type(self.parent.reward_type());
        let mut uniques = self.uniques.clone();
        for unique in &mut uniques {
            unique.collected = 0;
        }
        Self {
            mode: self.mode,
            parent,
            parent_spellings: self.parent_spellings.clone(),
            minions: BTreeMap::new(),
            uniques,
            unique_ids: self.unique_ids.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{NaiveDate, NaiveDateTime};

    use crate::clue::{CASKET_HARD, CLUE_SCROLL_HARD};

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, minute, 0)
            .unwrap()
    }

    fn record(activity: &str, kc: i32, items: Vec<ItemEntry>) -> Record {
        Record::new(activity, 0, kc, RewardType::Npc, items, at(0)).unwrap()
    }

    const X: ItemId = 12934;

    #[test]
    fn quantities_do_not_depend_on_record_order() {
        let records = vec![
            record("Zulrah", 1, vec![ItemEntry::new("Scales", X, 10, 150)]),
            record(
                "Zulrah",
                2,
                vec![
                    ItemEntry::new("Scales", X, 25, 160),
                    ItemEntry::new("Tanzanite fang", 12922, 1, 1000),
                ],
            ),
            record("Zulrah", 3, vec![ItemEntry::new("Clue scroll (hard)", 2729, 1, 0)]),
            record("Zulrah", 4, vec![ItemEntry::new("Clue scroll (hard)", 3520, 2, 0)]),
        ];
        let quantities = |order: &[usize]| {
            let mut log = LootLog::empty("Zulrah");
            for &i in order {
                log.add_record(records[i].clone());
            }
            let mut totals: Vec<(ItemId, i64)> =
                log.consolidated().values().map(|e| (e.id, e.quantity)).collect();
            totals.sort_unstable();
            totals
        };

        let expected = quantities(&[0, 1, 2, 3]);
        for order in [[3, 2, 1, 0], [1, 3, 0, 2], [2, 0, 3, 1]] {
            assert_eq!(quantities(&order), expected);
        }
        assert!(expected.contains(&(X, 35)));
        assert!(expected.contains(&(CLUE_SCROLL_HARD, 3)));
    }

    #[test]
    fn totals_saturate_instead_of_overflowing() {
        let mut group = LogGroup::activity(LootLog::new(
            "Zulrah",
            vec![
                record("Zulrah", 1, vec![ItemEntry::new("Scales", X, i64::MAX, 2)]),
                record("Zulrah", 2, vec![ItemEntry::new("Scales", X, i64::MAX, 2)]),
            ],
        ))
        .with_minion(LootLog::new(
            "Fumus",
            vec![record("Fumus", -1, vec![ItemEntry::new("Scales", X, 5, 1)])],
        ));
        group.recompute_uniques(true);

        assert_eq!(group.parent().quantity_of(X), i64::MAX);
        assert_eq!(group.total_value(true), i64::MAX);
        assert_eq!(group.merged_entries(true, ItemSort::Value)[0].quantity, i64::MAX);
    }

    #[test]
    fn consolidates_quantity_and_latest_price() {
        let log = LootLog::new(
            "Zulrah",
            vec![
                record("Zulrah", 5, vec![ItemEntry::new("Scales", X, 1, 1000)]),
                record("Zulrah", 6, vec![ItemEntry::new("Scales", X, 2, 1200)]),
            ],
        );

        let entry = log.entry(X).unwrap();
        assert_eq!(entry.quantity, 3);
        assert_eq!(entry.price, 1200);
        assert_eq!(log.value(), 3600);
        assert_eq!(log.reward_type(), RewardType::Npc);
    }

    #[test]
    fn empty_log_has_unknown_type() {
        let log = LootLog::empty("Zulrah");
        assert_eq!(log.reward_type(), RewardType::Unknown);
        assert_eq!(log.value(), 0);
    }

    #[test]
    fn clue_items_consolidate_under_tier_ids() {
        let log = LootLog::new(
            "Vorkath",
            vec![
                record("Vorkath", 1, vec![ItemEntry::new("Clue scroll (hard)", 2729, 1, 0)]),
                record("Vorkath", 2, vec![ItemEntry::new("Clue scroll (hard)", 3520, 1, 0)]),
                record("Vorkath", 3, vec![ItemEntry::new("Casket (hard)", 7000, 1, 0)]),
            ],
        );

        assert_eq!(log.quantity_of(CLUE_SCROLL_HARD), 2);
        assert_eq!(log.quantity_of(CASKET_HARD), 1);
        assert_eq!(log.consolidated().len(), 2);
    }

    #[test]
    fn incremental_and_bulk_consolidation_agree() {
        let records = vec![
            record("Zulrah", 1, vec![ItemEntry::new("Scales", X, 10, 150)]),
            record("Zulrah", 2, vec![ItemEntry::new("Tanzanite fang", 12922, 1, 3_000_000)]),
            record("Zulrah", 3, vec![ItemEntry::new("Scales", X, 5, 160)]),
        ];

        let bulk = LootLog::new("Zulrah", records.clone());
        let mut incremental = LootLog::empty("Zulrah");
        for r in records {
            incremental.add_record(r);
        }

        assert_eq!(bulk.consolidated(), incremental.consolidated());
        assert_eq!(bulk.records(), incremental.records());
    }

    #[test]
    fn uniques_sum_own_linked_and_alternative_ids() {
        let parent = LootLog::new(
            "Zulrah",
            vec![
                record("Zulrah", 1, vec![ItemEntry::new("Serpentine visage", 12927, 1, 0)]),
                record("Zulrah", 2, vec![ItemEntry::new("Serpentine visage", 12928, 2, 0)]),
                record("Zulrah", 3, vec![ItemEntry::new("Serpentine helm", 12929, 1, 0)]),
            ],
        );
        let mut group = LogGroup::activity(parent);
        group.recompute_uniques(false);

        let visage = group
            .uniques()
            .iter()
            .find(|u| u.item_id == 12927)
            .unwrap();
        assert_eq!(visage.collected, 4);
        assert!(group.unique_ids().contains(&12929));
    }

    #[test]
    fn uniques_include_minions_only_when_requested() {
        let parent = LootLog::new(
            "General Graardor",
            vec![record(
                "General Graardor",
                1,
                vec![ItemEntry::new("Godsword shard 1", 11818, 1, 0)],
            )],
        );
        let minion = LootLog::new(
            "sergeant strongstack",
            vec![record(
                "Sergeant Strongstack",
                -1,
                vec![ItemEntry::new("Godsword shard 1", 11818, 1, 0)],
            )],
        );
        let mut group = LogGroup::activity(parent).with_minion(minion);

        group.recompute_uniques(false);
        let shard = |g: &LogGroup| {
            g.uniques()
                .iter()
                .find(|u| u.item_id == 11818)
                .unwrap()
                .collected
        };
        assert_eq!(shard(&group), 1);

        group.recompute_uniques(true);
        assert_eq!(shard(&group), 2);
    }

    #[test]
    fn unique_slots_group_shared_positions() {
        let group = LogGroup::activity(LootLog::empty("Kree'arra"));
        let slots = group.unique_slots();
        assert_eq!(slots[&5].len(), 3);
        assert_eq!(slots[&0].len(), 1);
    }

    #[test]
    fn total_value_optionally_includes_minions() {
        let parent = LootLog::new(
            "Nex",
            vec![record("Nex", 1, vec![ItemEntry::new("Coins", 995, 100, 1)])],
        );
        let minion = LootLog::new(
            "fumus",
            vec![record("Fumus", -1, vec![ItemEntry::new("Coins", 995, 50, 1)])],
        );
        let group = LogGroup::activity(parent).with_minion(minion);

        assert_eq!(group.total_value(false), 100);
        assert_eq!(group.total_value(true), 150);
        assert_eq!(group.kills(true), 2);
    }

    #[test]
    fn activity_group_routes_by_name_and_spelling() {
        let mut group = LogGroup::activity(LootLog::empty("Vet'ion Reborn"))
            .with_spellings(&["Vet'ion"])
            .with_minion(LootLog::empty("calvar'ion"));

        assert_eq!(group.apply(record("vet'ion", 1, vec![])), Applied::Parent);
        assert_eq!(group.apply(record("Calvar'ion", 1, vec![])), Applied::Minion);
        assert_eq!(group.apply(record("Goblin", 1, vec![])), Applied::Ignored);
        assert_eq!(group.parent().records().len(), 1);
        assert_eq!(group.minion("Calvar'ion").unwrap().records().len(), 1);
    }

    #[test]
    fn session_group_creates_sub_logs_lazily() {
        let mut group = LogGroup::session();
        assert_eq!(group.name(), SESSION_NAME);
        assert_eq!(group.mode(), GroupMode::Session);

        group.apply(record("Zulrah", 1, vec![ItemEntry::new("Coins", 995, 10, 1)]));
        group.apply(record("zulrah", 2, vec![ItemEntry::new("Coins", 995, 5, 1)]));
        group.apply(record("Vorkath", 1, vec![ItemEntry::new("Coins", 995, 1, 1)]));

        assert_eq!(group.minions().count(), 2);
        assert_eq!(group.minion("ZULRAH").unwrap().quantity_of(995), 15);
        assert_eq!(group.total_value(true), 16);
        assert!(group.remove_minion("vorkath"));
        assert!(!group.remove_minion("vorkath"));
    }

    #[test]
    fn sort_orders_with_alphabetical_tiebreak() {
        let a = ItemEntry::new("Bones", 526, 10, 100);
        let b = ItemEntry::new("Ashes", 592, 20, 50);
        let c = ItemEntry::new("Coins", 995, 1, 2000);

        let names = |sort: ItemSort| {
            let mut entries = vec![&a, &b, &c];
            sort.sort(&mut entries);
            entries.iter().map(|e| e.name.as_str()).collect::<Vec<_>>()
        };

        assert_eq!(names(ItemSort::Value), ["Coins", "Ashes", "Bones"]);
        assert_eq!(names(ItemSort::Price), ["Coins", "Bones", "Ashes"]);
        assert_eq!(names(ItemSort::ItemId), ["Bones", "Ashes", "Coins"]);
        assert_eq!(names(ItemSort::Alphabetical), ["Ashes", "Bones", "Coins"]);
    }

    #[test]
    fn item_sort_parses_display_names() {
        for sort in [
            ItemSort::Value,
            ItemSort::Price,
            ItemSort::ItemId,
            ItemSort::Alphabetical,
        ] {
            assert_eq!(sort.to_string().parse::<ItemSort>().unwrap(), sort);
        }
        assert!("random".parse::<ItemSort>().is_err());
    }

    #[test]
    fn fresh_copy_keeps_identity_but_no_data() {
        let mut group = LogGroup::activity(LootLog::new(
            "Vorkath",
            vec![record("Vorkath", 1, vec![ItemEntry::new("Vorki", 21992, 1, 0)])],
        ))
        .with_minion(LootLog::empty("spawn"));
        group.recompute_uniques(false);

        let fresh = group.fresh();
        assert_eq!(fresh.name(), "Vorkath");
        assert_eq!(fresh.parent().reward_type(), RewardType::Npc);
        assert!(fresh.parent().records().is_empty());
        assert_eq!(fresh.minions().count(), 0);
        assert!(fresh.uniques().iter().all(|u| u.collected == 0));
        assert_eq!(fresh.unique_ids(), group.unique_ids());
    }
}
