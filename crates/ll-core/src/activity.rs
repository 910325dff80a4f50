//! Activity identities and name/alias resolution.
//!
//! An activity is a named source of loot: a boss, a raid chest, a clue tier or a
//! skilling reward. Many surface spellings (aliases) resolve to one identity.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::LazyLock;

use thiserror::Error;

use crate::types::RewardType;

/// A canonical activity with its aliases, category and minions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityIdentity {
    /// Canonical display name.
    pub name: String,
    /// Grouping used by the selection view.
    pub category: String,
    pub reward_type: RewardType,
    /// Every accepted spelling, canonical name first.
    pub aliases: Vec<String>,
    /// Minions that roll up into this activity, as declared.
    pub minions: Vec<String>,
}

impl ActivityIdentity {
    pub fn new(name: &str, category: &str, reward_type: RewardType) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            reward_type,
            aliases: vec![name.to_string()],
            minions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        for alias in aliases {
            if !self.has_alias(alias) {
                self.aliases.push((*alias).to_string());
            }
        }
        self
    }

    #[must_use]
    pub fn with_minions(mut self, minions: &[&str]) -> Self {
        self.minions = minions.iter().map(|m| (*m).to_string()).collect();
        self
    }

    /// Case-insensitive alias membership.
    pub fn has_alias(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.aliases.iter().any(|a| a.to_lowercase() == name)
    }

    /// Reward type minion drops are filed under, which is always the parent's.
    pub const fn minion_reward_type(&self) -> RewardType {
        self.reward_type
    }
}

/// Two identities claimed the same alias while building the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("alias {alias:?} claimed by both {previous:?} and {replacement:?}; using {replacement:?}")]
pub struct AliasConflict {
    pub alias: String,
    pub previous: String,
    pub replacement: String,
}

/// Registry construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("cannot build an activity registry from no identities")]
    Empty,
}

/// Alias index over a fixed set of identities.
#[derive(Debug, Clone)]
pub struct ActivityRegistry {
    identities: Vec<ActivityIdentity>,
    by_alias: HashMap<String, usize>,
    by_category: BTreeMap<String, Vec<usize>>,
    conflicts: Vec<AliasConflict>,
}

impl ActivityRegistry {
    /// Builds the alias index.
    ///
    /// Duplicate aliases do not fail the build: the identity registered last
    /// wins and the clash is reported through [`Self::conflicts`] and a warning.
    pub fn build(identities: Vec<ActivityIdentity>) -> Result<Self, RegistryError> {
        if identities.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut by_alias: HashMap<String, usize> = HashMap::new();
        let mut by_category: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut conflicts = Vec::new();

        for (index, identity) in identities.iter().enumerate() {
            for alias in &identity.aliases {
                let key = alias.to_lowercase();
                if let Some(previous) = by_alias.insert(key, index) {
                    if previous != index {
                        let conflict = AliasConflict {
                            alias: alias.clone(),
                            previous: identities[previous].name.clone(),
                            replacement: identity.name.clone(),
                        };
                        tracing::warn!(%conflict, "duplicate activity alias");
                        conflicts.push(conflict);
                    }
                }
            }
            by_category
                .entry(identity.category.clone())
                .or_default()
                .push(index);
        }

        Ok(Self {
            identities,
            by_alias,
            by_category,
            conflicts,
        })
    }

    /// The registry of every activity the logger knows about.
    pub fn builtin() -> &'static Self {
        static REGISTRY: LazyLock<ActivityRegistry> = LazyLock::new(|| {
            ActivityRegistry::build(builtin_identities()).expect("builtin table is not empty")
        });
        &REGISTRY
    }

    /// Case-insensitive lookup of any alias.
    pub fn resolve(&self, name: &str) -> Option<&ActivityIdentity> {
        self.by_alias
            .get(&name.trim().to_lowercase())
            .map(|&index| &self.identities[index])
    }

    /// Identities in a category, in declaration order.
    pub fn by_category(&self, category: &str) -> Vec<&ActivityIdentity> {
        self.by_category
            .get(category)
            .map(|indices| indices.iter().map(|&i| &self.identities[i]).collect())
            .unwrap_or_default()
    }

    /// Category names, alphabetical.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.by_category.keys().map(String::as_str).collect()
    }

    pub fn identities(&self) -> &[ActivityIdentity] {
        &self.identities
    }

    /// Alias clashes found while building.
    pub fn conflicts(&self) -> &[AliasConflict] {
        &self.conflicts
    }

    /// Every spelling whose log belongs to `name`.
    ///
    /// Unknown names only cover themselves.
    pub fn spellings(&self, name: &str) -> Vec<String> {
        self.resolve(name).map_or_else(
            || vec![name.to_string()],
            |identity| identity.aliases.clone(),
        )
    }
}

/// Kill-count announcements that spell a boss differently from its loot.
const KILL_COUNT_NAMES: &[(&str, &str)] = &[
    ("Whisperer", "The Whisperer"),
    ("Leviathan", "The Leviathan"),
    ("Lunar Chest", "Moons of Peril"),
];

/// Maps a kill-count message spelling to the boss name that receives it.
///
/// Names without an override are returned unchanged.
pub fn boss_name_for_kill_count(name: &str) -> &str {
    KILL_COUNT_NAMES
        .iter()
        .find(|(announced, _)| announced.eq_ignore_ascii_case(name))
        .map_or(name, |&(_, boss)| boss)
}

const RAIDS: &str = "Chests / Raids";
const GWD: &str = "God Wars Dungeon";
const WILDERNESS: &str = "Wilderness";
const SLAYER: &str = "Slayer";
const OTHER: &str = "Other";
const CLUES: &str = "Clue Scrolls";

fn builtin_identities() -> Vec<ActivityIdentity> {
    use RewardType::{Event, Npc};

    let id = ActivityIdentity::new;
    vec![
        id("Chambers of Xeric", RAIDS, Event),
        id("Theatre of Blood", RAIDS, Event),
        id("Tombs of Amascut", RAIDS, Event).with_minions(&["Cache of runes"]),
        id("Barrows", RAIDS, Event),
        id("Moons of Peril", RAIDS, Event).with_aliases(&["Lunar Chest"]),
        id("Fortis Colosseum", RAIDS, Event),
        id("Zulrah", OTHER, Npc),
        id("Vorkath", OTHER, Npc),
        id("Vardorvis", "Forgotten Four", Npc),
        id("The Leviathan", "Forgotten Four", Npc),
        id("Duke Sucellus", "Forgotten Four", Npc),
        id("The Whisperer", "Forgotten Four", Npc),
        id("Kree'arra", GWD, Npc).with_minions(&[
            "Wingman Skree",
            "Flockleader Geerin",
            "Flight Kilisa",
        ]),
        id("General Graardor", GWD, Npc).with_minions(&[
            "Sergeant Strongstack",
            "Sergeant Steelwill",
            "Sergeant Grimspike",
        ]),
        id("Commander Zilyana", GWD, Npc).with_minions(&["Growler", "Bree", "Starlight"]),
        id("K'ril Tsutsaroth", GWD, Npc).with_minions(&[
            "Balfrug Kreeyath",
            "Tstanon Karlak",
            "Zakl'n Gritch",
        ]),
        id("Nex", GWD, Npc).with_minions(&["Fumus", "Umbra", "Cruor", "Glacies"]),
        id("Vet'ion Reborn", WILDERNESS, Npc)
            .with_minions(&["Calvar'ion"])
            .with_aliases(&["Vet'ion"]),
        id("Venenatis", WILDERNESS, Npc).with_minions(&["Spindel"]),
        id("Callisto", WILDERNESS, Npc).with_minions(&["Artio"]),
        id("Chaos Elemental", WILDERNESS, Npc),
        id("Scorpia", WILDERNESS, Npc),
        id("Chaos Fanatic", WILDERNESS, Npc),
        id("Crazy Archaeologist", WILDERNESS, Npc),
        id("King Black Dragon", WILDERNESS, Npc),
        id("Skotizo", SLAYER, Npc),
        id("Grotesque Guardians", SLAYER, Npc).with_aliases(&["Dusk"]),
        id("Abyssal Sire", SLAYER, Npc),
        id("Kraken", SLAYER, Npc),
        id("Cerberus", SLAYER, Npc),
        id("Thermonuclear smoke devil", SLAYER, Npc),
        id("Alchemical Hydra", SLAYER, Npc),
        id("Araxxor", SLAYER, Npc),
        id("Kalphite Queen", OTHER, Npc),
        id("Giant Mole", OTHER, Npc),
        id("Corporeal Beast", OTHER, Npc),
        id("Sarachnis", OTHER, Npc),
        id("The Gauntlet", OTHER, Event),
        id("The Nightmare", OTHER, Npc),
        id("Phosani's Nightmare", OTHER, Npc),
        id("Phantom Muspah", OTHER, Npc),
        id("The Hueycoatl", OTHER, Npc),
        id("Dagannoth Rex", "Dagannoth Kings", Npc),
        id("Dagannoth Prime", "Dagannoth Kings", Npc),
        id("Dagannoth Supreme", "Dagannoth Kings", Npc),
        id("Clue Scroll (Beginner)", CLUES, Event),
        id("Clue Scroll (Easy)", CLUES, Event),
        id("Clue Scroll (Medium)", CLUES, Event),
        id("Clue Scroll (Hard)", CLUES, Event),
        id("Clue Scroll (Elite)", CLUES, Event),
        id("Clue Scroll (Master)", CLUES, Event),
        id("Wintertodt", "Skilling", Event).with_aliases(&["Supply crate (Wintertodt)"]),
        id("Tempoross", "Skilling", Event)
            .with_minions(&["Casket (Tempoross)"])
            .with_aliases(&["Reward pool (Tempoross)"]),
        id("Zalcano", "Skilling", Npc),
    ]
}
