//! Collectible items tracked per activity, and boss pets.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;

use crate::types::ItemId;

/// A notable drop tracked for "have I received this yet" progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniqueItem {
    pub name: String,
    pub item_id: ItemId,
    /// Noted variant, when the item can be noted.
    pub linked_id: Option<ItemId>,
    /// Other ids that count towards this unique (e.g. an assembled form).
    pub alternative_ids: Vec<ItemId>,
    /// Display slot; several uniques may share one slot.
    pub position: u32,
    /// Derived from consolidated totals and never persisted.
    pub collected: i64,
}

impl UniqueItem {
    pub fn new(name: &str, item_id: ItemId, linked_id: Option<ItemId>, position: u32) -> Self {
        Self {
            name: name.to_string(),
            item_id,
            linked_id,
            alternative_ids: Vec::new(),
            position,
            collected: 0,
        }
    }

    #[must_use]
    pub fn with_alternatives(mut self, ids: &[ItemId]) -> Self {
        self.alternative_ids = ids.to_vec();
        self
    }

    /// Every id whose quantity counts towards this unique.
    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        std::iter::once(self.item_id)
            .chain(self.linked_id)
            .chain(self.alternative_ids.iter().copied())
    }
}

/// Unique items grouped by lower-cased activity name.
#[derive(Debug, Clone, Default)]
pub struct UniqueCatalog {
    by_activity: HashMap<String, Vec<UniqueItem>>,
}

impl UniqueCatalog {
    pub fn insert(&mut self, activity: &str, uniques: Vec<UniqueItem>) {
        self.by_activity.insert(activity.to_lowercase(), uniques);
    }

    /// Uniques for an activity, sorted by display position.
    pub fn for_activity(&self, activity: &str) -> Vec<UniqueItem> {
        let mut uniques = self
            .by_activity
            .get(&activity.to_lowercase())
            .cloned()
            .unwrap_or_default();
        uniques.sort_by_key(|u| u.position);
        uniques
    }

    /// Name of any catalogued item id.
    pub fn item_name(&self, id: ItemId) -> Option<&str> {
        self.by_activity
            .values()
            .flatten()
            .find(|u| u.ids().any(|candidate| candidate == id))
            .map(|u| u.name.as_str())
    }

    pub fn builtin() -> &'static Self {
        static CATALOG: LazyLock<UniqueCatalog> = LazyLock::new(builtin_catalog);
        &CATALOG
    }
}

fn builtin_catalog() -> UniqueCatalog {
    let u = UniqueItem::new;
    let mut catalog = UniqueCatalog::default();

    catalog.insert(
        "Zulrah",
        vec![
            u("Pet snakeling", 12921, None, 0),
            u("Tanzanite fang", 12922, Some(12923), 1),
            u("Magic fang", 12932, Some(12933), 2),
            u("Serpentine visage", 12927, Some(12928), 3).with_alternatives(&[12929]),
            u("Uncut onyx", 6571, Some(6572), 4),
            u("Tanzanite mutagen", 13200, None, 5),
            u("Magma mutagen", 13201, None, 5),
            u("Jar of swamp", 12936, None, 6),
        ],
    );
    catalog.insert(
        "Vorkath",
        vec![
            u("Vorki", 21992, None, 0),
            u("Draconic visage", 11286, Some(11287), 1),
            u("Skeletal visage", 22006, Some(22007), 2),
            u("Dragonbone necklace", 22111, Some(22112), 3),
            u("Jar of decay", 22106, None, 4),
            u("Vorkath's head", 21907, None, 5),
        ],
    );
    catalog.insert(
        "Abyssal Sire",
        vec![
            u("Abyssal orphan", 13262, None, 0),
            u("Unsired", 13273, None, 1),
            u("Abyssal dagger", 13265, Some(13266), 2),
            u("Bludgeon spine", 13274, None, 3),
            u("Bludgeon claw", 13275, None, 3),
            u("Bludgeon axon", 13276, None, 3),
            u("Jar of miasma", 13277, None, 4),
            u("Abyssal head", 7979, None, 5),
        ],
    );
    catalog.insert(
        "Kree'arra",
        vec![
            u("Pet kree'arra", 12649, None, 0),
            u("Armadyl helmet", 11826, Some(11827), 1),
            u("Armadyl chestplate", 11828, Some(11829), 2),
            u("Armadyl chainskirt", 11830, Some(11831), 3),
            u("Armadyl hilt", 11810, Some(11811), 4),
            u("Godsword shard 1", 11818, Some(11819), 5),
            u("Godsword shard 2", 11820, Some(11821), 5),
            u("Godsword shard 3", 11822, Some(11823), 5),
        ],
    );
    catalog.insert(
        "General Graardor",
        vec![
            u("Pet general graardor", 12650, None, 0),
            u("Bandos chestplate", 11832, Some(11833), 1),
            u("Bandos tassets", 11834, Some(11835), 2),
            u("Bandos boots", 11836, Some(11837), 3),
            u("Bandos hilt", 11812, Some(11813), 4),
            u("Godsword shard 1", 11818, Some(11819), 5),
            u("Godsword shard 2", 11820, Some(11821), 5),
            u("Godsword shard 3", 11822, Some(11823), 5),
        ],
    );
    catalog.insert(
        "The Nightmare",
        vec![
            u("Little nightmare", 24491, None, 0),
            u("Inquisitor's mace", 24417, Some(24418), 1),
            u("Nightmare staff", 24422, Some(24423), 2),
            u("Eldritch orb", 24517, Some(24518), 3),
            u("Harmonised orb", 24511, Some(24512), 3),
            u("Volatile orb", 24514, Some(24515), 3),
        ],
    );
    catalog.insert(
        "Clue Scroll (Master)",
        vec![
            u("Bloodhound", 19730, None, 0),
            u("Ring of coins", 20017, Some(20018), 1),
            u("Bucket helm (g)", 20059, Some(20060), 2),
        ],
    );

    catalog
}

/// Pets and the boss names that can award them.
const PETS: &[(ItemId, &str, &[&str])] = &[
    (12650, "Pet general graardor", &["General Graardor"]),
    (12649, "Pet kree'arra", &["Kree'arra"]),
    (12652, "Pet k'ril tsutsaroth", &["K'ril Tsutsaroth"]),
    (12651, "Pet zilyana", &["Commander Zilyana"]),
    (26348, "Nexling", &["Nex"]),
    (13178, "Callisto cub", &["Callisto", "Artio"]),
    (11995, "Pet chaos elemental", &["Chaos Elemental", "Chaos Fanatic"]),
    (13181, "Scorpia's offspring", &["Scorpia"]),
    (13177, "Venenatis spiderling", &["Venenatis", "Spindel"]),
    (13179, "Vet'ion jr.", &["Vet'ion Reborn", "Vet'ion", "Calvar'ion"]),
    (12653, "Prince black dragon", &["King Black Dragon"]),
    (13262, "Abyssal orphan", &["Abyssal Sire"]),
    (13247, "Hellpuppy", &["Cerberus"]),
    (21748, "Noon", &["Grotesque Guardians"]),
    (12655, "Pet kraken", &["Kraken"]),
    (12648, "Pet smoke devil", &["Thermonuclear smoke devil"]),
    (21273, "Skotos", &["Skotizo"]),
    (12646, "Baby mole", &["Giant Mole"]),
    (12654, "Kalphite princess", &["Kalphite Queen"]),
    (20851, "Olmlet", &["Chambers of Xeric"]),
    (22473, "Lil' zik", &["Theatre of Blood"]),
    (12816, "Pet dark core", &["Corporeal Beast"]),
    (12921, "Pet snakeling", &["Zulrah"]),
    (12645, "Pet dagannoth rex", &["Dagannoth Rex"]),
    (12644, "Pet dagannoth prime", &["Dagannoth Prime"]),
    (12643, "Pet dagannoth supreme", &["Dagannoth Supreme"]),
    (21992, "Vorki", &["Vorkath"]),
    (19730, "Bloodhound", &["Clue Scroll (Master)"]),
    (22746, "Ikkle hydra", &["Alchemical Hydra"]),
    (23757, "Youngllef", &["The Gauntlet"]),
    (23495, "Sraracha", &["Sarachnis"]),
    (23760, "Smolcano", &["Zalcano"]),
    (24491, "Little nightmare", &["The Nightmare", "Phosani's Nightmare"]),
    (21509, "Herbi", &["Herbiboar"]),
    (20693, "Phoenix", &["Wintertodt"]),
    (12703, "Pet penance queen", &["Barbarian Assault"]),
    (25602, "Tiny tempor", &["Tempoross"]),
    (27352, "Tumeken's guardian", &["Tombs of Amascut"]),
    (27590, "Muphin", &["Phantom Muspah"]),
    (28248, "Butch", &["Vardorvis"]),
    (28252, "Lil'viathan", &["The Leviathan"]),
    (28250, "Baron", &["Duke Sucellus"]),
    (28246, "Wisp", &["The Whisperer"]),
    (28960, "Smol heredit", &["Fortis Colosseum"]),
    (29836, "Nid", &["Araxxor"]),
    (30152, "Huberte", &["The Hueycoatl"]),
    (30154, "Moxi", &["Amoxliatl"]),
    (28801, "Scurry", &["Scurrius"]),
];

/// A pet item awarded by a boss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pet {
    pub item_id: ItemId,
    pub name: &'static str,
}

/// Looks up the pet a boss can award, by any of its boss names.
pub fn pet_for_boss(boss: &str) -> Option<Pet> {
    PETS.iter()
        .find(|(_, _, bosses)| bosses.iter().any(|b| b.eq_ignore_ascii_case(boss)))
        .map(|&(item_id, name, _)| Pet { item_id, name })
}
