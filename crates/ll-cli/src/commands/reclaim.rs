//! Reclaim command for items awarded after the kill they belong to.

use std::io::Write;

use anyhow::Result;
use chrono::{Local, SubsecRound};
use ll_core::ingest::{BuiltinItemNames, ItemNames};
use ll_core::{ItemEntry, ItemId, RewardType};
use ll_store::RecordStore;

/// Item to attach to the latest record.
#[derive(Debug, Clone)]
pub struct ReclaimedItem {
    pub id: ItemId,
    pub name: Option<String>,
    pub quantity: i64,
    pub price: i64,
}

pub fn run<W: Write>(
    writer: &mut W,
    store: &RecordStore,
    name: &str,
    reward_type: RewardType,
    combat_level: i32,
    item: ReclaimedItem,
) -> Result<()> {
    let item_name = item
        .name
        .or_else(|| BuiltinItemNames.item_name(item.id))
        .unwrap_or_else(|| format!("Unknown item {}", item.id));
    let entry = ItemEntry::new(item_name, item.id, item.quantity, item.price);
    let at = Local::now().naive_local().trunc_subsecs(0);

    if !store.reclaim(reward_type, name, combat_level, entry.clone(), at) {
        anyhow::bail!("failed to add {} to {name}", entry.name);
    }
    writeln!(writer, "Added {} x{} to {name}.", entry.name, entry.quantity)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reclaim_names_catalogued_items() {
        let temp = tempfile::tempdir().unwrap();
        let store = RecordStore::new(temp.path());
        store.set_active_player("12345");

        let item = ReclaimedItem {
            id: 13273,
            name: None,
            quantity: 1,
            price: 0,
        };
        let mut output = Vec::new();
        run(&mut output, &store, "Abyssal Sire", RewardType::Npc, 350, item).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Added Unsired x1 to Abyssal Sire.\n"
        );
        let records = store.load_all(RewardType::Npc, "Abyssal Sire");
        assert_eq!(records[0].items[0].name, "Unsired");
    }

    #[test]
    fn reclaim_rejects_non_positive_quantity() {
        let temp = tempfile::tempdir().unwrap();
        let store = RecordStore::new(temp.path());
        store.set_active_player("12345");

        let item = ReclaimedItem {
            id: 13273,
            name: None,
            quantity: 0,
            price: 0,
        };
        let mut output = Vec::new();
        assert!(run(&mut output, &store, "Abyssal Sire", RewardType::Npc, 0, item).is_err());
    }
}
