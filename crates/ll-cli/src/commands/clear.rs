//! Clear command for deleting an activity's stored records.

use std::io::Write;

use anyhow::Result;
use ll_core::{ActivityRegistry, RewardType};
use ll_store::RecordStore;

/// Deletes every alias file of `name`, in one reward type or all of them.
pub fn run<W: Write>(
    writer: &mut W,
    store: &RecordStore,
    registry: &ActivityRegistry,
    name: &str,
    reward_type: Option<RewardType>,
) -> Result<()> {
    let types = reward_type.map_or_else(|| RewardType::ALL.to_vec(), |t| vec![t]);
    let deleted = types
        .into_iter()
        .filter(|&t| store.delete_activity(registry, t, name))
        .count();

    let display = registry
        .resolve(name)
        .map_or(name, |identity| identity.name.as_str());
    if deleted == 0 {
        writeln!(writer, "No data for {display}.")?;
    } else {
        writeln!(writer, "Cleared data for {display}.")?;
    }
    Ok(())
}
