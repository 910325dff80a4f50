//! Operations that span every spelling of an activity.

use std::collections::HashSet;
use std::sync::PoisonError;

use chrono::NaiveDateTime;
use ll_core::{
    ActivityRegistry, ItemEntry, LogGroup, LootLog, Record, RewardType, UNKNOWN_KILL_COUNT,
    ValidationError,
};
use rayon::prelude::*;
use thiserror::Error;

use crate::{
    RecordStore, StoreError, append_records, log_file_name, read_records, write_records,
};

#[derive(Debug, Error)]
enum ReclaimError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("invalid reclaimed item: {0}")]
    Invalid(#[from] ValidationError),
}

impl RecordStore {
    /// Records of every alias file of `name`, canonical spelling first.
    ///
    /// Aliases that map to the same file are read once.
    pub fn load_activity(
        &self,
        registry: &ActivityRegistry,
        reward_type: RewardType,
        name: &str,
    ) -> Vec<Record> {
        distinct_files(registry.spellings(name))
            .iter()
            .flat_map(|spelling| self.load_all(reward_type, spelling))
            .collect()
    }

    /// Deletes every alias file of `name`. Returns whether any was removed.
    pub fn delete_activity(
        &self,
        registry: &ActivityRegistry,
        reward_type: RewardType,
        name: &str,
    ) -> bool {
        distinct_files(registry.spellings(name))
            .iter()
            .fold(false, |deleted, spelling| {
                self.delete(reward_type, spelling) || deleted
            })
    }

    /// Adds an item that was awarded after the kill it belongs to.
    ///
    /// The item is appended to the most recent record of the exact activity
    /// file, which is then rewritten. With no records, a new single-item record
    /// with an unknown kill count is appended instead. The file stays locked
    /// from the read through the rewrite.
    pub fn reclaim(
        &self,
        reward_type: RewardType,
        activity: &str,
        combat_level: i32,
        item: ItemEntry,
        at: NaiveDateTime,
    ) -> bool {
        match self.try_reclaim(reward_type, activity, combat_level, item, at) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(activity, error = %e, "failed to reclaim item");
                false
            }
        }
    }

    fn try_reclaim(
        &self,
        reward_type: RewardType,
        activity: &str,
        combat_level: i32,
        item: ItemEntry,
        at: NaiveDateTime,
    ) -> Result<(), ReclaimError> {
        let path = self.log_path(reward_type, activity)?;
        let lock = self.file_lock(&path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut records = read_records(&path);
        let Some(last) = records.last_mut() else {
            let record = Record::new(
                activity,
                combat_level,
                UNKNOWN_KILL_COUNT,
                reward_type,
                vec![item],
                at,
            )?;
            return Ok(append_records(&path, std::slice::from_ref(&record))?);
        };

        if item.quantity <= 0 {
            return Err(ReclaimError::Invalid(ValidationError::NonPositiveQuantity {
                item_id: item.id,
                quantity: item.quantity,
            }));
        }
        tracing::info!(activity, item_id = item.id, kill_count = last.kill_count, "reclaimed item");
        last.push_item(item);
        Ok(write_records(&path, &records)?)
    }

    /// Loads a named activity with its aliases and minions.
    ///
    /// The reward type of the resolved identity is used when `reward_type` is
    /// unknown. Minion logs are read in parallel.
    pub fn build_group(
        &self,
        registry: &ActivityRegistry,
        reward_type: RewardType,
        name: &str,
    ) -> LogGroup {
        let identity = registry.resolve(name);
        let canonical = identity.map_or(name, |identity| identity.name.as_str());
        let reward_type = match (reward_type, identity) {
            (RewardType::Unknown, Some(identity)) => identity.reward_type,
            (reward_type, _) => reward_type,
        };

        let mut parent = LootLog::new(canonical, self.load_activity(registry, reward_type, name));
        if parent.reward_type() == RewardType::Unknown {
            parent.set_reward_type(reward_type);
        }

        let Some(identity) = identity else {
            return LogGroup::activity(parent);
        };

        let minion_type = identity.minion_reward_type();
        let minions: Vec<LootLog> = identity
            .minions
            .par_iter()
            .map(|minion| LootLog::new(minion.as_str(), self.load_all(minion_type, minion)))
            .collect();

        minions.into_iter().fold(
            LogGroup::activity(parent).with_spellings(&identity.aliases),
            LogGroup::with_minion,
        )
    }
}

fn distinct_files(spellings: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    spellings
        .into_iter()
        .filter(|spelling| {
            log_file_name(spelling).is_ok_and(|file| seen.insert(file))
        })
        .collect()
}
