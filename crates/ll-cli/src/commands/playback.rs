//! Playback command for replaying an activity's records.

use std::io::Write;

use anyhow::{Context, Result};
use ll_core::{
    ActivityRegistry, LogViewer, PlaybackController, RewardType, Toggled, spawn_viewer,
};
use ll_store::RecordStore;

use crate::Config;
use crate::commands::util::reward_type_for;

pub fn run<W: Write>(
    writer: &mut W,
    store: &RecordStore,
    registry: &ActivityRegistry,
    config: &Config,
    name: &str,
    reward_type: Option<RewardType>,
) -> Result<()> {
    let reward_type = reward_type_for(registry, name, reward_type);
    let group = store.build_group(registry, reward_type, name);
    let total = group.parent().records().len();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to start playback runtime")?;

    runtime.block_on(async {
        let mut viewer = spawn_viewer(LogViewer::new(group.clone(), config.include_minions));
        let controller = PlaybackController::new(config.pacing());
        let Toggled::Started(task) = controller.toggle(&group, viewer.jobs.clone()) else {
            anyhow::bail!("playback already running");
        };

        // Frames may be coalesced by the watch channel; the last one always shows.
        let mut shown = 0;
        while viewer.snapshots.changed().await.is_ok() {
            let snapshot = viewer.snapshots.borrow_and_update().clone();
            if !snapshot.replaying {
                break;
            }
            shown += 1;
            let log = snapshot.group.parent();
            writeln!(
                writer,
                "[{}/{total}] value: {} gp",
                log.records().len(),
                log.value()
            )?;
        }

        let outcome = task.await.context("playback task failed")?;
        tracing::debug!(shown, frames = outcome.frames, "playback done");
        let viewer = viewer.shutdown().await.context("viewer task failed")?;
        writeln!(
            writer,
            "Playback finished: {} records, total value {} gp.",
            outcome.frames,
            viewer.current().total_value(config.include_minions)
        )?;
        Ok::<(), anyhow::Error>(())
    })
}
