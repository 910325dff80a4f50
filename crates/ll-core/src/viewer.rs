//! Single owner of the displayed aggregation model.
//!
//! Live records, playback frames and playback completion all arrive as
//! [`ViewJob`]s on one channel. One task applies them in order and publishes
//! the visible state through a `watch` channel, so the model is never mutated
//! from two places at once.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::loot_log::{Applied, LogGroup};
use crate::types::Record;

#[derive(Debug)]
pub enum ViewJob {
    /// A newly observed record. Always applied to the original model.
    Live(Record),
    /// Replay state after one more record.
    Frame(Box<LogGroup>),
    /// Playback ended; show the original model again.
    PlaybackFinished { cancelled: bool },
}

/// What a renderer should currently show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub group: LogGroup,
    pub replaying: bool,
}

#[derive(Debug)]
pub struct LogViewer {
    group: LogGroup,
    replay: Option<LogGroup>,
    include_minions: bool,
}

impl LogViewer {
    pub fn new(mut group: LogGroup, include_minions: bool) -> Self {
        group.recompute_uniques(include_minions);
        Self {
            group,
            replay: None,
            include_minions,
        }
    }

    /// Applies one job. Returns whether the visible state changed.
    pub fn handle(&mut self, job: ViewJob) -> bool {
        match job {
            ViewJob::Live(record) => {
                if self.group.apply(record) == Applied::Ignored {
                    return false;
                }
                self.group.recompute_uniques(self.include_minions);
                self.replay.is_none()
            }
            ViewJob::Frame(frame) => {
                self.replay = Some(*frame);
                true
            }
            ViewJob::PlaybackFinished { cancelled } => {
                tracing::debug!(cancelled, activity = self.group.name(), "playback finished");
                self.replay = None;
                true
            }
        }
    }

    /// The replay model while playing, otherwise the original.
    pub fn current(&self) -> &LogGroup {
        self.replay.as_ref().unwrap_or(&self.group)
    }

    /// The fully consolidated model, including live records received during playback.
    pub const fn original(&self) -> &LogGroup {
        &self.group
    }

    pub const fn is_replaying(&self) -> bool {
        self.replay.is_some()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            group: self.current().clone(),
            replaying: self.is_replaying(),
        }
    }
}

pub struct ViewerHandle {
    pub jobs: mpsc::UnboundedSender<ViewJob>,
    pub snapshots: watch::Receiver<ViewSnapshot>,
    task: JoinHandle<LogViewer>,
}

impl ViewerHandle {
    /// Closes this handle's sender and waits for queued jobs to drain.
    ///
    /// Other senders (such as a running playback) keep the task alive until
    /// they are dropped.
    pub async fn shutdown(self) -> Result<LogViewer, tokio::task::JoinError> {
        drop(self.jobs);
        self.task.await
    }
}

/// Moves the viewer onto its own task.
pub fn spawn_viewer(mut viewer: LogViewer) -> ViewerHandle {
    let (jobs, mut rx) = mpsc::unbounded_channel();
    let (publish, snapshots) = watch::channel(viewer.snapshot());

    let task = tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            if viewer.handle(job) {
                publish.send_replace(viewer.snapshot());
            }
        }
        viewer
    });

    ViewerHandle {
        jobs,
        snapshots,
        task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;

    use crate::loot_log::LootLog;
    use crate::types::{ItemEntry, RewardType};

    fn record(kc: i32, quantity: i64) -> Record {
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Record::new(
            "Zulrah",
            725,
            kc,
            RewardType::Npc,
            vec![ItemEntry::new("Zulrah's scales", 12934, quantity, 150)],
            at,
        )
        .unwrap()
    }

    fn viewer() -> LogViewer {
        LogViewer::new(
            LogGroup::activity(LootLog::new("Zulrah", vec![record(1, 10)])),
            true,
        )
    }

    #[test]
    fn live_records_update_the_original() {
        let mut viewer = viewer();
        assert!(viewer.handle(ViewJob::Live(record(2, 5))));
        assert_eq!(viewer.current().parent().quantity_of(12934), 15);
    }

    #[test]
    fn unrelated_live_records_are_ignored() {
        let mut viewer = viewer();
        let mut other = record(1, 5);
        other.activity = "Vorkath".to_string();
        assert!(!viewer.handle(ViewJob::Live(other)));
        assert_eq!(viewer.current().parent().records().len(), 1);
    }

    #[test]
    fn live_records_during_replay_are_kept_for_later() {
        let mut viewer = viewer();
        let frame = viewer.original().fresh();
        viewer.handle(ViewJob::Frame(Box::new(frame)));

        assert!(!viewer.handle(ViewJob::Live(record(2, 5))));
        assert!(viewer.is_replaying());
        assert_eq!(viewer.current().parent().quantity_of(12934), 0);

        viewer.handle(ViewJob::PlaybackFinished { cancelled: false });
        assert!(!viewer.is_replaying());
        assert_eq!(viewer.current().parent().quantity_of(12934), 15);
        assert_eq!(viewer.current().parent().records().len(), 2);
    }

    #[tokio::test]
    async fn spawned_viewer_publishes_snapshots() {
        let mut handle = spawn_viewer(viewer());
        handle.jobs.send(ViewJob::Live(record(2, 5))).unwrap();
        handle.snapshots.changed().await.unwrap();

        let snapshot = handle.snapshots.borrow_and_update().clone();
        assert!(!snapshot.replaying);
        assert_eq!(snapshot.group.parent().quantity_of(12934), 15);

        let viewer = handle.shutdown().await.unwrap();
        assert_eq!(viewer.original().kills(true), 2);
    }
}
