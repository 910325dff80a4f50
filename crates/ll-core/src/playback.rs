//! Throttled replay of a stored log.
//!
//! Playback is single-flight per controller and toggles: starting while a
//! replay is running asks it to stop instead. Frames are sent to the viewer
//! queue, never applied to the displayed model directly.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::loot_log::LogGroup;
use crate::types::{ItemId, Record};
use crate::viewer::ViewJob;

/// Delay between replayed records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub interval: Duration,
    /// Minimum pause after a record that contains a unique.
    pub unique_pause: Duration,
}

impl Pacing {
    /// Interval from an updates-per-second ceiling. A rate of zero counts as one.
    pub fn from_rate(updates_per_second: u32, unique_pause: Duration) -> Self {
        Self {
            interval: Duration::from_secs(1) / updates_per_second.max(1),
            unique_pause,
        }
    }

    pub fn delay_for(&self, record: &Record, unique_ids: &HashSet<ItemId>) -> Duration {
        if record.contains_any(unique_ids) {
            self.interval.max(self.unique_pause)
        } else {
            self.interval
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    CancelRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackOutcome {
    /// Frames sent before the replay ended.
    pub frames: usize,
    pub cancelled: bool,
}

#[derive(Debug)]
pub enum Toggled {
    Started(JoinHandle<PlaybackOutcome>),
    /// A replay was running and has been asked to stop.
    Cancelling,
}

#[derive(Debug, Clone)]
pub struct PlaybackController {
    state: Arc<Mutex<PlaybackState>>,
    pacing: Pacing,
}

impl PlaybackController {
    pub fn new(pacing: Pacing) -> Self {
        Self {
            state: Arc::new(Mutex::new(PlaybackState::Idle)),
            pacing,
        }
    }

    pub fn state(&self) -> PlaybackState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts replaying `group`'s records, or cancels the running replay.
    ///
    /// Must be called from within a tokio runtime.
    pub fn toggle(&self, group: &LogGroup, jobs: UnboundedSender<ViewJob>) -> Toggled {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if *state != PlaybackState::Idle {
                *state = PlaybackState::CancelRequested;
                return Toggled::Cancelling;
            }
            *state = PlaybackState::Playing;
        }

        let records = group.parent().records().to_vec();
        let model = group.fresh();
        tracing::debug!(activity = group.name(), records = records.len(), "playback started");

        Toggled::Started(tokio::spawn(replay(
            Arc::clone(&self.state),
            self.pacing,
            model,
            records,
            jobs,
        )))
    }
}

async fn replay(
    state: Arc<Mutex<PlaybackState>>,
    pacing: Pacing,
    mut model: LogGroup,
    records: Vec<Record>,
    jobs: UnboundedSender<ViewJob>,
) -> PlaybackOutcome {
    let cancel_requested =
        || *state.lock().unwrap_or_else(PoisonError::into_inner) == PlaybackState::CancelRequested;

    let total = records.len();
    let mut frames = 0;
    let mut cancelled = false;

    for (index, record) in records.into_iter().enumerate() {
        if cancel_requested() {
            cancelled = true;
            break;
        }

        let delay = pacing.delay_for(&record, model.unique_ids());
        model.parent_mut().add_record(record);
        model.recompute_uniques(false);

        if jobs.send(ViewJob::Frame(Box::new(model.clone()))).is_err() {
            tracing::debug!("viewer closed during playback");
            cancelled = true;
            break;
        }
        frames += 1;

        if index + 1 < total {
            tokio::time::sleep(delay).await;
        }
    }

    *state.lock().unwrap_or_else(PoisonError::into_inner) = PlaybackState::Idle;
    // The viewer may already be gone.
    let _ = jobs.send(ViewJob::PlaybackFinished { cancelled });

    PlaybackOutcome { frames, cancelled }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    use crate::loot_log::LootLog;
    use crate::types::{ItemEntry, RewardType};
    use crate::viewer::LogViewer;

    fn record(kc: i32, item: ItemEntry) -> Record {
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Record::new("Zulrah", 725, kc, RewardType::Npc, vec![item], at).unwrap()
    }

    fn scales(quantity: i64) -> ItemEntry {
        ItemEntry::new("Zulrah's scales", 12934, quantity, 150)
    }

    fn three_kills() -> LogGroup {
        LogGroup::activity(LootLog::new(
            "Zulrah",
            vec![record(1, scales(10)), record(2, scales(20)), record(3, scales(30))],
        ))
    }

    fn pacing_ms(interval: u64, pause: u64) -> Pacing {
        Pacing {
            interval: Duration::from_millis(interval),
            unique_pause: Duration::from_millis(pause),
        }
    }

    #[test]
    fn rate_sets_the_interval() {
        let pacing = Pacing::from_rate(4, Duration::from_secs(1));
        assert_eq!(pacing.interval, Duration::from_millis(250));
        assert_eq!(Pacing::from_rate(0, Duration::ZERO).interval, Duration::from_secs(1));
    }

    #[test]
    fn uniques_get_the_longer_pause() {
        let pacing = pacing_ms(100, 1000);
        let ids = HashSet::from([12922]);
        let fang = record(1, ItemEntry::new("Tanzanite fang", 12922, 1, 0));

        assert_eq!(pacing.delay_for(&fang, &ids), Duration::from_millis(1000));
        assert_eq!(
            pacing.delay_for(&record(1, scales(1)), &ids),
            Duration::from_millis(100)
        );
        assert_eq!(
            pacing_ms(500, 100).delay_for(&fang, &ids),
            Duration::from_millis(500)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn replays_each_record_in_order() {
        let group = three_kills();
        let mut viewer = LogViewer::new(group.clone(), false);
        let controller = PlaybackController::new(pacing_ms(100, 0));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let Toggled::Started(task) = controller.toggle(&group, tx) else {
            panic!("playback should start");
        };
        assert_eq!(controller.state(), PlaybackState::Playing);

        let mut frame_times = Vec::new();
        let mut quantities = Vec::new();
        while let Some(job) = rx.recv().await {
            if let ViewJob::Frame(frame) = &job {
                frame_times.push(Instant::now());
                quantities.push(frame.parent().quantity_of(12934));
            }
            viewer.handle(job);
        }

        assert_eq!(quantities, [10, 30, 60]);
        for pair in frame_times.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(100));
        }

        let outcome = task.await.unwrap();
        assert_eq!(outcome, PlaybackOutcome { frames: 3, cancelled: false });
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert!(!viewer.is_replaying());
        assert_eq!(viewer.current().parent(), group.parent());
    }

    #[tokio::test(start_paused = true)]
    async fn second_toggle_cancels_and_restores_the_full_model() {
        let group = three_kills();
        let mut viewer = LogViewer::new(group.clone(), false);
        let controller = PlaybackController::new(pacing_ms(100, 0));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let Toggled::Started(task) = controller.toggle(&group, tx.clone()) else {
            panic!("playback should start");
        };

        let first = rx.recv().await.unwrap();
        viewer.handle(first);
        assert!(viewer.is_replaying());
        assert_eq!(viewer.current().parent().quantity_of(12934), 10);

        assert!(matches!(controller.toggle(&group, tx), Toggled::Cancelling));
        assert_eq!(controller.state(), PlaybackState::CancelRequested);

        while let Some(job) = rx.recv().await {
            viewer.handle(job);
        }

        let outcome = task.await.unwrap();
        assert_eq!(outcome, PlaybackOutcome { frames: 1, cancelled: true });
        assert!(!viewer.is_replaying());
        assert_eq!(viewer.current().parent().quantity_of(12934), 60);
        assert_eq!(controller.state(), PlaybackState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_log_finishes_immediately() {
        let group = LogGroup::activity(LootLog::empty("Zulrah"));
        let controller = PlaybackController::new(pacing_ms(100, 0));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let Toggled::Started(task) = controller.toggle(&group, tx) else {
            panic!("playback should start");
        };

        assert!(matches!(
            rx.recv().await,
            Some(ViewJob::PlaybackFinished { cancelled: false })
        ));
        assert_eq!(task.await.unwrap().frames, 0);
    }
}
