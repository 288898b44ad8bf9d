use std::time::Duration;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::debug;

use crate::services::draft_actor::DraftCommand;

const TICK: Duration = Duration::from_secs(1);

/// Drives the pick countdown by posting one `Tick` per second onto the draft queue.
///
/// At most one ticker task exists. It is tagged with the coordinator's countdown epoch so
/// the coordinator can drop ticks that were already in flight when the countdown restarted.
#[derive(Debug, Default)]
pub struct TurnTimer {
    running: Option<(u64, JoinHandle<()>)>,
}

impl TurnTimer {
    /// A stopped timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the ticker match `countdown`: stopped on `None`, restarted when the epoch differs
    /// from the one currently ticking, left alone otherwise.
    pub fn sync(&mut self, countdown: Option<u64>, commands: &mpsc::WeakSender<DraftCommand>) {
        if self.epoch() == countdown {
            return;
        }
        self.cancel();
        if let Some(epoch) = countdown {
            debug!(epoch, "countdown started");
            self.running = Some((epoch, spawn_ticker(epoch, commands.clone())));
        }
    }

    /// Stop the ticker, if any.
    pub fn cancel(&mut self) {
        if let Some((epoch, handle)) = self.running.take() {
            handle.abort();
            debug!(epoch, "countdown cancelled");
        }
    }

    /// Epoch of the ticker currently running.
    pub fn epoch(&self) -> Option<u64> {
        self.running.as_ref().map(|(epoch, _)| *epoch)
    }
}

impl Drop for TurnTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// The ticker only holds a weak sender so it never keeps the draft queue open on its own.
fn spawn_ticker(epoch: u64, commands: mpsc::WeakSender<DraftCommand>) -> JoinHandle<()> {
    tokio::spawn(async move {
        // First tick one full second after the start, not immediately.
        let mut interval = tokio::time::interval_at(Instant::now() + TICK, TICK);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let Some(commands) = commands.upgrade() else {
                break;
            };
            if commands.send(DraftCommand::Tick { epoch }).await.is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn next_epoch(rx: &mut mpsc::Receiver<DraftCommand>) -> u64 {
        match rx.recv().await {
            Some(DraftCommand::Tick { epoch }) => epoch,
            other => panic!("expected a tick, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_second_with_its_epoch() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut timer = TurnTimer::new();
        let started = Instant::now();

        timer.sync(Some(3), &tx.downgrade());

        assert_eq!(next_epoch(&mut rx).await, 3);
        assert_eq!(started.elapsed(), Duration::from_secs(1));
        assert_eq!(next_epoch(&mut rx).await, 3);
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn new_epoch_replaces_the_ticker() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut timer = TurnTimer::new();

        let weak = tx.downgrade();
        timer.sync(Some(1), &weak);
        timer.sync(Some(1), &weak);
        assert_eq!(next_epoch(&mut rx).await, 1);

        timer.sync(Some(2), &weak);
        assert_eq!(timer.epoch(), Some(2));
        for _ in 0..3 {
            assert_eq!(next_epoch(&mut rx).await, 2);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stopping_silences_the_queue() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut timer = TurnTimer::new();

        let weak = tx.downgrade();
        timer.sync(Some(7), &weak);
        timer.sync(None, &weak);

        assert_eq!(timer.epoch(), None);
        let waited = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(waited.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_does_not_keep_the_queue_open() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut timer = TurnTimer::new();

        timer.sync(Some(1), &tx.downgrade());
        drop(tx);

        assert!(rx.recv().await.is_none());
    }
}
