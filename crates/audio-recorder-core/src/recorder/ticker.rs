use crate::recorder::RecorderEvent;

use std::time::Duration;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

/// Cadence of the elapsed counter.
pub(crate) const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Cancellable periodic tick feeding the recorder's event queue.
///
/// Dropping the ticker aborts its task. Ticks already queued when that
/// happens still carry the old id and are discarded by the recorder.
#[derive(Debug)]
pub(crate) struct Ticker {
    id: u64,
    handle: JoinHandle<()>,
}

impl Ticker {
    pub(crate) fn spawn(id: u64, tx: mpsc::UnboundedSender<RecorderEvent>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if tx.send(RecorderEvent::Tick { ticker_id: id }).is_err() {
                    break;
                }
            }
        });

        Self { id, handle }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
