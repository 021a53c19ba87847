use std::fmt;

use arcana_model::{ScanProgress, ScanResult};
use tokio::sync::broadcast;

/// Lightweight in-process event bus fanning scan telemetry out to observers
/// (UI transports, logs, tests).
///
/// Emission is fire-and-forget: with no subscribers attached a send is a
/// no-op, and a slow subscriber only lags its own receiver. For a single
/// task, events are delivered in emission order; the bus never reorders,
/// batches, or de-duplicates.
pub struct ScanEventBus {
    progress_tx: broadcast::Sender<ScanProgress>,
    complete_tx: broadcast::Sender<ScanResult>,
    capacity: usize,
}

impl fmt::Debug for ScanEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanEventBus")
            .field("capacity", &self.capacity)
            .field("progress_subscribers", &self.progress_tx.receiver_count())
            .field("complete_subscribers", &self.complete_tx.receiver_count())
            .finish()
    }
}

impl ScanEventBus {
    pub fn new(capacity: usize) -> Self {
        let (progress_tx, _) = broadcast::channel(capacity);
        let (complete_tx, _) = broadcast::channel(capacity);
        Self {
            progress_tx,
            complete_tx,
            capacity,
        }
    }

    pub fn emit_progress(&self, event: ScanProgress) {
        let _ = self.progress_tx.send(event);
    }

    pub fn emit_complete(&self, result: ScanResult) {
        let _ = self.complete_tx.send(result);
    }

    pub fn subscribe_progress(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    pub fn subscribe_complete(&self) -> broadcast::Receiver<ScanResult> {
        self.complete_tx.subscribe()
    }
}

impl Default for ScanEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcana_model::ScanTaskId;

    #[tokio::test]
    async fn emit_without_subscribers_is_a_noop() {
        let bus = ScanEventBus::new(8);
        bus.emit_progress(ScanProgress::failed(
            ScanTaskId::new(),
            "Steam",
            "boom",
        ));
        // Nothing to assert beyond "did not panic"; a subscriber attached
        // afterwards must not see the earlier event.
        let mut rx = bus.subscribe_progress();
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn progress_events_arrive_in_emission_order() {
        let bus = ScanEventBus::new(8);
        let mut rx = bus.subscribe_progress();
        let id = ScanTaskId::new();

        for step in 0..3usize {
            let mut event =
                ScanProgress::failed(id, "Steam", format!("step-{step}"));
            event.done = false;
            bus.emit_progress(event);
        }

        for step in 0..3usize {
            let event = rx.recv().await.expect("event");
            assert_eq!(event.error.as_deref(), Some(format!("step-{step}").as_str()));
        }
    }
}
