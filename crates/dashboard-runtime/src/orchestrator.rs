//! Background data loads.
//!
//! Runs a [`DataLoader`] on a tokio task and hands the [`LoadOutcome`] to the
//! TUI through an `mpsc` channel, so the event loop never blocks on the
//! network.

use dashboard_data::loader::{DataLoader, LoadOutcome};
use tokio::sync::mpsc;

// ── LoadOrchestrator ──────────────────────────────────────────────────────────

/// Spawns loads. Each call to [`start`](Self::start) is an independent load
/// with its own channel; dropping a receiver discards that load's result.
#[derive(Debug, Clone)]
pub struct LoadOrchestrator {
    loader: DataLoader,
}

impl LoadOrchestrator {
    pub fn new(loader: DataLoader) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &DataLoader {
        &self.loader
    }

    /// Start one load.
    ///
    /// Returns the receiver the outcome will arrive on and a handle that can
    /// abort the task.
    pub fn start(&self) -> (mpsc::Receiver<LoadOutcome>, LoadHandle) {
        let (tx, rx) = mpsc::channel(1);
        let loader = self.loader.clone();

        let handle = tokio::spawn(async move {
            let outcome = loader.load().await;
            if tx.send(outcome).await.is_err() {
                tracing::debug!("load receiver dropped; discarding outcome");
            }
        });

        (rx, LoadHandle { handle })
    }
}

// ── LoadHandle ────────────────────────────────────────────────────────────────

/// A handle to an in-flight load.
pub struct LoadHandle {
    handle: tokio::task::JoinHandle<()>,
}

impl LoadHandle {
    /// Immediately abort the load.
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::periods::PeriodStrategy;
    use std::time::Duration;

    #[tokio::test]
    async fn test_offline_load_delivers_outcome() {
        let orch = LoadOrchestrator::new(DataLoader::offline(PeriodStrategy::Quarterly));
        let (mut rx, _handle) = orch.start();

        let outcome = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for outcome")
            .expect("channel closed before receiving outcome");

        assert_eq!(outcome.strategy, PeriodStrategy::Quarterly);
        assert!(outcome.used_sample);
        assert!(!outcome.transactions.is_empty());
    }

    #[tokio::test]
    async fn test_dropped_receiver_does_not_panic() {
        let orch = LoadOrchestrator::new(DataLoader::offline(PeriodStrategy::Monthly));
        let (rx, handle) = orch.start();
        drop(rx);

        tokio::time::timeout(Duration::from_secs(5), async {
            while !handle.is_finished() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("load task did not finish");
    }

    #[tokio::test]
    async fn test_start_and_abort() {
        let orch = LoadOrchestrator::new(DataLoader::offline(PeriodStrategy::Monthly));
        let (_rx, handle) = orch.start();
        handle.abort();
    }

    #[tokio::test]
    async fn test_each_start_is_independent() {
        let orch = LoadOrchestrator::new(DataLoader::offline(PeriodStrategy::Monthly));
        let (mut first, _h1) = orch.start();
        let (mut second, _h2) = orch.start();

        assert!(first.recv().await.is_some());
        assert!(second.recv().await.is_some());
        assert!(orch.loader().is_offline());
    }
}
