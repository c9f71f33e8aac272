//! Worker pool and channel plumbing (spec §5).
//!
//! `analysis_channel` is logically MPMC: many Grouper producers, many
//! Scorer consumers. `tokio::sync::mpsc` only gives MPSC for free, so
//! the consumer side is a single `Receiver` shared behind
//! `Arc<tokio::sync::Mutex<_>>` and drained by every worker task —
//! the standard way to turn an MPSC channel into an MPMC work queue
//! without reaching for a second channel crate the rest of the
//! workspace doesn't otherwise need.
//!
//! `write_channel` is naturally MPSC (many workers, one Sink) and
//! needs no such wrapping.
//!
//! Termination: the Grouper side closes `analysis_channel` by
//! dropping every producer `Sender`. Each worker observes the
//! closed-and-drained channel (`recv` returns `None`) and returns.
//! `ScorerPool::join` awaits every worker's `JoinHandle` — the
//! barrier — before the caller can safely drop its own
//! `write_channel` sender, which is what actually closes the Sink's
//! receiver once every clone is gone. No records are dropped on
//! shutdown: a worker that is mid-score when the channel closes
//! finishes that pair and sends its output before observing the next
//! `recv` returning `None`.

use std::sync::Arc;
use std::time::Instant;

use beacon_proto::{score_pair, BeaconOutput, Config, GlobalWindow, PairInput};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::metrics::BeaconMetrics;

pub type AnalysisSender = mpsc::Sender<PairInput>;
type AnalysisReceiver = Arc<Mutex<mpsc::Receiver<PairInput>>>;
pub type WriteSender = mpsc::Sender<BeaconOutput>;
pub type WriteReceiver = mpsc::Receiver<BeaconOutput>;

/// Bounded channel capacity between the Grouper and the Scorer pool.
/// Bounded so a slow Sink applies backpressure all the way up to the
/// Grouper rather than letting queued pairs grow without limit.
pub const ANALYSIS_CHANNEL_CAPACITY: usize = 1024;
pub const WRITE_CHANNEL_CAPACITY: usize = 1024;

/// Create the analysis channel. The returned `AnalysisSender` may be
/// cloned per Grouper producer; the pool itself holds the only
/// consumer handle.
pub fn analysis_channel() -> (AnalysisSender, AnalysisReceiver) {
    let (tx, rx) = mpsc::channel(ANALYSIS_CHANNEL_CAPACITY);
    (tx, Arc::new(Mutex::new(rx)))
}

/// Create the write channel. The returned `WriteSender` may be cloned
/// per worker; the `WriteReceiver` belongs to the Sink task.
pub fn write_channel() -> (WriteSender, WriteReceiver) {
    mpsc::channel(WRITE_CHANNEL_CAPACITY)
}

/// A running pool of Scorer workers. Dropping this without calling
/// [`ScorerPool::join`] abandons the worker tasks; callers should
/// always join after the Grouper side closes the analysis channel.
pub struct ScorerPool {
    handles: Vec<JoinHandle<()>>,
}

impl ScorerPool {
    /// Spawn `worker_count` workers, each draining `analysis_rx` and
    /// sending scored pairs to `write_tx` until the analysis channel
    /// is closed and drained.
    pub fn spawn(
        worker_count: usize,
        analysis_rx: AnalysisReceiver,
        write_tx: WriteSender,
        window: GlobalWindow,
        config: Config,
        metrics: Arc<BeaconMetrics>,
    ) -> Self {
        let handles = (0..worker_count.max(1))
            .map(|worker_id| {
                let analysis_rx = analysis_rx.clone();
                let write_tx = write_tx.clone();
                let metrics = Arc::clone(&metrics);
                tokio::spawn(worker_loop(worker_id, analysis_rx, write_tx, window, config, metrics))
            })
            .collect();

        Self { handles }
    }

    /// Await every worker's completion. This is the barrier from spec
    /// §5: once every worker has observed the closed-and-drained
    /// analysis channel, the caller may drop its `write_tx` clone
    /// knowing no worker will send again.
    pub async fn join(self) {
        for handle in self.handles {
            // A panicking worker is a bug, not a recoverable condition;
            // surface it rather than silently losing the rest of the run.
            handle.await.expect("scorer worker task panicked");
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    analysis_rx: AnalysisReceiver,
    write_tx: WriteSender,
    window: GlobalWindow,
    config: Config,
    metrics: Arc<BeaconMetrics>,
) {
    loop {
        // Each worker only ever blocks receiving from analysis_channel
        // or sending to write_channel (spec §5's only suspension
        // points); the lock here is held just long enough to pop one
        // item, never across the scoring computation itself.
        let input = {
            let mut rx = analysis_rx.lock().await;
            rx.recv().await
        };

        let Some(input) = input else {
            tracing::debug!(worker_id, "analysis channel closed, worker exiting");
            return;
        };

        metrics.record_observed();
        let uconn_id = input.uconn_id.clone();
        let started = Instant::now();
        match score_pair(input, &window, &config) {
            Some(output) => {
                let elapsed = started.elapsed().as_secs_f64();
                metrics.record_scored(elapsed);
                tracing::trace!(worker_id, uconn_id = ?uconn_id, score = output.score, elapsed, "pair scored");
                if write_tx.send(output).await.is_err() {
                    tracing::debug!(worker_id, "write channel closed, worker exiting");
                    return;
                }
            }
            None => {
                metrics.record_skipped();
                tracing::debug!(worker_id, uconn_id = ?uconn_id, "pair skipped: below threshold");
            }
        }
    }
}
