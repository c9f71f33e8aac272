//! Prometheus metrics surface for the analyzer pipeline: passive
//! observability counters and a latency histogram, not alerting —
//! nothing here evaluates a threshold or fires a notification, it only
//! counts and measures for whoever scrapes the registry.

use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::histogram::Histogram;
use prometheus_client::registry::Registry;

pub struct BeaconMetrics {
    registry: Registry,
    pairs_observed: Counter,
    pairs_skipped: Counter,
    pairs_scored: Counter,
    score_duration_seconds: Histogram,
}

impl BeaconMetrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("beacon");

        let pairs_observed = Counter::default();
        registry.register(
            "pairs_observed",
            "Pair records dequeued from the analysis channel",
            pairs_observed.clone(),
        );

        let pairs_skipped = Counter::default();
        registry.register(
            "pairs_skipped",
            "Pairs dropped for failing the minimum-samples threshold",
            pairs_skipped.clone(),
        );

        let pairs_scored = Counter::default();
        registry.register(
            "pairs_scored",
            "Pairs that produced a BeaconOutput",
            pairs_scored.clone(),
        );

        // Buckets tuned for per-pair scoring latency, which is CPU-bound
        // sort-and-scan work over at most a few thousand samples.
        let score_duration_seconds = Histogram::new(
            [
                0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0,
            ]
            .into_iter(),
        );
        registry.register(
            "score_duration_seconds",
            "Wall-clock time spent inside score_pair",
            score_duration_seconds.clone(),
        );

        Self {
            registry,
            pairs_observed,
            pairs_skipped,
            pairs_scored,
            score_duration_seconds,
        }
    }

    pub fn record_observed(&self) {
        self.pairs_observed.inc();
    }

    pub fn record_skipped(&self) {
        self.pairs_skipped.inc();
    }

    pub fn record_scored(&self, elapsed_seconds: f64) {
        self.pairs_scored.inc();
        self.score_duration_seconds.observe(elapsed_seconds);
    }

    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buf = String::new();
        encode(&mut buf, &self.registry)?;
        Ok(buf)
    }
}

impl Default for BeaconMetrics {
    fn default() -> Self {
        Self::new()
    }
}
