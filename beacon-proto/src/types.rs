//! Data model shared between the Grouper, the Scorer, and the Sink.
//!
//! `PairInput` and `BeaconOutput` are owned, serde-friendly values so they
//! can cross a channel or a process boundary without aliasing into
//! whatever buffers the Grouper used to build them.

use serde::{Deserialize, Serialize};

/// The aggregated connection history for a single (source, destination)
/// pair, as produced by the Grouper.
///
/// `ts` and `origIPBytes` need not be sorted, need not be the same
/// length, and need not be parallel: the only contract is "all
/// connections between this pair, batched into one record".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairInput {
    /// Opaque identifier for the (source, destination) pair. Never
    /// inspected by the scorer.
    #[serde(rename = "uconnID")]
    pub uconn_id: Vec<u8>,
    /// Connection start timestamps, in epoch seconds. May be unsorted,
    /// may contain duplicates.
    pub ts: Vec<i64>,
    /// Origin-IP byte counts, one per connection, independent of `ts`'s
    /// order and (after dedup) independent of its length.
    #[serde(rename = "origIPBytes")]
    pub orig_ip_bytes: Vec<i64>,
}

/// The observation window spanning an entire run: the earliest and
/// latest connection timestamps seen across every pair.
///
/// Shared read-only across all scorer workers. `max_time > min_time` is
/// a precondition enforced by whoever constructs this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalWindow {
    pub min_time: i64,
    pub max_time: i64,
}

impl GlobalWindow {
    pub fn new(min_time: i64, max_time: i64) -> Self {
        assert!(
            max_time > min_time,
            "GlobalWindow requires max_time > min_time, got {max_time} <= {min_time}"
        );
        Self { min_time, max_time }
    }

    pub(crate) fn span(&self) -> i64 {
        self.max_time - self.min_time
    }
}

/// Minimum distinct-timestamp count a pair must clear to be scored.
/// Pairs below this threshold are skipped silently.
pub const DEFAULT_CONNECTION_THRESH: usize = 20;

/// Diagnostic sub-statistics for the interval (delta-time) series of a
/// pair, alongside its contribution to the composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampStats {
    pub skew: f64,
    pub dispersion: i64,
    pub duration: f64,
    pub range: i64,
    pub mode: i64,
    pub mode_count: i64,
    pub intervals: Vec<i64>,
    pub interval_counts: Vec<i64>,
    pub score: f64,
}

/// Diagnostic sub-statistics for the origin-byte-size distribution of a
/// pair, alongside its contribution to the composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeStats {
    pub skew: f64,
    pub dispersion: i64,
    pub range: i64,
    pub mode: i64,
    pub mode_count: i64,
    pub sizes: Vec<i64>,
    pub size_counts: Vec<i64>,
    pub score: f64,
}

/// One scored pair, as emitted by the Scorer and owned by the Sink
/// thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeaconOutput {
    #[serde(rename = "uconnID")]
    pub uconn_id: Vec<u8>,
    #[serde(rename = "TS")]
    pub ts: TimestampStats,
    #[serde(rename = "DS")]
    pub ds: SizeStats,
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "max_time > min_time")]
    fn window_rejects_single_timestamp_corpus() {
        GlobalWindow::new(5, 5);
    }

    #[test]
    fn window_accepts_ordered_bounds() {
        let w = GlobalWindow::new(0, 1000);
        assert_eq!(w.span(), 1000);
    }

    #[test]
    fn beacon_output_json_round_trip_preserves_wire_names() {
        let output = BeaconOutput {
            uconn_id: vec![1, 2, 3],
            ts: TimestampStats {
                skew: 0.1,
                dispersion: 2,
                duration: 0.5,
                range: 10,
                mode: 5,
                mode_count: 3,
                intervals: vec![5, 6],
                interval_counts: vec![3, 1],
                score: 0.9,
            },
            ds: SizeStats {
                skew: -0.2,
                dispersion: 4,
                range: 20,
                mode: 50,
                mode_count: 7,
                sizes: vec![50, 70],
                size_counts: vec![7, 1],
                score: 0.8,
            },
            score: 0.85,
        };

        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"uconnID\""));
        assert!(json.contains("\"TS\""));
        assert!(json.contains("\"DS\""));

        let round_tripped: BeaconOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(round_tripped, output);
    }

    #[test]
    fn pair_input_json_round_trip_preserves_wire_names() {
        let input = PairInput {
            uconn_id: b"src->dst".to_vec(),
            ts: vec![1, 2, 3],
            orig_ip_bytes: vec![40, 50],
        };

        let json = serde_json::to_string(&input).unwrap();
        assert!(json.contains("\"uconnID\""));
        assert!(json.contains("\"origIPBytes\""));

        let round_tripped: PairInput = serde_json::from_str(&json).unwrap();
        assert_eq!(round_tripped, input);
    }
}
