//! The beacon scoring kernel.
//!
//! `score_pair` is the only entry point: given one pair's connection
//! history and the run's observation window, it either returns a
//! `BeaconOutput` or `None` on a threshold miss. It is a pure function
//! of its arguments — no shared state, no I/O, safe to call
//! concurrently from any number of workers with no synchronization
//! beyond what `&GlobalWindow`/`&Config` already give for free.

use crate::numeric::{histogram, sorted_dedup};
use crate::stats::{bowley_skew, madm, quartiles};
use crate::types::{BeaconOutput, GlobalWindow, PairInput, SizeStats, TimestampStats};

/// Minimum distinct-timestamp count a pair must clear to be scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub default_connection_thresh: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_connection_thresh: crate::types::DEFAULT_CONNECTION_THRESH,
        }
    }
}

/// Cutoff, in seconds, beyond which interval dispersion saturates the
/// timestamp dispersion score to zero.
const TS_MADM_CUTOFF: f64 = 30.0;
/// Cutoff, in bytes, beyond which size dispersion saturates the
/// byte-size dispersion score to zero.
const DS_MADM_CUTOFF: f64 = 32.0;
/// Largest size-smallness payload before the score saturates to zero.
/// 65535 is the max value of a 16-bit length field, the natural upper
/// bound for a single packet's payload size.
const DS_SMALLNESS_CUTOFF: f64 = 65535.0;

/// Score one (source, destination) pair, or return `None` if it
/// doesn't clear `config.default_connection_thresh` distinct,
/// post-dedup timestamps.
///
/// Preconditions (enforced by the caller, not re-validated here):
/// `window.max_time > window.min_time`, `!input.ts.is_empty()`,
/// `!input.orig_ip_bytes.is_empty()`.
pub fn score_pair(input: PairInput, window: &GlobalWindow, config: &Config) -> Option<BeaconOutput> {
    let PairInput {
        uconn_id,
        ts,
        orig_ip_bytes,
    } = input;

    // 4.1.1 Preprocessing: sort both series independently, then
    // collapse sub-second-duplicate timestamps. Duplicates in
    // orig_ip_bytes are retained -- the size analysis is distributional,
    // not per-connection, and deliberately not realigned with ts after
    // this point.
    let mut ts = ts;
    ts.sort_unstable();
    let ts = sorted_dedup(&ts);

    let mut orig_ip_bytes = orig_ip_bytes;
    orig_ip_bytes.sort_unstable();

    if ts.len() < config.default_connection_thresh {
        return None;
    }

    let n_t = ts.len() - 1;
    let n_d = orig_ip_bytes.len();

    // 4.1.3 Duration score: fraction of the whole-corpus window this
    // pair's own activity spans.
    let duration = (ts[n_t] - ts[0]) as f64 / window.span() as f64;

    // 4.1.2 Interval series.
    let mut diff: Vec<i64> = (0..n_t).map(|i| ts[i + 1] - ts[i]).collect();
    diff.sort_unstable();

    // 4.1.4 / 4.1.5 Skew and dispersion, timestamps and sizes.
    let ts_quartiles = quartiles(&diff);
    let ds_quartiles = quartiles(&orig_ip_bytes);

    let ts_skew = bowley_skew(ts_quartiles);
    let ds_skew = bowley_skew(ds_quartiles);

    let ts_madm = madm(&diff, ts_quartiles.q2);
    let ds_madm = madm(&orig_ip_bytes, ds_quartiles.q2);

    // 4.1.8 Range diagnostics (human-facing only, do not feed the score).
    let ts_interval_range = diff[n_t - 1] - diff[0];
    let ds_range = orig_ip_bytes[n_d - 1] - orig_ip_bytes[0];

    // 4.1.7 Histogram / mode extraction.
    let (intervals, interval_counts, ts_mode, ts_mode_count) = histogram(&diff);
    let (sizes, size_counts, ds_mode, ds_mode_count) = histogram(&orig_ip_bytes);

    // 4.1.6 Size-smallness score, from the size-series mode.
    let ds_smallness_score = (1.0 - ds_mode as f64 / DS_SMALLNESS_CUTOFF).max(0.0);

    let ts_skew_score = 1.0 - ts_skew.abs();
    let ds_skew_score = 1.0 - ds_skew.abs();
    let ts_madm_score = (1.0 - ts_madm as f64 / TS_MADM_CUTOFF).max(0.0);
    let ds_madm_score = (1.0 - ds_madm as f64 / DS_MADM_CUTOFF).max(0.0);

    // 4.1.9 Composite score.
    let ts_sum = ts_skew_score + ts_madm_score + duration;
    let ds_sum = ds_skew_score + ds_madm_score + ds_smallness_score;

    let ts_score = ts_sum / 3.0;
    let ds_score = ds_sum / 3.0;
    let score = (ts_sum + ds_sum) / 6.0;

    Some(BeaconOutput {
        uconn_id,
        ts: TimestampStats {
            skew: ts_skew,
            dispersion: ts_madm,
            duration,
            range: ts_interval_range,
            mode: ts_mode,
            mode_count: ts_mode_count,
            intervals,
            interval_counts,
            score: ts_score,
        },
        ds: SizeStats {
            skew: ds_skew,
            dispersion: ds_madm,
            range: ds_range,
            mode: ds_mode,
            mode_count: ds_mode_count,
            sizes,
            size_counts,
            score: ds_score,
        },
        score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> GlobalWindow {
        GlobalWindow::new(0, 1000)
    }

    fn config() -> Config {
        Config {
            default_connection_thresh: 20,
        }
    }

    fn input(ts: Vec<i64>, sizes: Vec<i64>) -> PairInput {
        PairInput {
            uconn_id: b"src->dst".to_vec(),
            ts,
            orig_ip_bytes: sizes,
        }
    }

    #[test]
    fn perfect_beacon_scores_near_one() {
        let ts: Vec<i64> = (0..=1000).collect();
        let sizes = vec![50i64; ts.len()];
        let out = score_pair(input(ts, sizes), &window(), &config()).unwrap();

        assert!((out.ts.duration - 1.0).abs() < 1e-9);
        assert_eq!(out.ts.skew, 0.0);
        assert_eq!(out.ts.dispersion, 0);
        assert_eq!(out.ds.skew, 0.0);
        assert_eq!(out.ds.dispersion, 0);
        assert!((out.ds.score - (1.0 - 50.0 / 65535.0)).abs() < 1e-6);
        assert!((out.ts.score - 1.0).abs() < 1e-9);
        assert!(out.score > 0.999);
    }

    #[test]
    fn threshold_miss_on_collapsed_duplicates() {
        let mut ts = vec![0i64; 20];
        ts.push(5);
        let sizes = vec![10i64; ts.len()];
        assert!(score_pair(input(ts, sizes), &window(), &config()).is_none());
    }

    #[test]
    fn subsecond_clustering_collapses_below_threshold() {
        let mut ts = vec![100i64; 500];
        ts.extend(std::iter::repeat(900i64).take(500));
        let sizes = vec![10i64; ts.len()];
        assert!(score_pair(input(ts, sizes), &window(), &config()).is_none());
    }

    #[test]
    fn jittered_beacon_has_nonzero_skew_but_zero_madm() {
        // 0, 10, .., 500, 600, 610, .., 1000: every gap is 10s except
        // the single 500->600 gap, which is 100s. Total span still
        // exactly fills the window.
        let mut ts: Vec<i64> = (0..=500).step_by(10).collect();
        ts.push(600);
        ts.extend((610..=1000).step_by(10));
        let sizes = vec![64i64; ts.len()];
        let out = score_pair(input(ts, sizes), &window(), &config()).unwrap();

        assert!((out.ts.duration - 1.0).abs() < 1e-6);
        assert!(out.ts.skew > 0.0);
        assert_eq!(out.ts.dispersion, 0);
        assert!(out.ts.score < 1.0);
    }

    #[test]
    fn large_payload_drops_ds_smallness_to_zero() {
        let ts: Vec<i64> = (0..=1000).collect();
        let sizes = vec![65535i64; ts.len()];
        let out = score_pair(input(ts, sizes), &window(), &config()).unwrap();

        assert_eq!(out.ds.mode, 65535);
        assert!((out.ds.score - (2.0 / 3.0)).abs() < 1e-6);
    }

    #[test]
    fn duration_is_exactly_one_when_pair_spans_the_whole_window() {
        let ts: Vec<i64> = (0..=1000).step_by(25).collect();
        let sizes = vec![10i64; ts.len()];
        let out = score_pair(input(ts, sizes), &window(), &config()).unwrap();
        assert_eq!(out.ts.duration, 1.0);
    }

    #[test]
    fn reordering_timestamps_does_not_change_the_output() {
        let ts: Vec<i64> = (0..=1000).step_by(5).collect();
        let sizes = vec![40i64; ts.len()];

        let mut shuffled = ts.clone();
        // deterministic "shuffle": reverse, which is still a reordering
        shuffled.reverse();

        let a = score_pair(input(ts, sizes.clone()), &window(), &config()).unwrap();
        let b = score_pair(input(shuffled, sizes), &window(), &config()).unwrap();
        assert_eq!(a.score, b.score);
        assert_eq!(a.ts, b.ts);
    }

    #[test]
    fn reordering_sizes_does_not_change_the_output() {
        let ts: Vec<i64> = (0..=1000).step_by(5).collect();
        let sizes: Vec<i64> = (0..ts.len() as i64).map(|i| 10 + i % 7).collect();
        let mut shuffled_sizes = sizes.clone();
        shuffled_sizes.reverse();

        let a = score_pair(input(ts.clone(), sizes), &window(), &config()).unwrap();
        let b = score_pair(input(ts, shuffled_sizes), &window(), &config()).unwrap();
        assert_eq!(a.ds, b.ds);
        assert_eq!(a.score, b.score);
    }
}
