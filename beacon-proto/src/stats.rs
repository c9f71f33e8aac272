//! Quartile extraction, Bowley skew, and median-absolute-deviation
//! helpers shared by the timestamp-interval and byte-size analyses.
//!
//! The quartile convention here — nearest-rank on `L - 1`, half-up
//! rounding — is load-bearing: it must match the original analyzer's
//! indexing exactly, or scores silently drift from prior analyses on
//! the same data. See the module-level numeric-semantics note in
//! `scorer`.

use crate::numeric::round_half_up;

/// The three Bowley quartiles of a sorted series, indexed by
/// nearest-rank on `len - 1` with half-up rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quartiles {
    pub q1: i64,
    pub q2: i64,
    pub q3: i64,
}

/// Extract `Quartiles` from an ascending-sorted, non-empty series.
pub fn quartiles(sorted: &[i64]) -> Quartiles {
    let last = (sorted.len() - 1) as f64;
    let at = |p: f64| sorted[round_half_up(p * last) as usize];
    Quartiles {
        q1: at(0.25),
        q2: at(0.5),
        q3: at(0.75),
    }
}

/// Bowley's quartile skew coefficient, `(Q1 + Q3 - 2*Q2) / (Q3 - Q1)`.
///
/// Defined to be `0.0` whenever the measure would be unreliable: a
/// zero denominator, or the median coinciding with either outer
/// quartile. This is a deliberate degeneracy rule, not a fallback for
/// division-by-zero — narrow-but-bursty distributions are exactly the
/// case this guards.
pub fn bowley_skew(q: Quartiles) -> f64 {
    let den = q.q3 - q.q1;
    if den == 0 || q.q2 == q.q1 || q.q2 == q.q3 {
        return 0.0;
    }
    let num = q.q1 + q.q3 - 2 * q.q2;
    num as f64 / den as f64
}

/// Median Absolute Deviation about the median `center`: deviations are
/// computed against `center` (not recomputed from the deviation
/// series), then the median of those deviations is taken by the same
/// nearest-rank rule as `quartiles`.
///
/// `values` need not be sorted; this function sorts its own scratch
/// copy of the absolute deviations.
pub fn madm(values: &[i64], center: i64) -> i64 {
    use crate::numeric::abs_i64;

    let mut devs: Vec<i64> = values.iter().map(|&v| abs_i64(v - center)).collect();
    devs.sort_unstable();
    let last = (devs.len() - 1) as f64;
    devs[round_half_up(0.5 * last) as usize]
}
