//! Small numeric helpers used by the scoring kernel. Each one is a
//! direct, exact translation of a primitive the kernel leans on
//! repeatedly; they are cheap enough, and used often enough, that
//! getting them exactly right matters more than generality.

use std::collections::HashMap;

/// Remove duplicate values from an already-sorted slice, in place,
/// returning the sorted-distinct prefix length semantics as a new
/// `Vec`. The first element is always kept.
///
/// `sorted` must already be sorted ascending; this is not checked.
pub fn sorted_dedup(sorted: &[i64]) -> Vec<i64> {
    let mut result = Vec::with_capacity(sorted.len());
    let mut iter = sorted.iter();
    let Some(&first) = iter.next() else {
        return result;
    };
    result.push(first);
    let mut last = first;
    for &v in iter {
        if v != last {
            result.push(v);
        }
        last = v;
    }
    result
}

/// Half-up rounding: `floor(f + 0.5)`. Rust's own `f64::round` rounds
/// halves away from zero, which agrees with this for positive inputs
/// but not negative ones; the quantile indices the kernel computes are
/// always non-negative, but we match the half-up definition exactly
/// rather than relying on that.
pub fn round_half_up(f: f64) -> i64 {
    (f + 0.5).floor() as i64
}

/// Two's-complement absolute value. Inputs are bounded well away from
/// `i64::MIN` by the caller (connection counts and byte counts don't
/// approach `2^62`), so the `i64::MIN` edge case is never exercised in
/// practice, but the computation itself is well-defined for every
/// value except `i64::MIN`.
pub fn abs_i64(a: i64) -> i64 {
    a.wrapping_abs()
}

/// Build a (distinct values, parallel counts, mode, mode count) tuple
/// from a data series. Order of `distinct`/`counts` is whatever order
/// a single forward pass over the input first encounters each value in
/// — stable within one call, not meaningful across calls, and not part
/// of the output's contract.
///
/// The mode tie-break is "first value encountered during the forward
/// pass that first reaches the maximum count" — equivalently, the
/// first entry in `distinct` whose count equals the max.
pub fn histogram(data: &[i64]) -> (Vec<i64>, Vec<i64>, i64, i64) {
    let mut index_of: HashMap<i64, usize> = HashMap::with_capacity(data.len());
    let mut distinct = Vec::new();
    let mut counts: Vec<i64> = Vec::new();

    for &v in data {
        match index_of.get(&v) {
            Some(&idx) => counts[idx] += 1,
            None => {
                index_of.insert(v, distinct.len());
                distinct.push(v);
                counts.push(1);
            }
        }
    }

    let mut mode = distinct[0];
    let mut mode_count = counts[0];
    for (idx, &count) in counts.iter().enumerate() {
        if count > mode_count {
            mode_count = count;
            mode = distinct[idx];
        }
    }

    (distinct, counts, mode, mode_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_empty() {
        assert_eq!(sorted_dedup(&[]), Vec::<i64>::new());
    }

    #[test]
    fn dedup_single() {
        assert_eq!(sorted_dedup(&[7]), vec![7]);
    }

    #[test]
    fn dedup_all_same() {
        assert_eq!(sorted_dedup(&[7, 7]), vec![7]);
    }

    #[test]
    fn dedup_runs() {
        assert_eq!(sorted_dedup(&[1, 2, 2, 3, 3, 3]), vec![1, 2, 3]);
    }

    #[test]
    fn round_half_up_positive_half() {
        assert_eq!(round_half_up(0.5), 1);
    }

    #[test]
    fn round_half_up_negative_half() {
        // floor(-0.5 + 0.5) == floor(0.0) == 0
        assert_eq!(round_half_up(-0.5), 0);
    }

    #[test]
    fn round_half_up_ordinary() {
        assert_eq!(round_half_up(2.4), 2);
        assert_eq!(round_half_up(2.6), 3);
    }

    #[test]
    fn abs_ordinary() {
        assert_eq!(abs_i64(-5), 5);
        assert_eq!(abs_i64(5), 5);
        assert_eq!(abs_i64(0), 0);
    }

    #[test]
    fn abs_near_min_is_well_defined() {
        assert_eq!(abs_i64(i64::MIN + 1), i64::MAX);
    }

    #[test]
    fn histogram_finds_mode_and_counts() {
        let (distinct, counts, mode, mode_count) = histogram(&[5, 5, 5, 1, 1, 9]);
        assert_eq!(mode, 5);
        assert_eq!(mode_count, 3);
        assert_eq!(distinct.len(), 3);
        assert_eq!(counts.iter().sum::<i64>(), 6);
    }

    #[test]
    fn histogram_tie_break_is_first_seen() {
        // 1 and 2 both appear twice; 1 is seen first.
        let (_, _, mode, mode_count) = histogram(&[1, 2, 1, 2]);
        assert_eq!(mode, 1);
        assert_eq!(mode_count, 2);
    }
}
