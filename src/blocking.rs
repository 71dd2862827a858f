/*!
# Blocking analysis of correlated series

The naive estimator `s²/N` underestimates `Var[mean]` for an autocorrelated
series such as an importance-weight sequence from a Markov chain. Blocking
re-estimates the variance of the mean from block averages at geometrically
increasing block lengths: once blocks are longer than the autocorrelation
length, the block means are effectively independent and the estimate
plateaus. That plateau is the reliable error bar.

Each estimate carries its own one-sigma uncertainty from χ² sampling theory
for a variance estimated from `n_blocks` values, `v · sqrt(2/(n_blocks-1))`,
which is what makes the plateau identifiable in the first place.

## Example

```rust
use mcint::blocking::{analyze, DEFAULT_MIN_BLOCKS};
use ndarray::Array1;

let series = Array1::from_iter((0..64).map(|i| (i % 7) as f64));
let curve = analyze(series.view(), DEFAULT_MIN_BLOCKS);
// 64 / 16 = 4 blocks still works; 64 / 32 = 2 does not.
assert_eq!(curve.block_lengths, vec![1, 2, 4, 8, 16]);
```
*/

use log::debug;
use ndarray::{Array1, ArrayView1};
use num_traits::Float;

/// Fewest blocks from which a variance-of-variance estimate is still
/// accepted.
pub const DEFAULT_MIN_BLOCKS: usize = 4;

/// The blocking curve: one `(block length, Var[mean] estimate, 1-σ error)`
/// triple per power-of-two block length, stored as three parallel vectors
/// of equal length.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockingCurve<T> {
    /// Strictly increasing powers of two.
    pub block_lengths: Vec<usize>,
    /// Estimated variance of the overall mean at each block length.
    pub var_of_mean: Vec<T>,
    /// One-sigma uncertainty of each variance estimate.
    pub error: Vec<T>,
}

impl<T: Copy> BlockingCurve<T> {
    pub fn len(&self) -> usize {
        self.block_lengths.len()
    }

    /// An empty curve means "insufficient data for blocking analysis" —
    /// it must never be read as a zero variance.
    pub fn is_empty(&self) -> bool {
        self.block_lengths.is_empty()
    }

    /// The coarsest triple, the conventional plateau read-out once the
    /// curve has flattened.
    pub fn plateau(&self) -> Option<(usize, T, T)> {
        let last = self.block_lengths.len().checked_sub(1)?;
        Some((
            self.block_lengths[last],
            self.var_of_mean[last],
            self.error[last],
        ))
    }
}

/**
Runs the blocking analysis on `series`.

For each block length `L = 2^k` while `N / L >= min_blocks`, partitions the
first `(N / L) * L` elements into contiguous non-overlapping blocks
(remainder discarded), takes the unbiased sample variance `s²` of the block
means, and records `v = s² / n_blocks` with uncertainty
`v * sqrt(2 / (n_blocks - 1))`. The curve is truncated — never padded — at
the first `L` that would leave fewer than `min_blocks` blocks, and is empty
when even `L = 1` fails.

# Panics

If `min_blocks < 2` (the unbiased variance needs at least two blocks).
*/
pub fn analyze<T: Float>(series: ArrayView1<'_, T>, min_blocks: usize) -> BlockingCurve<T> {
    assert!(min_blocks >= 2, "min_blocks must be at least 2");

    let n = series.len();
    let mut curve = BlockingCurve {
        block_lengths: Vec::new(),
        var_of_mean: Vec::new(),
        error: Vec::new(),
    };

    let mut block_len = 1usize;
    while block_len <= n && n / block_len >= min_blocks {
        let n_blocks = n / block_len;

        let mut means = Array1::<T>::zeros(n_blocks);
        for b in 0..n_blocks {
            let start = b * block_len;
            let mut sum = T::zero();
            for i in start..start + block_len {
                sum = sum + series[i];
            }
            means[b] = sum / T::from(block_len).unwrap();
        }

        let nb = T::from(n_blocks).unwrap();
        let grand_mean = means.sum() / nb;
        let s2 = means.mapv(|m| (m - grand_mean) * (m - grand_mean)).sum() / (nb - T::one());
        let v = s2 / nb;
        let err = v * (T::from(2.0).unwrap() / (nb - T::one())).sqrt();

        curve.block_lengths.push(block_len);
        curve.var_of_mean.push(v);
        curve.error.push(err);

        block_len *= 2;
    }

    debug!(
        "blocking: n={}, min_blocks={}, {} levels",
        n,
        min_blocks,
        curve.len()
    );
    curve
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use rand_distr::StandardNormal;

    fn standard_normal_series(n: usize, seed: u64) -> Array1<f64> {
        let mut rng = SmallRng::seed_from_u64(seed);
        Array1::from_iter((0..n).map(|_| rng.sample::<f64, _>(StandardNormal)))
    }

    /// AR(1) with coefficient `phi` and unit innovations, started from its
    /// stationary distribution.
    fn ar1_series(n: usize, phi: f64, seed: u64) -> Array1<f64> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let stationary_std = (1.0 / (1.0 - phi * phi)).sqrt();
        let mut x = stationary_std * rng.sample::<f64, _>(StandardNormal);
        Array1::from_iter((0..n).map(|_| {
            x = phi * x + rng.sample::<f64, _>(StandardNormal);
            x
        }))
    }

    fn level(curve: &BlockingCurve<f64>, block_len: usize) -> usize {
        curve
            .block_lengths
            .iter()
            .position(|&l| l == block_len)
            .expect("block length not in curve")
    }

    #[test]
    fn truncation_law() {
        // N = 16, min_blocks = 4: 16/4 = 4 blocks is still allowed at
        // L = 4, but 16/8 = 2 is not, so only L in {1, 2, 4} appears.
        let series = standard_normal_series(16, 0);
        let curve = analyze(series.view(), 4);
        assert_eq!(curve.block_lengths, vec![1, 2, 4]);
        assert_eq!(curve.var_of_mean.len(), 3);
        assert_eq!(curve.error.len(), 3);
    }

    #[test]
    fn too_short_series_yields_an_empty_curve() {
        let series = Array1::from(vec![1.0, 2.0, 3.0]);
        let curve = analyze(series.view(), 4);
        assert!(curve.is_empty());
        assert!(curve.plateau().is_none());
    }

    #[test]
    #[should_panic(expected = "min_blocks")]
    fn min_blocks_below_two_panics() {
        let series = Array1::from(vec![1.0, 2.0, 3.0, 4.0]);
        analyze(series.view(), 1);
    }

    #[test]
    fn hand_computed_two_level_curve() {
        let series = Array1::from(vec![1.0, 2.0, 3.0, 4.0]);
        let curve = analyze(series.view(), 2);
        assert_eq!(curve.block_lengths, vec![1, 2]);

        // L = 1: s² of {1,2,3,4} is 5/3, v = s²/4.
        assert_abs_diff_eq!(curve.var_of_mean[0], 5.0 / 12.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            curve.error[0],
            5.0 / 12.0 * (2.0f64 / 3.0).sqrt(),
            epsilon = 1e-12
        );

        // L = 2: block means {1.5, 3.5}, s² = 2, v = 1, err = v·√2.
        assert_abs_diff_eq!(curve.var_of_mean[1], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(curve.error[1], 2.0f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn remainder_elements_are_discarded() {
        // N = 5, L = 2 uses only the first 4 elements; the outlier in the
        // tail position must not affect the L = 2 level.
        let with_tail = Array1::from(vec![1.0, 2.0, 3.0, 4.0, 1e6]);
        let curve = analyze(with_tail.view(), 2);
        let l2 = level(&curve, 2);
        assert_abs_diff_eq!(curve.var_of_mean[l2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn iid_series_is_flat_within_error_bars() {
        let n = 4096;
        let series = standard_normal_series(n, 42);
        let curve = analyze(series.view(), DEFAULT_MIN_BLOCKS);
        let v1 = curve.var_of_mean[0];
        for k in 1..curve.len() {
            // The relative spread of a variance estimate from n_blocks
            // values is sqrt(2/(n_blocks-1)); only levels with enough
            // blocks pin the flatness down tightly.
            if n / curve.block_lengths[k] < 64 {
                continue;
            }
            let ratio = curve.var_of_mean[k] / v1;
            assert!(
                (0.5..2.0).contains(&ratio),
                "level {} deviates from flatness: ratio {}",
                k,
                ratio
            );
        }
    }

    #[test]
    fn autocorrelated_series_rises_then_plateaus() {
        // phi = 0.9 has autocorrelation time (1+phi)/(1-phi) = 19, so the
        // naive L = 1 estimate is ~19x too small and blocks much longer
        // than ~19 recover the true variance of the mean.
        let series = ar1_series(16_384, 0.9, 42);
        let curve = analyze(series.view(), DEFAULT_MIN_BLOCKS);

        let v1 = curve.var_of_mean[level(&curve, 1)];
        let v256 = curve.var_of_mean[level(&curve, 256)];
        assert!(
            v256 / v1 > 6.0,
            "blocking did not reveal the autocorrelation: ratio {}",
            v256 / v1
        );

        // Beyond the autocorrelation length the curve is flat within its
        // own error bars.
        let l128 = level(&curve, 128);
        let l256 = level(&curve, 256);
        let diff = (curve.var_of_mean[l256] - curve.var_of_mean[l128]).abs();
        assert!(diff < 3.0 * (curve.error[l128] + curve.error[l256]));
    }

    #[test]
    fn outputs_always_have_equal_lengths() {
        for n in [0usize, 1, 3, 4, 16, 100, 1000] {
            let series = standard_normal_series(n, n as u64);
            let curve = analyze(series.view(), DEFAULT_MIN_BLOCKS);
            assert_eq!(curve.block_lengths.len(), curve.var_of_mean.len());
            assert_eq!(curve.block_lengths.len(), curve.error.len());
        }
    }
}
