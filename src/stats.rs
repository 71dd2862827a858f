//! Summary statistics and autocorrelation diagnostics for weight sequences
//! and other scalar chain outputs.

use ndarray::ArrayView1;
use ndarray_stats::QuantileExt;
use num_traits::Float;
use rustfft::{num_complex::Complex, FftNum, FftPlanner};

use crate::core::McError;

/// Basic statistics of a scalar series.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeriesSummary<T> {
    pub n: usize,
    pub mean: T,
    /// Unbiased sample variance; 0 for a single-element series.
    pub var: T,
    pub min: T,
    pub max: T,
}

/// Summarizes a series.
///
/// # Errors
///
/// [`McError::InsufficientSamples`] on an empty series,
/// [`McError::InvalidInput`] if the series contains NaN (min/max would be
/// meaningless).
pub fn summary<T: Float>(series: ArrayView1<'_, T>) -> Result<SeriesSummary<T>, McError> {
    let n = series.len();
    if n == 0 {
        return Err(McError::InsufficientSamples { got: 0, need: 1 });
    }
    let min = *series
        .min()
        .map_err(|_| McError::InvalidInput("series contains NaN".to_string()))?;
    let max = *series
        .max()
        .map_err(|_| McError::InvalidInput("series contains NaN".to_string()))?;

    let n_t = T::from(n).unwrap();
    let mean = series.sum() / n_t;
    let var = if n > 1 {
        series.mapv(|x| (x - mean) * (x - mean)).sum() / (n_t - T::one())
    } else {
        T::zero()
    };

    Ok(SeriesSummary {
        n,
        mean,
        var,
        min,
        max,
    })
}

/// Integrated autocorrelation time `τ = 1 + 2 Σ ρ_t`.
///
/// The normalized autocorrelation function is computed in O(n log n) by
/// FFT (Wiener–Khinchin) and the sum is truncated at the first non-positive
/// `ρ_t`, the initial-positive-sequence convention. A series with fewer
/// than two elements or zero variance has `τ = 1` by convention.
pub fn integrated_autocorr_time<T: Float + FftNum>(series: ArrayView1<'_, T>) -> T {
    let n = series.len();
    if n < 2 {
        return T::one();
    }

    let n_t = T::from(n).unwrap();
    let mean = series.sum() / n_t;

    // Zero-padded to at least 2n so the circular convolution is linear.
    let m = (2 * n).next_power_of_two();
    let mut buf: Vec<Complex<T>> = Vec::with_capacity(m);
    for &x in series.iter() {
        buf.push(Complex::new(x - mean, T::zero()));
    }
    buf.resize(m, Complex::new(T::zero(), T::zero()));

    let mut planner = FftPlanner::<T>::new();
    planner.plan_fft_forward(m).process(&mut buf);
    for c in buf.iter_mut() {
        *c = Complex::new(c.norm_sqr(), T::zero());
    }
    planner.plan_fft_inverse(m).process(&mut buf);

    // The inverse transform is unnormalized; c0 is the series variance
    // up to the same constant, so the ratios ρ_t need no normalization.
    let c0 = buf[0].re;
    if !(c0 > T::zero()) {
        return T::one();
    }

    let two = T::from(2.0).unwrap();
    let mut tau = T::one();
    for t in 1..n {
        let rho = buf[t].re / c0;
        if rho <= T::zero() {
            break;
        }
        tau = tau + two * rho;
    }
    tau
}

/// Effective sample size `n / τ`: the number of independent draws the
/// correlated series is worth when estimating its mean.
pub fn ess<T: Float + FftNum>(series: ArrayView1<'_, T>) -> T {
    let n = T::from(series.len()).unwrap();
    n / integrated_autocorr_time(series)
}
