/*!
Plain Monte Carlo integration over an axis-aligned box.

Draws independent uniform points from the box, so the usual i.i.d.
standard-error formula applies: `volume * std / sqrt(n)`. This is the
independent-sample counterpart of the chain-based pipeline in
[`crate::gibbs`] + [`crate::importance`].

# Examples

```rust
use mcint::distributions::ExpNegSquaredNorm;
use mcint::plain::{integrate, Bounds};
use rand::rngs::SmallRng;
use rand::SeedableRng;

let bounds = Bounds::cube(-8.0, 8.0, 2).unwrap();
let mut rng = SmallRng::seed_from_u64(42);
let est = integrate(&ExpNegSquaredNorm, &bounds, 100_000, &mut rng).unwrap();
// ∫ exp(-‖x‖²) over ℝ² = π; the box holds essentially all the mass.
assert!((est.value - std::f64::consts::PI).abs() < 5.0 * est.std_error);
```
*/

use ndarray::Array1;
use num_traits::Float;
use rand::Rng;

use crate::core::McError;
use crate::distributions::Integrand;

/// An axis-aligned integration region, `low[i] < high[i]` for every axis.
#[derive(Clone, Debug, PartialEq)]
pub struct Bounds<T> {
    low: Vec<T>,
    high: Vec<T>,
}

impl<T: Float> Bounds<T> {
    /// Builds a region from per-axis endpoints.
    ///
    /// Fails with [`McError::InvalidInput`] on mismatched lengths, empty
    /// vectors, non-finite endpoints, or any axis with `low >= high`.
    pub fn new(low: Vec<T>, high: Vec<T>) -> Result<Self, McError> {
        if low.is_empty() || low.len() != high.len() {
            return Err(McError::InvalidInput(
                "bounds must be two equal-length, non-empty vectors".to_string(),
            ));
        }
        for (lo, hi) in low.iter().zip(high.iter()) {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(McError::InvalidInput(
                    "bounds must be finite".to_string(),
                ));
            }
            if !(*lo < *hi) {
                return Err(McError::InvalidInput(
                    "each axis needs low < high".to_string(),
                ));
            }
        }
        Ok(Self { low, high })
    }

    /// The box `[lo, hi]^dim`.
    pub fn cube(lo: T, hi: T, dim: usize) -> Result<Self, McError> {
        Self::new(vec![lo; dim], vec![hi; dim])
    }

    pub fn dim(&self) -> usize {
        self.low.len()
    }

    pub fn low(&self) -> &[T] {
        &self.low
    }

    pub fn high(&self) -> &[T] {
        &self.high
    }

    /// Product of the axis lengths.
    pub fn volume(&self) -> T {
        self.low
            .iter()
            .zip(self.high.iter())
            .fold(T::one(), |acc, (&lo, &hi)| acc * (hi - lo))
    }

    /// Draws one point uniformly from the box.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<T>
    where
        rand_distr::Standard: rand_distr::Distribution<T>,
    {
        self.low
            .iter()
            .zip(self.high.iter())
            .map(|(&lo, &hi)| {
                let u: T = rng.gen();
                lo + u * (hi - lo)
            })
            .collect()
    }
}

/// An integral estimate with its one-sigma statistical uncertainty.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Estimate<T> {
    pub value: T,
    pub std_error: T,
}

/// Estimates `∫ f` over `bounds` from `num_samples` independent uniform
/// draws.
///
/// Returns `volume * mean(f)` with standard error
/// `volume * std(f) / sqrt(n)`, using the population-std (ddof = 0)
/// convention. A single sample therefore reports a standard error of
/// exactly 0 — statistically meaningless, and on the caller to flag, not a
/// confidence interval.
///
/// # Errors
///
/// [`McError::InvalidInput`] if `num_samples == 0`.
pub fn integrate<T, F, R>(
    integrand: &F,
    bounds: &Bounds<T>,
    num_samples: usize,
    rng: &mut R,
) -> Result<Estimate<T>, McError>
where
    T: Float,
    F: Integrand<T>,
    R: Rng + ?Sized,
    rand_distr::Standard: rand_distr::Distribution<T>,
{
    if num_samples == 0 {
        return Err(McError::InvalidInput(
            "num_samples must be at least 1".to_string(),
        ));
    }

    let mut values = Array1::<T>::zeros(num_samples);
    for i in 0..num_samples {
        let x = bounds.draw(rng);
        values[i] = integrand.eval(&x);
    }

    let n = T::from(num_samples).unwrap();
    let mean = values.sum() / n;
    let var = values.mapv(|v| (v - mean) * (v - mean)).sum() / n;
    let volume = bounds.volume();

    Ok(Estimate {
        value: volume * mean,
        std_error: volume * var.sqrt() / n.sqrt(),
    })
}
