/*!
Importance-sampling estimation of `∫ f(x) dx` from chain samples.

If the rows of the sample matrix are distributed according to the target
density `p`, then `E[f(X)/p(X)] = ∫ f(x) dx`, so the arithmetic mean of the
weight sequence `f(x_i)/p(x_i)` is an unbiased estimate of the integral.
The weight sequence inherits the chain's autocorrelation; its statistical
error is what [`crate::blocking`] is for.
*/

use ndarray::{Array1, Array2};
use num_traits::Float;

use crate::core::McError;
use crate::distributions::{Integrand, TargetDensity};

/// Computes the importance-weight sequence `f(x_i) / p(x_i)`, one entry per
/// chain sample.
///
/// # Errors
///
/// [`McError::DegenerateDensity`] if the target density is zero (or its log
/// is otherwise non-finite) at any sample, or if a weight overflows —
/// infinities and NaNs are never propagated into downstream means.
/// [`McError::InsufficientSamples`] for an empty sample matrix.
pub fn weights<T, F, D>(
    samples: &Array2<T>,
    integrand: &F,
    target: &D,
) -> Result<Array1<T>, McError>
where
    T: Float,
    F: Integrand<T>,
    D: TargetDensity<T>,
{
    if samples.nrows() == 0 {
        return Err(McError::InsufficientSamples { got: 0, need: 1 });
    }

    let mut w = Array1::<T>::zeros(samples.nrows());
    for (i, row) in samples.outer_iter().enumerate() {
        let x = row.to_vec();
        let lp = target.log_density(&x);
        if !lp.is_finite() {
            return Err(McError::DegenerateDensity {
                index: i,
                reason: "target density is zero or non-finite".to_string(),
            });
        }
        let wi = integrand.eval(&x) * (-lp).exp();
        if !wi.is_finite() {
            return Err(McError::DegenerateDensity {
                index: i,
                reason: "importance weight is non-finite".to_string(),
            });
        }
        w[i] = wi;
    }

    Ok(w)
}

/// The importance-sampling estimate of the integral: the mean of
/// [`weights`].
pub fn estimate<T, F, D>(samples: &Array2<T>, integrand: &F, target: &D) -> Result<T, McError>
where
    T: Float,
    F: Integrand<T>,
    D: TargetDensity<T>,
{
    let w = weights(samples, integrand, target)?;
    Ok(w.sum() / T::from(w.len()).unwrap())
}
