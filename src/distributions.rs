/*!
Defines the target-density and integrand abstractions consumed by the
samplers and estimators, along with concrete types for the Gaussian test
problem: an isotropic Gaussian density and the `exp(-‖x‖²)` integrand whose
integral over ℝ^d is π^(d/2).

This module is generic over the floating-point precision (e.g., `f32` or
`f64`) using the [`num_traits::Float`] trait.

# Examples

```rust
use mcint::distributions::{ExpNegSquaredNorm, Integrand, IsotropicGaussian, TargetDensity};

// A standard normal density in any dimension.
let target: IsotropicGaussian<f64> = IsotropicGaussian::standard();
let lp = target.log_density(&[0.5, -0.5]);
println!("log-density: {}", lp);

// The default integrand and its closed-form integral.
let f = ExpNegSquaredNorm;
assert!(f.eval(&[0.0, 0.0]) == 1.0);
let reference: f64 = ExpNegSquaredNorm::exact(2);
assert!((reference - std::f64::consts::PI).abs() < 1e-12);
```
*/

use num_traits::Float;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use std::f64::consts::PI;

/// A probability density on ℝ^d from which we want to sample.
///
/// The sampler only ever uses differences of log-densities, so any constant
/// offset (an unnormalized density) leaves the chain unchanged. Importance
/// estimates divide by the density itself and therefore require the
/// normalized one.
pub trait TargetDensity<T: Float> {
    /// Returns the log of the density at `x`. Zero-density points are
    /// represented by negative infinity.
    fn log_density(&self, x: &[T]) -> T;

    /// Returns the density at `x`, `exp(log_density(x))`.
    fn density(&self, x: &[T]) -> T {
        self.log_density(x).exp()
    }
}

/// A real-valued function on ℝ^d to be integrated.
pub trait Integrand<T: Float> {
    /// Evaluates the integrand at a single point.
    fn eval(&self, x: &[T]) -> T;
}

/**
An isotropic Gaussian density with mean zero and standard deviation `std`
along every coordinate. The dimension is taken from the argument, so one
value works for states of any length.

# Examples

```rust
use mcint::distributions::{IsotropicGaussian, TargetDensity};

let g: IsotropicGaussian<f64> = IsotropicGaussian::new(2.0);
let lp = g.log_density(&[0.42, 9.6]);
println!("log-density: {}", lp);
```
*/
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IsotropicGaussian<T: Float> {
    pub std: T,
}

impl<T: Float> IsotropicGaussian<T> {
    /// Creates an isotropic Gaussian with the given standard deviation.
    pub fn new(std: T) -> Self {
        Self { std }
    }

    /// The standard normal: unit variance along every coordinate.
    pub fn standard() -> Self {
        Self { std: T::one() }
    }
}

impl<T: Float> IsotropicGaussian<T>
where
    StandardNormal: Distribution<T>,
{
    /// Draws one independent d-dimensional point directly from the density.
    ///
    /// Used to generate reference samples against which chain output is
    /// compared in tests and demos.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R, dim: usize) -> Vec<T> {
        (0..dim)
            .map(|_| {
                let z: T = rng.sample(StandardNormal);
                z * self.std
            })
            .collect()
    }
}

impl<T: Float> TargetDensity<T> for IsotropicGaussian<T> {
    /// Fully normalized log-density: `-‖x‖²/(2σ²) - (d/2) ln(2πσ²)`.
    fn log_density(&self, x: &[T]) -> T {
        let mut sum_sq = T::zero();
        for &xi in x.iter() {
            sum_sq = sum_sq + xi * xi;
        }
        let half = T::from(0.5).unwrap();
        let d = T::from(x.len()).unwrap();
        let var = self.std * self.std;
        let two_pi = T::from(2.0 * PI).unwrap();
        -half * sum_sq / var - d * half * (two_pi * var).ln()
    }
}

/**
The integrand `f(x) = exp(-‖x‖²)`, whose integral over all of ℝ^d is
π^(d/2). This is the ground-truth problem the estimators are tested
against.
*/
#[derive(Clone, Copy, Debug, Default)]
pub struct ExpNegSquaredNorm;

impl ExpNegSquaredNorm {
    /// Closed-form value of `∫ exp(-‖x‖²) dx` over ℝ^d.
    pub fn exact<T: Float>(dim: usize) -> T {
        let pi = T::from(PI).unwrap();
        let half = T::from(0.5).unwrap();
        pi.powf(T::from(dim).unwrap() * half)
    }
}

impl<T: Float> Integrand<T> for ExpNegSquaredNorm {
    fn eval(&self, x: &[T]) -> T {
        let mut sum_sq = T::zero();
        for &xi in x.iter() {
            sum_sq = sum_sq + xi * xi;
        }
        (-sum_sq).exp()
    }
}
