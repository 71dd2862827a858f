//! Chain-running scaffolding shared by the samplers, plus the crate error type.

use indicatif::{ProgressBar, ProgressStyle};
use ndarray::{Array2, ArrayView1, Axis};
use num_traits::Float;
use thiserror::Error;

/// Errors reported by samplers and estimators.
///
/// All failures are local and synchronous: a call either returns a complete,
/// internally consistent result or one of these. Nothing is retried.
#[derive(Debug, Error)]
pub enum McError {
    /// A caller-supplied parameter is outside its domain (non-positive
    /// proposal width, zero sweeps, malformed bounds, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The target density vanished or was NaN at a point where a finite
    /// ratio is required.
    #[error("degenerate density at sample {index}: {reason}")]
    DegenerateDensity { index: usize, reason: String },

    /// Burn-in/thinning left fewer samples than the computation needs.
    #[error("insufficient samples: got {got}, need at least {need}")]
    InsufficientSamples { got: usize, need: usize },
}

pub trait MarkovChain<T> {
    /// Does one transition of the chain, returning the new current state.
    fn step(&mut self) -> &[T];

    /// Current state without stepping.
    fn current_state(&self) -> &[T];
}

/// Runs `chain` for `n_steps` transitions, recording one row per transition.
pub fn run_chain<T, M>(chain: &mut M, n_steps: usize) -> Array2<T>
where
    M: MarkovChain<T>,
    T: Float,
{
    let dim = chain.current_state().len();
    let mut out = Array2::<T>::zeros((n_steps, dim));

    for i in 0..n_steps {
        let state = chain.step();
        out.row_mut(i).assign(&ArrayView1::from(state));
    }

    out
}

/// Same as [`run_chain`], but keeps a progress bar updated while running.
pub fn run_chain_with_progress<T, M>(chain: &mut M, n_steps: usize, pb: &ProgressBar) -> Array2<T>
where
    M: MarkovChain<T>,
    T: Float,
{
    let dim = chain.current_state().len();
    let mut out = Array2::<T>::zeros((n_steps, dim));

    pb.set_length(n_steps as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{prefix} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .expect("Expected valid progress bar template")
            .progress_chars("##-"),
    );

    for i in 0..n_steps {
        let state = chain.step();
        out.row_mut(i).assign(&ArrayView1::from(state));
        pb.inc(1);
    }

    out
}

/// Applies thinning, then burn-in, to a matrix of recorded states.
///
/// Keeps every `thinning`-th row starting at row 0, then drops the first
/// `burn_in` rows of what remains. Burn-in therefore counts post-thinning
/// rows. An empty result is reported as [`McError::InsufficientSamples`]
/// rather than returned as an empty matrix.
pub fn thin_then_burn<T: Clone>(
    samples: &Array2<T>,
    thinning: usize,
    burn_in: usize,
) -> Result<Array2<T>, McError> {
    if thinning == 0 {
        return Err(McError::InvalidInput(
            "thinning must be at least 1".to_string(),
        ));
    }

    let kept: Vec<usize> = (0..samples.nrows()).step_by(thinning).skip(burn_in).collect();
    if kept.is_empty() {
        let thinned = samples.nrows().div_ceil(thinning);
        return Err(McError::InsufficientSamples {
            got: thinned,
            need: burn_in + 1,
        });
    }

    Ok(samples.select(Axis(0), &kept))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    struct Counter {
        state: Vec<f64>,
    }

    impl MarkovChain<f64> for Counter {
        fn step(&mut self) -> &[f64] {
            for x in self.state.iter_mut() {
                *x += 1.0;
            }
            &self.state
        }

        fn current_state(&self) -> &[f64] {
            &self.state
        }
    }

    #[test]
    fn run_chain_records_each_step() {
        let mut chain = Counter {
            state: vec![0.0, 10.0],
        };
        let out = run_chain(&mut chain, 3);
        assert_eq!(out, arr2(&[[1.0, 11.0], [2.0, 12.0], [3.0, 13.0]]));
    }

    #[test]
    fn thinning_then_burn_in_order() {
        // 10 recorded sweeps, stride 3 keeps rows {0, 3, 6, 9}; burn-in then
        // drops the first two of those, leaving rows 6 and 9.
        let samples = Array2::from_shape_fn((10, 1), |(i, _)| i as f64);
        let kept = thin_then_burn(&samples, 3, 2).unwrap();
        assert_eq!(kept, arr2(&[[6.0], [9.0]]));
    }

    #[test]
    fn burn_in_consuming_everything_is_an_error() {
        let samples = Array2::from_shape_fn((10, 1), |(i, _)| i as f64);
        let err = thin_then_burn(&samples, 3, 4).unwrap_err();
        match err {
            McError::InsufficientSamples { got, need } => {
                assert_eq!(got, 4);
                assert_eq!(need, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zero_thinning_is_invalid() {
        let samples = Array2::from_shape_fn((4, 1), |(i, _)| i as f64);
        assert!(matches!(
            thin_then_burn(&samples, 0, 0),
            Err(McError::InvalidInput(_))
        ));
    }
}
