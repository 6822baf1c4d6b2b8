//! Surrogate modeling of the objective function.
//!
//! The optimization step only relies on the [`Surrogate`] and
//! [`SurrogateBuilder`] seams: any probabilistic regression model producing a
//! predictive mean and variance can back the acquisition criteria. The
//! default implementation is a [`GaussianProcess`] with a constant mean and a
//! squared exponential kernel.

mod algorithm;
pub(crate) mod utils;

pub use algorithm::{GaussianProcess, GpParams};

use crate::errors::Result;
use ndarray::{Array2, ArrayView2};

/// A fitted probabilistic surrogate of the objective function
pub trait Surrogate: Sync {
    /// Predictive mean at the given (n, nx) points as an (n, 1) array
    fn predict_values(&self, x: &ArrayView2<f64>) -> Result<Array2<f64>>;

    /// Predictive variance at the given (n, nx) points as an (n, 1) array of
    /// non-negative values
    fn predict_variances(&self, x: &ArrayView2<f64>) -> Result<Array2<f64>>;
}

/// Surrogate training seam used by the optimization step
///
/// Training may fail when hyperparameter fitting does not converge, which is
/// fatal to the current step.
pub trait SurrogateBuilder {
    type Model: Surrogate;

    /// Fit a surrogate on the given training dataset (x, y)
    fn train(&self, x: &ArrayView2<f64>, y: &ArrayView2<f64>) -> Result<Self::Model>;
}
