//! `smbo` is a sequential model-based optimization library for the
//! minimization of expensive black-box functions over a bounded continuous
//! domain.
//!
//! Each step fits a Gaussian process surrogate on the points evaluated so
//! far, scores an acquisition criterion on its predictive distribution and
//! maximizes that criterion with a bounded multistart local optimization to
//! pick the next point to evaluate. The library exposes an ask-and-tell
//! interface: the caller owns the evaluation loop and the observed history.
//!
//! # Features
//!
//! * acquisition criteria: probability of improvement, expected improvement
//!   and upper confidence bound ([`InfillStrategy`]);
//! * start generation strategies: uniform random, quasi-random Halton and
//!   full-factorial grid ([`InitStrategy`]);
//! * gradient-free (Cobyla) or gradient-based (Slsqp) local refinement of
//!   the acquisition optimum ([`LocalOptimizer`]);
//! * reproducible campaigns through a single owned, seedable random
//!   generator.
//!
//! # Example
//!
//! ```
//! use ndarray::{array, concatenate, Array2, ArrayView2, Axis};
//! use smbo::{BoBuilder, InfillStrategy};
//!
//! // expensive function to be minimized
//! fn xsinx(x: &ArrayView2<f64>) -> Array2<f64> {
//!     (x - 3.5) * ((x - 3.5) / std::f64::consts::PI).mapv(f64::sin)
//! }
//!
//! // initial evaluations
//! let mut x_data = array![[0.], [7.], [20.], [25.]];
//! let mut y_data = xsinx(&x_data.view());
//!
//! let mut bo = BoBuilder::optimize()
//!     .configure(|config| config.infill_strategy(InfillStrategy::Ei).n_start(15).seed(42))
//!     .min_within(&array![[0., 25.]])
//!     .expect("valid domain");
//!
//! // ask-and-tell loop: suggest, evaluate, append
//! for _ in 0..3 {
//!     let (x_next, _gp) = bo.suggest(&x_data, &y_data, None).expect("next point");
//!     let x_next = x_next.insert_axis(Axis(0));
//!     let y_next = xsinx(&x_next.view());
//!     x_data = concatenate![Axis(0), x_data, x_next];
//!     y_data = concatenate![Axis(0), y_data, y_next];
//! }
//!
//! let best = y_data.iter().cloned().fold(f64::INFINITY, f64::min);
//! assert!(best < 0.);
//! ```
pub mod criteria;
pub mod errors;
pub mod gp;
mod optimizers;
pub mod sampling;
pub mod solver;
pub mod types;
pub mod utils;

pub use crate::errors::{Result, SmboError};
pub use crate::gp::{GaussianProcess, GpParams, Surrogate, SurrogateBuilder};
pub use crate::solver::{Bo, BoBuilder, BoConfig};
pub use crate::types::{InfillStrategy, InitStrategy, LocalOptimizer};
