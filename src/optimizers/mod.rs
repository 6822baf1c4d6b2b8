//! Bound-constrained local optimization of the acquisition objective.

mod optimizer;

pub(crate) use optimizer::Optimizer;
