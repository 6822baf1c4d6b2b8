use thiserror::Error;

/// A result type for sequential model-based optimization errors
pub type Result<T> = std::result::Result<T, SmboError>;

/// An error raised during an optimization step
#[derive(Error, Debug)]
pub enum SmboError {
    /// When an argument violates a shape, bounds or naming contract
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    /// When a named but deliberately unimplemented strategy is selected
    #[error("Not implemented: {0}")]
    NotImplemented(String),
    /// When likelihood computation fails while fitting the surrogate
    #[error("Likelihood computation error: {0}")]
    LikelihoodComputation(String),
    /// When no acquisition refinement run produces a usable point
    #[error("Local optimization failure: {0}")]
    LocalOptimization(String),
    /// When linear algebra computation fails
    #[error(transparent)]
    LinalgError(#[from] linfa_linalg::LinalgError),
}
