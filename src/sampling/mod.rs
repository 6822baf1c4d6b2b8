//! Candidate generation strategies over a bounded search domain.
//!
//! All strategies implement [`SamplingMethod`]: they produce points in the
//! `[0, 1]^nx` hypercube which are then rescaled into the domain bounds.

mod full_factorial;
mod halton;
mod random;
mod traits;

pub use full_factorial::FullFactorial;
pub use halton::Halton;
pub use random::Random;
pub use traits::SamplingMethod;
