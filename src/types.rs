use crate::errors::SmboError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Acquisition criterion used to select the next promising point
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfillStrategy {
    /// Probability of Improvement
    Pi,
    /// Expected Improvement
    Ei,
    /// Upper Confidence Bound
    Ucb,
}

impl FromStr for InfillStrategy {
    type Err = SmboError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pi" => Ok(InfillStrategy::Pi),
            "ei" => Ok(InfillStrategy::Ei),
            "ucb" => Ok(InfillStrategy::Ucb),
            _ => Err(SmboError::InvalidValue(format!(
                "unknown acquisition criterion '{s}', expected one of pi, ei, ucb"
            ))),
        }
    }
}

impl fmt::Display for InfillStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InfillStrategy::Pi => write!(f, "pi"),
            InfillStrategy::Ei => write!(f, "ei"),
            InfillStrategy::Ucb => write!(f, "ucb"),
        }
    }
}

/// Strategy used to generate the initial candidates of the multistart
/// acquisition optimization
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitStrategy {
    /// Deterministic full-factorial design, reduced to its best point
    Grid,
    /// Independent uniform draws within the domain bounds
    Uniform,
    /// Halton low-discrepancy sequence rescaled into the domain bounds
    QuasiRandom,
    /// Latin-hypercube style design, deliberately unimplemented
    Structured,
}

impl FromStr for InitStrategy {
    type Err = SmboError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grid" => Ok(InitStrategy::Grid),
            "uniform" => Ok(InitStrategy::Uniform),
            "quasirandom" => Ok(InitStrategy::QuasiRandom),
            "structured" => Ok(InitStrategy::Structured),
            _ => Err(SmboError::InvalidValue(format!(
                "unknown initialization strategy '{s}', \
                 expected one of grid, uniform, quasirandom, structured"
            ))),
        }
    }
}

impl fmt::Display for InitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InitStrategy::Grid => write!(f, "grid"),
            InitStrategy::Uniform => write!(f, "uniform"),
            InitStrategy::QuasiRandom => write!(f, "quasirandom"),
            InitStrategy::Structured => write!(f, "structured"),
        }
    }
}

/// Local optimizer used to refine the acquisition starts within bounds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocalOptimizer {
    /// Cobyla optimizer (gradient free)
    Cobyla,
    /// SLSQP optimizer (gradient from finite differences)
    Slsqp,
}

/// A function trait for the acquisition objective handled by local optimizers
///
/// Arguments:
/// * `x` the point at which the function is evaluated
/// * `g` an optional gradient to be updated if present
/// * `u` information provided by the user
pub trait ObjFn<U>: Fn(&[f64], Option<&mut [f64]>, &mut U) -> f64 {}
impl<T, U> ObjFn<U> for T where T: Fn(&[f64], Option<&mut [f64]>, &mut U) -> f64 {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infill_strategy_from_str() {
        assert_eq!("ei".parse::<InfillStrategy>().unwrap(), InfillStrategy::Ei);
        assert_eq!("pi".parse::<InfillStrategy>().unwrap(), InfillStrategy::Pi);
        assert_eq!(
            "ucb".parse::<InfillStrategy>().unwrap(),
            InfillStrategy::Ucb
        );
        assert!(matches!(
            "xyz".parse::<InfillStrategy>(),
            Err(SmboError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_init_strategy_from_str() {
        assert_eq!(
            "uniform".parse::<InitStrategy>().unwrap(),
            InitStrategy::Uniform
        );
        assert!(matches!(
            "latin".parse::<InitStrategy>(),
            Err(SmboError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_roundtrip_display() {
        for s in ["grid", "uniform", "quasirandom", "structured"] {
            assert_eq!(s.parse::<InitStrategy>().unwrap().to_string(), s);
        }
    }
}
