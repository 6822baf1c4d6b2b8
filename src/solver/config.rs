use crate::types::{InfillStrategy, InitStrategy, LocalOptimizer};
use serde::{Deserialize, Serialize};

/// Configuration of an optimization campaign.
///
/// Immutable for the lifetime of the [`Bo`](crate::solver::Bo) optimizer it
/// configures: one configuration per campaign.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoConfig {
    /// Acquisition criterion scored on the surrogate predictive distribution
    pub(crate) acq: InfillStrategy,
    /// Strategy generating the starts of the acquisition optimization
    pub(crate) init: InitStrategy,
    /// Small positive constant added to the predictive std denominator
    pub(crate) jitter: f64,
    /// Exploration weight of the UCB criterion
    pub(crate) kappa: f64,
    /// Grow the UCB exploration weight as `kappa * ln(n)` with history size n
    pub(crate) ucb_increased: bool,
    /// Number of starts of the multistart acquisition optimization
    pub(crate) n_start: usize,
    /// Total sample budget of the full-factorial grid initialization
    pub(crate) n_grid: usize,
    /// Local optimizer used to refine each start within bounds
    pub(crate) local_optimizer: LocalOptimizer,
    /// Evaluation cap of each local optimization run
    pub(crate) max_eval: usize,
    /// Seed of the campaign-owned random generator
    pub(crate) seed: Option<u64>,
    /// Log the per-start refinement results
    pub(crate) verbose: bool,
    /// Log internal values such as the generated starts
    pub(crate) debug: bool,
}

impl Default for BoConfig {
    fn default() -> Self {
        BoConfig {
            acq: InfillStrategy::Ei,
            init: InitStrategy::Uniform,
            jitter: 1e-5,
            kappa: 2.,
            ucb_increased: true,
            n_start: 100,
            n_grid: 100,
            local_optimizer: LocalOptimizer::Slsqp,
            max_eval: 200,
            seed: None,
            verbose: false,
            debug: false,
        }
    }
}

impl BoConfig {
    /// Set the acquisition criterion (default: EI)
    pub fn infill_strategy(mut self, acq: InfillStrategy) -> Self {
        self.acq = acq;
        self
    }

    /// Set the start generation strategy (default: uniform)
    pub fn init_strategy(mut self, init: InitStrategy) -> Self {
        self.init = init;
        self
    }

    /// Set the acquisition jitter (default: 1e-5)
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    /// Set the UCB exploration weight (default: 2)
    pub fn kappa(mut self, kappa: f64) -> Self {
        self.kappa = kappa;
        self
    }

    /// Enable or disable the increasing UCB exploration schedule (default: enabled)
    pub fn ucb_increased(mut self, increased: bool) -> Self {
        self.ucb_increased = increased;
        self
    }

    /// Set the number of acquisition optimization starts (default: 100)
    pub fn n_start(mut self, n_start: usize) -> Self {
        self.n_start = n_start;
        self
    }

    /// Set the grid initialization sample budget (default: 100)
    pub fn n_grid(mut self, n_grid: usize) -> Self {
        self.n_grid = n_grid;
        self
    }

    /// Set the local optimizer refining the starts (default: SLSQP)
    pub fn local_optimizer(mut self, optimizer: LocalOptimizer) -> Self {
        self.local_optimizer = optimizer;
        self
    }

    /// Set the evaluation cap of each local run (default: 200)
    pub fn max_eval(mut self, max_eval: usize) -> Self {
        self.max_eval = max_eval;
        self
    }

    /// Seed the campaign random generator for reproducibility
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Log per-start refinement results at info level
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Log internal values at debug level
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
