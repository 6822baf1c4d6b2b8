use crate::errors::{Result, SmboError};
use crate::gp::{GpParams, Surrogate, SurrogateBuilder};
use crate::optimizers::Optimizer;
use crate::sampling::{FullFactorial, Halton, Random, SamplingMethod};
use crate::solver::BoConfig;
use crate::types::{InfillStrategy, InitStrategy};
use crate::utils::select_best;
use finitediff::FiniteDiff;
use log::{debug, info};
use ndarray::{Array1, Array2, ArrayBase, ArrayView, ArrayView1, ArrayView2, Axis, Data, Ix2};
use ndarray_rand::rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use rayon::prelude::*;

/// Fixed positive multiplier keeping acquisition magnitudes well conditioned
/// for the local optimizer. It does not change the location of the optimum.
const ACQ_MULTIPLIER: f64 = 10.;

/// Builder of a [`Bo`] optimizer following the configure-then-bind pattern:
///
/// ```
/// use ndarray::array;
/// use smbo::{BoBuilder, InfillStrategy};
///
/// let _bo = BoBuilder::optimize()
///     .configure(|config| config.infill_strategy(InfillStrategy::Ei).seed(42))
///     .min_within(&array![[0., 25.]])
///     .expect("optimizer configured");
/// ```
pub struct BoBuilder {
    config: BoConfig,
}

impl BoBuilder {
    pub fn optimize() -> Self {
        BoBuilder {
            config: BoConfig::default(),
        }
    }

    /// Configure the optimizer with a closure taking and returning a [`BoConfig`]
    pub fn configure<F: FnOnce(BoConfig) -> BoConfig>(mut self, init: F) -> Self {
        self.config = init(self.config);
        self
    }

    /// Bind the optimizer to the continuous domain `xlimits` specified as a
    /// (nx, 2) matrix \[\[lower, upper\], ...\], with the default Gaussian
    /// process surrogate.
    pub fn min_within(
        self,
        xlimits: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    ) -> Result<Bo<GpParams>> {
        self.min_within_with_surrogate(xlimits, GpParams::default())
    }

    /// Bind the optimizer to the domain with a custom surrogate builder
    pub fn min_within_with_surrogate<SB: SurrogateBuilder>(
        self,
        xlimits: &ArrayBase<impl Data<Elem = f64>, Ix2>,
        surrogate_builder: SB,
    ) -> Result<Bo<SB>> {
        if xlimits.ncols() != 2 {
            return Err(SmboError::InvalidValue(format!(
                "xlimits expected as a (nx, 2) matrix, got {} columns",
                xlimits.ncols()
            )));
        }
        if xlimits.nrows() == 0 {
            return Err(SmboError::InvalidValue(
                "empty search domain".to_string(),
            ));
        }
        for (i, row) in xlimits.outer_iter().enumerate() {
            if row[0] > row[1] {
                return Err(SmboError::InvalidValue(format!(
                    "invalid bounds [{}, {}] for dimension {i}",
                    row[0], row[1]
                )));
            }
        }
        let rng = match self.config.seed {
            Some(seed) => Xoshiro256Plus::seed_from_u64(seed),
            None => Xoshiro256Plus::from_entropy(),
        };
        Ok(Bo {
            config: self.config,
            xlimits: xlimits.to_owned(),
            surrogate_builder,
            rng,
        })
    }
}

/// Sequential model-based optimizer with an ask-and-tell interface.
///
/// One [`suggest`](Bo::suggest) call performs one optimization step: it fits
/// the surrogate on the observed history, maximizes the configured
/// acquisition criterion with a bounded multistart local optimization, and
/// returns the next most promising point together with the fitted surrogate.
/// The caller keeps control of the loop: it evaluates the true objective at
/// the suggestion and appends the outcome to the history before the next
/// call.
pub struct Bo<SB: SurrogateBuilder = GpParams> {
    config: BoConfig,
    xlimits: Array2<f64>,
    surrogate_builder: SB,
    /// Campaign-owned random generator: seeding it at configuration time is
    /// the only way randomness enters a campaign
    rng: Xoshiro256Plus,
}

impl<SB: SurrogateBuilder> Bo<SB> {
    /// Suggest the next point to evaluate given the observed history.
    ///
    /// `x_data` is the (n, nx) matrix of evaluated points and `y_data` the
    /// (n, 1) column of outcomes, n >= 1. `init` overrides the configured
    /// start generation strategy for this call when given.
    ///
    /// Returns the suggested point together with the surrogate fitted on the
    /// history, usable for diagnostics without refitting.
    pub fn suggest(
        &mut self,
        x_data: &ArrayBase<impl Data<Elem = f64>, Ix2>,
        y_data: &ArrayBase<impl Data<Elem = f64>, Ix2>,
        init: Option<InitStrategy>,
    ) -> Result<(Array1<f64>, SB::Model)> {
        let nx = self.xlimits.nrows();
        if x_data.ncols() != nx {
            return Err(SmboError::InvalidValue(format!(
                "observed points dimension {} does not match domain dimension {nx}",
                x_data.ncols()
            )));
        }
        if y_data.ncols() != 1 {
            return Err(SmboError::InvalidValue(format!(
                "observed outcomes expected as a (n, 1) column, got {} columns",
                y_data.ncols()
            )));
        }
        if x_data.nrows() != y_data.nrows() {
            return Err(SmboError::InvalidValue(format!(
                "observed history size mismatch: {} points vs {} outcomes",
                x_data.nrows(),
                y_data.nrows()
            )));
        }
        if x_data.nrows() == 0 {
            return Err(SmboError::InvalidValue(
                "observed history is empty".to_string(),
            ));
        }
        let init = init.unwrap_or(self.config.init);
        if init == InitStrategy::Structured {
            // named, expected condition: halts the step, never a silent fallback
            return Err(SmboError::NotImplemented(
                "structured initialization".to_string(),
            ));
        }

        let model = self
            .surrogate_builder
            .train(&x_data.view(), &y_data.view())?;

        let (acq, jitter, kappa, ucb_increased) = (
            self.config.acq,
            self.config.jitter,
            self.config.kappa,
            self.config.ucb_increased,
        );
        let y_train = y_data.view();
        // Negated scaled acquisition: the local optimizer minimizes while the
        // criterion is to be maximized
        let obj = |x: &[f64], gradient: Option<&mut [f64]>, _u: &mut ()| -> f64 {
            if let Some(grad) = gradient {
                let f = |x: &Vec<f64>| {
                    eval_acq_obj(x, &model, &y_train, acq, jitter, kappa, ucb_increased)
                };
                grad[..].copy_from_slice(&x.to_vec().central_diff(&f));
            }
            eval_acq_obj(x, &model, &y_train, acq, jitter, kappa, ucb_increased)
        };
        let fobj = |row: &ArrayView1<f64>| obj(&row.to_vec(), None, &mut ());

        let starts = self.get_initial(init, &fobj)?;
        if self.config.debug {
            debug!("{init} initialization produced starts {starts}");
        }

        let xlimits = &self.xlimits;
        let (algo, max_eval, verbose) = (
            self.config.local_optimizer,
            self.config.max_eval,
            self.config.verbose,
        );
        // Independent runs: parallel map over start indices, results
        // collected by index to keep the selection tie-break deterministic
        let refined: Vec<Array1<f64>> = (0..starts.nrows())
            .into_par_iter()
            .map(|i| {
                let (y_opt, x_opt) = Optimizer::new(algo, &obj, xlimits)
                    .xinit(&starts.row(i))
                    .max_eval(max_eval)
                    .ftol_rel(1e-4)
                    .ftol_abs(1e-4)
                    .minimize();
                if verbose {
                    info!("refined start {i} to {x_opt} (objective {y_opt})");
                }
                // keep refined points within the domain against numerical overshoot
                let mut x_opt = x_opt;
                for (j, v) in x_opt.iter_mut().enumerate() {
                    *v = v.max(xlimits[[j, 0]]).min(xlimits[[j, 1]]);
                }
                x_opt
            })
            .collect();

        let mut candidates = Array2::zeros((refined.len(), nx));
        for (i, x) in refined.iter().enumerate() {
            candidates.row_mut(i).assign(x);
        }
        let (best_index, next_point) = select_best(&candidates, &fobj);
        // an infinite value means every run failed; NaN from a zero-jitter
        // configuration is degenerate but defined and passes through
        if fobj(&next_point.view()) == f64::INFINITY {
            return Err(SmboError::LocalOptimization(
                "no refinement run produced a usable acquisition value".to_string(),
            ));
        }
        if verbose {
            info!("next point {next_point} selected from start {best_index}");
        }
        Ok((next_point, model))
    }

    /// Generate the initial candidates of the multistart acquisition
    /// optimization according to the selected strategy.
    fn get_initial(
        &mut self,
        init: InitStrategy,
        fobj: &dyn Fn(&ArrayView1<f64>) -> f64,
    ) -> Result<Array2<f64>> {
        match init {
            InitStrategy::Grid => {
                // the grid is reduced to its best point: one refined start
                let doe = FullFactorial::new(&self.xlimits).sample(self.config.n_grid);
                let (_, best) = select_best(&doe, fobj);
                Ok(best.insert_axis(Axis(0)))
            }
            InitStrategy::Uniform => {
                let rng = self.rng.clone();
                self.rng.jump();
                Ok(Random::new_with_rng(&self.xlimits, rng).sample(self.config.n_start))
            }
            InitStrategy::QuasiRandom => {
                let offset = self.rng.gen_range(0..10000);
                if self.config.debug {
                    debug!("quasirandom initialization with sequence offset {offset}");
                }
                Ok(Halton::new(&self.xlimits)
                    .with_offset(offset)
                    .sample(self.config.n_start))
            }
            InitStrategy::Structured => Err(SmboError::NotImplemented(
                "structured initialization".to_string(),
            )),
        }
    }
}

/// Evaluate the negated scaled acquisition criterion at a single point.
///
/// Surrogate prediction failures map to an infinite value so the affected
/// run never wins the best-of-starts selection.
fn eval_acq_obj<M: Surrogate>(
    x: &[f64],
    model: &M,
    y_train: &ArrayView2<f64>,
    acq: InfillStrategy,
    jitter: f64,
    kappa: f64,
    ucb_increased: bool,
) -> f64 {
    let pt = ArrayView::from_shape((1, x.len()), x).unwrap();
    let mean = match model.predict_values(&pt) {
        Ok(mean) => mean,
        Err(_) => return f64::INFINITY,
    };
    let std = match model.predict_variances(&pt) {
        Ok(var) => var.mapv(f64::sqrt),
        Err(_) => return f64::INFINITY,
    };
    match acq.value(
        &mean.column(0),
        &std.column(0),
        y_train,
        jitter,
        kappa,
        ucb_increased,
    ) {
        Ok(vals) => -ACQ_MULTIPLIER * vals[0],
        Err(_) => f64::INFINITY,
    }
}
