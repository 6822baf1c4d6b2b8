use crate::types::{LocalOptimizer, ObjFn};
use cobyla::RhoBeg;
use ndarray::{arr1, Array1, Array2, ArrayView1};

/// Facade for the bound-constrained local optimization algorithms used to
/// refine acquisition starts.
///
/// A failed run yields an infinite objective value at its start point, so it
/// never wins the best-of-starts selection.
pub(crate) struct Optimizer<'a> {
    algo: LocalOptimizer,
    fun: &'a (dyn ObjFn<()> + Sync),
    bounds: Array2<f64>,
    max_eval: usize,
    xinit: Option<Array1<f64>>,
    ftol_abs: Option<f64>,
    ftol_rel: Option<f64>,
}

impl<'a> Optimizer<'a> {
    pub fn new(
        algo: LocalOptimizer,
        fun: &'a (dyn ObjFn<()> + Sync),
        bounds: &Array2<f64>,
    ) -> Self {
        Optimizer {
            algo,
            fun,
            bounds: bounds.clone(),
            max_eval: 200,
            xinit: None,
            ftol_abs: None,
            ftol_rel: None,
        }
    }

    pub fn ftol_abs(&mut self, ftol_abs: f64) -> &mut Self {
        self.ftol_abs = Some(ftol_abs);
        self
    }

    pub fn ftol_rel(&mut self, ftol_rel: f64) -> &mut Self {
        self.ftol_rel = Some(ftol_rel);
        self
    }

    pub fn max_eval(&mut self, max_eval: usize) -> &mut Self {
        self.max_eval = max_eval;
        self
    }

    pub fn xinit(&mut self, xinit: &ArrayView1<f64>) -> &mut Self {
        self.xinit = Some(xinit.to_owned());
        self
    }

    pub fn minimize(&self) -> (f64, Array1<f64>) {
        let xinit = self
            .xinit
            .clone()
            .unwrap_or_else(|| self.bounds.column(0).to_owned())
            .to_vec();
        let bounds: Vec<_> = self
            .bounds
            .outer_iter()
            .map(|row| (row[0], row[1]))
            .collect();
        match self.algo {
            LocalOptimizer::Cobyla => {
                let cstrs: Vec<&dyn cobyla::Func<()>> = vec![];
                let res = cobyla::minimize(
                    |x: &[f64], u: &mut ()| (self.fun)(x, None, u),
                    &xinit,
                    &bounds,
                    &cstrs,
                    (),
                    self.max_eval,
                    RhoBeg::All(0.5),
                    Some(cobyla::StopTols {
                        ftol_rel: self.ftol_rel.unwrap_or(0.0),
                        ftol_abs: self.ftol_abs.unwrap_or(0.0),
                        ..cobyla::StopTols::default()
                    }),
                );
                match res {
                    Ok((_, x_opt, y_opt)) => (y_opt, arr1(&x_opt)),
                    Err((_, x_opt, _)) => (f64::INFINITY, arr1(&x_opt)),
                }
            }
            LocalOptimizer::Slsqp => {
                let cstrs: Vec<&(dyn ObjFn<()> + Sync)> = vec![];
                let res = slsqp::minimize(
                    self.fun,
                    &xinit,
                    &bounds,
                    &cstrs,
                    (),
                    self.max_eval,
                    Some(slsqp::StopTols {
                        ftol_rel: self.ftol_rel.unwrap_or(0.0),
                        ftol_abs: self.ftol_abs.unwrap_or(0.0),
                        ..slsqp::StopTols::default()
                    }),
                );
                match res {
                    Ok((_, x_opt, y_opt)) => (y_opt, arr1(&x_opt)),
                    Err((_, x_opt, _)) => (f64::INFINITY, arr1(&x_opt)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use finitediff::FiniteDiff;
    use ndarray::array;

    fn paraboloid(x: &[f64], gradient: Option<&mut [f64]>, _u: &mut ()) -> f64 {
        if let Some(grad) = gradient {
            let f = |x: &Vec<f64>| (x[0] - 1.).powi(2);
            grad[..].copy_from_slice(&x.to_vec().central_diff(&f));
        }
        (x[0] - 1.).powi(2)
    }

    #[test]
    fn test_cobyla_minimize() {
        let bounds = array![[-5., 5.]];
        let (y_opt, x_opt) = Optimizer::new(LocalOptimizer::Cobyla, &paraboloid, &bounds)
            .xinit(&array![4.].view())
            .max_eval(200)
            .ftol_rel(1e-6)
            .minimize();
        assert_abs_diff_eq!(x_opt[0], 1., epsilon = 1e-2);
        assert!(y_opt < 1e-3);
    }

    #[test]
    fn test_slsqp_minimize() {
        let bounds = array![[-5., 5.]];
        let (_, x_opt) = Optimizer::new(LocalOptimizer::Slsqp, &paraboloid, &bounds)
            .xinit(&array![4.].view())
            .max_eval(200)
            .ftol_rel(1e-6)
            .minimize();
        assert_abs_diff_eq!(x_opt[0], 1., epsilon = 1e-2);
    }

    #[test]
    fn test_bounds_are_respected() {
        // unconstrained minimum at x = 7 lies outside the bounds
        let f = |x: &[f64], _g: Option<&mut [f64]>, _u: &mut ()| (x[0] - 7.).powi(2);
        let bounds = array![[-5., 5.]];
        let (_, x_opt) = Optimizer::new(LocalOptimizer::Cobyla, &f, &bounds)
            .xinit(&array![0.].view())
            .minimize();
        assert!(x_opt[0] <= 5. + 1e-6);
        assert_abs_diff_eq!(x_opt[0], 5., epsilon = 1e-2);
    }
}
