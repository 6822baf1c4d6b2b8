use crate::errors::{Result, SmboError};
use crate::gp::utils::{pairwise_differences, squared_exponential, DiffMatrix, NormalizedData};
use crate::gp::{Surrogate, SurrogateBuilder};
use linfa_linalg::{cholesky::*, qr::*, svd::*, triangular::*};
use log::{debug, warn};
use ndarray::{arr1, Array1, Array2, ArrayBase, ArrayView2, Axis, Data, Ix2};

/// Gaussian process internal fitted parameters
#[derive(Debug, Clone)]
pub(crate) struct GpInnerParams {
    /// Gaussian process variance
    sigma2: f64,
    /// Generalized least-squares regression weight of the constant mean
    beta: Array2<f64>,
    /// Gaussian process weights
    gamma: Array2<f64>,
    /// Cholesky decomposition of the correlation matrix \[R\]
    r_chol: Array2<f64>,
    /// Solution of the linear equation system \[R\] x Ft = F
    ft: Array2<f64>,
    /// R upper triangle matrix of the QR decomposition of Ft
    ft_qr_r: Array2<f64>,
}

/// Parameters of the Gaussian process surrogate with a constant mean and a
/// squared exponential correlation kernel.
#[derive(Debug, Clone)]
pub struct GpParams {
    /// Initial correlation length hyperparameter used as first multistart point
    theta_init: f64,
    /// Bounds of the correlation length hyperparameter
    theta_bounds: (f64, f64),
    /// Number of multistart points of the likelihood optimization
    n_start: usize,
    /// Nugget factor added to the correlation matrix diagonal for numerical stability
    nugget: f64,
}

impl Default for GpParams {
    fn default() -> GpParams {
        GpParams {
            theta_init: 1e-2,
            theta_bounds: (1e-6, 20.),
            n_start: 8,
            nugget: 100. * f64::EPSILON,
        }
    }
}

impl GpParams {
    pub fn new() -> GpParams {
        GpParams::default()
    }

    /// Set the initial hyperparameter guess
    pub fn initial_theta(mut self, theta_init: f64) -> Self {
        self.theta_init = theta_init;
        self
    }

    /// Set the hyperparameter search interval
    pub fn theta_bounds(mut self, bounds: (f64, f64)) -> Self {
        self.theta_bounds = bounds;
        self
    }

    /// Set the number of likelihood optimization restarts
    pub fn n_start(mut self, n_start: usize) -> Self {
        self.n_start = n_start;
        self
    }

    /// Set the nugget factor
    pub fn nugget(mut self, nugget: f64) -> Self {
        self.nugget = nugget;
        self
    }

    /// Fit the Gaussian process on the given training data.
    ///
    /// Hyperparameters are fitted by maximizing the reduced likelihood with a
    /// multistart Cobyla optimization over log10(theta).
    pub fn fit(
        &self,
        x: &ArrayBase<impl Data<Elem = f64>, Ix2>,
        y: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    ) -> Result<GaussianProcess> {
        if y.ncols() != 1 {
            return Err(SmboError::InvalidValue(format!(
                "training outcomes expected as a (n, 1) column, got {} columns",
                y.ncols()
            )));
        }
        if x.nrows() != y.nrows() {
            return Err(SmboError::InvalidValue(format!(
                "training set size mismatch: {} points vs {} outcomes",
                x.nrows(),
                y.nrows()
            )));
        }
        if x.nrows() == 0 {
            return Err(SmboError::InvalidValue(
                "cannot fit on an empty training set".to_string(),
            ));
        }

        let xtrain = NormalizedData::new(x);
        let ytrain = NormalizedData::new(y);
        let x_distances = DiffMatrix::new(&xtrain.data);
        let fx: Array2<f64> = Array2::ones((xtrain.data.nrows(), 1));

        let base: f64 = 10.;
        let objfn = |t: &[f64], _u: &mut ()| -> f64 {
            let theta = arr1(t).mapv(|v| base.powf(v));
            let rxx = squared_exponential(&x_distances.d, &theta);
            match reduced_likelihood(&fx, rxx, &x_distances, &ytrain, self.nugget) {
                Ok((lkh, _)) => -lkh,
                Err(_) => f64::INFINITY,
            }
        };

        // Optimize on log10(theta), multistart points spread over the bounds
        let nx = x.ncols();
        let (lo, up) = self.theta_bounds;
        let bounds = vec![(lo.log10(), up.log10()); nx];
        let mut theta0s = Array2::zeros((self.n_start + 1, nx));
        theta0s
            .row_mut(0)
            .assign(&Array1::from_elem(nx, self.theta_init.log10()));
        let spread = Array1::linspace(lo.log10(), up.log10(), self.n_start);
        for (i, &v) in spread.iter().enumerate() {
            theta0s.row_mut(i + 1).assign(&Array1::from_elem(nx, v));
        }

        let mut best: (f64, Array1<f64>) = (f64::INFINITY, theta0s.row(0).to_owned());
        for theta0 in theta0s.outer_iter() {
            let (fval, theta_opt) = optimize_theta(&objfn, &theta0.to_owned(), &bounds);
            if fval < best.0 {
                best = (fval, theta_opt);
            }
        }
        if !best.0.is_finite() {
            return Err(SmboError::LikelihoodComputation(
                "hyperparameter fitting did not converge".to_string(),
            ));
        }
        let opt_theta = best.1.mapv(|v| base.powf(v));
        debug!("GP fitted with theta={opt_theta} (likelihood={})", -best.0);

        let rxx = squared_exponential(&x_distances.d, &opt_theta);
        let (_, inner_params) = reduced_likelihood(&fx, rxx, &x_distances, &ytrain, self.nugget)?;
        Ok(GaussianProcess {
            theta: opt_theta,
            inner_params,
            xtrain,
            ytrain,
        })
    }
}

/// Optimize the likelihood objective from one start with Cobyla.
/// Returns the best function value and its location in log10(theta) space.
fn optimize_theta<F>(objfn: F, theta0: &Array1<f64>, bounds: &[(f64, f64)]) -> (f64, Array1<f64>)
where
    F: Fn(&[f64], &mut ()) -> f64,
{
    use cobyla::{minimize, Func, RhoBeg, StopTols};

    let cons: Vec<&dyn Func<()>> = vec![];
    let theta_init = theta0.to_vec();

    match minimize(
        |x, u| objfn(x, u),
        &theta_init,
        bounds,
        &cons,
        (),
        200,
        RhoBeg::All(0.5),
        Some(StopTols {
            ftol_rel: 1e-4,
            ..StopTols::default()
        }),
    ) {
        Ok((_, x_opt, fval)) => {
            let fval = if f64::is_nan(fval) {
                f64::INFINITY
            } else {
                fval
            };
            (fval, arr1(&x_opt))
        }
        Err((status, x_opt, _)) => {
            warn!("Cobyla error in GP hyperparameter optimization, status={status:?}");
            (f64::INFINITY, arr1(&x_opt))
        }
    }
}

/// A Gaussian process fitted on normalized training data.
///
/// An immutable value object: a fresh one is produced by each fit, prediction
/// never mutates it.
#[derive(Debug, Clone)]
pub struct GaussianProcess {
    /// Correlation length hyperparameters (one per input dimension)
    theta: Array1<f64>,
    /// Fitted internal parameters
    inner_params: GpInnerParams,
    /// Training inputs
    xtrain: NormalizedData,
    /// Training outputs
    ytrain: NormalizedData,
}

impl GaussianProcess {
    pub fn params() -> GpParams {
        GpParams::default()
    }

    /// Fitted correlation length hyperparameters
    pub fn theta(&self) -> &Array1<f64> {
        &self.theta
    }

    /// Predict the process mean at the given (n, nx) points
    pub fn predict_values(
        &self,
        x: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    ) -> Result<Array2<f64>> {
        let xnorm = (x - &self.xtrain.mean) / &self.xtrain.std;
        let corr = self.compute_correlation(&xnorm);
        let f: Array2<f64> = Array2::ones((x.nrows(), 1));
        // Scaled predictor
        let y_ = &f.dot(&self.inner_params.beta) + &corr.dot(&self.inner_params.gamma);
        // Predictor
        Ok(&y_ * &self.ytrain.std + &self.ytrain.mean)
    }

    /// Predict the process variance at the given (n, nx) points
    pub fn predict_variances(
        &self,
        x: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    ) -> Result<Array2<f64>> {
        let xnorm = (x - &self.xtrain.mean) / &self.xtrain.std;
        let corr = self.compute_correlation(&xnorm);
        let inners = &self.inner_params;

        let corr_t = corr.t().to_owned();
        let rt = inners.r_chol.solve_triangular(&corr_t, UPLO::Lower)?;
        let f: Array2<f64> = Array2::ones((x.nrows(), 1));
        let rhs = inners.ft.t().dot(&rt) - f.t();
        let u = inners.ft_qr_r.t().solve_triangular(&rhs, UPLO::Lower)?;

        let b: Array1<f64> = Array1::ones(rt.ncols()) - rt.mapv(|v| v * v).sum_axis(Axis(0))
            + u.mapv(|v| v * v).sum_axis(Axis(0));
        let mut mse = b.insert_axis(Axis(1));
        mse.mapv_inplace(|v| inners.sigma2 * v);

        // Mean squared error might be slightly negative depending on machine
        // precision: set to zero in that case
        Ok(mse.mapv(|v| if v < 0. { 0. } else { v }))
    }

    /// Correlation between normalized query points and the training set
    fn compute_correlation(&self, xnorm: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Array2<f64> {
        // Pairwise componentwise L1-distances to the input training set
        let dx = pairwise_differences(xnorm, &self.xtrain.data);
        let r = squared_exponential(&dx, &self.theta);
        let n_obs = xnorm.nrows();
        let nt = self.xtrain.data.nrows();
        r.into_shape((n_obs, nt)).unwrap().to_owned()
    }
}

impl Surrogate for GaussianProcess {
    fn predict_values(&self, x: &ArrayView2<f64>) -> Result<Array2<f64>> {
        GaussianProcess::predict_values(self, x)
    }

    fn predict_variances(&self, x: &ArrayView2<f64>) -> Result<Array2<f64>> {
        GaussianProcess::predict_variances(self, x)
    }
}

impl SurrogateBuilder for GpParams {
    type Model = GaussianProcess;

    fn train(&self, x: &ArrayView2<f64>, y: &ArrayView2<f64>) -> Result<GaussianProcess> {
        self.fit(x, y)
    }
}

/// Compute the reduced likelihood and the associated fitted parameters.
///
/// * `fx`: constant mean regressors at the training points,
/// * `rxx`: correlation factors at the training points,
/// * `x_distances`: pairwise distances between training points,
/// * `ytrain`: normalized training outcomes,
/// * `nugget`: diagonal factor improving numerical stability.
fn reduced_likelihood(
    fx: &Array2<f64>,
    rxx: Array2<f64>,
    x_distances: &DiffMatrix,
    ytrain: &NormalizedData,
    nugget: f64,
) -> Result<(f64, GpInnerParams)> {
    // Set up R
    let mut r_mx: Array2<f64> = Array2::<f64>::eye(x_distances.n_obs).mapv(|v| v + v * nugget);
    for (i, ij) in x_distances.d_indices.outer_iter().enumerate() {
        r_mx[[ij[0], ij[1]]] = rxx[[i, 0]];
        r_mx[[ij[1], ij[0]]] = rxx[[i, 0]];
    }

    // R cholesky decomposition
    let r_chol = r_mx.cholesky()?;
    // Solve the generalized least squares problem
    let ft = r_chol.solve_triangular(fx, UPLO::Lower)?;
    let (ft_qr_q, ft_qr_r) = ft.qr()?.into_decomp();

    // Check whether we have an ill-conditioned problem
    let (_, sv_qr_r, _) = ft_qr_r.svd(false, false)?;
    let cond_ft = sv_qr_r[sv_qr_r.len() - 1] / sv_qr_r[0];
    if cond_ft < 1e-10 {
        return Err(SmboError::LikelihoodComputation(
            "Ft is too ill conditioned, try another theta".to_string(),
        ));
    }

    let yt = r_chol.solve_triangular(&ytrain.data, UPLO::Lower)?;
    let beta = ft_qr_r.solve_triangular_into(ft_qr_q.t().dot(&yt), UPLO::Upper)?;
    let rho = yt - ft.dot(&beta);
    let rho_sqr = rho.mapv(|v| v * v).sum_axis(Axis(0));
    let gamma = r_chol.t().solve_triangular_into(rho, UPLO::Upper)?;

    // The determinant of R is the squared product of the diagonal elements of
    // its Cholesky decomposition
    let n_obs = x_distances.n_obs as f64;
    let logdet = r_chol.diag().mapv(|v| v.log10()).sum() * 2. / n_obs;

    // Reduced likelihood
    let sigma2 = rho_sqr / n_obs;
    let reduced_likelihood = -n_obs * (sigma2.sum().log10() + logdet);

    Ok((
        reduced_likelihood,
        GpInnerParams {
            sigma2: sigma2[0] * ytrain.std[0] * ytrain.std[0],
            beta,
            gamma,
            r_chol,
            ft,
            ft_qr_r,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{arr2, array, Array, Axis};

    #[test]
    fn test_gp_interpolates_training_points() {
        let xt = array![[0.0], [1.0], [2.0], [3.0], [4.0]];
        let yt = array![[0.0], [1.0], [1.5], [0.9], [1.0]];
        let gp = GaussianProcess::params()
            .initial_theta(0.1)
            .fit(&xt, &yt)
            .expect("GP fit error");

        let yvals = gp.predict_values(&xt).expect("prediction error");
        assert_abs_diff_eq!(yt, yvals, epsilon = 1e-2);

        let yvars = gp.predict_variances(&xt).expect("prediction error");
        for &v in yvars.iter() {
            assert!(v >= 0.);
            assert_abs_diff_eq!(v, 0., epsilon = 1e-3);
        }
    }

    #[test]
    fn test_gp_prediction_in_between() {
        let xt = array![[0.0], [1.0], [2.0], [3.0], [4.0]];
        let yt = array![[0.0], [1.0], [1.5], [0.9], [1.0]];
        let gp = GaussianProcess::params()
            .initial_theta(0.1)
            .fit(&xt, &yt)
            .expect("GP fit error");
        let yvals = gp
            .predict_values(&arr2(&[[1.0], [3.5]]))
            .expect("prediction error");
        let expected_y = arr2(&[[1.0], [0.9]]);
        assert_abs_diff_eq!(expected_y, yvals, epsilon = 0.5);

        // predictions over the whole interval stay defined
        let xplot = Array::linspace(0., 4., 100).insert_axis(Axis(1));
        let vals = gp.predict_values(&xplot).unwrap();
        let vars = gp.predict_variances(&xplot).unwrap();
        assert!(vals.iter().all(|v| v.is_finite()));
        assert!(vars.iter().all(|v| v.is_finite() && *v >= 0.));
    }

    #[test]
    fn test_gp_rejects_row_outcomes() {
        let xt = array![[0.0], [1.0]];
        let yt = array![[0.0, 1.0]];
        let res = GaussianProcess::params().fit(&xt, &yt);
        assert!(matches!(res, Err(SmboError::InvalidValue(_))));
    }

    #[test]
    fn test_gp_rejects_size_mismatch() {
        let xt = array![[0.0], [1.0], [2.0]];
        let yt = array![[0.0], [1.0]];
        let res = GaussianProcess::params().fit(&xt, &yt);
        assert!(matches!(res, Err(SmboError::InvalidValue(_))));
    }

    #[test]
    fn test_gp_single_observation() {
        let xt = array![[1.5]];
        let yt = array![[0.3]];
        let gp = GaussianProcess::params().fit(&xt, &yt).expect("GP fit");
        let vals = gp.predict_values(&array![[1.5]]).unwrap();
        assert_abs_diff_eq!(vals[[0, 0]], 0.3, epsilon = 1e-6);
    }
}
