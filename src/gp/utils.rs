use ndarray::{s, Array1, Array2, ArrayBase, Axis, Data, Ix2};

/// A structure to store (n, xdim) matrix data and its mean and standard
/// deviation vectors.
#[derive(Debug, Clone)]
pub(crate) struct NormalizedData {
    /// normalized data
    pub data: Array2<f64>,
    /// mean vector computed from data
    pub mean: Array1<f64>,
    /// standard deviation vector computed from data
    pub std: Array1<f64>,
}

impl NormalizedData {
    pub fn new(x: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> NormalizedData {
        let (data, mean, std) = normalize(x);
        NormalizedData { data, mean, std }
    }
}

pub(crate) fn normalize(
    x: &ArrayBase<impl Data<Elem = f64>, Ix2>,
) -> (Array2<f64>, Array1<f64>, Array1<f64>) {
    let x_mean = x.mean_axis(Axis(0)).unwrap();
    let mut x_std = x.std_axis(Axis(0), 1.);
    // a single observation yields a NaN std (ddof 1), a constant column a
    // zero one; both get unit scaling
    x_std.mapv_inplace(|v| if v == 0. || !v.is_finite() { 1. } else { v });
    let xnorm = (x - &x_mean) / &x_std;

    (xnorm, x_mean, x_std)
}

/// A structure to retain absolute differences computation used to build the
/// correlation matrix
#[derive(Debug)]
pub(crate) struct DiffMatrix {
    /// Differences as a (n_obs * (n_obs - 1) / 2, nx) array
    pub d: Array2<f64>,
    /// Indices of the differences in the original data array
    pub d_indices: Array2<usize>,
    /// Number of observations
    pub n_obs: usize,
}

impl DiffMatrix {
    /// Compute pairwise differences of points given as an (n_obs, nx) array
    pub fn new(x: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> DiffMatrix {
        let (d, d_indices) = Self::_cross_diff(x);
        let n_obs = x.nrows();

        DiffMatrix {
            d,
            d_indices,
            n_obs,
        }
    }

    fn _cross_diff(x: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> (Array2<f64>, Array2<usize>) {
        let n_obs = x.nrows();
        let nx = x.ncols();
        let n_non_zero_cross_dist = n_obs * n_obs.saturating_sub(1) / 2;
        let mut indices = Array2::<usize>::zeros((n_non_zero_cross_dist, 2));
        let mut d = Array2::zeros((n_non_zero_cross_dist, nx));
        let mut idx = 0;
        for k in 0..n_obs.saturating_sub(1) {
            let idx0 = idx;
            let offset = n_obs - k - 1;
            idx = idx0 + offset;

            for i in (k + 1)..n_obs {
                let r = idx0 + i - k - 1;
                indices[[r, 0]] = k;
                indices[[r, 1]] = i;
            }

            let diff = &x.slice(s![k, ..]) - &x.slice(s![k + 1..n_obs, ..]);
            d.slice_mut(s![idx0..idx, ..]).assign(&diff);
        }
        d = d.mapv(|v| v.abs());

        (d, indices)
    }
}

/// Computes componentwise differences between each row of x and each row of y,
/// resulting in a (nrows(x) * nrows(y), ncols(x)) array.
///
/// **Panics** if x and y do not have the same number of columns.
pub(crate) fn pairwise_differences(
    x: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    y: &ArrayBase<impl Data<Elem = f64>, Ix2>,
) -> Array2<f64> {
    assert!(x.ncols() == y.ncols());
    let nx = x.nrows();
    let ny = y.nrows();
    let ncols = x.ncols();
    let mut result = Array2::zeros((nx * ny, ncols));
    for (i, xrow) in x.outer_iter().enumerate() {
        let diff = &xrow.to_owned().insert_axis(Axis(0)) - y;
        result
            .slice_mut(s![i * ny..(i + 1) * ny, ..])
            .assign(&diff);
    }
    result.mapv(|v| v.abs())
}

/// Squared exponential correlation between points separated by the given
/// componentwise absolute differences:
///
///   r(d) = exp(-0.5 * sum_j (theta_j * d_j)^2)
pub(crate) fn squared_exponential(d: &Array2<f64>, theta: &Array1<f64>) -> Array2<f64> {
    let theta2 = theta.mapv(|v| v * v);
    let r = d.mapv(|v| v * v).dot(&theta2);
    r.mapv(|v| (-0.5 * v).exp())
        .into_shape((d.nrows(), 1))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_normalize_constant_column() {
        let x = array![[1., 2.], [1., 4.]];
        let (xnorm, mean, std) = normalize(&x);
        // zero spread column gets unit std to avoid division by zero
        assert_abs_diff_eq!(std[0], 1., epsilon = 1e-12);
        assert_abs_diff_eq!(mean[0], 1., epsilon = 1e-12);
        assert_abs_diff_eq!(xnorm[[0, 0]], 0., epsilon = 1e-12);
    }

    #[test]
    fn test_normalize_single_row() {
        let x = array![[0.5, 2.]];
        let (xnorm, mean, std) = normalize(&x);
        assert_abs_diff_eq!(std, array![1., 1.], epsilon = 1e-12);
        assert_abs_diff_eq!(mean, array![0.5, 2.], epsilon = 1e-12);
        assert!(xnorm.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_diff_matrix() {
        let x = array![[0.], [1.], [3.]];
        let dm = DiffMatrix::new(&x);
        assert_eq!(dm.n_obs, 3);
        assert_abs_diff_eq!(dm.d, array![[1.], [3.], [2.]], epsilon = 1e-12);
        assert_eq!(dm.d_indices, array![[0, 1], [0, 2], [1, 2]]);
    }

    #[test]
    fn test_single_observation_diff_matrix() {
        let x = array![[0.5]];
        let dm = DiffMatrix::new(&x);
        assert_eq!(dm.d.nrows(), 0);
    }

    #[test]
    fn test_squared_exponential_at_zero_distance() {
        let d = array![[0., 0.], [1., 1.]];
        let theta = array![1., 1.];
        let r = squared_exponential(&d, &theta);
        assert_abs_diff_eq!(r[[0, 0]], 1., epsilon = 1e-12);
        assert_abs_diff_eq!(r[[1, 0]], (-1.0f64).exp(), epsilon = 1e-12);
    }
}
