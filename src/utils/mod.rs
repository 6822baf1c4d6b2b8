use libm::erfc;
use ndarray::{Array1, Array2, ArrayView1};

const SQRT_2PI: f64 = 2.5066282746310007;

/// Standard normal cumulative distribution function
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Standard normal probability density function
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / SQRT_2PI
}

/// Evaluate `f` on every row of `candidates` and return the index and point
/// of the minimum.
///
/// Ties are broken by evaluation order: the first occurrence of the extreme
/// wins, which keeps the selection deterministic for deterministic inputs.
/// NaN evaluations never displace the current best.
pub fn select_best<F>(candidates: &Array2<f64>, f: F) -> (usize, Array1<f64>)
where
    F: Fn(&ArrayView1<f64>) -> f64,
{
    let mut best_index = 0;
    let mut best_value = f64::INFINITY;
    for (i, row) in candidates.outer_iter().enumerate() {
        let v = f(&row);
        if v < best_value {
            best_index = i;
            best_value = v;
        }
    }
    (best_index, candidates.row(best_index).to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_norm_cdf_pdf() {
        assert_abs_diff_eq!(norm_cdf(0.), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(norm_pdf(0.), 1. / SQRT_2PI, epsilon = 1e-12);
        assert_abs_diff_eq!(norm_cdf(f64::INFINITY), 1., epsilon = 1e-12);
        assert_abs_diff_eq!(norm_cdf(f64::NEG_INFINITY), 0., epsilon = 1e-12);
    }

    #[test]
    fn test_select_best_min() {
        let cands = array![[0.], [1.], [2.], [3.]];
        let (i, x) = select_best(&cands, |row| (row[0] - 2.1).powi(2));
        assert_eq!(i, 2);
        assert_abs_diff_eq!(x[0], 2., epsilon = 1e-12);
    }

    #[test]
    fn test_select_best_first_extreme_tie_break() {
        let cands = array![[1., 0.], [0., 1.], [2., 2.]];
        // both first rows evaluate to the same value
        let (i, x) = select_best(&cands, |row| row[0] + row[1]);
        assert_eq!(i, 0);
        assert_abs_diff_eq!(x[0], 1., epsilon = 1e-12);
        // repeated calls pick the identical point
        let (j, _) = select_best(&cands, |row| row[0] + row[1]);
        assert_eq!(i, j);
    }

    #[test]
    fn test_select_best_ignores_nan() {
        let cands = array![[0.], [1.], [2.]];
        let (i, _) = select_best(&cands, |row| {
            if row[0] < 0.5 {
                f64::NAN
            } else {
                row[0]
            }
        });
        assert_eq!(i, 1);
        // a leading NaN must not pin the selection to the first row
        let (i, x) = select_best(&cands, |row| if row[0] < 0.5 { f64::NAN } else { -row[0] });
        assert_eq!(i, 2);
        assert_abs_diff_eq!(x[0], 2., epsilon = 1e-12);
    }
}
