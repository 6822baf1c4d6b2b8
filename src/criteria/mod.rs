//! Acquisition criteria computed from the surrogate predictive distribution.
//!
//! All criteria assume a minimization objective: improvement is measured
//! against the current minimum of the observed outcomes. A criterion maps the
//! predictive mean and standard deviation at candidate points to a scalar
//! utility per point, to be maximized by the acquisition optimizer.

use crate::errors::{Result, SmboError};
use crate::types::InfillStrategy;
use crate::utils::{norm_cdf, norm_pdf};
use ndarray::{Array1, ArrayBase, Data, Ix1, Ix2, Zip};

fn check_shapes(
    pred_mean: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    pred_std: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    y_train: &ArrayBase<impl Data<Elem = f64>, Ix2>,
) -> Result<()> {
    if pred_mean.len() != pred_std.len() {
        return Err(SmboError::InvalidValue(format!(
            "predictive mean and std lengths mismatch: {} != {}",
            pred_mean.len(),
            pred_std.len()
        )));
    }
    if y_train.ncols() != 1 {
        return Err(SmboError::InvalidValue(format!(
            "observed outcomes expected as a (n, 1) column, got {} columns",
            y_train.ncols()
        )));
    }
    if y_train.nrows() == 0 {
        return Err(SmboError::InvalidValue(
            "observed outcomes are empty".to_string(),
        ));
    }
    Ok(())
}

fn min_outcome(y_train: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> f64 {
    y_train.iter().fold(f64::INFINITY, |acc, &v| acc.min(v))
}

/// Probability of Improvement.
///
/// `PI = cdf((fmin - mean) / (std + jitter))` elementwise where `fmin` is the
/// minimum observed outcome. With zero jitter and zero predictive std the
/// division yields an infinite or NaN argument which propagates through the
/// CDF as a degenerate but defined value.
pub fn pi(
    pred_mean: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    pred_std: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    y_train: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    jitter: f64,
) -> Result<Array1<f64>> {
    check_shapes(pred_mean, pred_std, y_train)?;
    let fmin = min_outcome(y_train);
    let mut acq = Array1::zeros(pred_mean.len());
    Zip::from(&mut acq)
        .and(pred_mean)
        .and(pred_std)
        .for_each(|a, &m, &s| {
            *a = norm_cdf((fmin - m) / (s + jitter));
        });
    Ok(acq)
}

/// Expected Improvement.
///
/// `EI = (fmin - mean) * cdf(z) + std * pdf(z)` with
/// `z = (fmin - mean) / (std + jitter)`. The pdf term vanishes as std goes to
/// zero so a certain prediction still yields a finite improvement value.
pub fn ei(
    pred_mean: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    pred_std: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    y_train: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    jitter: f64,
) -> Result<Array1<f64>> {
    check_shapes(pred_mean, pred_std, y_train)?;
    let fmin = min_outcome(y_train);
    let mut acq = Array1::zeros(pred_mean.len());
    Zip::from(&mut acq)
        .and(pred_mean)
        .and(pred_std)
        .for_each(|a, &m, &s| {
            let z = (fmin - m) / (s + jitter);
            *a = (fmin - m) * norm_cdf(z) + s * norm_pdf(z);
        });
    Ok(acq)
}

/// Upper Confidence Bound (negated mean, minimization convention).
///
/// `UCB = -mean + kappa_eff * std` where `kappa_eff = kappa * ln(n)` when
/// `is_increased` is set, reproducing the regret-bound exploration schedule
/// that grows with the number of observations. `ln(1) = 0` on a single
/// observation makes the exploration term vanish, which is accepted.
pub fn ucb(
    pred_mean: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    pred_std: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    kappa: f64,
    y_train: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    is_increased: bool,
) -> Result<Array1<f64>> {
    check_shapes(pred_mean, pred_std, y_train)?;
    let kappa_eff = if is_increased {
        kappa * (y_train.nrows() as f64).ln()
    } else {
        kappa
    };
    let mut acq = Array1::zeros(pred_mean.len());
    Zip::from(&mut acq)
        .and(pred_mean)
        .and(pred_std)
        .for_each(|a, &m, &s| {
            *a = -m + kappa_eff * s;
        });
    Ok(acq)
}

impl InfillStrategy {
    /// Compute the selected criterion on a batch of predictions
    pub fn value(
        &self,
        pred_mean: &ArrayBase<impl Data<Elem = f64>, Ix1>,
        pred_std: &ArrayBase<impl Data<Elem = f64>, Ix1>,
        y_train: &ArrayBase<impl Data<Elem = f64>, Ix2>,
        jitter: f64,
        kappa: f64,
        ucb_increased: bool,
    ) -> Result<Array1<f64>> {
        match self {
            InfillStrategy::Pi => pi(pred_mean, pred_std, y_train, jitter),
            InfillStrategy::Ei => ei(pred_mean, pred_std, y_train, jitter),
            InfillStrategy::Ucb => ucb(pred_mean, pred_std, kappa, y_train, ucb_increased),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    const JITTER: f64 = 1e-5;

    #[test]
    fn test_pi_in_unit_interval() {
        let mean = array![-2., -0.5, 0., 0.3, 10.];
        let std = array![0., 0.1, 1., 2., 5.];
        let yt = array![[0.1], [-0.3], [2.4]];
        let acq = pi(&mean, &std, &yt, JITTER).unwrap();
        for &v in acq.iter() {
            assert!((0. ..=1.).contains(&v), "PI value {v} out of [0, 1]");
        }
    }

    #[test]
    fn test_ei_non_negative() {
        let mean = array![-2., -0.5, 0., 0.3, 10.];
        let std = array![0.05, 0.1, 1., 2., 5.];
        let yt = array![[0.1], [-0.3], [2.4]];
        let acq = ei(&mean, &std, &yt, JITTER).unwrap();
        for &v in acq.iter() {
            assert!(v >= 0., "EI value {v} is negative");
        }
    }

    #[test]
    fn test_ei_zero_std_is_finite() {
        let mean = array![1.5];
        let std = array![0.];
        let yt = array![[0.5]];
        let acq = ei(&mean, &std, &yt, JITTER).unwrap();
        assert!(acq[0].is_finite());
        assert_abs_diff_eq!(acq[0], 0., epsilon = 1e-12);
    }

    #[test]
    fn test_ucb_single_observation_reduces_to_neg_mean() {
        let mean = array![0.7, -1.2];
        let std = array![0.4, 2.3];
        let yt = array![[0.5]];
        // ln(1) = 0 cancels the exploration term
        let acq = ucb(&mean, &std, 2., &yt, true).unwrap();
        assert_abs_diff_eq!(acq[0], -0.7, epsilon = 1e-12);
        assert_abs_diff_eq!(acq[1], 1.2, epsilon = 1e-12);
    }

    #[test]
    fn test_ucb_monotonic_in_std() {
        let yt = array![[0.5], [1.2]];
        let mut prev = f64::NEG_INFINITY;
        for s in [0., 0.5, 1., 2., 10.] {
            let acq = ucb(&array![0.3], &array![s], 1.5, &yt, false).unwrap();
            assert!(acq[0] > prev, "UCB not increasing with std at std={s}");
            prev = acq[0];
        }
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let yt = array![[0.5]];
        let res = ei(&array![0., 1.], &array![1.], &yt, JITTER);
        assert!(matches!(res, Err(SmboError::InvalidValue(_))));
    }

    #[test]
    fn test_row_outcomes_rejected() {
        // outcomes must be a column, not a row
        let yt = array![[0.5, 0.7]];
        let res = pi(&array![0.], &array![1.], &yt, JITTER);
        assert!(matches!(res, Err(SmboError::InvalidValue(_))));
    }

    #[test]
    fn test_pi_matches_closed_form() {
        let mean = array![0.];
        let std = array![1.];
        let yt = array![[0.]];
        // z = 0 => cdf = 0.5
        let acq = pi(&mean, &std, &yt, 0.).unwrap();
        assert_abs_diff_eq!(acq[0], 0.5, epsilon = 1e-12);
    }
}
