use crate::sampling::SamplingMethod;
use linfa::Float;
use ndarray::{Array2, ArrayBase, Data, Ix2};

/// Prime bases of the per-dimension Van der Corput sequences.
const PRIMES: [usize; 32] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131,
];

/// The Halton design draws points from a low-discrepancy sequence, filling
/// the space more evenly than independent uniform draws for the same sample
/// count.
///
/// Each dimension uses the radical-inverse (Van der Corput) sequence in a
/// distinct prime base. The `offset` skips ahead in the sequence, so two
/// samplers with the same offset produce the identical design.
pub struct Halton<F: Float> {
    /// The ith row is the [lower_bound, upper_bound] of xi, the ith component of x
    xlimits: Array2<F>,
    /// Number of leading sequence elements to skip
    offset: usize,
}

impl<F: Float> Halton<F> {
    /// Constructor given a (nx, 2) design space matrix \[\[lower bound, upper bound\], ...\]
    ///
    /// **Panics** if xlimits number of columns is different from 2 or if the
    /// space dimension exceeds the number of tabulated prime bases.
    pub fn new(xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Self {
        if xlimits.ncols() != 2 {
            panic!("xlimits must have 2 columns (lower, upper)");
        }
        if xlimits.nrows() > PRIMES.len() {
            panic!(
                "Halton design limited to {} dimensions, got {}",
                PRIMES.len(),
                xlimits.nrows()
            );
        }
        Halton {
            xlimits: xlimits.to_owned(),
            offset: 0,
        }
    }

    /// Skip the first `offset` elements of the sequence
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// Radical inverse of `n` in the given `base`, in [0, 1)
fn van_der_corput(mut n: usize, base: usize) -> f64 {
    let mut q = 0.;
    let mut bk = 1. / base as f64;
    while n > 0 {
        q += (n % base) as f64 * bk;
        n /= base;
        bk /= base as f64;
    }
    q
}

impl<F: Float> SamplingMethod<F> for Halton<F> {
    fn sampling_space(&self) -> &Array2<F> {
        &self.xlimits
    }

    fn normalized_sample(&self, ns: usize) -> Array2<F> {
        let nx = self.xlimits.nrows();
        let mut doe = Array2::zeros((ns, nx));
        for i in 0..ns {
            // index 0 maps to the origin in every base, skip it
            let n = self.offset + i + 1;
            for j in 0..nx {
                doe[[i, j]] = F::cast(van_der_corput(n, PRIMES[j]));
            }
        }
        doe
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{arr2, array};

    #[test]
    fn test_van_der_corput_base2() {
        assert_abs_diff_eq!(van_der_corput(1, 2), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(van_der_corput(2, 2), 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(van_der_corput(3, 2), 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(van_der_corput(4, 2), 0.125, epsilon = 1e-12);
    }

    #[test]
    fn test_halton_2d() {
        let xlimits = arr2(&[[0., 1.], [0., 1.]]);
        let expected = array![
            [0.5, 1. / 3.],
            [0.25, 2. / 3.],
            [0.75, 1. / 9.],
            [0.125, 4. / 9.],
        ];
        let actual = Halton::new(&xlimits).sample(4);
        assert_abs_diff_eq!(expected, actual, epsilon = 1e-12);
    }

    #[test]
    fn test_halton_offset_skips_ahead() {
        let xlimits = arr2(&[[0., 1.]]);
        let head = Halton::new(&xlimits).sample(6);
        let tail = Halton::new(&xlimits).with_offset(2).sample(4);
        assert_abs_diff_eq!(head.slice(ndarray::s![2.., ..]), tail, epsilon = 1e-12);
    }

    #[test]
    fn test_halton_rescaled_within_bounds() {
        let xlimits = arr2(&[[-3., 3.], [5., 10.]]);
        let doe = Halton::new(&xlimits).with_offset(13).sample(32);
        for row in doe.outer_iter() {
            assert!(row[0] >= -3. && row[0] <= 3.);
            assert!(row[1] >= 5. && row[1] <= 10.);
        }
    }
}
