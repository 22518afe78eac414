//! Generation of random matrices and random smooth test functions.

use crate::types::{c64, Result, ScalarType};
use ndarray::{Array, Array1, Array2};
use ndarray_linalg::QR;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

pub trait RandomMatrix
where
    Self: ScalarType,
{
    /// Generate a random Gaussian matrix.
    ///
    /// # Arguments
    ///
    /// * `dimension`: Tuple (rows, cols) specifying the number of rows and columns.
    /// * `rng`: The random number generator to use.
    fn random_gaussian<R: Rng>(dimension: (usize, usize), rng: &mut R) -> Array2<Self>;

    /// Generate a random matrix with orthonormal columns (if rows >= cols) or rows.
    fn random_orthogonal_matrix<R: Rng>(dimension: (usize, usize), rng: &mut R) -> Result<Array2<Self>> {
        let (m, n) = if dimension.1 > dimension.0 {
            (dimension.1, dimension.0)
        } else {
            dimension
        };

        let (q, _) = Self::random_gaussian((m, n), rng).qr()?;

        if dimension.1 > dimension.0 {
            Ok(q.t().mapv(|item| item.conj()))
        } else {
            Ok(q)
        }
    }

    /// Generate a random matrix with singular values logarithmically distributed
    /// between `sigma_max` and `sigma_min`.
    fn random_approximate_low_rank_matrix<R: Rng>(
        dimension: (usize, usize),
        sigma_max: f64,
        sigma_min: f64,
        rng: &mut R,
    ) -> Result<Array2<Self>> {
        assert!(
            sigma_min < sigma_max,
            "`sigma_min` must be smaller than `sigma_max`"
        );
        assert!(sigma_min > 0.0, "`sigma_min` must be positive.");

        let min_dim = std::cmp::min(dimension.0, dimension.1);
        let singvals = Array::geomspace(sigma_max, sigma_min, min_dim)
            .unwrap_or_else(|| Array1::from_elem(min_dim, sigma_max));
        Self::random_matrix_with_spectrum(dimension, &singvals, rng)
    }

    /// Generate a random matrix `U diag(s) V^H` with the given singular values.
    fn random_matrix_with_spectrum<R: Rng>(
        dimension: (usize, usize),
        singvals: &Array1<f64>,
        rng: &mut R,
    ) -> Result<Array2<Self>> {
        let rank = singvals.len();
        let u = Self::random_orthogonal_matrix((dimension.0, rank), rng)?;
        let vt = Self::random_orthogonal_matrix((rank, dimension.1), rng)?;
        let sigma = Array2::from_diag(&singvals.mapv(Self::from_real));
        Ok(u.dot(&sigma.dot(&vt)))
    }

    /// Random Chebyshev coefficients with geometric decay `rate^k`.
    ///
    /// The corresponding expansion is a smooth function whose length is
    /// controlled by `rate`, which is what the adaptive constructors are tested on.
    fn random_decaying_coefficients<R: Rng>(n: usize, rate: f64, rng: &mut R) -> Array1<Self> {
        let mut coeffs = Self::random_gaussian((n, 1), rng).into_shape(n).unwrap_or_else(|_| Array1::zeros(n));
        for (k, item) in coeffs.iter_mut().enumerate() {
            *item = item.mul_real(rate.powi(k as i32));
        }
        coeffs
    }
}

impl RandomMatrix for f64 {
    fn random_gaussian<R: Rng>(dimension: (usize, usize), rng: &mut R) -> Array2<f64> {
        Array2::from_shape_simple_fn(dimension, || StandardNormal.sample(rng))
    }
}

impl RandomMatrix for c64 {
    fn random_gaussian<R: Rng>(dimension: (usize, usize), rng: &mut R) -> Array2<c64> {
        Array2::from_shape_simple_fn(dimension, || {
            let re: f64 = StandardNormal.sample(rng);
            let im: f64 = StandardNormal.sample(rng);
            c64::new(re, im)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RelDiff, Scalar};

    macro_rules! orthogonal_tests {
        ($($name:ident: $scalar:ty, $dim:expr,)*) => {
            $(
            #[test]
            fn $name() {
                let mut rng = rand::thread_rng();
                let q = <$scalar>::random_orthogonal_matrix($dim, &mut rng).unwrap();
                let k = std::cmp::min($dim.0, $dim.1);
                let gram = if $dim.0 >= $dim.1 {
                    q.t().mapv(|v| v.conj()).dot(&q)
                } else {
                    q.dot(&q.t().mapv(|v| v.conj()))
                };
                let identity = Array2::<$scalar>::eye(k);
                assert_eq!(q.dim(), $dim);
                assert!(<$scalar>::rel_diff_max(&gram, &identity) < 1E-12);
            }
            )*
        };
    }

    orthogonal_tests! {
        test_orthogonal_f64_thin: f64, (20, 5),
        test_orthogonal_f64_thick: f64, (5, 20),
        test_orthogonal_c64_thin: c64, (20, 5),
        test_orthogonal_c64_thick: c64, (5, 20),
    }

    #[test]
    fn test_decaying_coefficients() {
        let mut rng = rand::thread_rng();
        let coeffs = f64::random_decaying_coefficients(30, 0.1, &mut rng);
        assert_eq!(coeffs.len(), 30);
        assert!(coeffs[29].abs() < 1E-20);
    }
}
