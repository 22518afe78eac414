//! Building blocks of the ultraspherical spectral method.
//!
//! Functions are represented by Chebyshev coefficients. Differentiation of
//! order $m$ maps them to coefficients in the ultraspherical basis
//! $C^{(m)}$, conversion operators $S_\lambda$ map $C^{(\lambda)}$ to
//! $C^{(\lambda+1)}$ (with $S_0$ mapping $T$ to $U = C^{(1)}$), and
//! multiplication operators act within one basis. All matrices here refer to
//! the reference interval $[-1, 1]$ except where a scale is passed.

use crate::types::{real, Result, ScalarType};
use ndarray::{s, Array1, Array2, ArrayView1};
use ndarray_linalg::{Diag, SolveTriangular, UPLO};

/// Conversion $S_\lambda$ from $C^{(\lambda)}$ to $C^{(\lambda+1)}$ coefficients, `size` x `size`.
fn conversion_step(lambda: usize, size: usize) -> Array2<f64> {
    let mut mat = Array2::<f64>::zeros((size, size));
    for k in 0..size {
        let (diagonal, upper) = if lambda == 0 {
            (if k == 0 { 1.0 } else { 0.5 }, -0.5)
        } else {
            let l = lambda as f64;
            (l / (k as f64 + l), -l / (k as f64 + 2.0 + l))
        };
        mat[[k, k]] = diagonal;
        if k + 2 < size {
            mat[[k, k + 2]] = upper;
        }
    }
    mat
}

/// Conversion from $C^{(\lambda_0)}$ to $C^{(\lambda_1)}$ for $\lambda_0 \le \lambda_1$,
/// where $C^{(0)}$ stands for the Chebyshev basis.
pub fn conversion(from: usize, to: usize, size: usize) -> Array2<f64> {
    (from..to).fold(Array2::eye(size), |acc, lambda| conversion_step(lambda, size).dot(&acc))
}

/// Differentiation of order `order` from `cols` Chebyshev coefficients to
/// `rows` coefficients in $C^{(order)}$, scaled by `scale^order`.
///
/// Uses $\frac{d^m}{dx^m} T_k = 2^{m-1} (m-1)!\, k\, C^{(m)}_{k-m}$.
pub fn differentiation(order: usize, rows: usize, cols: usize, scale: f64) -> Array2<f64> {
    let mut mat = Array2::<f64>::zeros((rows, cols));
    if order == 0 {
        for k in 0..rows.min(cols) {
            mat[[k, k]] = 1.0;
        }
        return mat;
    }

    let factorial = (1..order).fold(1.0, |acc, j| acc * j as f64);
    let factor = 2f64.powi(order as i32 - 1) * factorial * scale.powi(order as i32);
    for k in order..cols {
        if k - order < rows {
            mat[[k - order, k]] = factor * k as f64;
        }
    }
    mat
}

/// Multiplication by $\sum_j a_j T_j$ in Chebyshev coefficient space, `size` x `size`.
///
/// $T_i T_j = (T_{i+j} + T_{|i-j|}) / 2$ gives a Toeplitz plus Hankel matrix.
pub fn multiplication_chebyshev<A: ScalarType>(coeffs: ArrayView1<A>, size: usize) -> Array2<A> {
    let coeff = |k: usize| if k < coeffs.len() { coeffs[k] } else { A::zero() };
    let half = real::<A>(0.5);
    Array2::from_shape_fn((size, size), |(i, j)| {
        let distance = if i > j { i - j } else { j - i };
        let toeplitz = if distance == 0 { coeff(0) } else { coeff(distance) * half };
        let hankel = if i == 0 { A::zero() } else { coeff(i + j) * half };
        toeplitz + hankel
    })
}

/// Multiplication by $\sum_j a_j T_j$ acting on $C^{(\lambda)}$ coefficients, `size` x `size`.
///
/// Computed as $S_{0 \to \lambda} M_0 S_{0 \to \lambda}^{-1}$. Callers take a
/// leading block of a matrix computed with room for the degree of the product.
pub fn multiplication<A: ScalarType>(lambda: usize, coeffs: ArrayView1<A>, size: usize) -> Result<Array2<A>> {
    let m0 = multiplication_chebyshev(coeffs, size);
    if lambda == 0 {
        return Ok(m0);
    }
    if coeffs.len() <= 1 {
        let value = if coeffs.is_empty() { A::zero() } else { coeffs[0] };
        return Ok(Array2::from_diag(&Array1::from_elem(size, value)));
    }

    let conv = conversion(0, lambda, size).mapv(real::<A>);
    // X = M0 S^{-1}  <=>  S^T X^T = M0^T
    let xt = conv
        .t()
        .to_owned()
        .solve_triangular(UPLO::Lower, Diag::NonUnit, &m0.t().to_owned())?;
    Ok(conv.dot(&xt.t()))
}

/// Chebyshev coefficients padded with zeros or truncated to length `n`.
pub fn resize<A: ScalarType>(coeffs: ArrayView1<A>, n: usize) -> Array1<A> {
    let mut result = Array1::<A>::zeros(n);
    let m = n.min(coeffs.len());
    result.slice_mut(s![..m]).assign(&coeffs.slice(s![..m]));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chebtech;
    use crate::types::{c64, RelDiff};

    #[test]
    fn test_conversion_to_second_kind() {
        // T_2 = 2x^2 - 1 = (U_2 - U_0) / 2
        let mut t2 = Array1::<f64>::zeros(5);
        t2[2] = 1.0;
        let u = conversion(0, 1, 5).dot(&t2);
        assert!((u[0] + 0.5).abs() < 1E-15);
        assert!((u[2] - 0.5).abs() < 1E-15);
        assert!(u[1].abs() < 1E-15 && u[3].abs() < 1E-15);
    }

    #[test]
    fn test_first_derivative_in_u_basis() {
        // d/dx T_3 = 3 U_2
        let d = differentiation(1, 6, 6, 1.0);
        let mut t3 = Array1::<f64>::zeros(6);
        t3[3] = 1.0;
        let result = d.dot(&t3);
        assert!((result[2] - 3.0).abs() < 1E-15);
        assert_eq!(result.iter().filter(|v| v.abs() > 0.0).count(), 1);
    }

    #[test]
    fn test_second_derivative_matches_coefficient_differentiation() {
        // S_1 S_0 d2/dx2 in T coefficients equals D_2.
        let n = 12;
        let coeffs = Array1::from_shape_fn(n, |k| 1.0 / (1.0 + k as f64).powi(2));
        let mut second = chebtech::diff_coeffs(coeffs.view());
        second = chebtech::diff_coeffs(second.view());
        let expected = conversion(0, 2, n).dot(&resize(second.view(), n));
        let actual = differentiation(2, n, n, 1.0).dot(&coeffs);
        assert!(f64::rel_diff_max(&actual, &expected) < 1E-13);
    }

    #[test]
    fn test_chebyshev_multiplication() {
        // x * x = (T_0 + T_2) / 2
        let x = Array1::<f64>::from(vec![0.0, 1.0]);
        let u = resize(x.view(), 4);
        let product = multiplication_chebyshev(x.view(), 4).dot(&u);
        assert!((product[0] - 0.5).abs() < 1E-15);
        assert!((product[2] - 0.5).abs() < 1E-15);
        assert!(product[1].abs() < 1E-15);
    }

    #[test]
    fn test_multiplication_commutes_with_conversion() {
        let n = 10;
        let size = 16;
        let a = Array1::from(vec![c64::new(1.0, 0.5), c64::new(0.3, 0.0), c64::new(0.0, -0.2)]);
        let u = Array1::from_shape_fn(size, |k| if k < n { c64::new(1.0 / (k + 1) as f64, 0.1) } else { c64::new(0.0, 0.0) });

        let m0 = multiplication_chebyshev(a.view(), size);
        let m2 = multiplication(2, a.view(), size).unwrap();
        let conv = conversion(0, 2, size).mapv(c64::from);

        let expected = conv.dot(&m0.dot(&u));
        let actual = m2.dot(&conv.dot(&u));
        let rows = n;
        assert!(
            c64::rel_diff_max(&actual.slice(s![..rows]).to_owned(), &expected.slice(s![..rows]).to_owned()) < 1E-12
        );
    }
}
