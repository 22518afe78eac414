//! Chebyshev technology on the reference interval $[-1, 1]$.
//!
//! Second-kind points $x_j = -\cos(j\pi/(n-1))$ are ordered from left to right.
//! A Chebyshev expansion $\sum_k c_k T_k(x)$ is stored as the coefficient
//! vector $c$. All routines here work on the reference interval; callers
//! apply the scaling of their own interval.

use crate::types::ScalarType;
use ndarray::{s, Array1, Array2, ArrayView1};
use std::f64::consts::PI;

/// Chebyshev points of the second kind.
pub fn points(n: usize) -> Array1<f64> {
    if n == 1 {
        return Array1::zeros(1);
    }
    let m = (n - 1) as f64;
    Array1::from_shape_fn(n, |j| {
        // Symmetric formula keeps the points exactly antisymmetric.
        (PI * (2.0 * j as f64 - m) / (2.0 * m)).sin()
    })
}

/// Chebyshev points of the first kind (roots of $T_n$), ascending.
pub fn points_first_kind(n: usize) -> Array1<f64> {
    let m = n as f64;
    Array1::from_shape_fn(n, |j| (PI * (2.0 * j as f64 + 1.0 - m) / (2.0 * m)).sin())
}

/// Barycentric weights of the second-kind points.
pub fn barycentric_weights(n: usize) -> Array1<f64> {
    let mut weights = Array1::from_shape_fn(n, |j| if j % 2 == 0 { 1.0 } else { -1.0 });
    if n > 1 {
        weights[0] *= 0.5;
        weights[n - 1] *= 0.5;
    }
    weights
}

fn cosine_table(m: usize) -> Vec<f64> {
    (0..2 * m)
        .map(|i| (PI * i as f64 / m as f64).cos())
        .collect()
}

/// Chebyshev coefficients of the interpolant through values on second-kind points.
pub fn vals_to_coeffs<A: ScalarType>(values: ArrayView1<A>) -> Array1<A> {
    let n = values.len();
    if n <= 1 {
        return values.to_owned();
    }
    let m = n - 1;
    let table = cosine_table(m);

    let mut coeffs = Array1::<A>::zeros(n);
    for k in 0..n {
        let mut acc = A::zero();
        for (j, &value) in values.iter().enumerate() {
            let mut weight = table[(k * j) % (2 * m)];
            if j == 0 || j == m {
                weight *= 0.5;
            }
            acc += value.mul_real(weight);
        }
        let mut factor = 2.0 / m as f64;
        if k == 0 || k == m {
            factor *= 0.5;
        }
        if k % 2 == 1 {
            factor = -factor;
        }
        coeffs[k] = acc.mul_real(factor);
    }
    coeffs
}

/// Values on `n` second-kind points of the expansion with the given coefficients.
pub fn coeffs_to_vals<A: ScalarType>(coeffs: ArrayView1<A>, n: usize) -> Array1<A> {
    if coeffs.len() > n {
        let x = points(n);
        return x.mapv(|s| clenshaw(coeffs, s));
    }
    if n == 1 {
        let value = if coeffs.is_empty() { A::zero() } else { coeffs[0] };
        return Array1::from_elem(1, value);
    }
    let m = n - 1;
    let table = cosine_table(m);

    Array1::from_shape_fn(n, |j| {
        coeffs
            .iter()
            .enumerate()
            .fold(A::zero(), |acc, (k, &c)| {
                let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                acc + c.mul_real(sign * table[(k * j) % (2 * m)])
            })
    })
}

/// Evaluate $\sum_k c_k T_k(s)$ by Clenshaw's recurrence.
pub fn clenshaw<A: ScalarType>(coeffs: ArrayView1<A>, s: f64) -> A {
    if coeffs.is_empty() {
        return A::zero();
    }
    let mut b1 = A::zero();
    let mut b2 = A::zero();
    for &c in coeffs.slice(s![1..]).iter().rev() {
        let b0 = c + b1.mul_real(2.0 * s) - b2;
        b2 = b1;
        b1 = b0;
    }
    coeffs[0] + b1.mul_real(s) - b2
}

/// Coefficients of the derivative on the reference interval.
pub fn diff_coeffs<A: ScalarType>(coeffs: ArrayView1<A>) -> Array1<A> {
    let n = coeffs.len();
    if n <= 1 {
        return Array1::zeros(1);
    }
    let mut deriv = Array1::<A>::zeros(n + 1);
    for k in (1..n).rev() {
        deriv[k - 1] = deriv[k + 1] + coeffs[k].mul_real(2.0 * k as f64);
    }
    deriv[0] = deriv[0].mul_real(0.5);
    deriv.slice(s![..n - 1]).to_owned()
}

/// $\int_{-1}^1 T_k(x)\,dx$ for $k < n$.
pub fn integral_of_basis(n: usize) -> Array1<f64> {
    Array1::from_shape_fn(n, |k| {
        if k % 2 == 0 {
            2.0 / (1.0 - (k * k) as f64)
        } else {
            0.0
        }
    })
}

/// Clenshaw–Curtis weights on `n` second-kind points.
pub fn quadrature_weights(n: usize) -> Array1<f64> {
    if n == 1 {
        return Array1::from_elem(1, 2.0);
    }
    let m = n - 1;
    let table = cosine_table(m);
    let moments = integral_of_basis(n);

    Array1::from_shape_fn(n, |j| {
        let mut weight = 0.0;
        for k in (0..n).step_by(2) {
            let mut factor = 2.0 / m as f64;
            if k == 0 || k == m {
                factor *= 0.5;
            }
            weight += moments[k] * factor * table[(k * j) % (2 * m)];
        }
        if j == 0 || j == m {
            weight *= 0.5;
        }
        weight
    })
}

/// Barycentric interpolation matrix from `n` second-kind points to `targets`.
pub fn interpolation_matrix(n: usize, targets: ArrayView1<f64>) -> Array2<f64> {
    let x = points(n);
    let weights = barycentric_weights(n);
    let mut mat = Array2::<f64>::zeros((targets.len(), n));

    for (i, &t) in targets.iter().enumerate() {
        if let Some(j) = x.iter().position(|&xj| xj == t) {
            mat[[i, j]] = 1.0;
            continue;
        }
        let mut denominator = 0.0;
        for j in 0..n {
            let value = weights[j] / (t - x[j]);
            mat[[i, j]] = value;
            denominator += value;
        }
        mat.row_mut(i).mapv_inplace(|v| v / denominator);
    }
    mat
}

/// Spectral differentiation matrix on `n` second-kind points.
pub fn differentiation_matrix(n: usize) -> Array2<f64> {
    let x = points(n);
    let weights = barycentric_weights(n);
    let mut mat = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        let mut diagonal = 0.0;
        for j in 0..n {
            if i != j {
                let value = (weights[j] / weights[i]) / (x[i] - x[j]);
                mat[[i, j]] = value;
                diagonal -= value;
            }
        }
        mat[[i, i]] = diagonal;
    }
    mat
}

/// Row of values $T_j^{(d)}(s)$ for $j < n$ on the reference interval.
pub fn basis_derivative_row(n: usize, s: f64, derivative: usize) -> Array1<f64> {
    Array1::from_shape_fn(n, |j| {
        let mut unit = Array1::<f64>::zeros(j + 1);
        unit[j] = 1.0;
        for _ in 0..derivative {
            unit = diff_coeffs(unit.view());
        }
        clenshaw(unit.view(), s)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{c64, RelDiff};

    #[test]
    fn test_points_are_symmetric_and_sorted() {
        let x = points(17);
        assert_eq!(x[0], -1.0);
        assert_eq!(x[16], 1.0);
        assert_eq!(x[8], 0.0);
        for j in 0..16 {
            assert!(x[j] < x[j + 1]);
            assert!((x[j] + x[16 - j]).abs() < 1E-15);
        }
    }

    #[test]
    fn test_transform_recovers_polynomial_coefficients() {
        // 3 T_0 - 2 T_3 + 0.5 T_5
        let mut coeffs = Array1::<f64>::zeros(9);
        coeffs[0] = 3.0;
        coeffs[3] = -2.0;
        coeffs[5] = 0.5;
        let values = coeffs_to_vals(coeffs.view(), 9);
        let recovered = vals_to_coeffs(values.view());
        assert!(f64::rel_diff_max(&recovered, &coeffs) < 1E-14);

        for (&x, &v) in points(9).iter().zip(values.iter()) {
            assert!((clenshaw(coeffs.view(), x) - v).abs() < 1E-13);
        }
    }

    #[test]
    fn test_complex_transform() {
        let values = points(12).mapv(|x| c64::new(x.exp(), (2.0 * x).sin()));
        let coeffs = vals_to_coeffs(values.view());
        let back = coeffs_to_vals(coeffs.view(), 12);
        assert!(c64::rel_diff_max(&back, &values) < 1E-13);
    }

    #[test]
    fn test_derivative_of_coefficients() {
        // d/dx T_4 = 4 U_3 = 8 T_3 + 8 T_1
        let mut coeffs = Array1::<f64>::zeros(5);
        coeffs[4] = 1.0;
        let deriv = diff_coeffs(coeffs.view());
        assert_eq!(deriv.len(), 4);
        assert!((deriv[3] - 8.0).abs() < 1E-14);
        assert!((deriv[1] - 8.0).abs() < 1E-14);
        assert!(deriv[0].abs() < 1E-14);
        assert!(deriv[2].abs() < 1E-14);
    }

    #[test]
    fn test_quadrature_weights_integrate_exponential() {
        let n = 25;
        let weights = quadrature_weights(n);
        let integral: f64 = points(n)
            .iter()
            .zip(weights.iter())
            .map(|(&x, &w)| w * x.exp())
            .sum();
        let exact = 1f64.exp() - (-1f64).exp();
        assert!((integral - exact).abs() < 1E-14);
    }

    #[test]
    fn test_differentiation_matrix_is_exact_for_polynomials() {
        let n = 10;
        let x = points(n);
        let d = differentiation_matrix(n);
        let values = x.mapv(|t| t.powi(5) - 2.0 * t);
        let expected = x.mapv(|t| 5.0 * t.powi(4) - 2.0);
        assert!(f64::rel_diff_max(&d.dot(&values), &expected) < 1E-12);
    }

    #[test]
    fn test_interpolation_matrix_to_first_kind_points() {
        let n = 20;
        let targets = points_first_kind(13);
        let p = interpolation_matrix(n, targets.view());
        let values = points(n).mapv(|t| (3.0 * t).cos());
        let expected = targets.mapv(|t| (3.0 * t).cos());
        assert!(f64::rel_diff_max(&p.dot(&values), &expected) < 1E-12);
    }

    #[test]
    fn test_basis_derivative_row_at_endpoints() {
        let row = basis_derivative_row(6, 1.0, 1);
        for j in 0..6 {
            assert!((row[j] - (j * j) as f64).abs() < 1E-12);
        }
        let row = basis_derivative_row(6, -1.0, 0);
        for j in 0..6 {
            let expected = if j % 2 == 0 { 1.0 } else { -1.0 };
            assert!((row[j] - expected).abs() < 1E-14);
        }
    }
}
