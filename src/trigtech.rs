//! Trigonometric technology for periodic functions on the reference interval $[-1, 1)$.
//!
//! A trigonometric interpolant is stored by its values on `n` equispaced
//! points $s_j = -1 + 2j/n$. Only odd `n` is used so that the interpolant is
//! a trigonometric polynomial of degree $(n-1)/2$ without a Nyquist mode.

use crate::types::ScalarType;
use ndarray::{Array1, Array2, ArrayView1};
use std::f64::consts::PI;

/// Equispaced points $s_j = -1 + 2j/n$.
pub fn points(n: usize) -> Array1<f64> {
    Array1::from_shape_fn(n, |j| -1.0 + 2.0 * j as f64 / n as f64)
}

/// Evaluate the trigonometric interpolant through `values` at `s`.
pub fn eval<A: ScalarType>(values: ArrayView1<A>, s: f64) -> A {
    let n = values.len();
    if n == 1 {
        return values[0];
    }
    let theta = PI * (s + 1.0);
    let step = 2.0 * PI / n as f64;
    let mut acc = A::zero();
    for (j, &value) in values.iter().enumerate() {
        let phi = theta - step * j as f64;
        let half = (0.5 * phi).sin();
        if half.abs() < 1E-14 {
            return value;
        }
        let kernel = (0.5 * n as f64 * phi).sin() / (n as f64 * half);
        acc += value.mul_real(kernel);
    }
    acc
}

/// Values of the interpolant through `values` on `n` equispaced points.
pub fn resample<A: ScalarType>(values: ArrayView1<A>, n: usize) -> Array1<A> {
    if values.len() == n {
        return values.to_owned();
    }
    points(n).mapv(|s| eval(values, s))
}

/// Magnitudes of the Fourier modes $0, 1, \dots, (n-1)/2$.
///
/// For mode $k$ this is $\sqrt{(|c_k|^2 + |c_{-k}|^2)/2}$, which is the modulus of
/// $c_k$ for real data.
pub fn mode_magnitudes<A: ScalarType>(values: ArrayView1<A>) -> Array1<f64> {
    let n = values.len();
    let modes = (n - 1) / 2 + 1;
    let step = 2.0 * PI / n as f64;

    Array1::from_shape_fn(modes, |k| {
        let mut cosine = A::zero();
        let mut sine = A::zero();
        for (j, &value) in values.iter().enumerate() {
            let angle = step * (k * j) as f64;
            cosine += value.mul_real(angle.cos());
            sine += value.mul_real(angle.sin());
        }
        let scale = 1.0 / n as f64;
        if k == 0 {
            cosine.abs() * scale
        } else {
            (cosine.abs().powi(2) + sine.abs().powi(2)).sqrt() * scale
        }
    })
}

/// Spectral differentiation matrix with respect to $s$ on `n` (odd) equispaced points.
pub fn differentiation_matrix(n: usize) -> Array2<f64> {
    let step = 2.0 * PI / n as f64;
    Array2::from_shape_fn((n, n), |(i, j)| {
        if i == j {
            0.0
        } else {
            let offset = i as f64 - j as f64;
            let sign = if (i + j) % 2 == 0 { 1.0 } else { -1.0 };
            // d/ds = pi d/dtheta on the reference interval of length 2.
            PI * 0.5 * sign / (0.5 * offset * step).sin()
        }
    })
}
