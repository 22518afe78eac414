//! Univariate spectral approximations.
//!
//! A [`Chebfun`] represents a smooth function on an interval either by a
//! truncated Chebyshev expansion or, for periodic functions, by a
//! trigonometric interpolant. Construction is adaptive: the function is
//! sampled on grids of size 17, 33, 65, ... until the expansion coefficients
//! have decayed below the tolerance in [`Preferences`].

use crate::chebtech;
use crate::chop::chop;
use crate::domain::Interval;
use crate::preferences::{Basis, Preferences};
use crate::trigtech;
use crate::types::{real, Result, RustySpectralError, ScalarType};
use ndarray::{s, Array1, ArrayView1};

const INITIAL_LENGTH: usize = 17;

#[derive(Clone, Debug, PartialEq)]
enum Representation<A: ScalarType> {
    /// Chebyshev coefficients.
    Chebyshev(Array1<A>),
    /// Values on an odd number of equispaced points.
    Trigonometric(Array1<A>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Chebfun<A: ScalarType> {
    interval: Interval,
    repr: Representation<A>,
}

impl<A: ScalarType> Chebfun<A> {
    /// Sample points of the given basis mapped to `interval`.
    pub fn points(basis: Basis, n: usize, interval: Interval) -> Array1<f64> {
        let reference = match basis {
            Basis::Chebyshev => chebtech::points(n),
            Basis::Trigonometric => trigtech::points(n),
        };
        reference.mapv(|s| interval.from_reference(s))
    }

    /// Adaptively approximate `f` on `interval` in the basis of `prefs`.
    ///
    /// # Arguments
    ///
    /// * `f`: The function to approximate.
    /// * `interval`: The interval of definition.
    /// * `prefs`: Tolerance, basis and the cap `max_length` on the number of samples.
    pub fn construct<F: Fn(f64) -> A>(f: F, interval: Interval, prefs: &Preferences) -> Result<Self> {
        Self::construct_with_scale(f, interval, prefs, 0.0)
    }

    /// Adaptively approximate `f`, measuring the tolerance against `scale_hint`
    /// whenever that exceeds the magnitude of `f` itself.
    ///
    /// This is used for residuals and corrections, which are small compared to
    /// the function they belong to and would otherwise be resolved down to
    /// rounding noise.
    pub fn construct_with_scale<F: Fn(f64) -> A>(
        f: F,
        interval: Interval,
        prefs: &Preferences,
        scale_hint: f64,
    ) -> Result<Self> {
        prefs.validate()?;

        for n in Preferences::refinement(INITIAL_LENGTH, prefs.max_length) {
            let x = Self::points(prefs.basis, n, interval);
            let values = x.mapv(&f);
            if values.iter().any(|v| !v.re().is_finite() || !v.im().is_finite()) {
                return Err(RustySpectralError::NonFiniteSample);
            }

            let candidate = Self::from_values(values, interval, prefs.basis);
            let magnitudes = candidate.coefficient_magnitudes();
            if let Some(length) = chop(magnitudes.as_slice().unwrap_or(&[]), prefs.tolerance, scale_hint) {
                log::debug!("univariate approximation resolved: {} samples, length {}", n, length);
                return Ok(candidate.truncate(length));
            }
        }

        Err(RustySpectralError::NotResolved {
            max_length: prefs.max_length,
        })
    }

    /// Build from values on `values.len()` points of `basis`.
    ///
    /// For the trigonometric basis the number of values must be odd.
    ///
    /// # Panics
    ///
    /// Panics if `basis` is [`Basis::Trigonometric`] and `values` has even length.
    pub fn from_values(values: Array1<A>, interval: Interval, basis: Basis) -> Self {
        let repr = match basis {
            Basis::Chebyshev => Representation::Chebyshev(chebtech::vals_to_coeffs(values.view())),
            Basis::Trigonometric => {
                assert!(values.len() % 2 == 1, "Trigonometric interpolants need an odd number of values.");
                Representation::Trigonometric(values)
            }
        };
        Chebfun { interval, repr }
    }

    /// Build from Chebyshev coefficients.
    pub fn from_coeffs(coeffs: Array1<A>, interval: Interval) -> Self {
        let coeffs = if coeffs.is_empty() {
            Array1::zeros(1)
        } else {
            coeffs
        };
        Chebfun {
            interval,
            repr: Representation::Chebyshev(coeffs),
        }
    }

    pub fn constant(value: A, interval: Interval, basis: Basis) -> Self {
        Self::from_values(Array1::from_elem(1, value), interval, basis)
    }

    pub fn zero(interval: Interval, basis: Basis) -> Self {
        Self::constant(A::zero(), interval, basis)
    }

    /// The identity function $x$ on `interval`.
    pub fn identity(interval: Interval) -> Self {
        let coeffs = Array1::from(vec![
            real(0.5 * (interval.a() + interval.b())),
            real(0.5 * interval.length()),
        ]);
        Self::from_coeffs(coeffs, interval)
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn basis(&self) -> Basis {
        match self.repr {
            Representation::Chebyshev(_) => Basis::Chebyshev,
            Representation::Trigonometric(_) => Basis::Trigonometric,
        }
    }

    /// Number of coefficients (Chebyshev) or grid values (trigonometric).
    pub fn length(&self) -> usize {
        match &self.repr {
            Representation::Chebyshev(c) => c.len(),
            Representation::Trigonometric(v) => v.len(),
        }
    }

    /// Chebyshev coefficients, `None` for a trigonometric representation.
    pub fn coeffs(&self) -> Option<ArrayView1<A>> {
        match &self.repr {
            Representation::Chebyshev(c) => Some(c.view()),
            Representation::Trigonometric(_) => None,
        }
    }

    /// Magnitudes of the expansion coefficients, ordered by degree.
    pub fn coefficient_magnitudes(&self) -> Array1<f64> {
        match &self.repr {
            Representation::Chebyshev(c) => c.mapv(|v| v.abs()),
            Representation::Trigonometric(v) => trigtech::mode_magnitudes(v.view()),
        }
    }

    /// Values on `n` points of the own basis.
    pub fn values_on(&self, n: usize) -> Array1<A> {
        match &self.repr {
            Representation::Chebyshev(c) => chebtech::coeffs_to_vals(c.view(), n),
            Representation::Trigonometric(v) => trigtech::resample(v.view(), n),
        }
    }

    /// Values on the own grid.
    pub fn values(&self) -> Array1<A> {
        self.values_on(self.length())
    }

    /// Largest magnitude on the own grid, an estimate of the sup norm.
    pub fn vscale(&self) -> f64 {
        self.values().iter().fold(0.0, |acc, v| acc.max(v.abs()))
    }

    pub fn is_zero(&self) -> bool {
        let data = match &self.repr {
            Representation::Chebyshev(c) => c,
            Representation::Trigonometric(v) => v,
        };
        data.iter().all(|v| *v == A::zero())
    }

    pub fn eval(&self, x: f64) -> A {
        let s = self.interval.to_reference(x);
        match &self.repr {
            Representation::Chebyshev(c) => chebtech::clenshaw(c.view(), s),
            Representation::Trigonometric(v) => trigtech::eval(v.view(), s),
        }
    }

    pub fn eval_many(&self, x: ArrayView1<f64>) -> Array1<A> {
        x.mapv(|t| self.eval(t))
    }

    fn truncate(self, length: usize) -> Self {
        let repr = match self.repr {
            Representation::Chebyshev(c) => {
                let keep = length.min(c.len()).max(1);
                Representation::Chebyshev(c.slice(s![..keep]).to_owned())
            }
            Representation::Trigonometric(v) => {
                let keep = (2 * length - 1).min(v.len());
                Representation::Trigonometric(trigtech::resample(v.view(), keep))
            }
        };
        Chebfun {
            interval: self.interval,
            repr,
        }
    }

    /// Drop trailing coefficients below `tol` relative to the larger of the own
    /// scale and `scale_hint`. Unresolved representations are returned unchanged.
    pub fn simplify(&self, tol: f64, scale_hint: f64) -> Self {
        let magnitudes = self.coefficient_magnitudes().to_vec();
        match chop(&magnitudes, tol, scale_hint) {
            Some(length) => self.clone().truncate(length),
            None => self.clone(),
        }
    }

    /// The `order`-th derivative.
    pub fn diff(&self, order: usize) -> Self {
        let scale = self.interval.scale();
        let repr = match &self.repr {
            Representation::Chebyshev(c) => {
                let mut coeffs = c.clone();
                for _ in 0..order {
                    coeffs = chebtech::diff_coeffs(coeffs.view()).mapv(|v| v.mul_real(scale));
                }
                Representation::Chebyshev(coeffs)
            }
            Representation::Trigonometric(v) => {
                let d = trigtech::differentiation_matrix(v.len()).mapv(|e| real::<A>(e * scale));
                let mut values = v.clone();
                for _ in 0..order {
                    values = d.dot(&values);
                }
                Representation::Trigonometric(values)
            }
        };
        Chebfun {
            interval: self.interval,
            repr,
        }
    }

    /// Definite integral over the interval.
    pub fn integral(&self) -> A {
        match &self.repr {
            Representation::Chebyshev(c) => {
                let moments = chebtech::integral_of_basis(c.len());
                c.iter()
                    .zip(moments.iter())
                    .fold(A::zero(), |acc, (&ck, &mk)| acc + ck.mul_real(mk))
                    .mul_real(0.5 * self.interval.length())
            }
            Representation::Trigonometric(v) => v
                .iter()
                .fold(A::zero(), |acc, &vk| acc + vk)
                .mul_real(self.interval.length() / v.len() as f64),
        }
    }

    /// The $L^2$ norm over the interval.
    pub fn norm_l2(&self) -> f64 {
        let n = 2 * self.length() + 1;
        let values = self.values_on(n);
        quadrature_weights(self.basis(), n, self.interval)
            .iter()
            .zip(values.iter())
            .map(|(w, v)| w * v.abs().powi(2))
            .sum::<f64>()
            .max(0.0)
            .sqrt()
    }

    /// Estimate of the maximum norm from values on a refined grid.
    pub fn norm_inf(&self) -> f64 {
        let n = std::cmp::max(4 * self.length() + 1, 33);
        self.values_on(n).iter().fold(0.0, |acc, v| acc.max(v.abs()))
    }

    fn check_compatible(&self, other: &Self) -> Result<()> {
        if self.interval == other.interval && self.basis() == other.basis() {
            Ok(())
        } else {
            Err(RustySpectralError::DomainMismatch)
        }
    }

    pub fn plus(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        let repr = match (&self.repr, &other.repr) {
            (Representation::Chebyshev(c1), Representation::Chebyshev(c2)) => {
                let n = c1.len().max(c2.len());
                let mut sum = Array1::<A>::zeros(n);
                sum.slice_mut(s![..c1.len()]).assign(c1);
                let mut tail = sum.slice_mut(s![..c2.len()]);
                tail += c2;
                Representation::Chebyshev(sum)
            }
            _ => {
                let n = self.length().max(other.length());
                Representation::Trigonometric(self.values_on(n) + other.values_on(n))
            }
        };
        Ok(Chebfun {
            interval: self.interval,
            repr,
        })
    }

    pub fn minus(&self, other: &Self) -> Result<Self> {
        self.plus(&other.neg())
    }

    /// Pointwise product.
    pub fn times(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        let n = self.length() + other.length() - 1;
        let values = self.values_on(n) * other.values_on(n);
        Ok(Self::from_values(values, self.interval, self.basis()))
    }

    pub fn scale(&self, factor: A) -> Self {
        self.map_data(|v| v * factor)
    }

    pub fn neg(&self) -> Self {
        self.map_data(|v| -v)
    }

    /// Complex conjugate.
    pub fn conj(&self) -> Self {
        self.map_data(|v| v.conj())
    }

    fn map_data<F: Fn(A) -> A>(&self, f: F) -> Self {
        let repr = match &self.repr {
            Representation::Chebyshev(c) => Representation::Chebyshev(c.mapv(&f)),
            Representation::Trigonometric(v) => Representation::Trigonometric(v.mapv(&f)),
        };
        Chebfun {
            interval: self.interval,
            repr,
        }
    }

    /// Approximate $g \circ f$ for a scalar map `g`.
    pub fn compose<G: Fn(A) -> A>(&self, g: G, prefs: &Preferences) -> Result<Self> {
        let prefs = prefs.with_basis(self.basis());
        Self::construct(|x| g(self.eval(x)), self.interval, &prefs)
    }
}

/// Quadrature weights on the `n` sample points of `basis` on `interval`.
///
/// Clenshaw–Curtis for Chebyshev points, the trapezoidal rule for equispaced
/// periodic points.
pub(crate) fn quadrature_weights(basis: Basis, n: usize, interval: Interval) -> Array1<f64> {
    match basis {
        Basis::Chebyshev => chebtech::quadrature_weights(n) * (0.5 * interval.length()),
        Basis::Trigonometric => Array1::from_elem(n, interval.length() / n as f64),
    }
}
