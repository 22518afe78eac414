//! Low-rank approximation of functions of three variables.
//!
//! The function is unfolded into a function of $(x, y)$ and $z$ and
//! approximated by cross approximation as
//! $$f(x, y, z) \approx \sum_{i=1}^k S_i(x, y)\, D_i\, T_i(z)$$
//! with bivariate slices $S_i$ (each a [`Chebfun2`]) and univariate tubes $T_i$.

use crate::chebfun::Chebfun;
use crate::chebfun2::{normalise, sample_size, Chebfun2};
use crate::cross::{adaptive_cross, CrossStep, CrossTerm};
use crate::domain::Cuboid;
use crate::preferences::Preferences;
use crate::types::{Result, RustySpectralError, ScalarType};
use ndarray::{Array1, Array2};

#[derive(Clone, Debug)]
struct Term<A: ScalarType> {
    slice: Chebfun2<A>,
    tube: Chebfun<A>,
    weight: A,
    pivot: (f64, f64, f64),
    pivot_value: A,
}

#[derive(Clone, Debug)]
pub struct Chebfun3<A: ScalarType> {
    domain: Cuboid,
    prefs: Preferences,
    terms: Vec<Term<A>>,
}

impl<A: ScalarType> Chebfun3<A> {
    /// Approximate `f` on `domain` to the tolerance in `prefs`.
    ///
    /// # Arguments
    ///
    /// * `f`: The function to approximate.
    /// * `domain`: The cuboid of definition.
    /// * `prefs`: Tolerance, basis, rank cap and pivot grid sizes, also used for the slices.
    pub fn construct<F: Fn(f64, f64, f64) -> A>(f: F, domain: Cuboid, prefs: &Preferences) -> Result<Self> {
        prefs.validate()?;
        let face = domain.xy();

        let mut terms = Vec::new();
        let mut resolved = false;
        for m in Preferences::refinement(prefs.sample_grid, prefs.max_sample_grid) {
            let m = sample_size(prefs.basis, m);
            let xs = Chebfun::<A>::points(prefs.basis, m, domain.x);
            let ys = Chebfun::<A>::points(prefs.basis, m, domain.y);
            let zs = Chebfun::<A>::points(prefs.basis, m, domain.z);

            // Row index a * m + b stands for (xs[a], ys[b]).
            let samples = Array2::from_shape_fn((m * m, m), |(i, k)| f(xs[i / m], ys[i % m], zs[k]));
            if samples.iter().any(|v| !v.re().is_finite() || !v.im().is_finite()) {
                return Err(RustySpectralError::NonFiniteSample);
            }

            let found = adaptive_cross(
                samples,
                prefs.tolerance,
                prefs.max_rank,
                0.0,
                |i, k, scale, terms: &[CrossTerm<A, Chebfun2<A>, Chebfun<A>>]| {
                    let (x0, y0, z0) = (xs[i / m], ys[i % m], zs[k]);
                    let tube_at_pivot: Vec<A> = terms.iter().map(|t| t.weight * t.row.eval(z0)).collect();
                    let slice_at_pivot: Vec<A> = terms.iter().map(|t| t.column.eval(x0, y0) * t.weight).collect();

                    let residual_slice = |x: f64, y: f64| {
                        terms
                            .iter()
                            .zip(tube_at_pivot.iter())
                            .fold(f(x, y, z0), |acc, (t, &w)| acc - t.column.eval(x, y) * w)
                    };
                    let residual_tube = |z: f64| {
                        terms
                            .iter()
                            .zip(slice_at_pivot.iter())
                            .fold(f(x0, y0, z), |acc, (t, &w)| acc - w * t.row.eval(z))
                    };

                    let pivot_value = residual_tube(z0);
                    let slice = Chebfun2::construct_with_scale(&residual_slice, face, prefs, scale)?;
                    let tube = Chebfun::construct_with_scale(&residual_tube, domain.z, prefs, scale)?;

                    let (slice_factor, tube_factor, weight) =
                        match normalise(slice.vscale(), tube.vscale(), pivot_value) {
                            Some(factors) => factors,
                            None => return Ok(None),
                        };
                    let slice = slice.scale(slice_factor);
                    let tube = tube.scale(tube_factor);

                    let slice_samples = slice.eval_grid(xs.view(), ys.view());
                    Ok(Some(CrossStep {
                        column_samples: slice_samples.iter().cloned().collect::<Array1<A>>(),
                        row_samples: tube.eval_many(zs.view()),
                        column: slice,
                        row: tube,
                        weight,
                        pivot_value,
                    }))
                },
            )?;

            terms = found
                .into_iter()
                .map(|t| Term {
                    pivot: (xs[t.pivot.0 / m], ys[t.pivot.0 % m], zs[t.pivot.1]),
                    pivot_value: t.pivot_value,
                    slice: t.column,
                    tube: t.row,
                    weight: t.weight,
                })
                .collect::<Vec<_>>();

            resolved = terms.iter().all(|t| {
                let (lx, ly) = t.slice.factor_lengths();
                lx <= m && ly <= m && t.tube.length() <= m
            });
            if resolved {
                log::debug!("trivariate approximation: rank {} on a {}^3 pivot grid", terms.len(), m);
                break;
            }
            log::debug!("factors exceed the {}^3 pivot grid, refining", m);
        }

        if !resolved {
            return Err(RustySpectralError::GridNotResolved {
                max_sample_grid: prefs.max_sample_grid,
            });
        }

        Ok(Chebfun3 {
            domain,
            prefs: *prefs,
            terms,
        })
    }

    pub fn domain(&self) -> Cuboid {
        self.domain
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    /// Number of slice-tube terms.
    pub fn length(&self) -> usize {
        self.terms.len()
    }

    /// Slices `S`, weights `D` and tubes `T` with
    /// $f(x, y, z) = \sum_i S_i(x, y) D_i T_i(z)$.
    pub fn cdr(&self) -> (Vec<Chebfun2<A>>, Array1<A>, Vec<Chebfun<A>>) {
        let slices = self.terms.iter().map(|t| t.slice.clone()).collect();
        let tubes = self.terms.iter().map(|t| t.tube.clone()).collect();
        (slices, self.diag(), tubes)
    }

    pub fn diag(&self) -> Array1<A> {
        self.terms.iter().map(|t| t.weight).collect()
    }

    pub fn pivot_values(&self) -> Array1<A> {
        self.terms.iter().map(|t| t.pivot_value).collect()
    }

    pub fn pivot_locations(&self) -> Vec<(f64, f64, f64)> {
        self.terms.iter().map(|t| t.pivot).collect()
    }

    pub fn eval(&self, x: f64, y: f64, z: f64) -> A {
        self.terms
            .iter()
            .fold(A::zero(), |acc, t| acc + t.slice.eval(x, y) * t.weight * t.tube.eval(z))
    }

    /// Integral over the box.
    pub fn integral(&self) -> A {
        self.terms
            .iter()
            .fold(A::zero(), |acc, t| acc + t.slice.integral() * t.weight * t.tube.integral())
    }

    pub fn scale(&self, factor: A) -> Self {
        let mut result = self.clone();
        for term in result.terms.iter_mut() {
            term.weight *= factor;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Interval;
    use crate::types::{c64, Scalar};

    #[test]
    fn test_rank_of_sine_of_sum() {
        let prefs = Preferences::default();
        let f = Chebfun3::<f64>::construct(|x, y, z| (x + y + z).sin(), Cuboid::default(), &prefs).unwrap();
        assert_eq!(f.length(), 2);
        for &(x, y, z) in &[(0.1, -0.4, 0.9), (-0.95, 0.3, 0.0), (0.7, 0.7, -0.2)] {
            assert!((f.eval(x, y, z) - (x + y + z).sin()).abs() < 1E-9);
        }
    }

    #[test]
    fn test_separable_function_has_rank_one() {
        let prefs = Preferences::default();
        let g = |x: f64, y: f64, z: f64| x.exp() * y.cos() * (1.0 + z * z);
        let f = Chebfun3::<f64>::construct(g, Cuboid::default(), &prefs).unwrap();
        assert_eq!(f.length(), 1);
        assert!((f.eval(0.2, 0.3, -0.6) - g(0.2, 0.3, -0.6)).abs() < 1E-10);

        let (slices, weights, tubes) = f.cdr();
        assert_eq!(slices[0].length(), 1);
        let from_cdr = slices[0].eval(0.2, 0.3) * weights[0] * tubes[0].eval(-0.6);
        assert!((from_cdr - f.eval(0.2, 0.3, -0.6)).abs() < 1E-14);
    }

    #[test]
    fn test_pivot_grid_is_refined() {
        let g = |x: f64, y: f64, z: f64| (3.0 * (x + y + z)).sin();
        let prefs = Preferences::default().with_sample_grid(5);
        let f = Chebfun3::<f64>::construct(g, Cuboid::default(), &prefs).unwrap();
        assert_eq!(f.length(), 2);
        let (_, _, tubes) = f.cdr();
        assert!(tubes.iter().any(|t| t.length() > 5));
        for &(x, y, z) in &[(0.1, -0.4, 0.9), (-0.95, 0.3, 0.0)] {
            assert!((f.eval(x, y, z) - g(x, y, z)).abs() < 1E-9);
        }

        let capped = prefs.with_sample_grids(5, 5);
        assert!(matches!(
            Chebfun3::<f64>::construct(g, Cuboid::default(), &capped),
            Err(RustySpectralError::GridNotResolved { max_sample_grid: 5 })
        ));
    }

    #[test]
    fn test_zero_function() {
        let f = Chebfun3::<f64>::construct(|_, _, _| 0.0, Cuboid::default(), &Preferences::default()).unwrap();
        assert_eq!(f.length(), 0);
        assert_eq!(f.eval(0.3, 0.1, 0.2), 0.0);
    }

    #[test]
    fn test_rational_function_and_integral() {
        let prefs = Preferences::default();
        let unit = Interval::new(0.0, 1.0).unwrap();
        let domain = Cuboid::new(unit, unit, unit);

        let g = |x: f64, y: f64, z: f64| 1.0 / (2.0 + x + y * z);
        let f = Chebfun3::<f64>::construct(g, domain, &prefs).unwrap();
        assert!(f.length() > 1);
        for &(x, y, z) in &[(0.1, 0.4, 0.9), (0.95, 0.3, 0.0), (0.5, 0.5, 0.5)] {
            assert!((f.eval(x, y, z) - g(x, y, z)).abs() < 1E-8);
        }

        let e = Chebfun3::<f64>::construct(|x, y, z| (x + y + z).exp(), domain, &prefs).unwrap();
        let expected = (1f64.exp() - 1.0).powi(3);
        assert!((e.integral() - expected).abs() < 1E-10);
    }

    #[test]
    fn test_complex_plane_wave() {
        let prefs = Preferences::default();
        let g = |x: f64, y: f64, z: f64| c64::new(0.0, x - 2.0 * y + 0.5 * z).exp();
        let f = Chebfun3::<c64>::construct(g, Cuboid::default(), &prefs).unwrap();
        assert_eq!(f.length(), 1);
        assert!((f.eval(-0.3, 0.8, 0.4) - g(-0.3, 0.8, 0.4)).abs() < 1E-10);
        assert!((f.scale(c64::new(0.0, 2.0)).eval(0.0, 0.0, 0.0) - c64::new(0.0, 2.0)).abs() < 1E-10);
    }
}
