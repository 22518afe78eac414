//! Low-rank approximation of functions of two variables.
//!
//! A [`Chebfun2`] approximates $f(x, y)$ on a rectangle by a sum of
//! separable terms
//! $$f(x, y) \approx \sum_{i=1}^k C_i(x)\, D_i\, R_i(y),$$
//! where the column factors $C_i$ and row factors $R_i$ are univariate
//! [`Chebfun`]s normalised to unit scale and $D_i$ is a scalar weight. The
//! terms are found by adaptive cross approximation, see [`crate::cross`].

use crate::chebfun::{quadrature_weights, Chebfun};
use crate::cross::{adaptive_cross, CrossStep, CrossTerm};
use crate::domain::Rectangle;
use crate::preferences::{Basis, Preferences};
use crate::svd::{CompressionType, ComputeSVD};
use crate::types::{real, Result, RustySpectralError, ScalarType};
use ndarray::{Array1, Array2, ArrayView1};
use ndarray_linalg::QR;

/// Location and residual value of a cross approximation pivot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pivot<A> {
    pub x: f64,
    pub y: f64,
    pub value: A,
}

#[derive(Clone, Debug)]
struct Term<A: ScalarType> {
    column: Chebfun<A>,
    row: Chebfun<A>,
    weight: A,
    /// `None` for terms produced by recompression.
    pivot: Option<Pivot<A>>,
}

#[derive(Clone, Debug)]
pub struct Chebfun2<A: ScalarType> {
    domain: Rectangle,
    prefs: Preferences,
    terms: Vec<Term<A>>,
}

/// Number of samples per coordinate, odd for the trigonometric basis.
pub(crate) fn sample_size(basis: Basis, m: usize) -> usize {
    match basis {
        Basis::Trigonometric if m % 2 == 0 => m + 1,
        _ => m,
    }
}

/// Normalise a new column and row to unit scale and compute the weight so
/// that `column * weight * row` takes the value `pivot_value` at the pivot.
pub(crate) fn normalise<A: ScalarType>(
    column_scale: f64,
    row_scale: f64,
    pivot_value: A,
) -> Option<(A, A, A)> {
    if column_scale == 0.0 || row_scale == 0.0 || pivot_value == A::zero() {
        return None;
    }
    Some((
        real(1.0 / column_scale),
        real(1.0 / row_scale),
        real::<A>(column_scale * row_scale) / pivot_value,
    ))
}

impl<A: ScalarType> Chebfun2<A> {
    /// Approximate `f` on `domain` to the tolerance in `prefs`.
    ///
    /// # Arguments
    ///
    /// * `f`: The function to approximate.
    /// * `domain`: The rectangle of definition.
    /// * `prefs`: Tolerance, basis, rank cap and pivot grid sizes.
    pub fn construct<F: Fn(f64, f64) -> A>(f: F, domain: Rectangle, prefs: &Preferences) -> Result<Self> {
        Self::construct_with_scale(f, domain, prefs, 0.0)
    }

    /// As [`Chebfun2::construct`], with residuals measured against at least `scale_hint`.
    pub fn construct_with_scale<F: Fn(f64, f64) -> A>(
        f: F,
        domain: Rectangle,
        prefs: &Preferences,
        scale_hint: f64,
    ) -> Result<Self> {
        prefs.validate()?;

        let mut terms = Vec::new();
        let mut resolved = false;
        for m in Preferences::refinement(prefs.sample_grid, prefs.max_sample_grid) {
            let m = sample_size(prefs.basis, m);
            let xs = Chebfun::<A>::points(prefs.basis, m, domain.x);
            let ys = Chebfun::<A>::points(prefs.basis, m, domain.y);

            let samples = Array2::from_shape_fn((m, m), |(i, j)| f(xs[i], ys[j]));
            if samples.iter().any(|v| !v.re().is_finite() || !v.im().is_finite()) {
                return Err(RustySpectralError::NonFiniteSample);
            }

            let found = adaptive_cross(
                samples,
                prefs.tolerance,
                prefs.max_rank,
                scale_hint,
                |i, j, scale, terms: &[CrossTerm<A, Chebfun<A>, Chebfun<A>>]| {
                    let (x0, y0) = (xs[i], ys[j]);
                    let row_at_pivot: Vec<A> = terms.iter().map(|t| t.weight * t.row.eval(y0)).collect();
                    let column_at_pivot: Vec<A> = terms.iter().map(|t| t.column.eval(x0) * t.weight).collect();

                    let residual_column = |x: f64| {
                        terms
                            .iter()
                            .zip(row_at_pivot.iter())
                            .fold(f(x, y0), |acc, (t, &w)| acc - t.column.eval(x) * w)
                    };
                    let residual_row = |y: f64| {
                        terms
                            .iter()
                            .zip(column_at_pivot.iter())
                            .fold(f(x0, y), |acc, (t, &w)| acc - w * t.row.eval(y))
                    };

                    let pivot_value = residual_column(x0);
                    let column = Chebfun::construct_with_scale(&residual_column, domain.x, prefs, scale)?;
                    let row = Chebfun::construct_with_scale(&residual_row, domain.y, prefs, scale)?;

                    let (column_factor, row_factor, weight) =
                        match normalise(column.vscale(), row.vscale(), pivot_value) {
                            Some(factors) => factors,
                            None => return Ok(None),
                        };
                    let column = column.scale(column_factor);
                    let row = row.scale(row_factor);

                    Ok(Some(CrossStep {
                        column_samples: column.eval_many(xs.view()),
                        row_samples: row.eval_many(ys.view()),
                        column,
                        row,
                        weight,
                        pivot_value,
                    }))
                },
            )?;

            terms = found
                .into_iter()
                .map(|t| Term {
                    pivot: Some(Pivot {
                        x: xs[t.pivot.0],
                        y: ys[t.pivot.1],
                        value: t.pivot_value,
                    }),
                    column: t.column,
                    row: t.row,
                    weight: t.weight,
                })
                .collect::<Vec<_>>();

            resolved = terms
                .iter()
                .all(|t| t.column.length() <= m && t.row.length() <= m);
            if resolved {
                log::debug!("bivariate approximation: rank {} on a {}x{} pivot grid", terms.len(), m, m);
                break;
            }
            log::debug!("factors exceed the {}x{} pivot grid, refining", m, m);
        }

        if !resolved {
            return Err(RustySpectralError::GridNotResolved {
                max_sample_grid: prefs.max_sample_grid,
            });
        }

        Ok(Chebfun2 {
            domain,
            prefs: *prefs,
            terms,
        })
    }

    pub fn domain(&self) -> Rectangle {
        self.domain
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    /// The rank, the number of separable terms.
    pub fn length(&self) -> usize {
        self.terms.len()
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Column factors `C`, weights `D` and row factors `R` with
    /// $f(x, y) = \sum_i C_i(x) D_i R_i(y)$.
    pub fn cdr(&self) -> (Vec<Chebfun<A>>, Array1<A>, Vec<Chebfun<A>>) {
        let columns = self.terms.iter().map(|t| t.column.clone()).collect();
        let rows = self.terms.iter().map(|t| t.row.clone()).collect();
        (columns, self.diag(), rows)
    }

    /// The weights `D`.
    pub fn diag(&self) -> Array1<A> {
        self.terms.iter().map(|t| t.weight).collect()
    }

    /// Residual values at the pivots, in the order the pivots were chosen.
    pub fn pivot_values(&self) -> Array1<A> {
        self.terms.iter().filter_map(|t| t.pivot.map(|p| p.value)).collect()
    }

    pub fn pivot_locations(&self) -> Vec<(f64, f64)> {
        self.terms.iter().filter_map(|t| t.pivot.map(|p| (p.x, p.y))).collect()
    }

    /// Largest lengths of the column and of the row factors.
    pub fn factor_lengths(&self) -> (usize, usize) {
        self.terms.iter().fold((0, 0), |(lx, ly), t| {
            (lx.max(t.column.length()), ly.max(t.row.length()))
        })
    }

    pub fn eval(&self, x: f64, y: f64) -> A {
        self.terms
            .iter()
            .fold(A::zero(), |acc, t| acc + t.column.eval(x) * t.weight * t.row.eval(y))
    }

    /// Values on the tensor grid `xs` x `ys`, entry `(i, j)` is $f(x_i, y_j)$.
    pub fn eval_grid(&self, xs: ArrayView1<f64>, ys: ArrayView1<f64>) -> Array2<A> {
        let columns = self.factor_matrix(|t| t.column.eval_many(xs), xs.len());
        let rows = self.factor_matrix(|t| t.row.eval_many(ys), ys.len());
        let weights = Array2::from_diag(&self.diag());
        columns.dot(&weights).dot(&rows.t())
    }

    fn factor_matrix<G: Fn(&Term<A>) -> Array1<A>>(&self, values: G, n: usize) -> Array2<A> {
        let mut mat = Array2::<A>::zeros((n, self.length()));
        for (index, term) in self.terms.iter().enumerate() {
            mat.column_mut(index).assign(&values(term));
        }
        mat
    }

    /// Largest magnitude on a grid fine enough for the factors.
    pub fn vscale(&self) -> f64 {
        let (lx, ly) = self.factor_lengths();
        let basis = self.prefs.basis;
        let xs = Chebfun::<A>::points(basis, sample_size(basis, lx.max(9)), self.domain.x);
        let ys = Chebfun::<A>::points(basis, sample_size(basis, ly.max(9)), self.domain.y);
        self.eval_grid(xs.view(), ys.view())
            .iter()
            .fold(0.0, |acc, v| acc.max(v.abs()))
    }

    /// Integral over the rectangle.
    pub fn integral(&self) -> A {
        self.terms.iter().fold(A::zero(), |acc, t| {
            acc + t.column.integral() * t.weight * t.row.integral()
        })
    }

    pub fn scale(&self, factor: A) -> Self {
        let mut result = self.clone();
        for term in result.terms.iter_mut() {
            term.weight *= factor;
        }
        result
    }

    pub fn neg(&self) -> Self {
        self.scale(-A::one())
    }

    fn check_compatible(&self, other: &Self) -> Result<()> {
        if self.domain == other.domain && self.prefs.basis == other.prefs.basis {
            Ok(())
        } else {
            Err(RustySpectralError::DomainMismatch)
        }
    }

    /// Sum of two approximations, recompressed to the looser of the two tolerances.
    ///
    /// Truncation is relative to the larger of the two summands, so that
    /// cancellation, as in `f - f`, gives rank 0.
    pub fn plus(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        let mut terms = self.terms.clone();
        terms.extend(other.terms.iter().cloned());
        let sum = Chebfun2 {
            domain: self.domain,
            prefs: self.prefs,
            terms,
        };
        if sum.is_zero() {
            return Ok(sum);
        }

        let (nx, ny) = sum.factor_lengths();
        let reference = self
            .leading_singular_value(nx, ny)?
            .max(other.leading_singular_value(nx, ny)?);
        sum.truncate(self.prefs.tolerance.max(other.prefs.tolerance), reference)
    }

    pub fn minus(&self, other: &Self) -> Result<Self> {
        self.plus(&other.neg())
    }

    /// Pointwise product, approximated afresh by cross approximation.
    pub fn times(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        Self::construct(|x, y| self.eval(x, y) * other.eval(x, y), self.domain, &self.prefs)
    }

    /// Recompress to the smallest rank that keeps singular values above `tol`
    /// times the largest.
    ///
    /// The factors are sampled on grids that resolve them exactly, the sampled
    /// column and row matrices are QR factorised, and the small core
    /// $R_C \operatorname{diag}(D) R_R^T$ is truncated by its SVD.
    pub fn compress(&self, tol: f64) -> Result<Self> {
        if !(tol > 0.0 && tol < 1.0) {
            return Err(RustySpectralError::InvalidTolerance(tol));
        }
        if self.is_zero() {
            return Ok(self.clone());
        }
        self.truncate(tol, 0.0)
    }

    /// Orthonormal column samples, core matrix and orthonormal row samples on
    /// `nx` x `ny` points. The factors must have at most `nx` and `ny` coefficients.
    fn sampled_core(&self, nx: usize, ny: usize) -> Result<(Array2<A>, Array2<A>, Array2<A>)> {
        let columns = self.factor_matrix(|t| t.column.values_on(nx), nx);
        let rows = self.factor_matrix(|t| t.row.values_on(ny), ny);
        let (qc, rc) = columns.qr()?;
        let (qr, rr) = rows.qr()?;
        let core = rc.dot(&Array2::from_diag(&self.diag())).dot(&rr.t());
        Ok((qc, core, qr))
    }

    fn leading_singular_value(&self, nx: usize, ny: usize) -> Result<f64> {
        if self.is_zero() {
            return Ok(0.0);
        }
        let (_, core, _) = self.sampled_core(nx, ny)?;
        Ok(core.compute_svd()?.s.get(0).copied().unwrap_or(0.0))
    }

    /// Drop singular values below `tol` times the larger of the leading
    /// singular value and `reference`.
    fn truncate(&self, tol: f64, reference: f64) -> Result<Self> {
        let basis = self.prefs.basis;
        let (nx, ny) = self.factor_lengths();
        let (qc, core, qr) = self.sampled_core(nx, ny)?;

        let svd = core.compute_svd()?;
        let leading = svd.s.get(0).copied().unwrap_or(0.0);
        let rank = svd.rank_above(tol * leading.max(reference));
        let svd = svd.compress(CompressionType::RANK(rank));

        let new_columns = qc.dot(&svd.u);
        let new_rows = qr.dot(&svd.vt.t());

        let mut terms = Vec::with_capacity(rank);
        for (index, &sigma) in svd.s.iter().enumerate() {
            let column = Chebfun::from_values(new_columns.column(index).to_owned(), self.domain.x, basis);
            let row = Chebfun::from_values(new_rows.column(index).to_owned(), self.domain.y, basis);
            let (alpha, beta) = (column.vscale(), row.vscale());
            if alpha == 0.0 || beta == 0.0 {
                continue;
            }
            terms.push(Term {
                column: column.scale(real(1.0 / alpha)).simplify(tol, 1.0),
                row: row.scale(real(1.0 / beta)).simplify(tol, 1.0),
                weight: real(sigma * alpha * beta),
                pivot: None,
            });
        }
        log::debug!("compressed rank {} to {}", self.length(), terms.len());

        Ok(Chebfun2 {
            domain: self.domain,
            prefs: self.prefs,
            terms,
        })
    }

    /// The $L^2$ (Frobenius) norm over the rectangle.
    pub fn norm_fro(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        let basis = self.prefs.basis;
        let (lx, ly) = self.factor_lengths();
        let (nx, ny) = (2 * lx + 1, 2 * ly + 1);

        let columns = self.factor_matrix(|t| t.column.values_on(nx), nx);
        let rows = self.factor_matrix(|t| t.row.values_on(ny), ny);
        let values = columns.dot(&Array2::from_diag(&self.diag())).dot(&rows.t());

        let wx = quadrature_weights(basis, nx, self.domain.x);
        let wy = quadrature_weights(basis, ny, self.domain.y);
        values
            .indexed_iter()
            .map(|((i, j), v)| wx[i] * wy[j] * v.abs().powi(2))
            .sum::<f64>()
            .max(0.0)
            .sqrt()
    }
}
