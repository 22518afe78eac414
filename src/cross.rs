//! Adaptive cross approximation on a sampled unfolding.
//!
//! The engine works on a matrix of samples of the target function. Each step
//! picks the entry of largest residual magnitude, asks the caller to build the
//! corresponding column and row factors as continuous objects, and subtracts
//! the rank-one term from the sampled residual. The caller decides what a
//! column and a row are: univariate functions for [`crate::Chebfun2`], a
//! bivariate slice and a univariate tube for [`crate::Chebfun3`].

use crate::types::{Result, RustySpectralError, ScalarType};
use ndarray::{Array1, Array2, Axis};

/// Factors are resolved to `tol * scale`, so residuals within this multiple of
/// the threshold cannot be eliminated reliably and count as converged.
const STAGNATION_SLACK: f64 = 10.0;

/// A rank-one term `column * weight * row` as returned to the engine.
pub(crate) struct CrossStep<A: ScalarType, C, R> {
    pub column: C,
    pub row: R,
    pub weight: A,
    /// Residual value at the pivot before the step.
    pub pivot_value: A,
    /// Normalised column evaluated on the row sample points.
    pub column_samples: Array1<A>,
    /// Normalised row evaluated on the column sample points.
    pub row_samples: Array1<A>,
}

/// Terms found by [`adaptive_cross`] together with their pivot indices.
pub(crate) struct CrossTerm<A: ScalarType, C, R> {
    pub column: C,
    pub row: R,
    pub weight: A,
    pub pivot_value: A,
    pub pivot: (usize, usize),
}

/// Magnitude and position of the largest entry.
fn max_entry<A: ScalarType>(residual: &Array2<A>) -> (f64, (usize, usize)) {
    residual
        .indexed_iter()
        .fold((0.0, (0, 0)), |(best, index), (ij, value)| {
            let magnitude = value.abs();
            if magnitude > best {
                (magnitude, ij)
            } else {
                (best, index)
            }
        })
}

/// Run the cross approximation on `samples`.
///
/// `build(i, j, scale, terms)` constructs the term through pivot `(i, j)` from
/// the current residual, or returns `None` if no meaningful term exists. The
/// residual is measured against `scale`, the larger of the largest sample and
/// `scale_hint`. Stops when the largest residual sample is at most
/// `tol * scale`. A function whose first term cannot be built is degenerate
/// and gives no terms. Fails once `max_rank` terms did not suffice, or with
/// [`RustySpectralError::CrossApproximationStagnated`] when a later term
/// cannot reduce a residual well above the threshold.
pub(crate) fn adaptive_cross<A, C, R, B>(
    samples: Array2<A>,
    tol: f64,
    max_rank: usize,
    scale_hint: f64,
    mut build: B,
) -> Result<Vec<CrossTerm<A, C, R>>>
where
    A: ScalarType,
    B: FnMut(usize, usize, f64, &[CrossTerm<A, C, R>]) -> Result<Option<CrossStep<A, C, R>>>,
{
    let mut terms: Vec<CrossTerm<A, C, R>> = Vec::new();

    let (largest, _) = max_entry(&samples);
    if largest == 0.0 {
        return Ok(terms);
    }
    let scale = largest.max(scale_hint);

    let mut residual = samples;

    loop {
        let (magnitude, (i, j)) = max_entry(&residual);
        if magnitude <= tol * scale {
            log::debug!("cross approximation converged at rank {}", terms.len());
            break;
        }
        if terms.len() == max_rank {
            return Err(RustySpectralError::CrossApproximationNotConverged { max_rank });
        }

        let step = match build(i, j, scale, &terms)? {
            Some(step) => step,
            None => {
                stagnated(terms.len(), magnitude, tol, scale)?;
                break;
            }
        };

        let column = step.column_samples.insert_axis(Axis(1));
        let row = step.row_samples.insert_axis(Axis(0));
        let candidate = &residual - &(column.dot(&row) * step.weight);
        // A valid term removes the pivot entry from the residual.
        if !(candidate[[i, j]].abs() < 0.5 * magnitude) {
            stagnated(terms.len(), magnitude, tol, scale)?;
            break;
        }

        residual = candidate;
        terms.push(CrossTerm {
            column: step.column,
            row: step.row,
            weight: step.weight,
            pivot_value: step.pivot_value,
            pivot: (i, j),
        });
    }

    Ok(terms)
}

/// Decide whether a step that failed to reduce the residual ends the
/// approximation or is an error.
fn stagnated(rank: usize, magnitude: f64, tol: f64, scale: f64) -> Result<()> {
    let residual = magnitude / scale;
    log::debug!("cross approximation stagnated at rank {} with residual {:e}", rank, residual);
    if rank == 0 || residual <= STAGNATION_SLACK * tol {
        Ok(())
    } else {
        Err(RustySpectralError::CrossApproximationStagnated { rank, residual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random_matrix::RandomMatrix;
    use crate::types::{c64, RelDiff};

    /// Run the engine with discrete columns and rows of the matrix itself.
    fn matrix_cross<A: ScalarType>(mat: &Array2<A>, tol: f64, max_rank: usize) -> Result<Array2<A>> {
        let terms = adaptive_cross(mat.clone(), tol, max_rank, 0.0, |i, j, _, terms: &[CrossTerm<A, Array1<A>, Array1<A>>]| {
            let mut column = mat.column(j).to_owned();
            let mut row = mat.row(i).to_owned();
            for term in terms {
                column = column - &term.column * (term.weight * term.row[j]);
                row = row - &term.row * (term.weight * term.column[i]);
            }
            let pivot_value = column[i];
            Ok(Some(CrossStep {
                column_samples: column.clone(),
                row_samples: row.clone(),
                column,
                row,
                weight: A::one() / pivot_value,
                pivot_value,
            }))
        })?;

        let mut approx = Array2::<A>::zeros(mat.dim());
        for term in terms {
            let column = term.column.insert_axis(Axis(1));
            let row = term.row.insert_axis(Axis(0));
            approx = approx + column.dot(&row) * term.weight;
        }
        Ok(approx)
    }

    macro_rules! matrix_cross_tests {
        ($($name:ident: $scalar:ty, $dim:expr, $rank:expr,)*) => {
            $(
            #[test]
            fn $name() {
                let mut rng = rand::thread_rng();
                let singvals = Array1::from_shape_fn($rank, |k| 0.5f64.powi(k as i32));
                let mat = <$scalar>::random_matrix_with_spectrum($dim, &singvals, &mut rng).unwrap();

                let approx = matrix_cross(&mat, 1E-12, 50).unwrap();
                assert!(<$scalar>::rel_diff_max(&approx, &mat) < 1E-8);
            }
            )*
        };
    }

    matrix_cross_tests! {
        test_matrix_cross_f64_rank_5: f64, (40, 30), 5,
        test_matrix_cross_c64_rank_5: c64, (40, 30), 5,
        test_matrix_cross_f64_rank_12: f64, (30, 40), 12,
    }

    #[test]
    fn test_zero_samples_give_no_terms() {
        let mat = Array2::<f64>::zeros((10, 10));
        let terms = adaptive_cross(mat, 1E-10, 10, 0.0, |_, _, _, _: &[CrossTerm<f64, (), ()>]| Ok(None)).unwrap();
        assert!(terms.is_empty());
    }

    #[test]
    fn test_stagnation() {
        let mat = Array2::<f64>::eye(4);
        let calls = std::cell::Cell::new(0);
        // A first term that cannot be built means a degenerate function.
        let terms = adaptive_cross(mat.clone(), 1E-10, 10, 0.0, |_, _, _, _: &[CrossTerm<f64, (), ()>]| {
            calls.set(calls.get() + 1);
            Ok(None)
        })
        .unwrap();
        assert!(terms.is_empty());
        assert_eq!(calls.get(), 1);

        // After one term, a step that does not remove its pivot is an error.
        let result = adaptive_cross(mat, 1E-10, 10, 0.0, |i, _, _, terms: &[CrossTerm<f64, (), ()>]| {
            let mut samples = Array1::<f64>::zeros(4);
            if terms.is_empty() {
                samples[i] = 1.0;
            }
            Ok(Some(CrossStep {
                column: (),
                row: (),
                weight: 1.0,
                pivot_value: 1.0,
                column_samples: samples.clone(),
                row_samples: samples,
            }))
        });
        assert!(matches!(
            result,
            Err(RustySpectralError::CrossApproximationStagnated { rank: 1, .. })
        ));
    }

    #[test]
    fn test_rank_cap() {
        let mat = Array2::<f64>::eye(8);
        let result = matrix_cross(&mat, 1E-10, 3);
        assert!(matches!(
            result,
            Err(RustySpectralError::CrossApproximationNotConverged { max_rank: 3 })
        ));
        let exact = matrix_cross(&mat, 1E-10, 8).unwrap();
        assert!(f64::rel_diff_max(&exact, &mat) < 1E-14);
    }
}
