//! Matrix exponential by Padé approximation with scaling and squaring.
//!
//! Follows Higham, "The scaling and squaring method for the matrix
//! exponential revisited" (2005): the degree of the diagonal Padé approximant
//! is chosen from the 1-norm of the matrix, and for large norms the matrix is
//! scaled by a power of two before the degree 13 approximant is applied and the
//! result squared back.

use crate::types::{real, Result, ScalarType};
use ndarray::{Array2, ArrayBase, Axis, Data, Ix2};
use ndarray_linalg::error::LinalgError;
use ndarray_linalg::{FactorizeInto, OperationNorm, Solve};

const THETA: [f64; 5] = [
    1.495585217958292e-2,
    2.539398330063230e-1,
    9.504178996162932e-1,
    2.097847961257068e0,
    5.371920351148152e0,
];

const PADE_3: [f64; 4] = [120.0, 60.0, 12.0, 1.0];
const PADE_5: [f64; 6] = [30240.0, 15120.0, 3360.0, 420.0, 30.0, 1.0];
const PADE_7: [f64; 8] = [
    17297280.0, 8648640.0, 1995840.0, 277200.0, 25200.0, 1512.0, 56.0, 1.0,
];
const PADE_9: [f64; 10] = [
    17643225600.0,
    8821612800.0,
    2075673600.0,
    302702400.0,
    30270240.0,
    2162160.0,
    110880.0,
    3960.0,
    90.0,
    1.0,
];
const PADE_13: [f64; 14] = [
    64764752532480000.0,
    32382376266240000.0,
    7771770303897600.0,
    1187353796428800.0,
    129060195264000.0,
    10559470521600.0,
    670442572800.0,
    33522128640.0,
    1323241920.0,
    40840800.0,
    960960.0,
    16380.0,
    182.0,
    1.0,
];

pub trait MatrixExp {
    type A: ScalarType;

    /// Return $e^A$ for a square matrix $A$.
    fn expm(&self) -> Result<Array2<Self::A>>;
}

impl<A: ScalarType, S: Data<Elem = A>> MatrixExp for ArrayBase<S, Ix2> {
    type A = A;

    fn expm(&self) -> Result<Array2<A>> {
        let (rows, cols) = self.dim();
        if rows != cols {
            return Err(LinalgError::NotSquare {
                rows: rows as i32,
                cols: cols as i32,
            }
            .into());
        }
        if rows == 0 {
            return Ok(Array2::zeros((0, 0)));
        }

        let mat = self.to_owned();
        let norm = mat.opnorm_one()?;

        let low_degrees: [&[f64]; 4] = [&PADE_3, &PADE_5, &PADE_7, &PADE_9];
        for (coeffs, &theta) in low_degrees.iter().zip(THETA.iter()) {
            if norm <= theta {
                return pade(&mat, coeffs);
            }
        }

        let squarings = (norm / THETA[4]).log2().ceil().max(0.0) as i32;
        let scaled = &mat * real::<A>(2f64.powi(-squarings));
        let mut result = pade_13(&scaled)?;
        for _ in 0..squarings {
            result = result.dot(&result);
        }
        Ok(result)
    }
}

/// Diagonal Padé approximant of degree 3, 5, 7 or 9 from its coefficients.
fn pade<A: ScalarType>(mat: &Array2<A>, coeffs: &[f64]) -> Result<Array2<A>> {
    let n = mat.nrows();
    let square = mat.dot(mat);

    let mut power = Array2::<A>::eye(n);
    let mut odd = Array2::<A>::zeros((n, n));
    let mut even = Array2::<A>::zeros((n, n));
    for pair in coeffs.chunks(2) {
        even.scaled_add(real::<A>(pair[0]), &power);
        odd.scaled_add(real::<A>(pair[1]), &power);
        power = power.dot(&square);
    }
    let odd = mat.dot(&odd);
    solve_pade(odd, even)
}

fn pade_13<A: ScalarType>(mat: &Array2<A>) -> Result<Array2<A>> {
    let n = mat.nrows();
    let b = |k: usize| real::<A>(PADE_13[k]);
    let ident = Array2::<A>::eye(n);
    let a2 = mat.dot(mat);
    let a4 = a2.dot(&a2);
    let a6 = a4.dot(&a2);

    let inner_odd = &a6 * b(13) + &a4 * b(11) + &a2 * b(9);
    let odd = a6.dot(&inner_odd) + &a6 * b(7) + &a4 * b(5) + &a2 * b(3) + &ident * b(1);
    let odd = mat.dot(&odd);

    let inner_even = &a6 * b(12) + &a4 * b(10) + &a2 * b(8);
    let even = a6.dot(&inner_even) + &a6 * b(6) + &a4 * b(4) + &a2 * b(2) + &ident * b(0);

    solve_pade(odd, even)
}

/// Solve $(V - U) X = V + U$.
fn solve_pade<A: ScalarType>(odd: Array2<A>, even: Array2<A>) -> Result<Array2<A>> {
    let rhs = &even + &odd;
    solve_columns(even - odd, &rhs)
}

/// Solve `lhs * X = rhs` column by column with one LU factorization.
pub(crate) fn solve_columns<A: ScalarType>(lhs: Array2<A>, rhs: &Array2<A>) -> Result<Array2<A>> {
    let factorized = lhs.factorize_into()?;
    let mut result = Array2::<A>::zeros(rhs.dim());
    for (index, col) in rhs.axis_iter(Axis(1)).enumerate() {
        result
            .index_axis_mut(Axis(1), index)
            .assign(&factorized.solve(&col.to_owned())?);
    }
    Ok(result)
}
