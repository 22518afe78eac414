//! Error type, scalar trait and small helpers shared by all modules.

use ndarray::{ArrayBase, Data, Dimension, ScalarOperand};
use ndarray_linalg::error::LinalgError;
use ndarray_linalg::{Lapack, Norm};
use thiserror::Error;

pub use ndarray_linalg::{c64, Scalar};

/// Reason why an operator failed the linearity check.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nonlinearity {
    #[error("product of two expressions depending on the unknown")]
    ProductOfUnknowns,
    #[error("nonlinear function applied to the unknown")]
    NonlinearFunction,
    #[error("operator has a forcing term independent of the unknown")]
    Inhomogeneous,
}

#[derive(Error, Debug)]
pub enum RustySpectralError {
    #[error("Lapack Error: {0}")]
    LinalgError(#[from] LinalgError),
    #[error("Could not resolve function with {max_length} samples")]
    NotResolved { max_length: usize },
    #[error("Function returned a non-finite value")]
    NonFiniteSample,
    #[error("Cross approximation did not converge within rank {max_rank}")]
    CrossApproximationNotConverged { max_rank: usize },
    #[error("Cross approximation stagnated at rank {rank} with relative residual {residual:e}")]
    CrossApproximationStagnated { rank: usize, residual: f64 },
    #[error("Factors not resolved on a pivot grid of {max_sample_grid} points")]
    GridNotResolved { max_sample_grid: usize },
    #[error("Incompatible domains or bases")]
    DomainMismatch,
    #[error("Invalid interval [{0}, {1}]")]
    InvalidInterval(f64, f64),
    #[error("Invalid tolerance {0}, require 0 < tol < 1")]
    InvalidTolerance(f64),
    #[error("Invalid preferences: {0}")]
    InvalidPreferences(&'static str),
    #[error("Invalid time value {0}")]
    InvalidTime(f64),
    #[error("Nonlinear operator: {0}")]
    NonlinearOperator(Nonlinearity),
    #[error("Discretization not resolved with maximum dimension {max_dimension}")]
    DiscretizationNotResolved { max_dimension: usize },
    #[error("Operator of order {order} requires {order} boundary conditions, got {constraints}")]
    BoundaryConditionMismatch { order: usize, constraints: usize },
    #[error("{constraints} boundary conditions do not fit a discretization of dimension {dimension}")]
    OverdeterminedBoundaryConditions { constraints: usize, dimension: usize },
    #[error("Boundary conditions are linearly dependent")]
    DependentBoundaryConditions,
    #[error("Non-periodic boundary condition with a trigonometric discretization")]
    NonPeriodicConstraint,
}

pub type Result<T> = std::result::Result<T, RustySpectralError>;

/// Scalars supported by the function types: `f64` and `c64`.
///
/// Domains are always real, so the real type is fixed to `f64`.
pub trait ScalarType: Scalar<Real = f64> + Lapack + ScalarOperand {}

impl<A: Scalar<Real = f64> + Lapack + ScalarOperand> ScalarType for A {}

/// Convert a real number into the scalar type.
pub(crate) fn real<A: ScalarType>(value: f64) -> A {
    A::from_real(value)
}

pub trait RelDiff {
    type A: ScalarType;

    /// Return the relative l2 (Frobenius for matrices) norm difference of `first` and `second`.
    fn rel_diff_l2<S1, S2, D>(first: &ArrayBase<S1, D>, second: &ArrayBase<S2, D>) -> f64
    where
        S1: Data<Elem = Self::A>,
        S2: Data<Elem = Self::A>,
        D: Dimension;

    /// Return the relative maximum norm difference of `first` and `second`.
    fn rel_diff_max<S1, S2, D>(first: &ArrayBase<S1, D>, second: &ArrayBase<S2, D>) -> f64
    where
        S1: Data<Elem = Self::A>,
        S2: Data<Elem = Self::A>,
        D: Dimension;
}

impl<A: ScalarType> RelDiff for A {
    type A = A;

    fn rel_diff_l2<S1, S2, D>(first: &ArrayBase<S1, D>, second: &ArrayBase<S2, D>) -> f64
    where
        S1: Data<Elem = A>,
        S2: Data<Elem = A>,
        D: Dimension,
    {
        let diff = first.to_owned() - second;
        diff.norm_l2() / second.norm_l2()
    }

    fn rel_diff_max<S1, S2, D>(first: &ArrayBase<S1, D>, second: &ArrayBase<S2, D>) -> f64
    where
        S1: Data<Elem = A>,
        S2: Data<Elem = A>,
        D: Dimension,
    {
        let diff = first.to_owned() - second;
        diff.norm_max() / second.norm_max()
    }
}
