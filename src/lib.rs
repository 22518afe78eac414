//! Spectral approximation of functions and solution operators in Rust.
//!
//! Smooth functions of one, two and three variables are represented by
//! Chebyshev or trigonometric expansions. Functions of several variables are
//! compressed into sums of products of univariate functions by adaptive cross
//! approximation. Linear differential operators with side conditions are
//! discretized spectrally and propagated in time with matrix exponentials.

pub mod chebtech;
pub mod chop;
pub mod domain;
pub mod preferences;
pub mod trigtech;
pub mod types;

pub mod chebfun;
pub mod chebfun2;
pub mod chebfun3;
pub(crate) mod cross;

pub mod discretization;
pub mod expm;
pub mod expr;
pub mod matrix_exp;
pub mod operator;
pub mod ultraspherical;

pub mod prelude;
pub mod random_matrix;
pub mod svd;

pub use chebfun::Chebfun;
pub use chebfun2::{Chebfun2, Pivot};
pub use chebfun3::Chebfun3;
pub use discretization::{ChebCollocation, DiscretizationMatrix, Discretize, TrigCollocation, Ultraspherical};
#[allow(deprecated)]
pub use expm::{expm, expm_at, expm_operator, propagate, Semigroup, UnitTimePropagator};
pub use domain::{Cuboid, Interval, Rectangle};
pub use expr::{ElementaryFunction, Expr};
pub use matrix_exp::MatrixExp;
pub use operator::{BoundaryConditions, Functional, Linearization, LinearOperator, Operator};
pub use preferences::{Basis, Discretization, Preferences};
pub use random_matrix::RandomMatrix;
pub use svd::{CompressionType, ComputeSVD, SVDData};
pub use types::{c64, Nonlinearity, RelDiff, Result, RustySpectralError, Scalar, ScalarType};
