//! Collect all traits and other exports here.

pub use crate::chebfun::Chebfun;
pub use crate::chebfun2::Chebfun2;
pub use crate::chebfun3::Chebfun3;
pub use crate::discretization::Discretize;
pub use crate::domain::{Cuboid, Interval, Rectangle};
pub use crate::expm::{expm, expm_at, Semigroup};
pub use crate::expr::{ElementaryFunction, Expr};
pub use crate::matrix_exp::MatrixExp;
pub use crate::operator::{BoundaryConditions, Functional, Operator};
pub use crate::preferences::{Basis, Discretization, Preferences};
pub use crate::random_matrix::RandomMatrix;
pub use crate::svd::ComputeSVD;
pub use crate::types::{c64, RelDiff, ScalarType};
