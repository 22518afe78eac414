//! Differential operators with homogeneous side conditions.

use crate::chebfun::Chebfun;
use crate::domain::Interval;
use crate::expr::{linear_form, Expr};
use crate::preferences::Preferences;
use crate::types::{Nonlinearity, Result, RustySpectralError, ScalarType};

/// A linear functional $B u$ used as side condition $B u = 0$.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Functional {
    /// $u^{(d)}(p)$ for `derivative` $d$ and `point` $p$.
    PointEvaluation { point: f64, derivative: usize },
    /// $u^{(d)}(b) - u^{(d)}(a)$ on $[a, b]$.
    PeriodicJump { derivative: usize },
    /// $\int_a^b u \, dx$.
    Integral,
}

impl Functional {
    pub fn is_periodic(&self) -> bool {
        matches!(self, Functional::PeriodicJump { .. })
    }

    /// Apply the functional to a function.
    pub fn apply<A: ScalarType>(&self, u: &Chebfun<A>) -> A {
        match *self {
            Functional::PointEvaluation { point, derivative } => u.diff(derivative).eval(point),
            Functional::PeriodicJump { derivative } => {
                let du = u.diff(derivative);
                let interval = u.interval();
                du.eval(interval.b()) - du.eval(interval.a())
            }
            Functional::Integral => u.integral(),
        }
    }
}

/// Side conditions of an operator.
#[derive(Clone, Debug, PartialEq)]
pub enum BoundaryConditions {
    None,
    /// $u(a) = u(b) = 0$.
    Dirichlet,
    /// $u'(a) = u'(b) = 0$.
    Neumann,
    /// Continuity of $u, u', \dots, u^{(m-1)}$ across the ends, for an operator of order $m$.
    Periodic,
    Custom(Vec<Functional>),
}

impl BoundaryConditions {
    /// The functionals for an operator of order `order` on `interval`.
    pub fn functionals(&self, interval: Interval, order: usize) -> Vec<Functional> {
        let ends = |derivative| {
            vec![
                Functional::PointEvaluation {
                    point: interval.a(),
                    derivative,
                },
                Functional::PointEvaluation {
                    point: interval.b(),
                    derivative,
                },
            ]
        };
        match self {
            BoundaryConditions::None => Vec::new(),
            BoundaryConditions::Dirichlet => ends(0),
            BoundaryConditions::Neumann => ends(1),
            BoundaryConditions::Periodic => (0..order)
                .map(|derivative| Functional::PeriodicJump { derivative })
                .collect(),
            BoundaryConditions::Custom(functionals) => functionals.clone(),
        }
    }
}

/// $L u = \sum_k a_k(x) u^{(k)}$ together with side conditions.
#[derive(Clone, Debug)]
pub struct LinearOperator<A: ScalarType> {
    interval: Interval,
    coeffs: Vec<Chebfun<A>>,
    constraints: Vec<Functional>,
}

impl<A: ScalarType> LinearOperator<A> {
    pub fn new(interval: Interval, coeffs: Vec<Chebfun<A>>, constraints: Vec<Functional>) -> Result<Self> {
        if coeffs.iter().any(|a| a.interval() != interval) {
            return Err(RustySpectralError::DomainMismatch);
        }
        Ok(LinearOperator {
            interval,
            coeffs,
            constraints,
        })
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    /// Differential order, the index of the highest nonzero coefficient.
    pub fn order(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    /// `coeffs()[k]` multiplies the `k`-th derivative.
    pub fn coeffs(&self) -> &[Chebfun<A>] {
        &self.coeffs
    }

    pub fn constraints(&self) -> &[Functional] {
        &self.constraints
    }

    /// Apply the operator to `u`, ignoring the side conditions.
    pub fn apply(&self, u: &Chebfun<A>) -> Result<Chebfun<A>> {
        let mut result = Chebfun::zero(self.interval, u.basis());
        for (k, a) in self.coeffs.iter().enumerate() {
            result = result.plus(&a.times(&u.diff(k))?)?;
        }
        Ok(result)
    }
}

/// Outcome of the linearity check.
#[derive(Clone, Debug)]
pub enum Linearization<A: ScalarType> {
    Linear(LinearOperator<A>),
    Nonlinear(Nonlinearity),
}

impl<A: ScalarType> Linearization<A> {
    pub fn is_linear(&self) -> bool {
        matches!(self, Linearization::Linear(_))
    }

    /// The linear operator, or [`RustySpectralError::NonlinearOperator`].
    pub fn into_linear(self) -> Result<LinearOperator<A>> {
        match self {
            Linearization::Linear(op) => Ok(op),
            Linearization::Nonlinear(kind) => Err(RustySpectralError::NonlinearOperator(kind)),
        }
    }
}

/// An operator given by an expression in the unknown and side conditions.
#[derive(Clone, Debug)]
pub struct Operator<A: ScalarType> {
    interval: Interval,
    expr: Expr<A>,
    boundary_conditions: BoundaryConditions,
}

impl<A: ScalarType> Operator<A> {
    pub fn new(interval: Interval, expr: Expr<A>) -> Self {
        Operator {
            interval,
            expr,
            boundary_conditions: BoundaryConditions::None,
        }
    }

    pub fn with_boundary_conditions(self, boundary_conditions: BoundaryConditions) -> Self {
        Operator {
            boundary_conditions,
            ..self
        }
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn expr(&self) -> &Expr<A> {
        &self.expr
    }

    pub fn boundary_conditions(&self) -> &BoundaryConditions {
        &self.boundary_conditions
    }

    /// Compute the coefficients of the operator and check that it is linear
    /// and homogeneous.
    ///
    /// Only numerical failures are returned as errors; a nonlinear operator
    /// gives [`Linearization::Nonlinear`].
    pub fn linearize(&self, prefs: &Preferences) -> Result<Linearization<A>> {
        let form = match linear_form(&self.expr, self.interval, prefs) {
            Ok(form) => form,
            Err(RustySpectralError::NonlinearOperator(kind)) => return Ok(Linearization::Nonlinear(kind)),
            Err(e) => return Err(e),
        };
        if !form.constant.is_zero() {
            return Ok(Linearization::Nonlinear(Nonlinearity::Inhomogeneous));
        }

        let order = form.coeffs.len().saturating_sub(1);
        let constraints = self.boundary_conditions.functionals(self.interval, order);
        log::debug!(
            "linearized operator of order {} with {} side conditions",
            order,
            constraints.len()
        );
        Ok(Linearization::Linear(LinearOperator::new(
            self.interval,
            form.coeffs,
            constraints,
        )?))
    }
}
