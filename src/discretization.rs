//! Discretizations of linear operators with homogeneous side conditions.
//!
//! A discretization of dimension $n$ turns $u' = L u$, $B u = 0$ into
//! $$M v' = G v, \quad M = \begin{bmatrix} B \\ P \end{bmatrix}, \quad
//! G = \begin{bmatrix} 0 \\ P L \end{bmatrix}$$
//! where $v$ holds $n$ degrees of freedom, $B$ are the $k$ constraint rows and
//! $P$ projects onto $n - k$ degrees of freedom to make room for them.

use crate::chebfun::{quadrature_weights, Chebfun};
use crate::chebtech;
use crate::domain::Interval;
use crate::matrix_exp::solve_columns;
use crate::operator::{Functional, LinearOperator};
use crate::preferences::{Basis, Discretization, Preferences};
use crate::svd::ComputeSVD;
use crate::trigtech;
use crate::types::{real, Result, RustySpectralError, ScalarType};
use crate::ultraspherical;
use ndarray::{s, Array1, Array2, Axis};
use num::Zero;

/// Relative threshold below which a singular value of the normalised
/// constraint rows counts as zero.
const DEPENDENCE_TOLERANCE: f64 = 1E-10;

/// The meaning of the degrees of freedom of a discretization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Space {
    /// Values on Chebyshev points of the second kind.
    ChebyshevValues,
    /// Chebyshev coefficients.
    ChebyshevCoefficients,
    /// Values on equispaced points.
    TrigonometricValues,
}

impl Space {
    pub fn basis(&self) -> Basis {
        match self {
            Space::ChebyshevValues | Space::ChebyshevCoefficients => Basis::Chebyshev,
            Space::TrigonometricValues => Basis::Trigonometric,
        }
    }
}

/// Square matrices of a discretized operator.
#[derive(Clone, Debug)]
pub struct DiscretizationMatrix<A: ScalarType> {
    interval: Interval,
    space: Space,
    mass: Array2<A>,
    generator: Array2<A>,
    constraints: Array2<A>,
}

impl<A: ScalarType> DiscretizationMatrix<A> {
    pub fn dimension(&self) -> usize {
        self.mass.nrows()
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn space(&self) -> Space {
        self.space
    }

    /// The mass matrix $[B; P]$.
    pub fn mass(&self) -> &Array2<A> {
        &self.mass
    }

    /// The generator $[0; P L]$.
    pub fn generator(&self) -> &Array2<A> {
        &self.generator
    }

    /// The `k x n` constraint rows $B$.
    pub fn constraints(&self) -> &Array2<A> {
        &self.constraints
    }

    /// $M^{-1} G$, the generator of $v' = M^{-1} G v$.
    pub fn explicit_generator(&self) -> Result<Array2<A>> {
        // Without constraints the mass matrix is the identity.
        if self.constraints.nrows() == 0 {
            return Ok(self.generator.clone());
        }
        solve_columns(self.mass.clone(), &self.generator)
    }

    /// The degrees of freedom `w` with $B w = 0$ and $P w = P v$.
    ///
    /// The correction $v - w$ lies in the null space of $P$, so it only
    /// touches the discarded highest modes and leaves the projected equations
    /// unchanged.
    pub fn constrain(&self, v: &Array1<A>) -> Result<Array1<A>> {
        let k = self.constraints.nrows();
        if k == 0 {
            return Ok(v.clone());
        }
        let mut rhs = Array2::<A>::zeros((self.dimension(), 1));
        rhs.slice_mut(s![..k, 0]).assign(&self.constraints.dot(v));
        let correction = solve_columns(self.mass.clone(), &rhs)?;
        Ok(v - &correction.column(0))
    }

    /// Degrees of freedom of `u` in the space of this discretization.
    pub fn project(&self, u: &Chebfun<A>) -> Result<Array1<A>> {
        if u.interval() != self.interval {
            return Err(RustySpectralError::DomainMismatch);
        }
        let n = self.dimension();
        let points = |basis| Chebfun::<A>::points(basis, n, self.interval);
        Ok(match self.space {
            Space::ChebyshevValues => u.eval_many(points(Basis::Chebyshev).view()),
            Space::TrigonometricValues => u.eval_many(points(Basis::Trigonometric).view()),
            Space::ChebyshevCoefficients => match u.coeffs() {
                Some(coeffs) => ultraspherical::resize(coeffs, n),
                None => chebtech::vals_to_coeffs(u.eval_many(points(Basis::Chebyshev).view()).view()),
            },
        })
    }

    /// The function with degrees of freedom `v`.
    pub fn reconstruct(&self, v: Array1<A>) -> Chebfun<A> {
        match self.space {
            Space::ChebyshevValues => Chebfun::from_values(v, self.interval, Basis::Chebyshev),
            Space::ChebyshevCoefficients => Chebfun::from_coeffs(v, self.interval),
            Space::TrigonometricValues => Chebfun::from_values(v, self.interval, Basis::Trigonometric),
        }
    }
}

pub trait Discretize<A: ScalarType> {
    /// Short name for log messages.
    fn name(&self) -> &'static str;

    /// The smallest usable dimension not below `n`.
    fn admissible_dimension(&self, n: usize) -> usize {
        n
    }

    /// Discretize `op` with `n` degrees of freedom.
    ///
    /// # Arguments
    ///
    /// * `op`: The linear operator with its side conditions.
    /// * `n`: The dimension, at least the number of side conditions plus one.
    fn discretize(&self, op: &LinearOperator<A>, n: usize) -> Result<DiscretizationMatrix<A>>;
}

/// Rectangular collocation on Chebyshev points of the second kind.
///
/// The operator output is interpolated to the $n - k$ Chebyshev points of the
/// first kind.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChebCollocation;

/// The ultraspherical spectral method on Chebyshev coefficients.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ultraspherical;

/// Fourier collocation on an odd number of equispaced points.
///
/// Periodicity is built into the basis, so periodic side conditions are
/// dropped. Any other side condition is rejected.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrigCollocation;

/// The discretization selected by `prefs`.
pub fn discretization_for<A: ScalarType>(prefs: &Preferences) -> Box<dyn Discretize<A>> {
    match (prefs.basis, prefs.discretization) {
        (Basis::Trigonometric, _) => Box::new(TrigCollocation),
        (Basis::Chebyshev, Discretization::Collocation) => Box::new(ChebCollocation),
        (Basis::Chebyshev, Discretization::Ultraspherical) => Box::new(Ultraspherical),
    }
}

impl<A: ScalarType> Discretize<A> for ChebCollocation {
    fn name(&self) -> &'static str {
        "Chebyshev collocation"
    }

    fn discretize(&self, op: &LinearOperator<A>, n: usize) -> Result<DiscretizationMatrix<A>> {
        check_constraint_count(op, n)?;
        let interval = op.interval();
        let k = op.constraints().len();

        let diff = chebtech::differentiation_matrix(n) * interval.scale();
        let rows = collocation_rows(op.constraints(), interval, n, &diff);
        check_independent(&rows)?;

        let x = Chebfun::<A>::points(Basis::Chebyshev, n, interval);
        let operator = collocation_operator(op, &x, &diff.mapv(real::<A>));

        let (projected_mass, projected_operator) = if k == 0 {
            (Array2::eye(n), operator)
        } else {
            let targets = chebtech::points_first_kind(n - k);
            let projection = chebtech::interpolation_matrix(n, targets.view()).mapv(real::<A>);
            let projected_operator = projection.dot(&operator);
            (projection, projected_operator)
        };

        Ok(assemble(
            interval,
            Space::ChebyshevValues,
            rows,
            projected_mass,
            projected_operator,
        ))
    }
}

impl<A: ScalarType> Discretize<A> for Ultraspherical {
    fn name(&self) -> &'static str {
        "ultraspherical"
    }

    fn discretize(&self, op: &LinearOperator<A>, n: usize) -> Result<DiscretizationMatrix<A>> {
        check_constraint_count(op, n)?;
        let interval = op.interval();
        let k = op.constraints().len();
        let order = op.order();

        let rows = coefficient_rows(op.constraints(), interval, n);
        check_independent(&rows)?;

        let coeffs: Vec<Array1<A>> = op.coeffs().iter().map(chebyshev_coeffs).collect();
        let longest = coeffs.iter().map(|c| c.len()).max().unwrap_or(1);
        // Rows below n of the truncated products are exact at this size.
        let size = n + 2 * order + longest + 2;

        let mut operator = Array2::<A>::zeros((size, size));
        for (j, a) in coeffs.iter().enumerate() {
            if a.iter().all(Zero::is_zero) {
                continue;
            }
            let diff = ultraspherical::differentiation(j, size, size, interval.scale()).mapv(real::<A>);
            let mult = ultraspherical::multiplication(j, a.view(), size)?;
            let conv = ultraspherical::conversion(j, order, size).mapv(real::<A>);
            operator += &conv.dot(&mult.dot(&diff));
        }

        let projected_operator = operator.slice(s![..n - k, ..n]).to_owned();
        let projected_mass = ultraspherical::conversion(0, order, size)
            .slice(s![..n - k, ..n])
            .mapv(real::<A>);

        Ok(assemble(
            interval,
            Space::ChebyshevCoefficients,
            rows,
            projected_mass,
            projected_operator,
        ))
    }
}

impl<A: ScalarType> Discretize<A> for TrigCollocation {
    fn name(&self) -> &'static str {
        "Fourier collocation"
    }

    fn admissible_dimension(&self, n: usize) -> usize {
        if n % 2 == 0 {
            n + 1
        } else {
            n
        }
    }

    fn discretize(&self, op: &LinearOperator<A>, n: usize) -> Result<DiscretizationMatrix<A>> {
        if op.constraints().iter().any(|c| !c.is_periodic()) {
            return Err(RustySpectralError::NonPeriodicConstraint);
        }
        if n % 2 == 0 {
            return Err(RustySpectralError::InvalidPreferences(
                "trigonometric discretizations need an odd dimension",
            ));
        }
        let interval = op.interval();
        let x = Chebfun::<A>::points(Basis::Trigonometric, n, interval);
        let diff = (trigtech::differentiation_matrix(n) * interval.scale()).mapv(real::<A>);
        let operator = collocation_operator(op, &x, &diff);

        Ok(assemble(
            interval,
            Space::TrigonometricValues,
            Array2::zeros((0, n)),
            Array2::eye(n),
            operator,
        ))
    }
}

/// $\sum_k \operatorname{diag}(a_k(x)) D^k$ on the collocation points `x`.
fn collocation_operator<A: ScalarType>(op: &LinearOperator<A>, x: &Array1<f64>, diff: &Array2<A>) -> Array2<A> {
    let n = x.len();
    let mut operator = Array2::<A>::zeros((n, n));
    let mut power = Array2::<A>::eye(n);
    for (k, a) in op.coeffs().iter().enumerate() {
        if k > 0 {
            power = diff.dot(&power);
        }
        if a.is_zero() {
            continue;
        }
        let values = a.eval_many(x.view()).insert_axis(Axis(1));
        operator += &(&power * &values);
    }
    operator
}

/// Constraint rows acting on values at `n` Chebyshev points.
fn collocation_rows(constraints: &[Functional], interval: Interval, n: usize, diff: &Array2<f64>) -> Array2<f64> {
    let mut rows = Array2::<f64>::zeros((constraints.len(), n));
    for (mut row, functional) in rows.axis_iter_mut(Axis(0)).zip(constraints) {
        let (base, derivative) = match *functional {
            Functional::PointEvaluation { point, derivative } => {
                let target = Array1::from_elem(1, interval.to_reference(point));
                let interp = chebtech::interpolation_matrix(n, target.view());
                (interp.index_axis_move(Axis(0), 0), derivative)
            }
            Functional::PeriodicJump { derivative } => {
                let mut jump = Array1::<f64>::zeros(n);
                jump[n - 1] = 1.0;
                jump[0] = -1.0;
                (jump, derivative)
            }
            Functional::Integral => (quadrature_weights(Basis::Chebyshev, n, interval), 0),
        };
        let value = (0..derivative).fold(base, |acc, _| acc.dot(diff));
        row.assign(&value);
    }
    rows
}

/// Constraint rows acting on `n` Chebyshev coefficients.
fn coefficient_rows(constraints: &[Functional], interval: Interval, n: usize) -> Array2<f64> {
    let scale = interval.scale();
    let mut rows = Array2::<f64>::zeros((constraints.len(), n));
    for (mut row, functional) in rows.axis_iter_mut(Axis(0)).zip(constraints) {
        let value = match *functional {
            Functional::PointEvaluation { point, derivative } => {
                chebtech::basis_derivative_row(n, interval.to_reference(point), derivative)
                    * scale.powi(derivative as i32)
            }
            Functional::PeriodicJump { derivative } => {
                (chebtech::basis_derivative_row(n, 1.0, derivative)
                    - chebtech::basis_derivative_row(n, -1.0, derivative))
                    * scale.powi(derivative as i32)
            }
            Functional::Integral => chebtech::integral_of_basis(n) * (0.5 * interval.length()),
        };
        row.assign(&value);
    }
    rows
}

fn chebyshev_coeffs<A: ScalarType>(a: &Chebfun<A>) -> Array1<A> {
    match a.coeffs() {
        Some(coeffs) => coeffs.to_owned(),
        None => {
            let x = Chebfun::<A>::points(Basis::Chebyshev, a.length(), a.interval());
            chebtech::vals_to_coeffs(a.eval_many(x.view()).view())
        }
    }
}

fn check_constraint_count<A: ScalarType>(op: &LinearOperator<A>, n: usize) -> Result<()> {
    let constraints = op.constraints().len();
    let order = op.order();
    if constraints != order {
        return Err(RustySpectralError::BoundaryConditionMismatch { order, constraints });
    }
    if constraints >= n {
        return Err(RustySpectralError::OverdeterminedBoundaryConditions {
            constraints,
            dimension: n,
        });
    }
    Ok(())
}

fn check_independent(rows: &Array2<f64>) -> Result<()> {
    let k = rows.nrows();
    if k == 0 {
        return Ok(());
    }
    let mut normalised = rows.clone();
    for mut row in normalised.axis_iter_mut(Axis(0)) {
        let scale = row.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
        if scale > 0.0 {
            row.mapv_inplace(|v| v / scale);
        }
    }
    if normalised.compute_svd()?.rank(DEPENDENCE_TOLERANCE) < k {
        return Err(RustySpectralError::DependentBoundaryConditions);
    }
    Ok(())
}

fn assemble<A: ScalarType>(
    interval: Interval,
    space: Space,
    constraints: Array2<f64>,
    projected_mass: Array2<A>,
    projected_operator: Array2<A>,
) -> DiscretizationMatrix<A> {
    let k = constraints.nrows();
    let n = projected_mass.ncols();
    let constraints = constraints.mapv(real::<A>);

    let mut mass = Array2::<A>::zeros((n, n));
    mass.slice_mut(s![..k, ..]).assign(&constraints);
    mass.slice_mut(s![k.., ..]).assign(&projected_mass);

    let mut generator = Array2::<A>::zeros((n, n));
    generator.slice_mut(s![k.., ..]).assign(&projected_operator);

    DiscretizationMatrix {
        interval,
        space,
        mass,
        generator,
        constraints,
    }
}
