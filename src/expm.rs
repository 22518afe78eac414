//! Solution operators $u(t) = e^{tL} u_0$ of linear evolution equations.
//!
//! The operator is linearized, discretized with increasing dimension and
//! propagated by a matrix exponential until every requested snapshot is
//! resolved. Side conditions are handled by eliminating them: with an
//! orthonormal basis $N$ of the null space of the constraint rows $B$ and
//! initial data $w_0$ corrected to satisfy $B w_0 = 0$ (see
//! [`DiscretizationMatrix::constrain`]),
//! $$v(t) = N e^{t N^H G N} N^H w_0, \quad t > 0,$$
//! so that $B v(t) = 0$ for every positive time. At $t = 0$ the initial data
//! are returned unchanged.

use crate::chebfun::Chebfun;
use crate::chop::chop;
use crate::discretization::{discretization_for, DiscretizationMatrix};
use crate::matrix_exp::MatrixExp;
use crate::operator::{LinearOperator, Operator};
use crate::preferences::Preferences;
use crate::svd::ComputeSVD;
use crate::types::{real, Result, RustySpectralError, ScalarType};
use ndarray::{s, Array1, Array2};

/// Snapshots $u(t_j)$ of a propagated function.
#[derive(Clone, Debug)]
pub struct Semigroup<A: ScalarType> {
    times: Vec<f64>,
    snapshots: Vec<Chebfun<A>>,
}

impl<A: ScalarType> Semigroup<A> {
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// One snapshot per requested time, in the order of the times.
    pub fn snapshots(&self) -> &[Chebfun<A>] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Pairs of time and snapshot.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &Chebfun<A>)> {
        self.times.iter().cloned().zip(self.snapshots.iter())
    }

    /// The snapshot of a single-time result.
    pub fn into_single(mut self) -> Option<Chebfun<A>> {
        if self.snapshots.len() == 1 {
            self.snapshots.pop()
        } else {
            None
        }
    }
}

/// Propagate `u0` under $u' = N(u)$ with the side conditions of `op` to each of `times`.
///
/// `op` must be linear and homogeneous. Fails with
/// [`RustySpectralError::NonlinearOperator`] otherwise.
///
/// # Arguments
///
/// * `op`: The operator and its side conditions.
/// * `times`: Nonnegative times, one snapshot is returned for each.
/// * `u0`: The initial condition, on the interval of `op`.
/// * `prefs`: Tolerance, discretization and the range of dimensions to try.
pub fn expm<A: ScalarType>(
    op: &Operator<A>,
    times: &[f64],
    u0: &Chebfun<A>,
    prefs: &Preferences,
) -> Result<Semigroup<A>> {
    prefs.validate()?;
    check_times(times)?;
    if u0.interval() != op.interval() {
        return Err(RustySpectralError::DomainMismatch);
    }
    let linear = op.linearize(prefs)?.into_linear()?;
    propagate(&linear, times, u0, prefs)
}

/// Propagate `u0` to a single time `t`.
///
/// # Arguments
///
/// * `op`: The operator and its side conditions.
/// * `t`: A nonnegative time.
/// * `u0`: The initial condition, on the interval of `op`.
/// * `prefs`: Tolerance, discretization and the range of dimensions to try.
pub fn expm_at<A: ScalarType>(op: &Operator<A>, t: f64, u0: &Chebfun<A>, prefs: &Preferences) -> Result<Chebfun<A>> {
    expm(op, &[t], u0, prefs)?
        .into_single()
        .ok_or(RustySpectralError::InvalidTime(t))
}

/// Propagate `u0` under a linear operator with its side conditions.
///
/// The dimension grows from `prefs.min_dimension` until every snapshot is
/// resolved, failing with [`RustySpectralError::DiscretizationNotResolved`]
/// past `prefs.max_dimension`.
///
/// # Arguments
///
/// * `op`: The linear operator.
/// * `times`: Nonnegative times, one snapshot is returned for each.
/// * `u0`: The initial condition, on the interval of `op`.
/// * `prefs`: Tolerance, discretization and the range of dimensions to try.
pub fn propagate<A: ScalarType>(
    op: &LinearOperator<A>,
    times: &[f64],
    u0: &Chebfun<A>,
    prefs: &Preferences,
) -> Result<Semigroup<A>> {
    prefs.validate()?;
    check_times(times)?;
    if u0.interval() != op.interval() {
        return Err(RustySpectralError::DomainMismatch);
    }

    let discretization = discretization_for::<A>(prefs);
    let scale_hint = u0.vscale();

    for n in Preferences::refinement(prefs.min_dimension, prefs.max_dimension) {
        let n = discretization.admissible_dimension(n);
        if n > prefs.max_dimension {
            break;
        }
        let matrices = discretization.discretize(op, n)?;
        let propagator = ConstrainedPropagator::new(&matrices, u0)?;

        let mut snapshots = Vec::with_capacity(times.len());
        for &t in times {
            let snapshot = matrices.reconstruct(propagator.at(t)?);
            let magnitudes = snapshot.coefficient_magnitudes().to_vec();
            if chop(&magnitudes, prefs.tolerance, scale_hint).is_none() {
                break;
            }
            snapshots.push(snapshot.simplify(prefs.tolerance, scale_hint));
        }

        if snapshots.len() == times.len() {
            log::debug!(
                "{} discretization resolved {} snapshots with dimension {}",
                discretization.name(),
                times.len(),
                n
            );
            return Ok(Semigroup {
                times: times.to_vec(),
                snapshots,
            });
        }
        log::debug!(
            "{} discretization of dimension {} not resolved, refining",
            discretization.name(),
            n
        );
    }

    Err(RustySpectralError::DiscretizationNotResolved {
        max_dimension: prefs.max_dimension,
    })
}

fn check_times(times: &[f64]) -> Result<()> {
    match times.iter().find(|t| !(t.is_finite() && **t >= 0.0)) {
        Some(&t) => Err(RustySpectralError::InvalidTime(t)),
        None => Ok(()),
    }
}

/// $v(t) = N e^{t G_N} N^H w_0$ for one discretization and initial condition.
struct ConstrainedPropagator<A: ScalarType> {
    null_space: Array2<A>,
    /// The reduced generator $G_N = N^H G N$.
    reduced: Array2<A>,
    initial: Array1<A>,
    reduced_initial: Array1<A>,
}

impl<A: ScalarType> ConstrainedPropagator<A> {
    fn new(matrices: &DiscretizationMatrix<A>, u0: &Chebfun<A>) -> Result<Self> {
        let n = matrices.dimension();
        let k = matrices.constraints().nrows();
        let v0 = matrices.project(u0)?;
        let generator = matrices.explicit_generator()?;

        let null_space = if k == 0 {
            Array2::eye(n)
        } else {
            let svd = matrices.constraints().compute_full_svd()?;
            svd.vt.slice(s![k.., ..]).t().mapv(|v| v.conj())
        };
        let adjoint = null_space.t().mapv(|v| v.conj());

        let reduced = adjoint.dot(&generator.dot(&null_space));
        let reduced_initial = adjoint.dot(&matrices.constrain(&v0)?);

        Ok(ConstrainedPropagator {
            null_space,
            reduced,
            initial: v0,
            reduced_initial,
        })
    }

    fn at(&self, t: f64) -> Result<Array1<A>> {
        if t == 0.0 {
            return Ok(self.initial.clone());
        }
        let state = (&self.reduced * real::<A>(t)).expm()?.dot(&self.reduced_initial);
        Ok(self.null_space.dot(&state))
    }
}

/// Propagator to time one created by [`expm_operator`].
#[derive(Clone, Debug)]
pub struct UnitTimePropagator<A: ScalarType> {
    op: Operator<A>,
    prefs: Preferences,
}

impl<A: ScalarType> UnitTimePropagator<A> {
    /// $e^{L} u_0$.
    pub fn apply(&self, u0: &Chebfun<A>) -> Result<Chebfun<A>> {
        expm_at(&self.op, 1.0, u0, &self.prefs)
    }
}

#[deprecated(note = "use `expm` or `expm_at` with explicit times")]
pub fn expm_operator<A: ScalarType>(op: &Operator<A>, prefs: &Preferences) -> UnitTimePropagator<A> {
    log::warn!("expm_operator is deprecated, pass explicit times to expm or expm_at");
    UnitTimePropagator {
        op: op.clone(),
        prefs: *prefs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Interval;
    use crate::expr::Expr;
    use crate::operator::{BoundaryConditions, Functional};
    use crate::preferences::{Basis, Discretization};
    use crate::types::{c64, Nonlinearity, Scalar};
    use std::f64::consts::PI;

    fn total_variation(u: &Chebfun<f64>) -> f64 {
        let x = Array1::linspace(-1.0, 1.0, 2001);
        let values = u.eval_many(x.view());
        values
            .iter()
            .zip(values.iter().skip(1))
            .map(|(a, b)| (b - a).abs())
            .sum()
    }

    #[test]
    fn test_heat_equation_with_dirichlet_conditions() {
        let prefs = Preferences::default();
        let interval = Interval::unit();
        let op = Operator::new(interval, Expr::u().diff(2)).with_boundary_conditions(BoundaryConditions::Dirichlet);
        let gaussian = |x: f64| (-20.0 * (x + 0.3).powi(2)).exp();
        let u0 = Chebfun::<f64>::construct(gaussian, interval, &prefs).unwrap();
        let times = [0.0, 0.001, 0.01, 0.1, 0.5, 1.0];

        let semigroup = expm(&op, &times, &u0, &prefs).unwrap();
        assert_eq!(semigroup.len(), times.len());
        assert_eq!(semigroup.times(), &times);

        let first = &semigroup.snapshots()[0];
        for k in 0..41 {
            let x = -1.0 + k as f64 / 20.0;
            assert!((first.eval(x) - gaussian(x)).abs() < 1E-9);
        }

        let maxima: Vec<f64> = semigroup.snapshots().iter().map(|u| u.norm_inf()).collect();
        let variations: Vec<f64> = semigroup.snapshots().iter().map(total_variation).collect();
        for j in 1..times.len() {
            assert!(maxima[j] < maxima[j - 1]);
            assert!(variations[j] < variations[j - 1]);
        }

        // u0(-1) is about 5.5e-5, positive times satisfy the conditions.
        assert!(first.eval(-1.0) > 1E-5);
        for (_, u) in semigroup.iter().skip(1) {
            assert!(u.eval(-1.0).abs() < 1E-8);
            assert!(u.eval(1.0).abs() < 1E-8);
        }
    }

    macro_rules! sine_mode_tests {
        ($($name:ident: $discretization:expr,)*) => {
            $(
            #[test]
            fn $name() {
                let prefs = Preferences::default().with_discretization($discretization);
                let interval = Interval::unit();
                let op = Operator::new(interval, Expr::u().diff(2))
                    .with_boundary_conditions(BoundaryConditions::Dirichlet);
                let u0 = Chebfun::<f64>::construct(|x| (PI * x).sin(), interval, &prefs).unwrap();

                let semigroup = expm(&op, &[0.05, 0.2], &u0, &prefs).unwrap();
                for (t, u) in semigroup.iter() {
                    for &x in &[-0.8, -0.3, 0.1, 0.45, 0.9] {
                        let exact = (-PI * PI * t).exp() * (PI * x).sin();
                        assert!((u.eval(x) - exact).abs() < 1E-8);
                    }
                }
            }
            )*
        };
    }

    sine_mode_tests! {
        test_sine_mode_collocation: Discretization::Collocation,
        test_sine_mode_ultraspherical: Discretization::Ultraspherical,
    }

    macro_rules! inconsistent_data_tests {
        ($($name:ident: $discretization:expr,)*) => {
            $(
            #[test]
            fn $name() {
                // u0 = 1 violates u(-1) = u(1) = 0; the solution is the sine series of 1.
                let prefs = Preferences::default().with_discretization($discretization);
                let interval = Interval::unit();
                let op = Operator::new(interval, Expr::u().diff(2))
                    .with_boundary_conditions(BoundaryConditions::Dirichlet);
                let u0 = Chebfun::<f64>::constant(1.0, interval, Basis::Chebyshev);
                let t = 0.5;

                let u = expm_at(&op, t, &u0, &prefs).unwrap();
                let exact = |x: f64| {
                    (0..20)
                        .map(|j| {
                            let k = (2 * j + 1) as f64;
                            4.0 / (k * PI) * (-(k * PI / 2.0).powi(2) * t).exp() * (k * PI * (x + 1.0) / 2.0).sin()
                        })
                        .sum::<f64>()
                };
                assert!(u.eval(-1.0).abs() < 1E-8);
                assert!(u.eval(1.0).abs() < 1E-8);
                for &x in &[-0.7, 0.0, 0.4] {
                    assert!((u.eval(x) - exact(x)).abs() < 1E-3);
                }
            }
            )*
        };
    }

    inconsistent_data_tests! {
        test_inconsistent_data_collocation: Discretization::Collocation,
        test_inconsistent_data_ultraspherical: Discretization::Ultraspherical,
    }

    #[test]
    fn test_periodic_conditions_are_elided_for_trigonometric_basis() {
        let interval = Interval::unit();
        let cheb_prefs = Preferences::default();
        let trig_prefs = Preferences::default().with_basis(Basis::Trigonometric);
        let f = |x: f64| (PI * x).sin().exp();

        let periodic = Operator::new(interval, Expr::u().diff(2)).with_boundary_conditions(BoundaryConditions::Custom(
            vec![
                Functional::PeriodicJump { derivative: 0 },
                Functional::PeriodicJump { derivative: 1 },
            ],
        ));
        let u0_cheb = Chebfun::<f64>::construct(f, interval, &cheb_prefs).unwrap();
        let u0_trig = Chebfun::<f64>::construct(f, interval, &trig_prefs).unwrap();

        let times = [0.0, 0.1, 0.5];
        let cheb = expm(&periodic, &times, &u0_cheb, &cheb_prefs).unwrap();
        let trig = expm(&periodic, &times, &u0_trig, &trig_prefs).unwrap();
        for (a, b) in cheb.snapshots().iter().zip(trig.snapshots()) {
            assert_eq!(b.basis(), Basis::Trigonometric);
            for k in 0..21 {
                let x = -1.0 + k as f64 / 10.0;
                assert!((a.eval(x) - b.eval(x)).abs() < 1E-7);
            }
        }
    }

    #[test]
    fn test_advection_shifts_periodic_data() {
        let interval = Interval::unit();
        let prefs = Preferences::default().with_basis(Basis::Trigonometric);
        let f = |x: f64| (PI * x).sin().exp();
        let op = Operator::new(interval, Expr::u().diff(1)).with_boundary_conditions(BoundaryConditions::Periodic);
        let u0 = Chebfun::<f64>::construct(f, interval, &prefs).unwrap();

        let u = expm_at(&op, 0.5, &u0, &prefs).unwrap();
        for &x in &[-0.9, -0.2, 0.3, 0.75] {
            assert!((u.eval(x) - f(x + 0.5)).abs() < 1E-9);
        }
    }

    #[test]
    fn test_complex_schroedinger_mode() {
        let interval = Interval::unit();
        let prefs = Preferences::default().with_basis(Basis::Trigonometric);
        let op = Operator::new(interval, Expr::u().diff(2).scale(c64::new(0.0, 1.0)));
        let u0 = Chebfun::<c64>::construct(|x| c64::new(0.0, PI * x).exp(), interval, &prefs).unwrap();

        let t = 0.3;
        let u = expm_at(&op, t, &u0, &prefs).unwrap();
        for &x in &[-0.5, 0.0, 0.8] {
            let exact = c64::new(0.0, PI * x - PI * PI * t).exp();
            assert!((u.eval(x) - exact).abs() < 1E-9);
        }
    }

    #[test]
    fn test_nonlinear_operators_are_rejected() {
        let prefs = Preferences::default();
        let interval = Interval::unit();
        let u0 = Chebfun::<f64>::construct(|x| 1.0 - x * x, interval, &prefs).unwrap();
        for expr in vec![Expr::u() * Expr::u(), Expr::u() * Expr::u().diff(2)] {
            let op = Operator::new(interval, expr).with_boundary_conditions(BoundaryConditions::Dirichlet);
            assert!(matches!(
                expm(&op, &[0.1], &u0, &prefs),
                Err(RustySpectralError::NonlinearOperator(Nonlinearity::ProductOfUnknowns))
            ));
        }
    }

    #[test]
    fn test_invalid_input() {
        let prefs = Preferences::default();
        let interval = Interval::unit();
        let heat = Operator::new(interval, Expr::u().diff(2)).with_boundary_conditions(BoundaryConditions::Dirichlet);
        let u0 = Chebfun::<f64>::construct(|x| 1.0 - x * x, interval, &prefs).unwrap();

        assert!(matches!(
            expm(&heat, &[0.1, -1.0], &u0, &prefs),
            Err(RustySpectralError::InvalidTime(_))
        ));
        assert!(matches!(
            expm(&heat, &[f64::NAN], &u0, &prefs),
            Err(RustySpectralError::InvalidTime(_))
        ));

        let other = Chebfun::<f64>::construct(|x| x, Interval::new(0.0, 1.0).unwrap(), &prefs).unwrap();
        assert!(matches!(
            expm(&heat, &[0.1], &other, &prefs),
            Err(RustySpectralError::DomainMismatch)
        ));

        let unconstrained = Operator::new(interval, Expr::u().diff(2));
        assert!(matches!(
            expm(&unconstrained, &[0.1], &u0, &prefs),
            Err(RustySpectralError::BoundaryConditionMismatch { order: 2, constraints: 0 })
        ));

        let trig = prefs.with_basis(Basis::Trigonometric);
        let u0_trig = Chebfun::<f64>::construct(|x| (PI * x).cos(), interval, &trig).unwrap();
        assert!(matches!(
            expm(&heat, &[0.1], &u0_trig, &trig),
            Err(RustySpectralError::NonPeriodicConstraint)
        ));
    }

    #[test]
    fn test_unresolved_discretization() {
        // A steep front needs more than 33 degrees of freedom.
        let prefs = Preferences::default().with_dimensions(17, 33);
        let interval = Interval::unit();
        let op = Operator::new(interval, Expr::u().diff(2)).with_boundary_conditions(BoundaryConditions::Dirichlet);
        let u0 = Chebfun::<f64>::construct(|x| (-200.0 * x * x).exp(), interval, &prefs).unwrap();
        assert!(matches!(
            expm(&op, &[0.0], &u0, &prefs),
            Err(RustySpectralError::DiscretizationNotResolved { max_dimension: 33 })
        ));
    }

    #[test]
    #[allow(deprecated)]
    fn test_unit_time_propagator() {
        let prefs = Preferences::default();
        let interval = Interval::unit();
        let op = Operator::new(interval, Expr::u().diff(2)).with_boundary_conditions(BoundaryConditions::Dirichlet);
        let u0 = Chebfun::<f64>::construct(|x| (PI * x).sin(), interval, &prefs).unwrap();

        let u = expm_operator(&op, &prefs).apply(&u0).unwrap();
        let expected = expm(&op, &[1.0], &u0, &prefs).unwrap().into_single().unwrap();
        assert!((u.eval(0.5) - expected.eval(0.5)).abs() < 1E-14);
        assert!((u.eval(0.5) - (-PI * PI).exp()).abs() < 1E-8);
    }
}
