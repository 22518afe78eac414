//! Expressions for operators acting on one unknown function.
//!
//! An [`Expr`] is a small syntax tree built from the unknown `u`, the
//! independent variable `x`, constants, fixed functions, derivatives and
//! arithmetic. It is turned into the coefficients of a linear differential
//! operator by [`linear_form`], which reports nonlinear terms instead of
//! linearizing them.

use crate::chebfun::Chebfun;
use crate::domain::Interval;
use crate::preferences::Preferences;
use crate::types::{Nonlinearity, Result, RustySpectralError, ScalarType};
use std::ops::{Add, Mul, Neg, Sub};

/// Scalar functions that can be applied to expressions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementaryFunction {
    Exp,
    Sin,
    Cos,
    Tanh,
}

impl ElementaryFunction {
    pub fn apply<A: ScalarType>(&self, value: A) -> A {
        match self {
            ElementaryFunction::Exp => value.exp(),
            ElementaryFunction::Sin => value.sin(),
            ElementaryFunction::Cos => value.cos(),
            ElementaryFunction::Tanh => value.tanh(),
        }
    }
}

#[derive(Clone, Debug)]
pub enum Expr<A: ScalarType> {
    /// The unknown function `u`.
    Unknown,
    /// The independent variable `x`.
    Variable,
    Constant(A),
    /// A fixed function of `x`.
    Function(Chebfun<A>),
    Diff(Box<Expr<A>>, usize),
    Add(Box<Expr<A>>, Box<Expr<A>>),
    Sub(Box<Expr<A>>, Box<Expr<A>>),
    Mul(Box<Expr<A>>, Box<Expr<A>>),
    Neg(Box<Expr<A>>),
    Apply(ElementaryFunction, Box<Expr<A>>),
}

impl<A: ScalarType> Expr<A> {
    pub fn u() -> Self {
        Expr::Unknown
    }

    pub fn x() -> Self {
        Expr::Variable
    }

    pub fn constant(value: A) -> Self {
        Expr::Constant(value)
    }

    pub fn function(f: Chebfun<A>) -> Self {
        Expr::Function(f)
    }

    /// The `order`-th derivative of the expression.
    pub fn diff(self, order: usize) -> Self {
        Expr::Diff(Box::new(self), order)
    }

    pub fn scale(self, factor: A) -> Self {
        Expr::Mul(Box::new(Expr::Constant(factor)), Box::new(self))
    }

    pub fn apply(self, function: ElementaryFunction) -> Self {
        Expr::Apply(function, Box::new(self))
    }

    /// True if the expression involves the unknown.
    pub fn depends_on_unknown(&self) -> bool {
        match self {
            Expr::Unknown => true,
            Expr::Variable | Expr::Constant(_) | Expr::Function(_) => false,
            Expr::Diff(e, _) | Expr::Neg(e) | Expr::Apply(_, e) => e.depends_on_unknown(),
            Expr::Add(l, r) | Expr::Sub(l, r) | Expr::Mul(l, r) => {
                l.depends_on_unknown() || r.depends_on_unknown()
            }
        }
    }
}

impl<A: ScalarType> Add for Expr<A> {
    type Output = Expr<A>;

    fn add(self, other: Expr<A>) -> Expr<A> {
        Expr::Add(Box::new(self), Box::new(other))
    }
}

impl<A: ScalarType> Sub for Expr<A> {
    type Output = Expr<A>;

    fn sub(self, other: Expr<A>) -> Expr<A> {
        Expr::Sub(Box::new(self), Box::new(other))
    }
}

impl<A: ScalarType> Mul for Expr<A> {
    type Output = Expr<A>;

    fn mul(self, other: Expr<A>) -> Expr<A> {
        Expr::Mul(Box::new(self), Box::new(other))
    }
}

impl<A: ScalarType> Neg for Expr<A> {
    type Output = Expr<A>;

    fn neg(self) -> Expr<A> {
        Expr::Neg(Box::new(self))
    }
}

/// An affine form $c(x) + \sum_k a_k(x) u^{(k)}$.
pub(crate) struct AffineForm<A: ScalarType> {
    /// `coeffs[k]` multiplies the `k`-th derivative; empty if `u` does not appear.
    pub coeffs: Vec<Chebfun<A>>,
    pub constant: Chebfun<A>,
}

struct Context<'a> {
    interval: Interval,
    prefs: &'a Preferences,
}

impl<'a> Context<'a> {
    fn zero<A: ScalarType>(&self) -> Chebfun<A> {
        Chebfun::zero(self.interval, self.prefs.basis)
    }

    /// Bring a fixed function to the working interval and basis.
    fn adopt<A: ScalarType>(&self, f: &Chebfun<A>) -> Result<Chebfun<A>> {
        if f.interval() != self.interval {
            return Err(RustySpectralError::DomainMismatch);
        }
        if f.basis() == self.prefs.basis {
            Ok(f.clone())
        } else {
            Chebfun::construct(|x| f.eval(x), self.interval, self.prefs)
        }
    }

    fn free<A: ScalarType>(&self, constant: Chebfun<A>) -> AffineForm<A> {
        AffineForm {
            coeffs: Vec::new(),
            constant,
        }
    }

    fn walk<A: ScalarType>(&self, expr: &Expr<A>) -> Result<AffineForm<A>> {
        let form = match expr {
            Expr::Unknown => AffineForm {
                coeffs: vec![Chebfun::constant(A::one(), self.interval, self.prefs.basis)],
                constant: self.zero(),
            },
            Expr::Variable => self.free(self.adopt(&Chebfun::identity(self.interval))?),
            Expr::Constant(c) => self.free(Chebfun::constant(*c, self.interval, self.prefs.basis)),
            Expr::Function(f) => self.free(self.adopt(f)?),
            Expr::Diff(e, order) => {
                let mut form = self.walk(e)?;
                for _ in 0..*order {
                    form = differentiate(form)?;
                }
                form
            }
            Expr::Add(l, r) => combine(self.walk(l)?, self.walk(r)?, false)?,
            Expr::Sub(l, r) => combine(self.walk(l)?, self.walk(r)?, true)?,
            Expr::Neg(e) => {
                let form = self.walk(e)?;
                AffineForm {
                    coeffs: form.coeffs.iter().map(|a| a.neg()).collect(),
                    constant: form.constant.neg(),
                }
            }
            Expr::Mul(l, r) => {
                let (left, right) = (self.walk(l)?, self.walk(r)?);
                let (free, dependent) = match (left.coeffs.is_empty(), right.coeffs.is_empty()) {
                    (false, false) => {
                        return Err(RustySpectralError::NonlinearOperator(
                            Nonlinearity::ProductOfUnknowns,
                        ))
                    }
                    (true, _) => (left.constant, right),
                    (false, true) => (right.constant, left),
                };
                AffineForm {
                    coeffs: dependent
                        .coeffs
                        .iter()
                        .map(|a| a.times(&free))
                        .collect::<Result<Vec<_>>>()?,
                    constant: dependent.constant.times(&free)?,
                }
            }
            Expr::Apply(function, e) => {
                let form = self.walk(e)?;
                if !form.coeffs.is_empty() {
                    return Err(RustySpectralError::NonlinearOperator(
                        Nonlinearity::NonlinearFunction,
                    ));
                }
                let function = *function;
                self.free(form.constant.compose(|v| function.apply(v), self.prefs)?)
            }
        };
        Ok(form)
    }
}

/// Product rule: $(a u^{(k)})' = a' u^{(k)} + a u^{(k+1)}$.
fn differentiate<A: ScalarType>(form: AffineForm<A>) -> Result<AffineForm<A>> {
    let constant = form.constant.diff(1);
    if form.coeffs.is_empty() {
        return Ok(AffineForm {
            coeffs: Vec::new(),
            constant,
        });
    }

    let n = form.coeffs.len();
    let mut coeffs: Vec<Chebfun<A>> = form.coeffs.iter().map(|a| a.diff(1)).collect();
    coeffs.push(form.coeffs[n - 1].clone());
    for k in 1..n {
        coeffs[k] = coeffs[k].plus(&form.coeffs[k - 1])?;
    }
    Ok(AffineForm { coeffs, constant })
}

fn combine<A: ScalarType>(left: AffineForm<A>, right: AffineForm<A>, subtract: bool) -> Result<AffineForm<A>> {
    let right_coeffs: Vec<Chebfun<A>> = if subtract {
        right.coeffs.iter().map(|a| a.neg()).collect()
    } else {
        right.coeffs
    };
    let right_constant = if subtract {
        right.constant.neg()
    } else {
        right.constant
    };

    let n = left.coeffs.len().max(right_coeffs.len());
    let mut coeffs = Vec::with_capacity(n);
    for k in 0..n {
        let term = match (left.coeffs.get(k), right_coeffs.get(k)) {
            (Some(a), Some(b)) => a.plus(b)?,
            (Some(a), None) => a.clone(),
            (None, Some(b)) => b.clone(),
            (None, None) => continue,
        };
        coeffs.push(term);
    }
    Ok(AffineForm {
        coeffs,
        constant: left.constant.plus(&right_constant)?,
    })
}

/// Coefficients of `expr` as an affine form in the unknown on `interval`.
///
/// Fails with [`RustySpectralError::NonlinearOperator`] for products of terms
/// that depend on the unknown and for nonlinear functions of the unknown.
pub(crate) fn linear_form<A: ScalarType>(
    expr: &Expr<A>,
    interval: Interval,
    prefs: &Preferences,
) -> Result<AffineForm<A>> {
    let context = Context { interval, prefs };
    let mut form = context.walk(expr)?;

    // Trailing identically zero coefficients do not count towards the order.
    while form.coeffs.last().map_or(false, |a| a.is_zero()) {
        form.coeffs.pop();
    }
    Ok(form)
}
