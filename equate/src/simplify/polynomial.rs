//! Sparse multivariate polynomials over opaque atoms
//!
//! An atom is anything the normal form does not look inside: a variable, a
//! named constant, a function application, a power with a non-integer or
//! symbolic exponent, or a quotient by a sum. Atoms are identified by their
//! canonical text, so two atoms that print the same are the same atom.

use crate::ast::{ArithmeticOperation, Constant, Expr};
use crate::evaluator::apply_function;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Products of sums are distributed only while the result stays this small
const MAX_TERMS: usize = 256;
/// Largest integer power of a sum that gets expanded
const MAX_EXPANDED_POWER: i64 = 8;
/// Relative size below which a cancelled sum of coefficients counts as zero
const COEFFICIENT_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone)]
struct Atom {
    key: String,
    expr: Expr,
}

impl Atom {
    fn new(expr: Expr) -> Self {
        Self {
            key: expr.to_string(),
            expr,
        }
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Atom {}

impl PartialOrd for Atom {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Atom {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

/// Product of atoms raised to non-zero integer exponents
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
struct Monomial(BTreeMap<Atom, i64>);

impl Monomial {
    fn of(atom: Atom, exponent: i64) -> Self {
        let mut factors = BTreeMap::new();
        if exponent != 0 {
            factors.insert(atom, exponent);
        }
        Self(factors)
    }

    fn is_unit(&self) -> bool {
        self.0.is_empty()
    }

    fn degree(&self) -> i64 {
        self.0.values().fold(0i64, |acc, e| acc.saturating_add(*e))
    }

    /// `None` if an exponent overflows
    fn times(&self, other: &Monomial) -> Option<Monomial> {
        let mut factors = self.0.clone();
        for (atom, exponent) in &other.0 {
            let total = factors.get(atom).copied().unwrap_or(0).checked_add(*exponent)?;
            if total == 0 {
                factors.remove(atom);
            } else {
                factors.insert(atom.clone(), total);
            }
        }
        Some(Monomial(factors))
    }

    fn raised(&self, power: i64) -> Option<Monomial> {
        self.0
            .iter()
            .map(|(atom, exponent)| Some((atom.clone(), exponent.checked_mul(power)?)))
            .collect::<Option<BTreeMap<_, _>>>()
            .map(Monomial)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Polynomial {
    terms: BTreeMap<Monomial, f64>,
}

impl Polynomial {
    fn zero() -> Self {
        Self::default()
    }

    fn constant(value: f64) -> Self {
        let mut poly = Self::zero();
        poly.add_term(Monomial::default(), value);
        poly
    }

    fn atom(expr: Expr) -> Self {
        Self::term(Monomial::of(Atom::new(expr), 1), 1.0)
    }

    fn term(monomial: Monomial, coefficient: f64) -> Self {
        let mut poly = Self::zero();
        poly.add_term(monomial, coefficient);
        poly
    }

    fn add_term(&mut self, monomial: Monomial, coefficient: f64) {
        let previous = self.terms.get(&monomial).copied().unwrap_or(0.0);
        let total = previous + coefficient;
        // Only cancellation removes a term; small coefficients survive
        let scale = previous.abs().max(coefficient.abs());
        if total == 0.0 || total.abs() <= COEFFICIENT_EPSILON * scale {
            self.terms.remove(&monomial);
        } else {
            self.terms.insert(monomial, total);
        }
    }

    fn plus(mut self, other: Polynomial) -> Polynomial {
        for (monomial, coefficient) in other.terms {
            self.add_term(monomial, coefficient);
        }
        self
    }

    fn scaled(self, factor: f64) -> Polynomial {
        let mut result = Self::zero();
        for (monomial, coefficient) in self.terms {
            result.add_term(monomial, coefficient * factor);
        }
        result
    }

    /// `None` when distributing would exceed [`MAX_TERMS`]
    fn times(&self, other: &Polynomial) -> Option<Polynomial> {
        if self.terms.len().saturating_mul(other.terms.len()) > MAX_TERMS {
            return None;
        }
        let mut result = Self::zero();
        for (left, a) in &self.terms {
            for (right, b) in &other.terms {
                result.add_term(left.times(right)?, a * b);
            }
        }
        Some(result)
    }

    fn raised(&self, power: i64) -> Option<Polynomial> {
        if power == 0 {
            return Some(Self::constant(1.0));
        }
        if self.terms.is_empty() {
            return if power > 0 { Some(Self::zero()) } else { None };
        }
        if let Some((monomial, coefficient)) = self.as_monomial() {
            let scaled = coefficient.powi(i32::try_from(power).ok()?);
            if !scaled.is_finite() {
                return None;
            }
            return Some(Self::term(monomial.raised(power)?, scaled));
        }
        if power < 0 || power > MAX_EXPANDED_POWER {
            return None;
        }
        let mut result = self.clone();
        for _ in 1..power {
            result = result.times(self)?;
        }
        Some(result)
    }

    pub(crate) fn as_constant(&self) -> Option<f64> {
        match self.terms.len() {
            0 => Some(0.0),
            1 => self
                .terms
                .iter()
                .next()
                .filter(|(monomial, _)| monomial.is_unit())
                .map(|(_, coefficient)| *coefficient),
            _ => None,
        }
    }

    fn as_monomial(&self) -> Option<(&Monomial, f64)> {
        if self.terms.len() == 1 {
            self.terms.iter().next().map(|(m, c)| (m, *c))
        } else {
            None
        }
    }

    pub(crate) fn from_expr(expr: &Expr) -> Polynomial {
        match expr {
            Expr::Number(n) => Self::constant(*n),
            Expr::Constant(Constant::True) => Self::constant(1.0),
            Expr::Constant(Constant::False) => Self::zero(),
            Expr::Constant(_) | Expr::Variable(_) => Self::atom(expr.clone()),
            Expr::Negate(inner) => Self::from_expr(inner).scaled(-1.0),
            Expr::Arithmetic(left, op, right) => {
                let left = Self::from_expr(left);
                let right = Self::from_expr(right);
                match op {
                    ArithmeticOperation::Add => left.plus(right),
                    ArithmeticOperation::Subtract => left.plus(right.scaled(-1.0)),
                    ArithmeticOperation::Multiply => match left.times(&right) {
                        Some(product) => product,
                        None => Self::opaque(left, ArithmeticOperation::Multiply, right),
                    },
                    ArithmeticOperation::Divide => Self::divide(left, right),
                    ArithmeticOperation::Power => Self::power(left, right),
                }
            }
            Expr::Function(function, argument) => {
                let argument = Self::from_expr(argument);
                if let Some(value) = argument.as_constant() {
                    if let Ok(folded) = apply_function(*function, value) {
                        return Self::constant(folded);
                    }
                }
                Self::atom(Expr::Function(*function, Box::new(argument.to_expr())))
            }
        }
    }

    fn divide(numerator: Polynomial, denominator: Polynomial) -> Polynomial {
        let inverse = match denominator.as_monomial() {
            Some((monomial, coefficient)) => monomial
                .raised(-1)
                .map(|inverse| Self::term(inverse, 1.0 / coefficient)),
            // a zero denominator stays visible in the output
            None if denominator.terms.is_empty() => None,
            None => Some(Self::term(
                Monomial::of(Atom::new(denominator.to_expr()), -1),
                1.0,
            )),
        };

        match inverse.and_then(|inverse| numerator.times(&inverse)) {
            Some(quotient) => quotient,
            None => Self::opaque(numerator, ArithmeticOperation::Divide, denominator),
        }
    }

    fn power(base: Polynomial, exponent: Polynomial) -> Polynomial {
        if let Some(k) = exponent.as_constant() {
            if let Some(b) = base.as_constant() {
                let value = if k.fract() == 0.0 && k.abs() <= f64::from(i32::MAX) {
                    b.powi(k as i32)
                } else {
                    b.powf(k)
                };
                if value.is_finite() && !(b == 0.0 && k < 0.0) {
                    return Self::constant(value);
                }
            } else if k.fract() == 0.0 && k.abs() <= i64::MAX as f64 {
                if let Some(expanded) = base.raised(k as i64) {
                    return expanded;
                }
            }
        }
        Self::opaque(base, ArithmeticOperation::Power, exponent)
    }

    fn opaque(left: Polynomial, op: ArithmeticOperation, right: Polynomial) -> Polynomial {
        Self::atom(Expr::binary(left.to_expr(), op, right.to_expr()))
    }

    /// Rebuild an expression; terms are ordered by descending degree, then by
    /// their atoms, with the constant term after all positive-degree terms.
    pub(crate) fn to_expr(&self) -> Expr {
        let mut terms: Vec<(&Monomial, f64)> = self.terms.iter().map(|(m, c)| (m, *c)).collect();
        terms.sort_by(|(a, _), (b, _)| b.degree().cmp(&a.degree()).then_with(|| a.cmp(b)));

        let mut iter = terms.into_iter();
        let Some((first_monomial, first_coefficient)) = iter.next() else {
            return Expr::Number(0.0);
        };

        let mut sum = term_expr(first_monomial, first_coefficient);
        for (monomial, coefficient) in iter {
            sum = if coefficient < 0.0 {
                Expr::binary(sum, ArithmeticOperation::Subtract, term_expr(monomial, -coefficient))
            } else {
                Expr::binary(sum, ArithmeticOperation::Add, term_expr(monomial, coefficient))
            };
        }
        sum
    }
}

fn term_expr(monomial: &Monomial, coefficient: f64) -> Expr {
    let mut numerator = Vec::new();
    let mut denominator = Vec::new();
    for (atom, exponent) in &monomial.0 {
        let factor = if exponent.unsigned_abs() == 1 {
            atom.expr.clone()
        } else {
            Expr::binary(
                atom.expr.clone(),
                ArithmeticOperation::Power,
                Expr::Number(exponent.unsigned_abs() as f64),
            )
        };
        if *exponent > 0 {
            numerator.push(factor);
        } else {
            denominator.push(factor);
        }
    }

    let body = match product(numerator) {
        None => Expr::Number(coefficient),
        Some(factors) if coefficient == 1.0 => factors,
        Some(factors) if coefficient == -1.0 => Expr::Negate(Box::new(factors)),
        Some(factors) => Expr::binary(
            Expr::Number(coefficient),
            ArithmeticOperation::Multiply,
            factors,
        ),
    };

    match product(denominator) {
        None => body,
        Some(factors) => Expr::binary(body, ArithmeticOperation::Divide, factors),
    }
}

fn product(factors: Vec<Expr>) -> Option<Expr> {
    factors
        .into_iter()
        .reduce(|acc, factor| Expr::binary(acc, ArithmeticOperation::Multiply, factor))
}
