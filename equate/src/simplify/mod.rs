//! Canonical normal form
//!
//! `simplify` rewrites an expression as a sum of monomials with like terms
//! combined, constants folded and small products of sums distributed. The
//! printed result is canonical: expressions that normalize to the same
//! polynomial print identically, whatever order the input was written in.
//!
//! ```text
//! 1 + x        -> x + 1
//! (x + 1)^2    -> x^2 + 2*x + 1
//! 2*x - x      -> x
//! x / x        -> 1
//! ```
//!
//! Anything outside polynomial arithmetic (trig, logs, fractional powers,
//! division by a sum) is kept as an opaque factor, so `sin(x)^2 + cos(x)^2`
//! does not reduce to `1`. Deciding those cases is left to numeric trials.

mod polynomial;

use crate::ast::Expr;
use polynomial::Polynomial;

/// Normal form of `expr`, or `expr` itself if normalizing overflows
pub fn simplify(expr: &Expr) -> Expr {
    let simplified = Polynomial::from_expr(expr).to_expr();
    if has_non_finite(&simplified) {
        expr.clone()
    } else {
        simplified
    }
}

/// The numeric value of `expr` if it normalizes to a finite constant
pub fn constant_value(expr: &Expr) -> Option<f64> {
    Polynomial::from_expr(expr)
        .as_constant()
        .filter(|value| value.is_finite())
}

fn has_non_finite(expr: &Expr) -> bool {
    let mut found = false;
    expr.walk(&mut |node| {
        if let Expr::Number(n) = node {
            found |= !n.is_finite();
        }
    });
    found
}
