//! The expression service the equivalence engine consumes
//!
//! The engine only ever talks to [`ExpressionService`]; [`MathExpressionService`]
//! is the implementation shipped with the crate, built on the pest grammar in
//! `parser`, the checked evaluator and the polynomial simplifier.

use crate::ast::Expr;
use crate::config::ExpressionLimits;
use crate::error::{EvalError, ParseError};
use crate::{evaluator, parser, simplify};
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Integer assignment of free variables, keyed by case-sensitive name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableBinding {
    values: BTreeMap<String, i64>,
}

impl VariableBinding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: i64) -> Option<i64> {
        self.values.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, i64> {
        self.values.iter()
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for VariableBinding {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl fmt::Display for VariableBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .values
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        write!(f, "{{{}}}", pairs.join(", "))
    }
}

/// Parse, evaluate and simplify math expressions.
///
/// `Expr` is opaque to callers. Its `Display` output must be the canonical
/// text of the expression, so that two simplified expressions can be compared
/// as strings.
pub trait ExpressionService: Send + Sync {
    type Expr: Clone + fmt::Display + Send + Sync;

    fn parse(&self, text: &str) -> Result<Self::Expr, ParseError>;

    fn evaluate(&self, expr: &Self::Expr, bindings: &VariableBinding) -> Result<f64, EvalError>;

    fn simplify(&self, expr: &Self::Expr) -> Self::Expr;

    /// Every symbol name appearing in the expression
    fn symbols(&self, expr: &Self::Expr) -> BTreeSet<String>;
}

/// The bundled expression service
#[derive(Debug, Clone, Default)]
pub struct MathExpressionService {
    limits: ExpressionLimits,
}

impl MathExpressionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: ExpressionLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &ExpressionLimits {
        &self.limits
    }
}

impl ExpressionService for MathExpressionService {
    type Expr = Expr;

    fn parse(&self, text: &str) -> Result<Expr, ParseError> {
        parser::parse(text, &self.limits)
    }

    fn evaluate(&self, expr: &Expr, bindings: &VariableBinding) -> Result<f64, EvalError> {
        evaluator::evaluate(expr, bindings)
    }

    fn simplify(&self, expr: &Expr) -> Expr {
        simplify::simplify(expr)
    }

    fn symbols(&self, expr: &Expr) -> BTreeSet<String> {
        let mut symbols = BTreeSet::new();
        expr.walk(&mut |node| {
            if let Expr::Variable(name) = node {
                symbols.insert(name.clone());
            }
        });
        symbols
    }
}
