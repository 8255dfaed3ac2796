//! Numeric evaluation of expression trees

pub mod operations;

use crate::ast::Expr;
use crate::error::EvalError;
use crate::expression::VariableBinding;

pub use operations::{apply_function, arithmetic_operation};

/// Evaluate `expr` with the free variables taken from `bindings`
pub fn evaluate(expr: &Expr, bindings: &VariableBinding) -> Result<f64, EvalError> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Constant(constant) => Ok(constant.value()),
        Expr::Variable(name) => bindings
            .get(name)
            .map(|value| value as f64)
            .ok_or_else(|| EvalError::UndefinedVariable(name.clone())),
        Expr::Negate(inner) => Ok(-evaluate(inner, bindings)?),
        Expr::Arithmetic(left, op, right) => {
            let left = evaluate(left, bindings)?;
            let right = evaluate(right, bindings)?;
            arithmetic_operation(left, *op, right)
        }
        Expr::Function(function, argument) => {
            let argument = evaluate(argument, bindings)?;
            apply_function(*function, argument)
        }
    }
}
