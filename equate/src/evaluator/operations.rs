//! Checked floating-point arithmetic
//!
//! Every operation either returns a finite number or an [`EvalError`]; NaN
//! and infinities never leak out of the evaluator.

use crate::ast::{ArithmeticOperation, MathematicalFunction};
use crate::error::EvalError;

/// Apply a binary arithmetic operation.
///
/// ```text
/// 1 / 0      -> DivisionByZero
/// 0 ^ -1     -> DivisionByZero
/// (-8) ^ 0.5 -> Domain
/// ```
pub fn arithmetic_operation(
    left: f64,
    op: ArithmeticOperation,
    right: f64,
) -> Result<f64, EvalError> {
    let result = match op {
        ArithmeticOperation::Add => left + right,
        ArithmeticOperation::Subtract => left - right,
        ArithmeticOperation::Multiply => left * right,
        ArithmeticOperation::Divide => {
            if right == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            left / right
        }
        ArithmeticOperation::Power => {
            if left == 0.0 && right < 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            if left < 0.0 && right.fract() != 0.0 {
                return Err(EvalError::Domain {
                    function: "power".to_string(),
                    argument: left,
                });
            }
            if right.fract() == 0.0 && right.abs() <= i32::MAX as f64 {
                left.powi(right as i32)
            } else {
                left.powf(right)
            }
        }
    };

    finite(result)
}

/// Apply a mathematical function, rejecting arguments outside its domain
pub fn apply_function(function: MathematicalFunction, argument: f64) -> Result<f64, EvalError> {
    let in_domain = match function {
        MathematicalFunction::Sqrt => argument >= 0.0,
        MathematicalFunction::Log => argument > 0.0,
        MathematicalFunction::Asin | MathematicalFunction::Acos => {
            (-1.0..=1.0).contains(&argument)
        }
        _ => true,
    };
    if !in_domain {
        return Err(EvalError::Domain {
            function: function.name().to_string(),
            argument,
        });
    }

    let result = match function {
        MathematicalFunction::Sin => argument.sin(),
        MathematicalFunction::Cos => argument.cos(),
        MathematicalFunction::Tan => argument.tan(),
        MathematicalFunction::Asin => argument.asin(),
        MathematicalFunction::Acos => argument.acos(),
        MathematicalFunction::Atan => argument.atan(),
        MathematicalFunction::Sqrt => argument.sqrt(),
        MathematicalFunction::Log => argument.ln(),
        MathematicalFunction::Exp => argument.exp(),
        MathematicalFunction::Abs => argument.abs(),
    };

    finite(result)
}

fn finite(value: f64) -> Result<f64, EvalError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NonFinite)
    }
}
