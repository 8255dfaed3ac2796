//! # Equate
//!
//! **Is the student's answer the expected one?**
//!
//! Equate decides whether a free-form math answer is equivalent to an
//! expected answer, says how sure it is, and turns that verdict plus session
//! telemetry (attempts, hints) into a bounded score and a mastery tier.
//!
//! ## Quick Start
//!
//! ```rust
//! use equate::{Confidence, Grader, Mastery, SessionTelemetry};
//!
//! let grader = Grader::new();
//!
//! let verdict = grader.check("2(x + 1)", "2x + 2");
//! assert!(verdict.is_equivalent);
//! assert_eq!(verdict.confidence, Confidence::High);
//!
//! let result = grader.grade(Some("4"), Some("4"), SessionTelemetry::new(1, 2));
//! assert_eq!(result.score, 0.8);
//! assert_eq!(result.mastery, Mastery::High);
//! ```
//!
//! ## The protocol
//!
//! Checking runs three stages, cheapest first:
//!
//! 1. exact text match
//! 2. canonical forms compared after simplification
//! 3. five random integer substitutions of the free variables
//!
//! Five of five passing trials give high confidence, four of five medium.
//! Weak verdicts can be escalated to a [`SemanticValidator`], whose opinion
//! is accepted at medium confidence at most.
//!
//! Nothing in the pipeline fails: parse errors, evaluation errors and
//! validator outages all resolve to a conservative verdict.

pub mod ast;
pub mod config;
pub mod equivalence;
pub mod error;
pub mod escalation;
pub mod evaluator;
pub mod expression;
pub mod extractor;
pub mod grader;
pub mod grading;
pub mod parser;
pub mod sampler;
pub mod simplify;

pub use ast::{ArithmeticOperation, Constant, Expr, MathematicalFunction};
pub use config::{EngineConfig, EquivalenceConfig, EscalationConfig, ExpressionLimits};
pub use equivalence::{Confidence, EquivalenceEngine, EquivalenceVerdict, TrialTally};
pub use error::{EquateError, EvalError, ParseError, ValidatorError};
pub use escalation::{EscalationPolicy, SemanticValidator};
pub use expression::{ExpressionService, MathExpressionService, VariableBinding};
pub use extractor::{AnswerExtractor, PatternExtractor};
pub use grader::Grader;
pub use grading::{grade, GradingPolicy, GradingResult, Mastery, SessionTelemetry};
pub use sampler::VariableSampler;

/// Result type for Equate operations
pub type EquateResult<T> = Result<T, EquateError>;

/// Compare two answers with the default engine
pub fn check(student: &str, expected: &str) -> EquivalenceVerdict {
    EquivalenceEngine::default().check(student, expected)
}

/// Compare two answers, escalating weak verdicts to `validator`
pub async fn validate(
    student: &str,
    expected: &str,
    validator: &dyn SemanticValidator,
) -> EquivalenceVerdict {
    Grader::new().validate(student, expected, validator).await
}

/// Evaluate an expression with integer variable bindings
pub fn evaluate(text: &str, bindings: &VariableBinding) -> EquateResult<f64> {
    let expr = parser::parse(text, &ExpressionLimits::default())?;
    Ok(evaluator::evaluate(&expr, bindings)?)
}

/// Canonical form of an expression
pub fn simplify(text: &str) -> EquateResult<String> {
    let expr = parser::parse(text, &ExpressionLimits::default())?;
    Ok(simplify::simplify(&expr).to_string())
}

#[cfg(test)]
mod tests;
