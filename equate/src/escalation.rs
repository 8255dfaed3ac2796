//! Escalation to an external semantic validator
//!
//! Strong local evidence is never escalated. Only inconclusive or negative
//! local verdicts reach the validator, whose answer is capped at medium
//! confidence. A failing or slow validator resolves to a conservative verdict
//! instead of an error, so grading always terminates.

use crate::config::EscalationConfig;
use crate::equivalence::{Confidence, EquivalenceEngine, EquivalenceVerdict};
use crate::error::ValidatorError;
use crate::expression::ExpressionService;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::{info, warn};

/// Reason attached to the fallback verdict
pub const VALIDATION_FAILED: &str = "validation failed";

/// An expensive second opinion, typically a language-model call
#[async_trait]
pub trait SemanticValidator: Send + Sync {
    async fn validate(
        &self,
        student: &str,
        expected: &str,
    ) -> Result<EquivalenceVerdict, ValidatorError>;
}

/// Whether a local verdict is weak enough to justify the validator
pub fn needs_escalation(verdict: &EquivalenceVerdict) -> bool {
    match verdict.confidence {
        Confidence::High => false,
        Confidence::Medium => !verdict.is_equivalent,
        Confidence::Low => true,
    }
}

pub fn fallback_verdict() -> EquivalenceVerdict {
    EquivalenceVerdict::not_equivalent(VALIDATION_FAILED)
}

pub struct EscalationPolicy<'a, S: ExpressionService> {
    engine: &'a EquivalenceEngine<S>,
    timeout: Duration,
}

impl<'a, S: ExpressionService> EscalationPolicy<'a, S> {
    pub fn new(engine: &'a EquivalenceEngine<S>, config: &EscalationConfig) -> Self {
        Self {
            engine,
            timeout: config.timeout(),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Check locally, escalating when the local verdict is weak.
    ///
    /// Must be awaited inside a Tokio runtime; the validator call is bounded
    /// by the configured timeout.
    pub async fn validate(
        &self,
        student: &str,
        expected: &str,
        validator: &dyn SemanticValidator,
    ) -> EquivalenceVerdict {
        let local = self.engine.check(student, expected);
        self.escalate(local, student, expected, validator).await
    }

    pub async fn validate_with_rng<R: Rng + Send>(
        &self,
        student: &str,
        expected: &str,
        validator: &dyn SemanticValidator,
        rng: &mut R,
    ) -> EquivalenceVerdict {
        let local = self.engine.check_with_rng(student, expected, rng);
        self.escalate(local, student, expected, validator).await
    }

    /// Merge a local verdict with the validator's opinion when warranted
    pub async fn escalate(
        &self,
        local: EquivalenceVerdict,
        student: &str,
        expected: &str,
        validator: &dyn SemanticValidator,
    ) -> EquivalenceVerdict {
        if !needs_escalation(&local) {
            return local;
        }

        info!(
            "escalating to semantic validator after local verdict: {}",
            local.reason
        );

        match tokio::time::timeout(self.timeout, validator.validate(student, expected)).await {
            Ok(Ok(remote)) => EquivalenceVerdict {
                is_equivalent: remote.is_equivalent,
                confidence: Confidence::Medium,
                reason: remote.reason,
            },
            Ok(Err(e)) => {
                warn!("semantic validator failed: {}", e);
                fallback_verdict()
            }
            Err(_) => {
                warn!("{}", ValidatorError::Timeout(self.timeout));
                fallback_verdict()
            }
        }
    }
}
