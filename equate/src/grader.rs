use crate::config::{EngineConfig, EscalationConfig};
use crate::equivalence::{EquivalenceEngine, EquivalenceVerdict};
use crate::escalation::{EscalationPolicy, SemanticValidator};
use crate::expression::{ExpressionService, MathExpressionService};
use crate::grading::{GradingPolicy, GradingResult, SessionTelemetry};
use rand::Rng;

/// Equivalence checking, escalation and grading behind one configuration.
///
/// A `Grader` holds no mutable state; share it freely across threads.
pub struct Grader<S: ExpressionService = MathExpressionService> {
    engine: EquivalenceEngine<S>,
    escalation: EscalationConfig,
    policy: GradingPolicy,
}

impl Default for Grader<MathExpressionService> {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

impl Grader<MathExpressionService> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let service = MathExpressionService::with_limits(config.limits.clone());
        Self::with_service(service, config)
    }
}

impl<S: ExpressionService> Grader<S> {
    /// Use a custom expression service; `config.limits` is left to the service
    pub fn with_service(service: S, config: EngineConfig) -> Self {
        Self {
            engine: EquivalenceEngine::new(service, config.equivalence),
            escalation: config.escalation,
            policy: config.grading,
        }
    }

    pub fn engine(&self) -> &EquivalenceEngine<S> {
        &self.engine
    }

    pub fn policy(&self) -> &GradingPolicy {
        &self.policy
    }

    pub fn escalation(&self) -> EscalationPolicy<'_, S> {
        EscalationPolicy::new(&self.engine, &self.escalation)
    }

    pub fn check(&self, student: &str, expected: &str) -> EquivalenceVerdict {
        self.engine.check(student, expected)
    }

    pub fn check_with_rng<R: Rng>(
        &self,
        student: &str,
        expected: &str,
        rng: &mut R,
    ) -> EquivalenceVerdict {
        self.engine.check_with_rng(student, expected, rng)
    }

    pub async fn validate(
        &self,
        student: &str,
        expected: &str,
        validator: &dyn SemanticValidator,
    ) -> EquivalenceVerdict {
        self.escalation()
            .validate(student, expected, validator)
            .await
    }

    pub fn grade(
        &self,
        student: Option<&str>,
        expected: Option<&str>,
        telemetry: SessionTelemetry,
    ) -> GradingResult {
        self.policy
            .grade(student, expected, telemetry, |s, e| self.engine.check(s, e))
    }

    pub fn grade_with_rng<R: Rng>(
        &self,
        student: Option<&str>,
        expected: Option<&str>,
        telemetry: SessionTelemetry,
        rng: &mut R,
    ) -> GradingResult {
        self.policy.grade(student, expected, telemetry, |s, e| {
            self.engine.check_with_rng(s, e, rng)
        })
    }

    /// Grade with escalation of weak local verdicts to `validator`.
    ///
    /// Missing answers are rejected before anything is evaluated.
    pub async fn grade_with_validator(
        &self,
        student: Option<&str>,
        expected: Option<&str>,
        telemetry: SessionTelemetry,
        validator: &dyn SemanticValidator,
    ) -> GradingResult {
        let (student, expected) = match self.policy.admit(student, expected) {
            Ok(answers) => answers,
            Err(rejected) => return rejected,
        };
        let verdict = self.validate(student, expected, validator).await;
        self.policy.score(&verdict, telemetry)
    }
}
