use async_trait::async_trait;
use equate::escalation::{fallback_verdict, needs_escalation, VALIDATION_FAILED};
use equate::sampler::seeded_rng;
use equate::{
    Confidence, EngineConfig, EquivalenceVerdict, EscalationConfig, Grader, Mastery,
    SemanticValidator, SessionTelemetry, ValidatorError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Returns a fixed verdict and counts how often it was asked
struct FixedValidator {
    verdict: EquivalenceVerdict,
    calls: AtomicUsize,
}

impl FixedValidator {
    fn new(is_equivalent: bool, confidence: Confidence) -> Self {
        Self {
            verdict: EquivalenceVerdict::new(is_equivalent, confidence, "validator says so"),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SemanticValidator for FixedValidator {
    async fn validate(
        &self,
        _student: &str,
        _expected: &str,
    ) -> Result<EquivalenceVerdict, ValidatorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.verdict.clone())
    }
}

struct FailingValidator;

#[async_trait]
impl SemanticValidator for FailingValidator {
    async fn validate(
        &self,
        _student: &str,
        _expected: &str,
    ) -> Result<EquivalenceVerdict, ValidatorError> {
        Err(ValidatorError::Transport("connection refused".to_string()))
    }
}

struct SlowValidator;

#[async_trait]
impl SemanticValidator for SlowValidator {
    async fn validate(
        &self,
        _student: &str,
        _expected: &str,
    ) -> Result<EquivalenceVerdict, ValidatorError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(EquivalenceVerdict::equivalent(Confidence::High, "too late"))
    }
}

fn grader_with_timeout(timeout_ms: u64) -> Grader {
    Grader::with_config(EngineConfig {
        escalation: EscalationConfig { timeout_ms },
        ..EngineConfig::default()
    })
}

#[test]
fn test_needs_escalation() {
    assert!(!needs_escalation(&EquivalenceVerdict::equivalent(Confidence::High, "")));
    assert!(!needs_escalation(&EquivalenceVerdict::equivalent(Confidence::Medium, "")));
    assert!(needs_escalation(&EquivalenceVerdict::new(false, Confidence::Medium, "")));
    assert!(needs_escalation(&EquivalenceVerdict::not_equivalent("")));
}

#[test]
fn test_fallback_verdict() {
    let verdict = fallback_verdict();
    assert!(!verdict.is_equivalent);
    assert_eq!(verdict.confidence, Confidence::Low);
    assert_eq!(verdict.reason, VALIDATION_FAILED);
}

#[tokio::test]
async fn test_high_confidence_is_never_escalated() {
    let grader = Grader::new();
    let validator = FixedValidator::new(false, Confidence::High);

    let verdict = grader.validate("x + 1", "1 + x", &validator).await;
    assert!(verdict.is_equivalent);
    assert_eq!(verdict.confidence, Confidence::High);
    assert_eq!(validator.calls(), 0);

    let verdict = grader.validate("7", "7", &validator).await;
    assert_eq!(verdict.reason, "Exact match");
    assert_eq!(validator.calls(), 0);
}

#[tokio::test]
async fn test_low_confidence_is_escalated_and_capped_at_medium() {
    let grader = Grader::new();
    let validator = FixedValidator::new(true, Confidence::High);

    let verdict = grader.validate("sec(x)", "1/cos(x)", &validator).await;
    assert_eq!(validator.calls(), 1);
    assert!(verdict.is_equivalent);
    assert_eq!(verdict.confidence, Confidence::Medium);
    assert_eq!(verdict.reason, "validator says so");
}

#[tokio::test]
async fn test_validator_can_reject() {
    let grader = Grader::new();
    let validator = FixedValidator::new(false, Confidence::Low);

    let verdict = grader.validate("x + 1", "x + 2", &validator).await;
    assert_eq!(validator.calls(), 1);
    assert!(!verdict.is_equivalent);
    assert_eq!(verdict.confidence, Confidence::Medium);
}

#[tokio::test]
async fn test_validator_error_falls_back() {
    let grader = Grader::new();
    let verdict = grader.validate("x + 1", "x + 2", &FailingValidator).await;
    assert_eq!(verdict, fallback_verdict());
}

#[tokio::test(start_paused = true)]
async fn test_validator_timeout_falls_back() {
    let grader = grader_with_timeout(50);
    let verdict = grader.validate("x + 1", "x + 2", &SlowValidator).await;
    assert_eq!(verdict, fallback_verdict());
}

#[tokio::test]
async fn test_seeded_escalation() {
    let grader = Grader::new();
    let validator = FixedValidator::new(true, Confidence::Medium);
    let verdict = grader
        .escalation()
        .validate_with_rng("x + 1", "x + 2", &validator, &mut seeded_rng(1))
        .await;
    assert!(verdict.is_equivalent);
    assert_eq!(grader.escalation().timeout(), Duration::from_secs(10));
}

#[tokio::test]
async fn test_grade_with_validator() {
    let grader = Grader::new();
    let validator = FixedValidator::new(true, Confidence::High);

    let result = grader
        .grade_with_validator(
            Some("sec(x)"),
            Some("1/cos(x)"),
            SessionTelemetry::new(1, 1),
            &validator,
        )
        .await;
    // medium (0.7) minus one hint
    assert_eq!(result.score, 0.6);
    assert_eq!(result.mastery, Mastery::Medium);
    assert_eq!(
        result.reason,
        "validator says so. Penalty: -0.1 for 1 hint(s)."
    );
}

#[tokio::test]
async fn test_grade_with_rejecting_validator_earns_nothing() {
    let grader = Grader::new();
    let validator = FixedValidator::new(false, Confidence::High);

    let result = grader
        .grade_with_validator(
            Some("x + 1"),
            Some("x + 2"),
            SessionTelemetry::new(1, 0),
            &validator,
        )
        .await;
    assert_eq!(validator.calls(), 1);
    assert_eq!(result.score, 0.0);
    assert_eq!(result.mastery, Mastery::Low);
    assert_eq!(result.reason, "validator says so");
}

#[tokio::test]
async fn test_grade_with_validator_rejects_missing_answers_first() {
    let grader = Grader::new();
    let validator = FixedValidator::new(true, Confidence::High);

    let result = grader
        .grade_with_validator(None, Some("x"), SessionTelemetry::default(), &validator)
        .await;
    assert_eq!(result.score, 0.0);
    assert_eq!(result.reason, "No student answer provided");
    assert_eq!(validator.calls(), 0);
}

#[tokio::test]
async fn test_grade_with_failing_validator() {
    let grader = Grader::new();
    let result = grader
        .grade_with_validator(
            Some("x + 1"),
            Some("x + 2"),
            SessionTelemetry::default(),
            &FailingValidator,
        )
        .await;
    assert_eq!(result.score, 0.0);
    assert_eq!(result.mastery, Mastery::Low);
    assert_eq!(result.reason, VALIDATION_FAILED);
}

#[tokio::test]
async fn test_crate_level_validate() {
    let validator = FixedValidator::new(true, Confidence::Medium);
    let verdict = equate::validate("2x", "x + x", &validator).await;
    assert!(verdict.is_equivalent);
    assert_eq!(verdict.confidence, Confidence::High);
    assert_eq!(validator.calls(), 0);
}
