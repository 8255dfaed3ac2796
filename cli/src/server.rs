#[cfg(feature = "server")]
pub mod http {
    use axum::{
        extract::State,
        http::StatusCode,
        response::{IntoResponse, Json},
        routing::{get, post},
        Router,
    };
    use equate::{EquivalenceVerdict, Grader, GradingResult, SessionTelemetry};
    use serde::{Deserialize, Serialize};
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tower_http::cors::CorsLayer;
    use tracing::{info, warn};

    type SharedGrader = Arc<Grader>;

    #[derive(Debug, Deserialize)]
    struct CheckRequest {
        student: String,
        expected: String,
    }

    #[derive(Debug, Deserialize)]
    struct GradeRequest {
        #[serde(default)]
        student: Option<String>,
        #[serde(default)]
        expected: Option<String>,
        #[serde(default = "first_attempt")]
        attempts: u32,
        #[serde(default)]
        hints_used: u32,
    }

    fn first_attempt() -> u32 {
        1
    }

    #[derive(Debug, Serialize)]
    struct ErrorResponse {
        error: String,
    }

    pub fn router(grader: SharedGrader) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/check", post(check_post))
            .route("/grade", post(grade_post))
            .layer(CorsLayer::permissive())
            .with_state(grader)
    }

    pub async fn start_server(grader: Grader, host: &str, port: u16) -> anyhow::Result<()> {
        let app = router(Arc::new(grader));

        let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
        info!("Equate server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    async fn health_check() -> impl IntoResponse {
        Json(serde_json::json!({
            "status": "ok",
            "service": "equate",
            "version": env!("CARGO_PKG_VERSION")
        }))
    }

    async fn check_post(
        State(grader): State<SharedGrader>,
        Json(payload): Json<CheckRequest>,
    ) -> Result<Json<EquivalenceVerdict>, (StatusCode, Json<ErrorResponse>)> {
        if payload.expected.trim().is_empty() {
            warn!("rejected check request without an expected answer");
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Expected answer cannot be empty".to_string(),
                }),
            ));
        }

        let verdict = grader.check(&payload.student, &payload.expected);
        info!(
            "checked answer: equivalent={} confidence={}",
            verdict.is_equivalent, verdict.confidence
        );

        Ok(Json(verdict))
    }

    async fn grade_post(
        State(grader): State<SharedGrader>,
        Json(payload): Json<GradeRequest>,
    ) -> Json<GradingResult> {
        let result = grader.grade(
            payload.student.as_deref(),
            payload.expected.as_deref(),
            SessionTelemetry::new(payload.attempts, payload.hints_used),
        );
        info!(
            "graded answer: score={} mastery={}",
            result.score, result.mastery
        );

        Json(result)
    }
}

#[cfg(not(feature = "server"))]
pub mod http {
    pub async fn start_server(
        _grader: equate::Grader,
        _host: &str,
        _port: u16,
    ) -> anyhow::Result<()> {
        anyhow::bail!("Server feature not enabled. Recompile with --features server")
    }
}

#[cfg(all(test, feature = "server"))]
mod tests {
    use super::http::router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use equate::Grader;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        router(Arc::new(Grader::new()))
    }

    fn post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_check() {
        let response = app()
            .oneshot(post(
                "/check",
                serde_json::json!({"student": "x+1", "expected": "1+x"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["is_equivalent"], true);
        assert_eq!(body["confidence"], "high");
        assert_eq!(body["reason"], "Canonical forms match");
    }

    #[tokio::test]
    async fn test_check_requires_expected_answer() {
        let response = app()
            .oneshot(post(
                "/check",
                serde_json::json!({"student": "x", "expected": "  "}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_check_rejects_malformed_body() {
        let response = app()
            .oneshot(post("/check", serde_json::json!({"student": "x"})))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_grade() {
        let response = app()
            .oneshot(post(
                "/grade",
                serde_json::json!({"student": "4", "expected": "4", "hints_used": 2}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["score"], 0.8);
        assert_eq!(body["mastery"], "high");
    }

    #[tokio::test]
    async fn test_grade_missing_expected() {
        let response = app()
            .oneshot(post("/grade", serde_json::json!({"student": "4"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["score"], 0.0);
        assert_eq!(body["reason"], "No expected answer provided for grading");
    }
}
