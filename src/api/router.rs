//! API router.
//!
//! All routes live under `/api`. CORS is permissive: the front end is
//! served from a separate origin during demos. The body limit sits above
//! the documented 20 MiB upload cap so the handler can reject oversize
//! uploads with a structured error instead of a bare 413.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::app_state::AppState;
use crate::config::MAX_UPLOAD_BYTES;

/// Slack above the upload cap for multipart framing overhead.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

/// Build the API router.
pub fn api_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/analyze", post(endpoints::analyze::analyze))
        .route("/demo", get(endpoints::demo::demo))
        .route("/comprehension", post(endpoints::comprehension::generate))
        .route("/fraud-check", get(endpoints::fraud::check))
        .route("/health", get(endpoints::health::check))
        .with_state(state);

    Router::new()
        .nest("/api", routes)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + BODY_LIMIT_SLACK))
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use std::io::Write;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::engine::{CompletionEngine, MockEngine};
    use crate::fallback::FallbackStore;
    use crate::reference::ReferenceStore;
    use crate::report::ensure_risk_amounts;

    const BOUNDARY: &str = "X-LEASEGUARD-TEST-BOUNDARY";

    fn valid_report(risk_amounts: &[Value]) -> Value {
        let clauses: Vec<Value> = risk_amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| {
                json!({
                    "number": format!("제{}조", i + 1),
                    "title": "조항",
                    "deviationScore": 70,
                    "riskAmount": amount,
                    "original": "원문",
                    "standard": "표준 원문",
                    "easyKorean": {"level1": "설명", "level2": "비유", "level3": "시나리오"},
                    "action": {"type": "negotiate", "priority": "high", "message": "수정 요청"}
                })
            })
            .collect();
        json!({
            "summary": {
                "totalMaxRisk": 0,
                "riskLevel": "medium",
                "deviatedClauseCount": clauses.len(),
                "totalClauseCount": 8
            },
            "clauses": clauses,
            "overallAction": {"type": "warning", "message": "확인 필요"}
        })
    }

    struct TestApp {
        router: Router,
        fallback_doc: Value,
        _files: (tempfile::NamedTempFile, tempfile::NamedTempFile),
    }

    fn test_app(engine: Arc<dyn CompletionEngine>) -> TestApp {
        let mut ref_file = tempfile::NamedTempFile::new().unwrap();
        write!(ref_file, r#"{{"title":"표준계약서","clauses":[]}}"#).unwrap();
        let reference = Arc::new(ReferenceStore::load(ref_file.path()).unwrap());

        let fallback_doc = ensure_risk_amounts(valid_report(&[json!(3_000_000)]));
        let mut fb_file = tempfile::NamedTempFile::new().unwrap();
        write!(fb_file, "{fallback_doc}").unwrap();
        let fallback = Arc::new(FallbackStore::load(fb_file.path()).unwrap());

        let mut config = Config::from_env();
        config.single_shot_timeout = std::time::Duration::from_secs(2);
        config.pipeline_timeout = std::time::Duration::from_secs(2);

        let state = AppState::with_engine(engine, reference, fallback, &config);
        TestApp {
            router: api_router(state),
            fallback_doc,
            _files: (ref_file, fb_file),
        }
    }

    fn multipart_upload(payload: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"file\"; filename=\"lease.pdf\"\r\n",
        );
        body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::post("/api/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn response_json(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = test_app(Arc::new(MockEngine::new()));
        let response = app
            .router
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn demo_returns_the_static_document_verbatim() {
        let app = test_app(Arc::new(MockEngine::new()));
        let response = app
            .router
            .oneshot(Request::get("/api/demo").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response_json(response).await, app.fallback_doc);
    }

    #[tokio::test]
    async fn analyze_repairs_and_tags_real_report() {
        // Producer returns a schema-valid report with one missing amount.
        let report = valid_report(&[json!(500_000), json!(null)]);
        let engine = Arc::new(MockEngine::new().reply_text(&report.to_string()));
        let app = test_app(engine);

        let response = app
            .router
            .oneshot(multipart_upload(b"%PDF-1.4 fake lease"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["analysisMode"], "real");
        assert_eq!(json["clauses"][1]["riskAmount"], 1_000_000);
        assert_eq!(json["summary"]["totalMaxRisk"], 1_500_000);
    }

    #[tokio::test]
    async fn analyze_degrades_to_static_fallback() {
        // Mock engine yields empty responses for every producer call.
        let app = test_app(Arc::new(MockEngine::new()));

        let response = app
            .router
            .oneshot(multipart_upload(b"%PDF-1.4 fake lease"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let mut json = response_json(response).await;
        assert_eq!(json["analysisMode"], "fallback");
        // Identical to the static document apart from the injected tag
        json.as_object_mut().unwrap().remove("analysisMode");
        assert_eq!(json, app.fallback_doc);
    }

    #[tokio::test]
    async fn analyze_rejects_oversize_upload_without_processing() {
        let engine = Arc::new(MockEngine::new());
        let app = test_app(engine.clone());

        let oversized = vec![0u8; MAX_UPLOAD_BYTES + 1];
        let response = app.router.oneshot(multipart_upload(&oversized)).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "PAYLOAD_TOO_LARGE");
        // No producer ever ran
        assert_eq!(engine.calls(), 0);
    }

    #[tokio::test]
    async fn analyze_without_file_field_is_missing_parameter() {
        let app = test_app(Arc::new(MockEngine::new()));
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhi\r\n--{BOUNDARY}--\r\n"
        );
        let request = Request::post("/api/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "MISSING_PARAMETER");
    }

    #[tokio::test]
    async fn fraud_check_requires_address() {
        let app = test_app(Arc::new(MockEngine::new()));
        let response = app
            .router
            .oneshot(Request::get("/api/fraud-check").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "MISSING_PARAMETER");
    }

    #[tokio::test]
    async fn fraud_check_never_fails_on_engine_errors() {
        use crate::engine::EngineError;
        let engine = Arc::new(
            MockEngine::new().reply_error(EngineError::Connection("api".into())),
        );
        let app = test_app(engine);

        let response = app
            .router
            .oneshot(
                Request::get("/api/fraud-check?address=%EC%84%9C%EC%9A%B8")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["searchPerformed"], false);
        assert_eq!(json["manualCheckLinks"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn comprehension_failure_is_reported_not_degraded() {
        // Engine returns unusable text → explicit 502, no silent fallback.
        let app = test_app(Arc::new(MockEngine::new().reply_text("불가")));
        let request = Request::post("/api/comprehension")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"riskAnalysis": {}, "finalReport": {"clauses": []}}).to_string(),
            ))
            .unwrap();

        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "GENERATION_FAILED");
    }

    #[tokio::test]
    async fn comprehension_success_returns_block() {
        let block = json!({
            "clozeQuestions": [
                {"clauseNumber": "제4조", "question": "보증금은 ___ 이내 반환", "answer": "1개월"}
            ]
        });
        let app = test_app(Arc::new(MockEngine::new().reply_text(&block.to_string())));
        let request = Request::post("/api/comprehension")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"riskAnalysis": {}, "finalReport": {"clauses": []}}).to_string(),
            ))
            .unwrap();

        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response_json(response).await, block);
    }

    #[tokio::test]
    async fn comprehension_missing_field_is_client_error() {
        let app = test_app(Arc::new(MockEngine::new()));
        let request = Request::post("/api/comprehension")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"riskAnalysis": {}}).to_string()))
            .unwrap();

        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = test_app(Arc::new(MockEngine::new()));
        let response = app
            .router
            .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
