use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use lead_intake::leads::{lead_import_router, LeadImportService, LeadStore};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_lead_routes<S>(service: Arc<LeadImportService<S>>) -> axum::Router
where
    S: LeadStore + 'static,
{
    lead_import_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::DefaultBodyLimit;
    use axum::http::Request;
    use lead_intake::leads::SqliteLeadStore;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    const BOUNDARY: &str = "api-test-boundary";

    fn state(ready: bool) -> AppState {
        let recorder = PrometheusBuilder::new().build_recorder();
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(recorder.handle()),
        }
    }

    async fn app(ready: bool) -> axum::Router {
        let store = SqliteLeadStore::connect("sqlite::memory:")
            .await
            .expect("in-memory store opens");
        let service = Arc::new(LeadImportService::new(Arc::new(store)));
        with_lead_routes(service).layer(Extension(state(ready)))
    }

    fn upload(contents: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
Content-Disposition: form-data; name=\"file\"; filename=\"leads.csv\"\r\n\
Content-Type: text/csv\r\n\r\n\
{contents}\r\n\
--{BOUNDARY}--\r\n"
        );
        Request::post("/api/v1/leads/import")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request builds")
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json payload")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).expect("request builds")
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn readiness_tracks_flag() {
        let response = app(false).await.oneshot(get("/ready")).await.expect("route executes");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await, json!({ "status": "initializing" }));

        let response = app(true).await.oneshot(get("/ready")).await.expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "status": "ready" }));
    }

    #[tokio::test]
    async fn metrics_are_plain_text() {
        let response = app(true).await.oneshot(get("/metrics")).await.expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("text/plain; version=0.0.4")
        );
    }

    #[tokio::test]
    async fn import_is_mounted_next_to_operational_routes() {
        let response = app(true)
            .await
            .oneshot(upload("fullName,phone\nJohn Doe,9876543210\n"))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "success": true, "count": 1 }));
    }

    #[tokio::test]
    async fn oversized_upload_is_refused() {
        let router = app(true).await.layer(DefaultBodyLimit::max(64));
        let contents = format!("fullName,phone\n{}", "John Doe,9876543210\n".repeat(20));

        let response = router.oneshot(upload(&contents)).await.expect("route executes");

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(json_body(response).await.get("error").is_some());
    }
}
