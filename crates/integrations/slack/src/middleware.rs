//! Axum middleware that reports failed requests and panics to Slack.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::body::{Body, HttpBody};
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use futures::FutureExt;
use tracing::{debug, warn};

use crate::reporter::SlackReporter;

/// Largest error body buffered to extract its error text.
const MAX_REPORTED_BODY: usize = 64 * 1024;

/// Report error responses and panics of the wrapped routes.
///
/// Install with [`axum::middleware::from_fn_with_state`]. Responses with a
/// status of 400 or above are reported (unless `only_panics` is set) and then
/// returned to the client unchanged. Bodies of unknown length (streams) or
/// larger than 64 KiB are passed through unread and reported by their status
/// reason phrase. A panicking handler is reported and the panic is resumed,
/// so outer layers such as `CatchPanicLayer` still see it.
pub async fn report_errors(
    State(reporter): State<Arc<SlackReporter>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    let method = request.method().clone();

    let response = match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => {
            let panic_text = panic_text(payload.as_ref());
            reporter
                .handle_panic(&panic_text, &path, method.as_str())
                .await;
            std::panic::resume_unwind(payload);
        }
    };

    let status = response.status();
    if reporter.config().only_panics || status.as_u16() < 400 {
        return response;
    }

    let (parts, body) = response.into_parts();
    let reason = status.canonical_reason().unwrap_or("Unknown Status");

    if body
        .size_hint()
        .upper()
        .is_none_or(|len| len > MAX_REPORTED_BODY as u64)
    {
        debug!(path = %path, "error body not buffered, reporting status reason");
        reporter
            .handle_error(status, reason, &path, method.as_str())
            .await;
        return Response::from_parts(parts, body);
    }

    let bytes = match axum::body::to_bytes(body, MAX_REPORTED_BODY).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %path, error = %e, "failed to buffer error response body");
            reporter
                .handle_error(status, reason, &path, method.as_str())
                .await;
            return Response::from_parts(parts, Body::empty());
        }
    };

    let error_text = reporter.error_text(status, &bytes);
    reporter
        .handle_error(status, &error_text, &path, method.as_str())
        .await;

    Response::from_parts(parts, Body::from(bytes))
}

fn panic_text(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;
    use tower::ServiceExt;

    use super::*;
    use crate::config::SlackConfig;
    use crate::test_support::{MockSlackServer, json_body};

    const LARGE_BODY: usize = 100 * 1024;

    fn app(config: SlackConfig) -> Router {
        let reporter = Arc::new(SlackReporter::new(config).unwrap());
        Router::new()
            .route("/ok", get(|| async { "fine" }))
            .route(
                "/bad",
                get(|| async {
                    (
                        StatusCode::BAD_REQUEST,
                        axum::Json(serde_json::json!({"error": "bad input"})),
                    )
                }),
            )
            .route(
                "/expired",
                get(|| async {
                    (
                        StatusCode::UNAUTHORIZED,
                        axum::Json(serde_json::json!({"message": "oauth: token is expired"})),
                    )
                }),
            )
            .route("/empty", get(|| async { StatusCode::NOT_FOUND }))
            .route(
                "/large",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "x".repeat(LARGE_BODY)) }),
            )
            .route(
                "/stream",
                get(|| async {
                    let chunks = futures::stream::pending::<Result<axum::body::Bytes, std::io::Error>>();
                    (StatusCode::BAD_GATEWAY, Body::from_stream(chunks))
                }),
            )
            .route(
                "/panic",
                get(|| async {
                    if true {
                        panic!("handler exploded");
                    }
                    "unreachable"
                }),
            )
            .layer(axum::middleware::from_fn_with_state(reporter, report_errors))
    }

    fn config(base_url: &str) -> SlackConfig {
        SlackConfig::new("xoxb-test", "C_ERRORS", "C_CRITICAL").with_api_base_url(base_url)
    }

    fn get_request(uri: &str) -> Request {
        axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn success_is_not_reported() {
        let server = MockSlackServer::start().await;
        let response = app(config(&server.base_url))
            .oneshot(get_request("/ok"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "fine");
        assert!(server.expect_no_request(Duration::from_millis(100)).await);
    }

    #[tokio::test]
    async fn error_response_is_reported_and_passed_through() {
        let server = MockSlackServer::start().await;
        let app = app(config(&server.base_url));
        let handle = tokio::spawn(async move { server.respond_once(200, r#"{"ok":true}"#).await });

        let response = app.oneshot(get_request("/bad")).await.unwrap();
        let report = json_body(&handle.await.unwrap());

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(response).await, r#"{"error":"bad input"}"#);

        assert_eq!(report["channel"], "C_ERRORS");
        let text = report["text"].as_str().unwrap();
        assert!(text.contains("`/bad`"));
        assert!(text.contains("`GET`"));
        assert!(text.contains("*Status:* 400"));
        assert!(text.contains("```bad input```"));
    }

    #[tokio::test]
    async fn critical_errors_go_to_critical_channel() {
        let server = MockSlackServer::start().await;
        let app = app(config(&server.base_url));
        let handle = tokio::spawn(async move { server.respond_once(200, r#"{"ok":true}"#).await });

        let response = app.oneshot(get_request("/expired")).await.unwrap();
        let report = json_body(&handle.await.unwrap());

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(report["channel"], "C_CRITICAL");
    }

    #[tokio::test]
    async fn empty_body_reports_status_reason() {
        let server = MockSlackServer::start().await;
        let app = app(config(&server.base_url));
        let handle = tokio::spawn(async move { server.respond_once(200, r#"{"ok":true}"#).await });

        let response = app.oneshot(get_request("/empty")).await.unwrap();
        let report = json_body(&handle.await.unwrap());

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(report["text"].as_str().unwrap().contains("```Not Found```"));
    }

    #[tokio::test]
    async fn large_body_reports_status_reason_and_passes_through() {
        let server = MockSlackServer::start().await;
        let app = app(config(&server.base_url));
        let handle = tokio::spawn(async move { server.respond_once(200, r#"{"ok":true}"#).await });

        let response = app.oneshot(get_request("/large")).await.unwrap();
        let report = json_body(&handle.await.unwrap());

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(response).await.len(), LARGE_BODY);
        assert!(
            report["text"]
                .as_str()
                .unwrap()
                .contains("```Internal Server Error```")
        );
    }

    #[tokio::test]
    async fn streaming_body_is_not_awaited() {
        let server = MockSlackServer::start().await;
        let app = app(config(&server.base_url));
        let handle = tokio::spawn(async move { server.respond_once(200, r#"{"ok":true}"#).await });

        let response = tokio::time::timeout(
            Duration::from_secs(5),
            app.oneshot(get_request("/stream")),
        )
        .await
        .expect("middleware waited on a streaming body")
        .unwrap();
        let report = json_body(&handle.await.unwrap());

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(report["text"].as_str().unwrap().contains("```Bad Gateway```"));
    }

    #[tokio::test]
    async fn slack_failure_does_not_change_response() {
        let server = MockSlackServer::start().await;
        let app = app(config(&server.base_url));
        let handle = tokio::spawn(async move {
            server
                .respond_once(200, r#"{"ok":false,"error":"not_in_channel"}"#)
                .await
        });

        let response = app.oneshot(get_request("/bad")).await.unwrap();
        handle.await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(response).await, r#"{"error":"bad input"}"#);
    }

    #[tokio::test]
    async fn only_panics_skips_error_responses() {
        let server = MockSlackServer::start().await;
        let response = app(config(&server.base_url).with_only_panics(true))
            .oneshot(get_request("/bad"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(server.expect_no_request(Duration::from_millis(100)).await);
    }

    #[tokio::test]
    async fn panic_is_reported_then_resumed() {
        let server = MockSlackServer::start().await;
        let app = app(config(&server.base_url).with_only_panics(true));
        let handle = tokio::spawn(async move { server.respond_once(200, r#"{"ok":true}"#).await });

        let result = tokio::spawn(app.oneshot(get_request("/panic"))).await;
        let report = json_body(&handle.await.unwrap());

        let err = result.unwrap_err();
        assert!(err.is_panic());

        let text = report["text"].as_str().unwrap();
        assert!(text.contains("PANIC CAPTURED"));
        assert!(text.contains("`/panic`"));
        assert!(text.contains("`handler exploded`"));
    }

    #[test]
    fn panic_text_handles_payload_types() {
        let static_str: Box<dyn Any + Send> = Box::new("static");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let other: Box<dyn Any + Send> = Box::new(42_u32);
        assert_eq!(panic_text(static_str.as_ref()), "static");
        assert_eq!(panic_text(owned.as_ref()), "owned");
        assert_eq!(panic_text(other.as_ref()), "non-string panic payload");
    }
}
