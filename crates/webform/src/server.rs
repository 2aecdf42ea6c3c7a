//! HTTP server for the download form

use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Form, Json, Router,
};
use getstocks::{GetStocksApi, PollSettings};
use std::future::Future;
use tower_http::trace::TraceLayer;

use crate::actions::{self, Action, ActionForm};
use crate::error::AppError;

const INDEX_TEMPLATE: &str = include_str!("../assets/index.html");

#[derive(Clone)]
struct WebState {
    api: GetStocksApi,
    page: String,
}

/// Web form API serving the page and relaying its actions
#[derive(Clone)]
pub struct WebFormApi {
    state: WebState,
}

impl WebFormApi {
    /// Create a new web form API
    ///
    /// # Arguments
    /// * `api` - GetStocks client every action is relayed to
    /// * `poll` - Interval and timeout the page script polls with
    pub fn new(api: GetStocksApi, poll: PollSettings) -> Self {
        let page = render_index(poll);
        Self {
            state: WebState { api, page },
        }
    }

    /// Create the axum router with all routes configured
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(index).post(action))
            .route("/health", get(health_check))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
    }

    /// Start the web server and run until `shutdown` resolves
    ///
    /// # Arguments
    /// * `host` - Host to bind to (e.g., "0.0.0.0")
    /// * `port` - Port to bind to (e.g., 8080)
    pub async fn serve<F>(self, host: &str, port: u16, shutdown: F) -> crate::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        tracing::info!("Web form listening on {}", addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Web form stopped");
        Ok(())
    }
}

fn render_index(poll: PollSettings) -> String {
    INDEX_TEMPLATE
        .replace("{{POLL_INTERVAL_MS}}", &poll.interval.as_millis().to_string())
        .replace("{{POLL_TIMEOUT_MS}}", &poll.timeout.as_millis().to_string())
}

async fn index(State(state): State<WebState>) -> Html<String> {
    Html(state.page)
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "Web form running")
}

async fn action(
    State(state): State<WebState>,
    form: Result<Form<ActionForm>, FormRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Form(form) = form.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let action = Action::try_from(form)?;
    tracing::debug!("Web form action: {:?}", action);

    let reply = actions::perform(&state.api, action).await?;
    Ok(Json(reply))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use getstocks::ApiConfig;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use url::Url;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app_for(server: &MockServer) -> Router {
        let base = Url::parse(&server.uri()).unwrap();
        let api = GetStocksApi::new(ApiConfig::new(base, "secret")).unwrap();
        WebFormApi::new(api, PollSettings::web()).router()
    }

    async fn post_form(app: Router, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_index_carries_poll_timings() {
        let server = MockServer::start().await;
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app_for(&server).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let page = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(page.contains("5000"));
        assert!(page.contains("60000"));
        assert!(!page.contains("{{POLL_"));
    }

    #[test]
    fn test_page_waits_one_interval_before_first_status_check() {
        let page = render_index(PollSettings::web());
        let script = &page[page.find("async function waitForFile").unwrap()..];
        let wait = script.find("setTimeout(resolve, POLL_INTERVAL_MS)").unwrap();
        let check = script.find("action: \"checkDownloadStatus\"").unwrap();
        assert!(wait < check);
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app_for(&server).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_info_relays_support() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/getinfo"))
            .and(body_string_contains("ispre=1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 200,
                "result": {"support": {
                    "slug": "freepik",
                    "id": "4711",
                    "itemthumb": "https://img.test/4711.jpg",
                    "type": {"zip": "ZIP"}
                }}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (status, body) = post_form(
            app_for(&server),
            "action=getInfo&link=https%3A%2F%2Fwww.freepik.com%2Fx_4711.htm",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], 200);
        assert_eq!(body["result"]["support"]["slug"], "freepik");
        assert_eq!(body["result"]["support"]["type"][0]["key"], "zip");
    }

    #[tokio::test]
    async fn test_get_info_rejects_non_link_without_calling_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (status, body) = post_form(app_for(&server), "action=getInfo&link=not-a-link").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_provider_error_becomes_error_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/getlink"))
            .and(body_string_contains("type=zip"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 403,
                "message": "Out of credits"
            })))
            .mount(&server)
            .await;

        let (_, body) = post_form(
            app_for(&server),
            "action=getLink&link=https%3A%2F%2Fa.test%2F1&ispre=1&type=zip",
        )
        .await;
        assert_eq!(body, json!({"status": "error", "message": "Out of credits"}));
    }

    #[tokio::test]
    async fn test_check_status_pending_and_ready() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/download-status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 200,
                "result": {"status": 0}
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/download-status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 200,
                "result": {
                    "status": 1,
                    "itemFilename": "poster.zip",
                    "itemSize": "12 MB",
                    "itemDCode": "dc-42"
                }
            })))
            .mount(&server)
            .await;

        let form = "action=checkDownloadStatus&slug=freepik&id=4711&ispre=1";
        let (_, pending) = post_form(app_for(&server), form).await;
        assert_eq!(pending, json!({"status": 200, "result": {"status": 0}}));

        let (_, ready) = post_form(app_for(&server), form).await;
        assert_eq!(ready["result"]["status"], 1);
        assert_eq!(ready["result"]["itemFilename"], "poster.zip");
        assert_eq!(
            ready["result"]["downloadLink"],
            format!("{}/api/v1/download/dc-42?token=secret", server.uri())
        );
    }

    #[tokio::test]
    async fn test_missing_action_is_bad_request() {
        let server = MockServer::start().await;
        let (status, body) = post_form(app_for(&server), "link=https%3A%2F%2Fa.test%2F1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_undecodable_form_is_bad_request() {
        let server = MockServer::start().await;
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"action\":\"getInfo\"}"))
            .unwrap();
        let response = app_for(&server).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_unknown_action_is_bad_request() {
        let server = MockServer::start().await;
        let (status, body) = post_form(app_for(&server), "action=purge").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }
}
