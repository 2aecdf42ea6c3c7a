use std::sync::Arc;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::provider::Provider;
use crate::types::{Envelope, InfoResult, ItemSupport, JobHandle, JobRequest, JobStatus, RawDownloadStatus};

const GET_INFO: &str = "api/v1/getinfo";
const GET_LINK: &str = "api/v1/getlink";
const DOWNLOAD_STATUS: &str = "api/v1/download-status";
const DOWNLOAD: &str = "api/v1/download/";

/// HTTP client for the GetStocks API
#[derive(Clone)]
pub struct GetStocksApi {
    client: reqwest::Client,
    config: Arc<ApiConfig>,
}

impl GetStocksApi {
    /// Build a client from explicit configuration
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Public link for a finished file, authenticated with the API token
    pub fn download_link(&self, download_code: &str) -> ApiResult<String> {
        let path = format!("{}{}", DOWNLOAD, urlencoding::encode(download_code));
        let mut url = self
            .config
            .base_url
            .join(&path)
            .map_err(|e| ApiError::Malformed(format!("bad download code {:?}: {}", download_code, e)))?;
        url.query_pairs_mut().append_pair("token", &self.config.token);
        Ok(url.to_string())
    }

    /// POST a form to `endpoint` and unwrap the response envelope
    async fn post(&self, endpoint: &str, form: &[(&str, String)]) -> ApiResult<serde_json::Value> {
        if self.config.token.is_empty() {
            return Err(ApiError::MissingToken);
        }

        let url = self
            .config
            .base_url
            .join(endpoint)
            .map_err(|e| ApiError::Malformed(format!("bad endpoint {}: {}", endpoint, e)))?;

        tracing::debug!("POST {}", endpoint);

        let response = self
            .client
            .post(url)
            .query(&[("token", self.config.token.as_str())])
            .form(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Request to {} failed: {}", endpoint, e);
                ApiError::from(e)
            })?;

        let http_status = response.status();
        let body = response.text().await?;

        let envelope: Envelope = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!("Undecodable response from {} (HTTP {}): {}", endpoint, http_status, e);
            ApiError::Malformed(format!("HTTP {}: {}", http_status, e))
        })?;

        envelope.into_result().map_err(|e| {
            tracing::warn!("{} returned an error: {}", endpoint, e);
            e
        })
    }
}

fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

fn decode<T: serde::de::DeserializeOwned>(endpoint: &str, value: serde_json::Value) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|e| ApiError::Malformed(format!("{}: {}", endpoint, e)))
}

impl Provider for GetStocksApi {
    async fn get_info(&self, link: &str, premium: bool) -> ApiResult<ItemSupport> {
        tracing::info!("Resolving metadata for {}", link);
        let form = [("link", link.to_string()), ("ispre", flag(premium))];
        let result: InfoResult = decode(GET_INFO, self.post(GET_INFO, &form).await?)?;
        result
            .support
            .ok_or_else(|| ApiError::Provider("This link is not supported".to_string()))
    }

    async fn get_link(&self, request: &JobRequest) -> ApiResult<JobHandle> {
        tracing::info!(
            "Submitting download job for {} (type: {:?})",
            request.link,
            request.item_type
        );
        let mut form = vec![("link", request.link.clone()), ("ispre", flag(request.premium))];
        if let Some(item_type) = request.item_type.as_ref().filter(|t| !t.is_empty()) {
            form.push(("type", item_type.clone()));
        }
        decode(GET_LINK, self.post(GET_LINK, &form).await?)
    }

    async fn check_status(&self, handle: &JobHandle) -> ApiResult<JobStatus> {
        let mut form = vec![
            ("slug", handle.provider_slug.clone()),
            ("id", handle.item_id.clone()),
            ("ispre", flag(handle.premium)),
        ];
        if let Some(item_type) = handle.item_type.as_ref().filter(|t| !t.is_empty()) {
            form.push(("type", item_type.clone()));
        }
        let raw: RawDownloadStatus = decode(DOWNLOAD_STATUS, self.post(DOWNLOAD_STATUS, &form).await?)?;
        raw.classify(handle, |code| self.download_link(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_for(server: &MockServer, token: &str) -> GetStocksApi {
        let base = Url::parse(&server.uri()).unwrap();
        GetStocksApi::new(ApiConfig::new(base, token)).unwrap()
    }

    fn handle() -> JobHandle {
        JobHandle {
            provider_slug: "freepik".to_string(),
            item_id: "4711".to_string(),
            premium: true,
            item_type: Some("zip".to_string()),
        }
    }

    #[tokio::test]
    async fn test_get_info_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/getinfo"))
            .and(query_param("token", "secret"))
            .and(body_string_contains("ispre=1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 200,
                "result": {"support": {
                    "slug": "freepik",
                    "id": "4711",
                    "ispre": 1,
                    "type": {"zip": "ZIP", "jpg": "JPG"}
                }}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = api_for(&server, "secret");
        let support = api.get_info("https://www.freepik.com/x_4711.htm", true).await.unwrap();
        assert_eq!(support.slug, "freepik");
        assert_eq!(support.types.len(), 2);
    }

    #[tokio::test]
    async fn test_get_info_without_support_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/getinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": 200, "result": {}})))
            .mount(&server)
            .await;

        let api = api_for(&server, "secret");
        let err = api.get_info("https://example.com/a", true).await.unwrap_err();
        assert!(matches!(err, ApiError::Provider(_)));
    }

    #[tokio::test]
    async fn test_provider_error_message_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/getlink"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 403,
                "message": "Out of credits"
            })))
            .mount(&server)
            .await;

        let api = api_for(&server, "secret");
        let err = api
            .get_link(&JobRequest::with_defaults("https://example.com/a"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Out of credits");
    }

    #[tokio::test]
    async fn test_get_link_omits_missing_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/getlink"))
            .and(body_string_contains("ispre=1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 200,
                "result": {"provSlug": "freepik", "itemID": 4711, "isPremium": 1, "itemType": "zip"}
            })))
            .mount(&server)
            .await;

        let api = api_for(&server, "secret");
        let handle = api
            .get_link(&JobRequest::with_defaults("https://example.com/a"))
            .await
            .unwrap();
        assert_eq!(handle, self::handle());

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(!body.contains("type="), "unexpected type field in {}", body);
    }

    #[tokio::test]
    async fn test_check_status_ready_builds_download_link() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/download-status"))
            .and(body_string_contains("slug=freepik"))
            .and(body_string_contains("type=zip"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 200,
                "result": {
                    "status": 1,
                    "provSlug": "freepik",
                    "itemID": "4711",
                    "itemFilename": "poster.zip",
                    "itemSize": "12 MB",
                    "itemDCode": "dc-42"
                }
            })))
            .mount(&server)
            .await;

        let api = api_for(&server, "secret");
        match api.check_status(&handle()).await.unwrap() {
            JobStatus::Ready(file) => {
                assert_eq!(file.download_code, "dc-42");
                assert_eq!(
                    file.download_link,
                    format!("{}/api/v1/download/dc-42?token=secret", server.uri())
                );
            }
            other => panic!("Expected ready, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_check_status_pending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/download-status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 200,
                "result": {"status": 0}
            })))
            .mount(&server)
            .await;

        let api = api_for(&server, "secret");
        assert_eq!(api.check_status(&handle()).await.unwrap(), JobStatus::Pending);
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let api = api_for(&server, "secret");
        let err = api.check_status(&handle()).await.unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
        assert!(err.to_string().contains("502"));
    }

    #[tokio::test]
    async fn test_missing_token_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let api = api_for(&server, "");
        let err = api.get_info("https://example.com/a", true).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingToken));
    }

    #[test]
    fn test_download_link_encodes_code() {
        let api = GetStocksApi::new(ApiConfig::new(Url::parse("https://getstocks.net/").unwrap(), "t k")).unwrap();
        assert_eq!(
            api.download_link("a/b").unwrap(),
            "https://getstocks.net/api/v1/download/a%2Fb?token=t+k"
        );
    }
}
