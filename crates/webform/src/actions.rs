//! The form actions posted by the web page
//!
//! Every action answers with the same JSON envelope the page expects:
//! `{"status": 200, "result": ...}` on success and
//! `{"status": "error", "message": ...}` on any provider failure.

use getstocks::types::de::parse_flag;
use getstocks::{JobHandle, JobRequest, JobStatus, Provider};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;

/// Fields posted by the page; which ones are required depends on `action`
#[derive(Debug, Default, Deserialize)]
pub struct ActionForm {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub ispre: Option<String>,
    #[serde(default, rename = "type")]
    pub item_type: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

/// The three things the page can ask for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    GetInfo { link: String, premium: bool },
    GetLink(JobRequest),
    CheckStatus(JobHandle),
}

impl TryFrom<ActionForm> for Action {
    type Error = AppError;

    fn try_from(form: ActionForm) -> Result<Self, Self::Error> {
        let premium = premium_flag(form.ispre.as_deref())?;
        let item_type = form.item_type.filter(|t| !t.trim().is_empty());

        match form.action.as_str() {
            "getInfo" => Ok(Action::GetInfo {
                link: required(form.link, "link")?,
                premium,
            }),
            "getLink" => Ok(Action::GetLink(JobRequest::new(
                required(form.link, "link")?,
                premium,
                item_type,
            ))),
            "checkDownloadStatus" => Ok(Action::CheckStatus(JobHandle {
                provider_slug: required(form.slug, "slug")?,
                item_id: required(form.id, "id")?,
                premium,
                item_type,
            })),
            other => Err(AppError::BadRequest(format!("Unknown action: {}", other))),
        }
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("Missing field: {}", field)))
}

fn premium_flag(raw: Option<&str>) -> Result<bool, AppError> {
    match raw {
        None => Ok(true),
        Some(raw) => parse_flag(raw).ok_or_else(|| AppError::BadRequest(format!("Invalid ispre: {}", raw))),
    }
}

fn success(result: Value) -> Value {
    json!({ "status": 200, "result": result })
}

fn failure(message: impl std::fmt::Display) -> Value {
    json!({ "status": "error", "message": message.to_string() })
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(format!("Failed to encode response: {}", e)))
}

/// Run one action against the provider and build the page's JSON reply
pub async fn perform<P: Provider>(provider: &P, action: Action) -> Result<Value, AppError> {
    match action {
        Action::GetInfo { link, premium } => {
            if !is_web_link(&link) {
                return Ok(failure("Please enter a valid http(s) link"));
            }
            let support = match provider.get_info(&link, premium).await {
                Ok(support) => support,
                Err(err) => return Ok(failure(err)),
            };
            Ok(success(json!({ "support": to_value(&support)? })))
        }
        Action::GetLink(request) => match provider.get_link(&request).await {
            Ok(handle) => Ok(success(to_value(&handle)?)),
            Err(err) => Ok(failure(err)),
        },
        Action::CheckStatus(handle) => match provider.check_status(&handle).await {
            Ok(JobStatus::Pending) => Ok(success(json!({ "status": 0 }))),
            Ok(JobStatus::Ready(file)) => {
                let mut result = to_value(&file)?;
                if let Value::Object(ref mut fields) = result {
                    fields.insert("status".to_string(), json!(1));
                }
                Ok(success(result))
            }
            Ok(JobStatus::Failed(message)) => Ok(failure(message)),
            Err(err) => Ok(failure(err)),
        },
    }
}

fn is_web_link(candidate: &str) -> bool {
    url::Url::parse(candidate)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}
