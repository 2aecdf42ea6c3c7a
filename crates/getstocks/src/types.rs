//! Wire types for the GetStocks API
//!
//! The provider is loose with its JSON: flags show up as booleans, integers or
//! numeric strings, ids as strings or numbers, and the type list as either an
//! object or an array. The deserializers in [`de`] normalize all of that so the
//! rest of the workspace only ever sees one shape.

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// A downloadable variant offered for an item (e.g. "jpg", "vector")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeOption {
    pub key: String,
    pub label: String,
}

/// Metadata returned by `getinfo` describing what can be downloaded for a link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSupport {
    #[serde(deserialize_with = "de::string")]
    pub slug: String,
    #[serde(deserialize_with = "de::string")]
    pub id: String,
    /// Canonical link the provider prefers for the follow-up `getlink` call
    #[serde(default, deserialize_with = "de::opt_string")]
    pub id2: Option<String>,
    #[serde(rename = "ispre", default = "de::yes", deserialize_with = "de::flag")]
    pub premium: bool,
    #[serde(rename = "itemthumb", default, deserialize_with = "de::opt_string")]
    pub thumbnail: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "de::type_options")]
    pub types: Vec<TypeOption>,
}

/// A request to produce a download job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub link: String,
    pub premium: bool,
    pub item_type: Option<String>,
}

impl JobRequest {
    pub fn new(link: impl Into<String>, premium: bool, item_type: Option<String>) -> Self {
        Self {
            link: link.into(),
            premium,
            item_type,
        }
    }

    /// Batch submissions go out as premium with no explicit type
    pub fn with_defaults(link: impl Into<String>) -> Self {
        Self::new(link, true, None)
    }
}

/// Identifies a submitted job; the key used for status polling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    #[serde(rename = "provSlug", deserialize_with = "de::string")]
    pub provider_slug: String,
    #[serde(rename = "itemID", deserialize_with = "de::string")]
    pub item_id: String,
    #[serde(rename = "isPremium", default = "de::yes", deserialize_with = "de::flag")]
    pub premium: bool,
    #[serde(rename = "itemType", default, deserialize_with = "de::opt_string")]
    pub item_type: Option<String>,
}

/// A finished job, ready to be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadyFile {
    #[serde(rename = "provSlug")]
    pub provider_slug: String,
    #[serde(rename = "itemID")]
    pub item_id: String,
    #[serde(rename = "itemFilename")]
    pub filename: String,
    #[serde(rename = "itemSize")]
    pub size: String,
    #[serde(rename = "itemDCode")]
    pub download_code: String,
    #[serde(rename = "downloadLink")]
    pub download_link: String,
}

/// Where a job stands according to the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Ready(ReadyFile),
    Failed(String),
}

/// `status == 200` in the envelope means success
pub(crate) const STATUS_OK: i64 = 200;

/// `result.status == 1` in a download-status answer means the file is ready
pub(crate) const DOWNLOAD_READY: i64 = 1;

/// Response envelope shared by every endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub status: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<serde_json::Value>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

impl Envelope {
    /// Unwrap a successful envelope into its `result`, or turn it into an error
    pub fn into_result(self) -> ApiResult<serde_json::Value> {
        let status = self
            .status
            .as_ref()
            .ok_or_else(|| ApiError::Malformed("missing status field".to_string()))?;

        if status.as_i64() != Some(STATUS_OK) {
            let message = self
                .message
                .as_ref()
                .and_then(de::value_to_string)
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(ApiError::Provider(message));
        }

        self.result
            .filter(|r| !r.is_null())
            .ok_or_else(|| ApiError::Malformed("status 200 without a result".to_string()))
    }
}

/// `getinfo` result body
#[derive(Debug, Deserialize)]
pub(crate) struct InfoResult {
    #[serde(default)]
    pub support: Option<ItemSupport>,
}

/// `download-status` result body, before classification
#[derive(Debug, Deserialize)]
pub(crate) struct RawDownloadStatus {
    #[serde(default)]
    pub status: Option<serde_json::Value>,
    #[serde(rename = "provSlug", default, deserialize_with = "de::opt_string")]
    pub provider_slug: Option<String>,
    #[serde(rename = "itemID", default, deserialize_with = "de::opt_string")]
    pub item_id: Option<String>,
    #[serde(rename = "itemFilename", default, deserialize_with = "de::opt_string")]
    pub filename: Option<String>,
    #[serde(rename = "itemSize", default, deserialize_with = "de::opt_string")]
    pub size: Option<String>,
    #[serde(rename = "itemDCode", default, deserialize_with = "de::opt_string")]
    pub download_code: Option<String>,
}

impl RawDownloadStatus {
    /// Decide what the answer means for `handle`.
    ///
    /// `download_link` builds the public link from the download code.
    pub fn classify(
        self,
        handle: &JobHandle,
        download_link: impl FnOnce(&str) -> ApiResult<String>,
    ) -> ApiResult<JobStatus> {
        let code = self
            .status
            .as_ref()
            .ok_or_else(|| ApiError::Malformed("download status without status field".to_string()))?
            .as_i64()
            .ok_or_else(|| ApiError::Malformed("download status field is not an integer".to_string()))?;

        if code != DOWNLOAD_READY {
            return Ok(JobStatus::Pending);
        }

        let download_code = self
            .download_code
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ApiError::Malformed("ready file without a download code".to_string()))?;

        Ok(JobStatus::Ready(ReadyFile {
            provider_slug: self.provider_slug.unwrap_or_else(|| handle.provider_slug.clone()),
            item_id: self.item_id.unwrap_or_else(|| handle.item_id.clone()),
            filename: self.filename.unwrap_or_default(),
            size: self.size.unwrap_or_default(),
            download_link: download_link(&download_code)?,
            download_code,
        }))
    }
}

/// Lenient deserializers for the provider's JSON
pub mod de {
    use super::TypeOption;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub(crate) fn yes() -> bool {
        true
    }

    /// Render a scalar JSON value as text
    pub fn value_to_string(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Interpret a textual flag the way form posts send them
    pub fn parse_flag(raw: &str) -> Option<bool> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" | "" => Some(false),
            _ => None,
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let value = Value::deserialize(deserializer)?;
        value_to_string(&value)
            .ok_or_else(|| D::Error::custom(format!("expected string or number, got {}", value)))
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::Null => Ok(None),
            other => value_to_string(&other)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("expected string or number, got {}", other))),
        }
    }

    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match &value {
            Value::Bool(b) => Ok(*b),
            Value::Null => Ok(false),
            Value::Number(n) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
            Value::String(s) => parse_flag(s).ok_or_else(|| D::Error::custom(format!("not a flag: {}", s))),
            other => Err(D::Error::custom(format!("not a flag: {}", other))),
        }
    }

    /// Accepts `{"key": "label", ...}` or `["label", ...]` (keys become indices)
    pub fn type_options<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<TypeOption>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let label = |v: &Value| value_to_string(v).unwrap_or_else(|| v.to_string());
        match value {
            Value::Null => Ok(Vec::new()),
            Value::Object(map) => Ok(map
                .iter()
                .map(|(key, v)| TypeOption {
                    key: key.clone(),
                    label: label(v),
                })
                .collect()),
            Value::Array(items) => Ok(items
                .iter()
                .enumerate()
                .map(|(i, v)| TypeOption {
                    key: i.to_string(),
                    label: label(v),
                })
                .collect()),
            other => Err(D::Error::custom(format!("expected type map or list, got {}", other))),
        }
    }
}
