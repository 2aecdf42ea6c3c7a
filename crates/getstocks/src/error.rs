use std::fmt;

/// Every way a call to the GetStocks API can fail.
///
/// All variants end up in front of the user as a single message, so the
/// `Display` output is written to be read by a person rather than a log parser.
#[derive(Debug)]
pub enum ApiError {
    /// No API token was configured
    MissingToken,
    /// Transport failure (connect, timeout, body read)
    Http(reqwest::Error),
    /// The provider answered with a non-200 envelope
    Provider(String),
    /// The provider answered with something we could not make sense of
    Malformed(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::MissingToken => write!(f, "No token available"),
            ApiError::Http(e) => write!(f, "{}", e),
            ApiError::Provider(msg) => write!(f, "{}", msg),
            ApiError::Malformed(msg) => write!(f, "Malformed provider response: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Http(err)
    }
}

/// Result type alias for provider calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Configuration could not be read from the environment
#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set in the environment or .env file", key),
            ConfigError::Invalid { key, reason } => write!(f, "{} is invalid: {}", key, reason),
        }
    }
}

impl std::error::Error for ConfigError {}
