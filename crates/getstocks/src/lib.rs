//! GetStocks API client
//!
//! This crate wraps the GetStocks stock-media download API: resolving what can
//! be downloaded for a link, submitting download jobs, and polling those jobs
//! until the provider has the file ready.

pub mod client;
pub mod config;
pub mod error;
pub mod poll;
pub mod provider;
pub mod types;

pub use client::GetStocksApi;
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ConfigError};
pub use poll::{poll_until_ready, PollOutcome, PollSettings};
pub use provider::Provider;
pub use types::{ItemSupport, JobHandle, JobRequest, JobStatus, ReadyFile, TypeOption};
