use std::future::Future;

use crate::error::ApiResult;
use crate::types::{ItemSupport, JobHandle, JobRequest, JobStatus};

/// The three calls the relay makes against a stock-media provider.
///
/// [`GetStocksApi`](crate::GetStocksApi) is the real implementation; the
/// chat flows and the polling loop are generic over this so they can run
/// against scripted providers in tests.
pub trait Provider: Send + Sync {
    /// Resolve what can be downloaded for `link`
    fn get_info(&self, link: &str, premium: bool) -> impl Future<Output = ApiResult<ItemSupport>> + Send;

    /// Submit a download job
    fn get_link(&self, request: &JobRequest) -> impl Future<Output = ApiResult<JobHandle>> + Send;

    /// Ask how a submitted job is doing
    fn check_status(&self, handle: &JobHandle) -> impl Future<Output = ApiResult<JobStatus>> + Send;
}
