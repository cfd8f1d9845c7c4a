//! Remote chart service
//!
//! The workflow only depends on the [`ChartApi`] trait; [`HttpChartApi`] is
//! the reqwest-backed implementation used by the application.

pub mod http;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use http::HttpChartApi;

use crate::error::Result;
use async_trait::async_trait;
use types::*;

/// Remote operations the client depends on
#[async_trait]
pub trait ChartApi: Send + Sync {
    /// Generate chart and conclusion in one round trip
    async fn generate_sync(
        &self,
        params: &GenChartParams,
        file: &DatasetFile,
    ) -> Result<ChartResult>;

    /// Queue generation on the server's own worker pool
    async fn generate_async_direct(
        &self,
        params: &GenChartParams,
        file: &DatasetFile,
    ) -> Result<Acknowledgement>;

    /// Queue generation through the message broker pipeline
    async fn generate_async_queued(
        &self,
        params: &GenChartParams,
        file: &DatasetFile,
    ) -> Result<Acknowledgement>;

    /// Page through the caller's own chart records
    async fn list_mine(&self, params: &SearchParams) -> Result<ChartPage>;
}
