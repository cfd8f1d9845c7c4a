//! Application state management

use crate::api::{ChartApi, HttpChartApi};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::notify::Notifier;
use crate::scheduler::{AutoRefreshHandle, AutoRefreshScheduler};
use crate::services::{ListingService, SubmissionService, SubmitMode};
use std::sync::Arc;

/// Shared collaborators from which page instances are created
pub struct AppState {
    pub config: ClientConfig,

    /// Remote chart service
    pub api: Arc<dyn ChartApi>,

    /// Where user-visible messages go
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Create state backed by the HTTP chart service
    pub fn new(config: ClientConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        config.validate()?;
        let api = Arc::new(HttpChartApi::new(&config)?);
        tracing::info!("Chart service: {}", config.base_url);
        Ok(Self::with_api(config, api, notifier))
    }

    pub fn with_api(
        config: ClientConfig,
        api: Arc<dyn ChartApi>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            api,
            notifier,
        }
    }

    /// A fresh submission form for the given mode
    pub fn submission_page(&self, mode: SubmitMode) -> SubmissionService {
        SubmissionService::new(mode, self.api.clone(), self.notifier.clone())
    }

    /// A fresh "my charts" listing at the configured baseline
    pub fn listing_page(&self) -> Arc<ListingService> {
        Arc::new(ListingService::new(
            self.api.clone(),
            self.notifier.clone(),
            self.config.baseline_params(),
        ))
    }

    /// Start auto-refresh for a listing if an interval is configured
    pub fn auto_refresh(&self, listing: &Arc<ListingService>) -> Option<AutoRefreshHandle> {
        self.config
            .refresh_interval()
            .map(|interval| AutoRefreshScheduler::new(listing.clone(), interval).start())
    }
}
