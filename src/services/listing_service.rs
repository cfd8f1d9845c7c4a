//! Listing Service
//!
//! Paged "my charts" query. Owns the search parameters, re-fetches whenever
//! they change and keeps the last good page when a fetch fails.
//!
//! Fetch responses can resolve out of order. Every fetch takes a generation
//! number under the state lock and only the newest generation may write its
//! result back.

use crate::api::types::{ChartPage, ChartRecord, SearchParams};
use crate::api::ChartApi;
use crate::chart;
use crate::error::{AppError, Result};
use crate::jobs::{render_card, RecordCard};
use crate::notify::Notifier;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

const FAILURE_MESSAGE: &str = "Failed to load my charts";

/// Snapshot of the listing for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingView {
    pub params: SearchParams,
    pub records: Vec<ChartRecord>,
    pub total: u64,
    pub loading: bool,
}

impl ListingView {
    pub fn cards(&self) -> Vec<RecordCard> {
        self.records.iter().map(render_card).collect()
    }
}

/// What happened to one fetch
#[derive(Debug)]
pub enum FetchOutcome {
    /// The page was replaced with the response
    Applied,
    /// A newer fetch superseded this one; its response was dropped
    Stale,
    /// The fetch failed; the previous page is still shown
    Failed(AppError),
}

struct ListingState {
    params: SearchParams,
    records: Vec<ChartRecord>,
    total: u64,
    loading: bool,
    generation: u64,
    detached: bool,
}

/// Paged query controller for the chart listing
pub struct ListingService {
    api: Arc<dyn ChartApi>,
    notifier: Arc<dyn Notifier>,
    baseline: SearchParams,
    state: Mutex<ListingState>,
}

impl ListingService {
    pub fn new(
        api: Arc<dyn ChartApi>,
        notifier: Arc<dyn Notifier>,
        baseline: SearchParams,
    ) -> Self {
        Self {
            api,
            notifier,
            state: Mutex::new(ListingState {
                params: baseline.clone(),
                records: Vec::new(),
                total: 0,
                loading: false,
                generation: 0,
                detached: false,
            }),
            baseline,
        }
    }

    pub fn params(&self) -> SearchParams {
        self.state.lock().params.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn view(&self) -> ListingView {
        let state = self.state.lock();
        ListingView {
            params: state.params.clone(),
            records: state.records.clone(),
            total: state.total,
            loading: state.loading,
        }
    }

    /// Whether the current page shows records the server is still working on
    pub fn has_pending_jobs(&self) -> bool {
        self.state
            .lock()
            .records
            .iter()
            .any(|r| r.job_status().is_some_and(|s| s.is_pending()))
    }

    /// Search by name; always starts over from the baseline parameters
    pub async fn set_filter(&self, name: &str) -> FetchOutcome {
        let params = self.baseline.clone().with_name(name);
        self.fetch_with(|current| *current = params).await
    }

    /// Move to another page, keeping filter and sort
    pub async fn set_page(&self, current: u64, page_size: u64) -> Result<FetchOutcome> {
        if current == 0 || page_size == 0 {
            return Err(AppError::Validation(format!(
                "Page {} with size {} is out of range",
                current, page_size
            )));
        }
        Ok(self
            .fetch_with(|params| {
                params.current = current;
                params.page_size = page_size;
            })
            .await)
    }

    /// Re-fetch the current parameters
    pub async fn refresh(&self) -> FetchOutcome {
        self.fetch_with(|_| {}).await
    }

    /// Stop applying responses; used when the page goes away
    pub fn detach(&self) {
        let mut state = self.state.lock();
        state.detached = true;
        state.generation += 1;
        state.loading = false;
        debug!("Listing detached at generation {}", state.generation);
    }

    async fn fetch_with<F>(&self, update: F) -> FetchOutcome
    where
        F: FnOnce(&mut SearchParams),
    {
        let (generation, params) = {
            let mut state = self.state.lock();
            if state.detached {
                return FetchOutcome::Stale;
            }
            update(&mut state.params);
            state.generation += 1;
            state.loading = true;
            (state.generation, state.params.clone())
        };

        debug!("Fetching my charts, generation {}: {:?}", generation, params);
        let result = self.api.list_mine(&params).await;

        let mut state = self.state.lock();
        if state.generation != generation {
            debug!(
                "Dropping listing response {} (latest is {})",
                generation, state.generation
            );
            return FetchOutcome::Stale;
        }
        state.loading = false;

        match result {
            Ok(page) => {
                let ChartPage { records, total } = page;
                state.records = records.into_iter().map(strip_title).collect();
                state.total = total;
                info!(
                    "Loaded {} of {} charts (page {})",
                    state.records.len(),
                    total,
                    params.current
                );
                FetchOutcome::Applied
            }
            Err(e) => {
                drop(state);
                warn!("Listing fetch failed: {}", e);
                let message = if e.is_empty_response() {
                    FAILURE_MESSAGE.to_string()
                } else {
                    format!("{}, {}", FAILURE_MESSAGE, e)
                };
                self.notifier.error(&message);
                FetchOutcome::Failed(e)
            }
        }
    }
}

/// Drop the generated title; the card header already names the chart
fn strip_title(mut record: ChartRecord) -> ChartRecord {
    match chart::for_list_view(record.gen_chart.as_deref()) {
        Ok(stripped) => record.gen_chart = stripped,
        Err(e) => warn!("Chart {} has an unreadable definition: {}", record.id, e),
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{Call, MockChartApi};
    use crate::api::types::SortOrder;
    use crate::jobs::{ChartSlot, StatusView};
    use crate::notify::testing::RecordingNotifier;

    fn setup() -> (Arc<MockChartApi>, Arc<RecordingNotifier>, Arc<ListingService>) {
        let api = Arc::new(MockChartApi::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let service = Arc::new(ListingService::new(
            api.clone(),
            notifier.clone(),
            SearchParams::default(),
        ));
        (api, notifier, service)
    }

    fn record(id: &str, status: &str) -> ChartRecord {
        ChartRecord {
            id: id.to_string(),
            name: Some(format!("chart{}", id)),
            status: Some(status.to_string()),
            goal: Some("growth".to_string()),
            ..Default::default()
        }
    }

    fn page(ids: &[&str], total: u64) -> ChartPage {
        ChartPage {
            records: ids.iter().map(|id| record(id, "success")).collect(),
            total,
        }
    }

    fn last_params(api: &MockChartApi) -> SearchParams {
        match api.calls().last() {
            Some(Call::List(params)) => params.clone(),
            other => panic!("unexpected call: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_refresh_loads_page() {
        let (api, _notifier, service) = setup();
        api.push_list(Ok(page(&["1", "2"], 2)));

        assert!(matches!(service.refresh().await, FetchOutcome::Applied));

        let view = service.view();
        assert_eq!(view.records.len(), 2);
        assert_eq!(view.total, 2);
        assert!(!view.loading);
        assert_eq!(last_params(&api), SearchParams::default());
    }

    #[tokio::test]
    async fn test_filter_resets_to_baseline() {
        let (api, _notifier, service) = setup();
        api.push_list(Ok(page(&["1"], 30)));
        api.push_list(Ok(page(&["9"], 1)));

        service.set_page(3, 10).await.unwrap();
        assert_eq!(service.params().current, 3);

        service.set_filter("sales").await;

        let params = service.params();
        assert_eq!(params.current, 1);
        assert_eq!(params.page_size, 4);
        assert_eq!(params.sort_field.as_deref(), Some("createTime"));
        assert_eq!(params.sort_order, Some(SortOrder::Desc));
        assert_eq!(params.name.as_deref(), Some("sales"));
        assert_eq!(last_params(&api), params);
    }

    #[tokio::test]
    async fn test_set_page_keeps_filter() {
        let (api, _notifier, service) = setup();
        api.push_list(Ok(page(&["1"], 12)));
        api.push_list(Ok(page(&["5"], 12)));

        service.set_filter("sales").await;
        service.set_page(2, 4).await.unwrap();

        let params = last_params(&api);
        assert_eq!(params.current, 2);
        assert_eq!(params.name.as_deref(), Some("sales"));
    }

    #[tokio::test]
    async fn test_set_page_rejects_zero() {
        let (api, _notifier, service) = setup();

        assert!(service.set_page(0, 4).await.is_err());
        assert!(service.set_page(1, 0).await.is_err());
        assert_eq!(api.call_count(), 0);
        assert_eq!(service.params(), SearchParams::default());
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_records() {
        let (api, notifier, service) = setup();
        api.push_list(Ok(page(&["1", "2", "3"], 3)));
        api.push_list(Err(AppError::Internal("connection reset".to_string())));

        service.refresh().await;
        let outcome = service.refresh().await;

        assert!(matches!(outcome, FetchOutcome::Failed(_)));
        let view = service.view();
        assert_eq!(view.records.len(), 3);
        assert_eq!(view.total, 3);
        assert!(!view.loading);
        let errors = notifier.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with(FAILURE_MESSAGE));
        assert!(errors[0].contains("connection reset"));
    }

    #[tokio::test]
    async fn test_empty_response_is_generic_failure() {
        let (api, notifier, service) = setup();
        api.push_list(Err(AppError::EmptyResponse("chart/my/list/page".to_string())));

        service.refresh().await;

        assert_eq!(notifier.errors(), vec![FAILURE_MESSAGE.to_string()]);
        assert!(!service.is_loading());
    }

    #[tokio::test]
    async fn test_stale_response_is_dropped() {
        let (api, _notifier, service) = setup();
        let release_old = api.push_list_gated(Ok(page(&["old"], 1)));
        api.push_list(Ok(page(&["new"], 1)));

        let slow = tokio::spawn({
            let service = service.clone();
            async move { service.set_page(2, 4).await }
        });
        api.wait_for_calls(1).await;
        assert!(service.is_loading());

        let fast = service.set_filter("new").await;
        assert!(matches!(fast, FetchOutcome::Applied));

        release_old.send(()).unwrap();
        let slow = slow.await.unwrap().unwrap();
        assert!(matches!(slow, FetchOutcome::Stale));

        let view = service.view();
        assert_eq!(view.records[0].id, "new");
        assert_eq!(view.params.name.as_deref(), Some("new"));
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn test_detach_fences_in_flight_fetch() {
        let (api, _notifier, service) = setup();
        let release = api.push_list_gated(Ok(page(&["1"], 1)));

        let pending = tokio::spawn({
            let service = service.clone();
            async move { service.refresh().await }
        });
        api.wait_for_calls(1).await;

        service.detach();
        release.send(()).unwrap();

        assert!(matches!(pending.await.unwrap(), FetchOutcome::Stale));
        assert!(service.view().records.is_empty());
        assert!(matches!(service.refresh().await, FetchOutcome::Stale));
        assert_eq!(api.call_count(), 1);
    }

    #[tokio::test]
    async fn test_titles_are_stripped_for_cards() {
        let (api, _notifier, service) = setup();
        let mut with_title = record("1", "success");
        with_title.gen_chart = Some(r#"{"title":{"text":"Growth"},"series":[]}"#.to_string());
        let mut broken = record("2", "success");
        broken.gen_chart = Some("{series".to_string());
        api.push_list(Ok(ChartPage {
            records: vec![with_title, broken],
            total: 2,
        }));

        service.refresh().await;

        let cards = service.view().cards();
        match &cards[0].body {
            Some(StatusView::Succeeded { chart: ChartSlot::Rendered(option), .. }) => {
                assert!(option.title().is_none());
                assert!(option.get("series").is_some());
            }
            other => panic!("unexpected body: {other:?}"),
        }
        assert!(matches!(
            &cards[1].body,
            Some(StatusView::Succeeded { chart: ChartSlot::Invalid(_), .. })
        ));
    }

    #[tokio::test]
    async fn test_pending_jobs_detection() {
        let (api, _notifier, service) = setup();
        api.push_list(Ok(ChartPage {
            records: vec![record("1", "success"), record("2", "running")],
            total: 2,
        }));
        api.push_list(Ok(page(&["1", "2"], 2)));

        assert!(!service.has_pending_jobs());
        service.refresh().await;
        assert!(service.has_pending_jobs());
        service.refresh().await;
        assert!(!service.has_pending_jobs());
    }
}
