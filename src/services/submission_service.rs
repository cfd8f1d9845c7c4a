//! Submission Service
//!
//! Owns one chart-generation form. At most one submission is in flight per
//! service instance; extra calls while busy are dropped, not queued.

use crate::api::types::{ChartRequest, DatasetFile, FieldError, GenChartParams};
use crate::api::ChartApi;
use crate::chart::{self, ChartOption};
use crate::error::{AppError, Result};
use crate::notify::Notifier;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

const SUCCESS_MESSAGE: &str = "Analysis succeeded";
const ACCEPTED_MESSAGE: &str = "Analysis task submitted, check its progress in My Charts";
const FAILURE_MESSAGE: &str = "Analysis failed";

/// Which remote operation a form submits to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitMode {
    Sync,
    AsyncDirect,
    AsyncQueued,
}

impl SubmitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmitMode::Sync => "sync",
            SubmitMode::AsyncDirect => "async",
            SubmitMode::AsyncQueued => "mq",
        }
    }

    pub fn is_deferred(&self) -> bool {
        !matches!(self, SubmitMode::Sync)
    }
}

impl FromStr for SubmitMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sync" => Ok(SubmitMode::Sync),
            "async" | "async_direct" => Ok(SubmitMode::AsyncDirect),
            "mq" | "async_queued" => Ok(SubmitMode::AsyncQueued),
            other => Err(AppError::Validation(format!("Unknown submit mode '{}'", other))),
        }
    }
}

/// What the result panel currently shows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubmissionView {
    pub result: Option<String>,
    pub option: Option<ChartOption>,
}

/// Result of one `submit` call
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Another submission was still in flight; nothing was sent
    Busy,
    /// Rejected before sending
    Invalid(Vec<FieldError>),
    /// Synchronous generation finished
    Generated {
        chart_id: Option<String>,
        result: Option<String>,
        option: ChartOption,
    },
    /// Deferred generation accepted; follow it in the listing
    Accepted { chart_id: Option<String> },
    Failed(AppError),
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Generated { .. } | SubmitOutcome::Accepted { .. })
    }
}

/// Holds the submitting flag until dropped
struct SubmitGuard<'a>(&'a AtomicBool);

impl<'a> SubmitGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmitGuard(flag))
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Submission controller for one form
pub struct SubmissionService {
    mode: SubmitMode,
    api: Arc<dyn ChartApi>,
    notifier: Arc<dyn Notifier>,
    submitting: AtomicBool,
    view: RwLock<SubmissionView>,
}

impl SubmissionService {
    pub fn new(mode: SubmitMode, api: Arc<dyn ChartApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            mode,
            api,
            notifier,
            submitting: AtomicBool::new(false),
            view: RwLock::new(SubmissionView::default()),
        }
    }

    pub fn mode(&self) -> SubmitMode {
        self.mode
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    pub fn view(&self) -> SubmissionView {
        self.view.read().clone()
    }

    /// Submit a request
    ///
    /// Validation failures come back as `Invalid` without a notification.
    /// Every remote failure is reported through the notifier and returned as
    /// `Failed`; nothing escapes as an error.
    pub async fn submit(&self, request: ChartRequest) -> SubmitOutcome {
        let (params, file) = match request.into_payload() {
            Ok(payload) => payload,
            Err(errors) => return SubmitOutcome::Invalid(errors),
        };

        let Some(_guard) = SubmitGuard::acquire(&self.submitting) else {
            debug!("Submission ignored, another one is in flight");
            return SubmitOutcome::Busy;
        };

        let span = info_span!("submit", id = %Uuid::new_v4(), mode = self.mode.as_str());
        async {
            info!("Submitting chart '{}'", params.name);
            let result = if self.mode.is_deferred() {
                self.run_deferred(&params, &file).await
            } else {
                self.run_sync(&params, &file).await
            };

            match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("Submission failed: {}", e);
                    self.notifier.error(&failure_message(&e));
                    SubmitOutcome::Failed(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_sync(&self, params: &GenChartParams, file: &DatasetFile) -> Result<SubmitOutcome> {
        // A chart view keeps internal state across re-renders with equal
        // data, so the old result must go before the new one arrives.
        *self.view.write() = SubmissionView::default();

        let response = self.api.generate_sync(params, file).await?;
        let option = chart::parse(response.gen_chart.as_deref())?.ok_or_else(|| {
            AppError::ChartParse("response did not include a chart definition".to_string())
        })?;

        *self.view.write() = SubmissionView {
            result: response.gen_result.clone(),
            option: Some(option.clone()),
        };
        self.notifier.success(SUCCESS_MESSAGE);
        info!("Chart generated, id={:?}", response.chart_id);

        Ok(SubmitOutcome::Generated {
            chart_id: response.chart_id,
            result: response.gen_result,
            option,
        })
    }

    async fn run_deferred(
        &self,
        params: &GenChartParams,
        file: &DatasetFile,
    ) -> Result<SubmitOutcome> {
        let ack = match self.mode {
            SubmitMode::AsyncQueued => self.api.generate_async_queued(params, file).await?,
            _ => self.api.generate_async_direct(params, file).await?,
        };

        self.notifier.success(ACCEPTED_MESSAGE);
        info!("Chart task accepted, id={:?}", ack.chart_id);

        Ok(SubmitOutcome::Accepted {
            chart_id: ack.chart_id,
        })
    }
}

fn failure_message(err: &AppError) -> String {
    match err {
        AppError::EmptyResponse(_) => FAILURE_MESSAGE.to_string(),
        AppError::ChartParse(cause) => format!("Chart definition could not be parsed, {}", cause),
        other => format!("{}, {}", FAILURE_MESSAGE, other),
    }
}
