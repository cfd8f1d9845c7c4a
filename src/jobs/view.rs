//! Per-status rendering of chart records

use super::JobStatus;
use crate::api::types::ChartRecord;
use crate::chart::{self, ChartOption};
use serde::Serialize;

/// Subtitle shown for queued records without a server message
pub const DEFAULT_QUEUED_MESSAGE: &str = "Task is queued, waiting to run...";

const PENDING_TITLE: &str = "Waiting to be generated";
const RUNNING_TITLE: &str = "Chart is being generated";
const FAILED_TITLE: &str = "Chart generation failed";

const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Warning,
    Info,
    Error,
}

impl Indicator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Indicator::Warning => "warning",
            Indicator::Info => "info",
            Indicator::Error => "error",
        }
    }
}

/// What to draw in a card's chart area
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ChartSlot {
    Placeholder,
    Rendered(ChartOption),
    Invalid(String),
}

impl ChartSlot {
    fn from_raw(raw: Option<&str>) -> Self {
        match chart::parse(raw) {
            Ok(Some(option)) => ChartSlot::Rendered(option),
            Ok(None) => ChartSlot::Placeholder,
            Err(e) => ChartSlot::Invalid(e.to_string()),
        }
    }
}

/// Status-specific body of a record card
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StatusView {
    Pending {
        title: &'static str,
        subtitle: String,
    },
    InProgress {
        title: &'static str,
        subtitle: Option<String>,
    },
    Succeeded {
        goal: Option<String>,
        chart: ChartSlot,
    },
    Failed {
        title: &'static str,
        subtitle: Option<String>,
    },
}

impl StatusView {
    pub fn indicator(&self) -> Option<Indicator> {
        match self {
            StatusView::Pending { .. } => Some(Indicator::Warning),
            StatusView::InProgress { .. } => Some(Indicator::Info),
            StatusView::Failed { .. } => Some(Indicator::Error),
            StatusView::Succeeded { .. } => None,
        }
    }
}

/// Body for a record, or `None` when its status is not recognized
pub fn render_status(record: &ChartRecord) -> Option<StatusView> {
    let view = match record.job_status()? {
        JobStatus::Wait => StatusView::Pending {
            title: PENDING_TITLE,
            subtitle: record
                .exec_message
                .clone()
                .unwrap_or_else(|| DEFAULT_QUEUED_MESSAGE.to_string()),
        },
        JobStatus::Running => StatusView::InProgress {
            title: RUNNING_TITLE,
            subtitle: record.exec_message.clone(),
        },
        JobStatus::Success => StatusView::Succeeded {
            goal: record.goal.clone(),
            chart: ChartSlot::from_raw(record.gen_chart.as_deref()),
        },
        JobStatus::Fail => StatusView::Failed {
            title: FAILED_TITLE,
            subtitle: record.exec_message.clone(),
        },
    };
    Some(view)
}

/// A listed record ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordCard {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Creation time as `YYYY-MM-DD HH:MM` in the server's offset
    pub created: Option<String>,
    pub indicator: Option<Indicator>,
    pub body: Option<StatusView>,
}

pub fn render_card(record: &ChartRecord) -> RecordCard {
    let body = render_status(record);
    RecordCard {
        id: record.id.clone(),
        title: format!("Name: {}", record.name.as_deref().unwrap_or_default()),
        description: record
            .chart_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| format!("Chart type: {}", t)),
        created: record
            .created_at()
            .map(|at| at.format(CREATED_FORMAT).to_string()),
        indicator: body.as_ref().and_then(StatusView::indicator),
        body,
    }
}
