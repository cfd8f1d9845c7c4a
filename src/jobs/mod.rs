//! Job status model for deferred chart generation
//!
//! Records created by the asynchronous submission paths start in `wait` and
//! are moved through `running` to `success` or `fail` by the server. The
//! client only ever reads the status; it never writes it.

mod view;

pub use view::{
    render_card, render_status, ChartSlot, Indicator, RecordCard, StatusView,
    DEFAULT_QUEUED_MESSAGE,
};

use crate::api::types::ChartRecord;
use serde::{Deserialize, Serialize};

/// Server-side status of a chart record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Wait,
    Running,
    Success,
    Fail,
}

impl JobStatus {
    /// Map a wire value; unknown values have no status
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "wait" => Some(JobStatus::Wait),
            "running" => Some(JobStatus::Running),
            "success" => Some(JobStatus::Success),
            "fail" => Some(JobStatus::Fail),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Wait => "wait",
            JobStatus::Running => "running",
            JobStatus::Success => "success",
            JobStatus::Fail => "fail",
        }
    }

    /// Still waiting on the server
    pub fn is_pending(&self) -> bool {
        matches!(self, JobStatus::Wait | JobStatus::Running)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ChartRecord {
    pub fn job_status(&self) -> Option<JobStatus> {
        self.status.as_deref().and_then(JobStatus::from_wire)
    }
}
