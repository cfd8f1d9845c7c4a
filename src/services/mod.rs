//! Services Layer
//!
//! Page-level workflow shared by the CLI commands and any other front end.
//! Each service value is one page instance and owns that page's state.
//!
//! # Architecture
//!
//! ```text
//! CLI commands ──┐
//!                ├──> Services --> ChartApi --> chart service (HTTP)
//! Other UI ──────┘         └────> Notifier
//! ```
//!
//! # Services
//!
//! - `SubmissionService` - Submit a chart request in sync, async or queued mode
//! - `ListingService` - Paged, filtered listing of the caller's charts

pub mod listing_service;
pub mod submission_service;

pub use listing_service::{FetchOutcome, ListingService, ListingView};
pub use submission_service::{SubmissionService, SubmissionView, SubmitMode, SubmitOutcome};
