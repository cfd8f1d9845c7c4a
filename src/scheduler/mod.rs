//! Scheduler module
//!
//! Handles scheduled tasks including:
//! - Periodic listing refresh while generation jobs are pending

mod auto_refresh;

pub use auto_refresh::{AutoRefreshHandle, AutoRefreshScheduler};
