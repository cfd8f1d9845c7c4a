//! Smart BI client
//!
//! Client-side workflow for AI chart generation: submit an analysis goal with
//! a dataset in synchronous, asynchronous or broker-queued mode, then follow
//! deferred jobs through the paged "my charts" listing.

pub mod api;
pub mod chart;
pub mod commands;
pub mod config;
pub mod error;
pub mod jobs;
pub mod notify;
pub mod scheduler;
pub mod services;
pub mod state;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging
///
/// Logs go to stderr so command output on stdout stays machine-readable.
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smartbi_client=info,smartbi=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
