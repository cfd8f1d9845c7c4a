//! CLI command handlers
//!
//! Thin wrappers that drive the services and print their views. Each handler
//! returns whether the command succeeded so the binary can pick an exit code.

pub mod charts;
pub mod config;
pub mod generate;

use crate::error::Result;
use crate::notify::{Notification, NotificationLevel};
use serde::Serialize;
use tokio::sync::mpsc;

/// Print notifications as they arrive until every sender is gone
pub async fn print_notifications(mut rx: mpsc::UnboundedReceiver<Notification>) {
    while let Some(notification) = rx.recv().await {
        let tag = match notification.level {
            NotificationLevel::Success => "success",
            NotificationLevel::Error => "error",
        };
        eprintln!("[{}] {}", tag, notification.message);
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
