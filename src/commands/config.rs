//! `config` command

use super::print_json;
use crate::config::ClientConfig;
use crate::error::Result;

/// Print the effective configuration with the session cookie masked
pub fn run(config: &ClientConfig) -> Result<bool> {
    print_json(&masked(config))?;
    Ok(true)
}

fn masked(config: &ClientConfig) -> ClientConfig {
    let mut shown = config.clone();
    if shown.session_cookie.is_some() {
        shown.session_cookie = Some("***".to_string());
    }
    shown
}
