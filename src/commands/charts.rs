//! `charts` command: the "my charts" listing

use super::print_json;
use crate::error::Result;
use crate::jobs::{ChartSlot, Indicator, RecordCard, StatusView};
use crate::scheduler::AutoRefreshScheduler;
use crate::services::{FetchOutcome, ListingService, ListingView};
use crate::state::AppState;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Default)]
pub struct ChartsArgs {
    pub filter: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub watch: bool,
    pub json: bool,
}

pub async fn run(state: &AppState, args: ChartsArgs) -> Result<bool> {
    let listing = state.listing_page();
    show(state, &listing, &args).await
}

/// Load, print and optionally watch a listing; it is detached on every exit
async fn show(state: &AppState, listing: &Arc<ListingService>, args: &ChartsArgs) -> Result<bool> {
    let result = load_and_watch(state, listing, args).await;
    listing.detach();
    result
}

async fn load_and_watch(
    state: &AppState,
    listing: &Arc<ListingService>,
    args: &ChartsArgs,
) -> Result<bool> {
    let outcome = load(listing, args).await?;
    let ok = !matches!(outcome, FetchOutcome::Failed(_));

    let mut last = listing.view();
    render(&last, args.json)?;

    if args.watch {
        let interval = state.config.refresh_interval().unwrap_or(DEFAULT_WATCH_INTERVAL);
        let refresher = match state.auto_refresh(listing) {
            Some(handle) => handle,
            None => AutoRefreshScheduler::new(listing.clone(), interval).start(),
        };

        while listing.has_pending_jobs() {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                _ = tokio::time::sleep(interval) => {}
            }
            let view = listing.view();
            if view != last {
                render(&view, args.json)?;
                last = view;
            }
        }
        refresher.shutdown().await;
    }

    Ok(ok)
}

/// Apply the requested filter and page, fetching once per change
async fn load(listing: &Arc<ListingService>, args: &ChartsArgs) -> Result<FetchOutcome> {
    let mut outcome = None;
    if let Some(filter) = &args.filter {
        outcome = Some(listing.set_filter(filter).await);
    }
    if args.page.is_some() || args.page_size.is_some() {
        let params = listing.params();
        let current = args.page.unwrap_or(params.current);
        let page_size = args.page_size.unwrap_or(params.page_size);
        outcome = Some(listing.set_page(current, page_size).await?);
    }
    match outcome {
        Some(outcome) => Ok(outcome),
        None => Ok(listing.refresh().await),
    }
}

fn render(view: &ListingView, json: bool) -> Result<()> {
    if json {
        return print_json(&view.cards());
    }
    for card in view.cards() {
        print_card(&card)?;
    }
    let pages = view.total.div_ceil(view.params.page_size.max(1));
    println!(
        "Total: {} (page {} of {})",
        view.total,
        view.params.current,
        pages.max(1)
    );
    Ok(())
}

fn print_card(card: &RecordCard) -> Result<()> {
    println!("#{} {}", card.id, card.title);
    if let Some(description) = &card.description {
        println!("  {}", description);
    }
    if let Some(created) = &card.created {
        println!("  Created: {}", created);
    }
    match &card.body {
        Some(StatusView::Pending { title, subtitle }) => {
            println!("  {}", status_line(card.indicator, title, Some(subtitle.as_str())))
        }
        Some(StatusView::InProgress { title, subtitle })
        | Some(StatusView::Failed { title, subtitle }) => {
            println!("  {}", status_line(card.indicator, title, subtitle.as_deref()))
        }
        Some(StatusView::Succeeded { goal, chart }) => {
            if let Some(goal) = goal {
                println!("  Analysis goal: {}", goal);
            }
            match chart {
                ChartSlot::Rendered(option) => println!("  {}", option.to_json_string()?),
                ChartSlot::Placeholder => println!("  (no chart yet)"),
                ChartSlot::Invalid(reason) => println!("  (chart unavailable: {})", reason),
            }
        }
        None => {}
    }
    println!();
    Ok(())
}

fn status_line(indicator: Option<Indicator>, title: &str, subtitle: Option<&str>) -> String {
    let mut line = match indicator {
        Some(indicator) => format!("[{}] {}", indicator.as_str(), title),
        None => title.to_string(),
    };
    if let Some(subtitle) = subtitle {
        line.push_str(": ");
        line.push_str(subtitle);
    }
    line
}
