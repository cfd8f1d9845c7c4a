//! `generate` command

use super::print_json;
use crate::api::types::{ChartRequest, ChartType, DatasetFile, FieldError};
use crate::chart::ChartOption;
use crate::error::{ErrorResponse, Result};
use crate::services::{SubmitMode, SubmitOutcome};
use crate::state::AppState;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct GenerateArgs {
    pub goal: String,
    pub name: String,
    pub chart_type: Option<ChartType>,
    pub file: Option<PathBuf>,
    pub mode: SubmitMode,
    pub json: bool,
}

/// Machine-readable form of a submission outcome
#[derive(Debug, Serialize)]
pub struct GenerateReport {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<ChartOption>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

impl GenerateReport {
    fn status(status: &'static str) -> Self {
        Self {
            status,
            chart_id: None,
            result: None,
            option: None,
            errors: Vec::new(),
            error: None,
        }
    }
}

impl From<&SubmitOutcome> for GenerateReport {
    fn from(outcome: &SubmitOutcome) -> Self {
        match outcome {
            SubmitOutcome::Busy => Self::status("busy"),
            SubmitOutcome::Invalid(errors) => Self {
                errors: errors.clone(),
                ..Self::status("invalid")
            },
            SubmitOutcome::Generated {
                chart_id,
                result,
                option,
            } => Self {
                chart_id: chart_id.clone(),
                result: result.clone(),
                option: Some(option.clone()),
                ..Self::status("generated")
            },
            SubmitOutcome::Accepted { chart_id } => Self {
                chart_id: chart_id.clone(),
                ..Self::status("accepted")
            },
            SubmitOutcome::Failed(e) => Self {
                error: Some(ErrorResponse::from(e)),
                ..Self::status("failed")
            },
        }
    }
}

pub async fn run(state: &AppState, args: GenerateArgs) -> Result<bool> {
    let mut request = ChartRequest::new(args.goal, args.name);
    if let Some(chart_type) = args.chart_type {
        request = request.with_chart_type(chart_type);
    }
    if let Some(path) = &args.file {
        request = request.with_file(DatasetFile::from_path(path).await?);
    }

    let page = state.submission_page(args.mode);
    let outcome = page.submit(request).await;

    if args.json {
        print_json(&GenerateReport::from(&outcome))?;
    } else {
        print_report(&outcome)?;
    }
    Ok(outcome.is_success())
}

fn print_report(outcome: &SubmitOutcome) -> Result<()> {
    write_report(&mut std::io::stdout().lock(), outcome)
}

fn write_report(out: &mut impl Write, outcome: &SubmitOutcome) -> Result<()> {
    match outcome {
        SubmitOutcome::Generated { result, option, .. } => {
            writeln!(out, "Conclusion:")?;
            writeln!(out, "{}", result.as_deref().unwrap_or("(none)"))?;
            writeln!(out)?;
            writeln!(out, "Chart:")?;
            writeln!(out, "{}", serde_json::to_string_pretty(option)?)?;
        }
        SubmitOutcome::Accepted { chart_id } => {
            if let Some(id) = chart_id {
                writeln!(out, "Chart id: {}", id)?;
            }
            writeln!(out, "Run `smartbi charts` to follow the job.")?;
        }
        SubmitOutcome::Invalid(errors) => {
            for error in errors {
                writeln!(out, "{}: {}", error.field, error.message)?;
            }
        }
        // reported through the notifier
        SubmitOutcome::Busy | SubmitOutcome::Failed(_) => {}
    }
    Ok(())
}
