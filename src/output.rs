//! Report rendering for text and JSON output modes

use anyhow::{Context, Result};
use serde::Serialize;
use std::process::ExitCode;

use crate::core::CheckReport;
use crate::error::CheckError;
use crate::sanitize::sanitize_terminal;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable report
    #[default]
    Text,
    /// A single pretty-printed JSON object
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// How a run ended, as reported through the process exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The check ran to the end, whatever the lookup result
    Completed,
    /// The check stopped on a [`CheckError`]
    Aborted,
}

impl RunStatus {
    pub fn code(self) -> u8 {
        match self {
            Self::Completed => 0,
            Self::Aborted => 1,
        }
    }
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        ExitCode::from(status.code())
    }
}

#[derive(Serialize)]
struct ErrorReport<'a> {
    error: &'a str,
}

/// Renders a completed check
///
/// # Examples
///
/// ```
/// use mdi_check::core::CheckReport;
/// use mdi_check::output::{render_report, OutputMode};
///
/// let report = CheckReport {
///     domains: vec!["x.com".to_string()],
///     tenant: "x".to_string(),
///     mdi: true,
/// };
/// let json = render_report(&report, OutputMode::Json).unwrap();
/// assert!(json.contains("\"tenant\": \"x\""));
/// ```
pub fn render_report(report: &CheckReport, mode: OutputMode) -> Result<String> {
    match mode {
        OutputMode::Text => Ok(render_text(report)),
        OutputMode::Json => {
            serde_json::to_string_pretty(report).context("Failed to serialize check report")
        }
    }
}

/// Renders a run-aborting error
///
/// JSON mode emits an object with the single key `error`.
pub fn render_error(err: &CheckError, mode: OutputMode) -> Result<String> {
    let message = err.to_string();
    match mode {
        OutputMode::Text => Ok(format!("[-] {}", message)),
        OutputMode::Json => serde_json::to_string_pretty(&ErrorReport { error: &message })
            .context("Failed to serialize error report"),
    }
}

/// Renders the outcome of a check and the status the process exits with
///
/// Exactly one of the report or the error is rendered, never both.
pub fn render_outcome(
    outcome: &Result<CheckReport, CheckError>,
    mode: OutputMode,
) -> Result<(String, RunStatus)> {
    match outcome {
        Ok(report) => Ok((render_report(report, mode)?, RunStatus::Completed)),
        Err(err) => Ok((render_error(err, mode)?, RunStatus::Aborted)),
    }
}

fn render_text(report: &CheckReport) -> String {
    let domains = report
        .domains
        .iter()
        .map(|d| sanitize_terminal(d))
        .collect::<Vec<_>>()
        .join("\n");
    let tenant = sanitize_terminal(&report.tenant);
    let target = sanitize_terminal(&report.sensor_hostname());

    let mut out = format!("\n[+] Domains found:\n{}\n", domains);
    out.push_str(&format!("\n[+] Tenant found: \n{}\n", tenant));
    if report.mdi {
        out.push_str(&format!("\n[+] An MDI instance was found for {}!\n", target));
    } else {
        out.push_str(&format!("\n[-] No MDI instance was found for {}\n", target));
    }
    out
}
