//! Check command implementation.
//!
//! Evaluates one requirement and reports its state.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use capreq_core::CheckState;
use capreq_engine::{CheckRequest, Fulfillment, Verdict};
use serde::Serialize;
use tracing::{info_span, warn};

use super::{load_base, load_extra};
use crate::config::OutputFormat;

/// Exit code when `--require` finds the requirement not fulfilled.
pub const EXIT_NOT_FULFILLED: u8 = 1;
/// Exit code for a malformed requirement.
pub const EXIT_PARSE_FAIL: u8 = 2;

/// Parameters for one check.
#[derive(Debug, Clone)]
pub struct CheckArgs {
    pub requirement: String,
    pub capabilities: Option<PathBuf>,
    pub add: Option<PathBuf>,
    pub negate: Vec<String>,
    pub dynamic: bool,
    pub require: bool,
    pub format: OutputFormat,
}

/// What gets printed for a check.
#[derive(Debug, Serialize)]
struct Report {
    status: CheckState,
    code: u8,
    message: String,
    doc: String,
}

impl From<Verdict> for Report {
    fn from(verdict: Verdict) -> Self {
        Self {
            code: verdict.code(),
            status: verdict.status,
            message: verdict.message,
            doc: verdict.doc,
        }
    }
}

/// Run the check command.
pub fn execute(args: CheckArgs) -> Result<ExitCode> {
    let _span = info_span!("check_command", requirement = %args.requirement).entered();

    let base = load_base(args.capabilities.as_ref())?;
    let mut request = CheckRequest::new(args.requirement.as_str())
        .with_negated(args.negate.iter().map(String::as_str))
        .dynamic(args.dynamic);
    if let Some(extra) = load_extra(args.add.as_ref())? {
        request = request.with_extra(extra);
    }

    let verdict = match request.run(&base) {
        Ok(verdict) => verdict,
        Err(err) => match err.as_state() {
            Some(status) => {
                print_report(
                    &Report {
                        status,
                        code: status.code(),
                        message: err.to_string(),
                        doc: String::new(),
                    },
                    args.format,
                )?;
                return Ok(ExitCode::from(EXIT_PARSE_FAIL));
            }
            None => return Err(err.into()),
        },
    };

    print_report(&Report::from(verdict.clone()), args.format)?;

    if args.require {
        return gate(&request, &verdict);
    }
    Ok(ExitCode::SUCCESS)
}

/// Host-side decision for `--require`.
///
/// With `--dynamic`, an unknown result passes and the decision is left to
/// the application once it has registered its own capabilities.
fn gate(request: &CheckRequest, verdict: &Verdict) -> Result<ExitCode> {
    match request.fulfillment(verdict)? {
        Fulfillment::Fulfilled => Ok(ExitCode::SUCCESS),
        Fulfillment::NotFulfilled => {
            eprintln!("Required capabilities '{}' are not fulfilled", request.requirement);
            Ok(ExitCode::from(EXIT_NOT_FULFILLED))
        }
        Fulfillment::Deferred => {
            warn!(requirement = %request.requirement, "Requirement is unknown, deferring to the application");
            eprintln!(
                "Required capabilities '{}' depend on capabilities registered at run time",
                request.requirement
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_report(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            println!("Status:  {} ({})", report.status, report.code);
            println!("Message: {}", report.message);
            if !report.doc.is_empty() {
                println!("Doc:     {}", report.doc);
            }
        }
    }
    Ok(())
}
