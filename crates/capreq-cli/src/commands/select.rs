//! Select command implementation.
//!
//! Decides whether a test with the given requirement runs under an
//! `--only` filter.

use std::path::PathBuf;

use anyhow::Result;
use capreq_engine::{skip_reason, CheckRequest, RequiredCapability};
use serde_json::json;

use super::{load_base, load_extra};
use crate::config::OutputFormat;

/// Parameters for one selection.
#[derive(Debug, Clone)]
pub struct SelectArgs {
    pub requirement: String,
    pub only: Vec<String>,
    pub capabilities: Option<PathBuf>,
    pub add: Option<PathBuf>,
    pub dynamic: bool,
    pub format: OutputFormat,
}

/// Run the select command.
pub fn execute(args: SelectArgs) -> Result<()> {
    let base = load_base(args.capabilities.as_ref())?;
    let required = RequiredCapability::parse_all(&base, &args.only)?;

    let mut request = CheckRequest::new(args.requirement.as_str()).dynamic(args.dynamic);
    if let Some(extra) = load_extra(args.add.as_ref())? {
        request = request.with_extra(extra);
    }

    let reason = skip_reason(&base, &request, &required)?;

    match args.format {
        OutputFormat::Json => {
            let report = json!({
                "run": reason.is_none(),
                "reason": reason,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => match reason {
            Some(reason) => println!("skip: {}", reason),
            None => println!("run"),
        },
    }
    Ok(())
}
