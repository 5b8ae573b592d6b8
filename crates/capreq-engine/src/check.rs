//! Top-level requirement check.

use capreq_core::{CheckState, Registry};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, debug_span};

use crate::error::{CheckError, CheckResult};
use crate::evaluate::evaluate;
use crate::parser::parse;

/// Message reported for the empty requirement.
pub const EMPTY_REQUIREMENTS: &str = "Empty requirements";

/// Result of one check: status, message and documentation.
///
/// Serializes with the integer `code` of the status alongside its name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Verdict {
    /// Resulting state.
    pub status: CheckState,

    /// The requirement as parsed, with grouping made explicit.
    pub message: String,

    /// `name: doc` of every registered capability the requirement mentions.
    pub doc: String,
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Verdict", 4)?;
        state.serialize_field("status", &self.status)?;
        state.serialize_field("code", &self.code())?;
        state.serialize_field("message", &self.message)?;
        state.serialize_field("doc", &self.doc)?;
        state.end()
    }
}

/// How the host application treats a checked requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fulfillment {
    Fulfilled,
    NotFulfilled,
    /// Unknown, but the application may still register the missing
    /// capabilities at run time.
    Deferred,
}

impl Verdict {
    fn empty() -> Self {
        Self {
            status: CheckState::CertainPass,
            message: EMPTY_REQUIREMENTS.to_string(),
            doc: String::new(),
        }
    }

    /// Integer status code.
    pub fn code(&self) -> u8 {
        self.status.code()
    }

    /// Decide whether the host may run with `requirement` in place.
    ///
    /// Fails are not fulfilled; passes are. `Unknown` means a comparison
    /// hit an unregistered capability, which the host cannot decide, and
    /// is an error.
    pub fn fulfillment(&self, requirement: &str) -> CheckResult<Fulfillment> {
        match self.status {
            CheckState::CertainFail | CheckState::PossibleFail => Ok(Fulfillment::NotFulfilled),
            CheckState::PossiblePass | CheckState::CertainPass => Ok(Fulfillment::Fulfilled),
            CheckState::Unknown => Err(CheckError::Ambiguous {
                requirement: requirement.to_string(),
            }),
            CheckState::ParseFail => Err(CheckError::Unparsed {
                requirement: requirement.to_string(),
            }),
        }
    }
}

/// Check `requirement` against `registry`.
///
/// The empty string passes unconditionally. Syntax errors and invalid
/// comparisons are returned as errors, never as a state.
pub fn check(requirement: &str, registry: &Registry) -> CheckResult<Verdict> {
    if requirement.is_empty() {
        return Ok(Verdict::empty());
    }

    let _span = debug_span!("check", requirement).entered();

    let expr = parse(requirement)?;
    let status = CheckState::from(evaluate(&expr, registry)?);

    let doc = expr
        .capability_names()
        .into_iter()
        .filter_map(|name| registry.query(name).map(|c| format!("{}: {}", name, c.doc)))
        .collect::<Vec<_>>()
        .join("; ");

    debug!(status = %status, "Checked requirement");
    Ok(Verdict {
        status,
        message: expr.to_string(),
        doc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_requirement_passes() {
        let verdict = check("", &Registry::new()).unwrap();
        assert_eq!(verdict.status, CheckState::CertainPass);
        assert_eq!(verdict.message, "Empty requirements");
        assert_eq!(verdict.doc, "");
    }

    #[test]
    fn test_message_and_doc() {
        let mut registry = Registry::new();
        registry.add("petsc", "3.9.2", "PETSc version").unwrap();
        registry.add("superlu", true, "has SuperLU").unwrap();

        let verdict = check("superlu & mumps | petsc>=3.9", &registry).unwrap();
        assert_eq!(verdict.status, CheckState::CertainPass);
        assert_eq!(verdict.message, "superlu & (mumps | petsc>=3.9)");
        assert_eq!(verdict.doc, "superlu: has SuperLU; petsc: PETSc version");
    }

    #[test]
    fn test_fulfillment() {
        let mut registry = Registry::new();
        registry.add("petsc", "3.9.2", "PETSc version").unwrap();

        let fulfilled = check("petsc>=3", &registry).unwrap();
        assert_eq!(fulfilled.fulfillment("petsc>=3").unwrap(), Fulfillment::Fulfilled);

        let not = check("mumps", &registry).unwrap();
        assert_eq!(not.fulfillment("mumps").unwrap(), Fulfillment::NotFulfilled);

        let ambiguous = check("slepc>=3", &registry).unwrap();
        assert!(matches!(
            ambiguous.fulfillment("slepc>=3").unwrap_err(),
            CheckError::Ambiguous { .. }
        ));

        let disambiguated = check("slepc & slepc>=3", &registry).unwrap();
        assert_eq!(disambiguated.status, CheckState::PossibleFail);
        assert_eq!(
            disambiguated.fulfillment("slepc & slepc>=3").unwrap(),
            Fulfillment::NotFulfilled
        );
    }

    #[test]
    fn test_verdict_serializes_status_name() {
        let verdict = check("", &Registry::new()).unwrap();
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["status"], "CERTAIN_PASS");
        assert_eq!(json["code"], 4);
        assert_eq!(json["message"], "Empty requirements");
        assert_eq!(json["doc"], "");

        let back: Verdict = serde_json::from_value(json).unwrap();
        assert_eq!(back, verdict);
    }

    #[test]
    fn test_parse_fail_state_is_a_syntax_error() {
        let verdict = Verdict {
            status: CheckState::ParseFail,
            message: "petsc &".to_string(),
            doc: String::new(),
        };
        let err = verdict.fulfillment("petsc &").unwrap_err();
        assert_eq!(
            err,
            CheckError::Unparsed {
                requirement: "petsc &".to_string()
            }
        );
        assert!(err.is_syntax());
    }
}
