//! Error types for parsing and evaluating requirements.

use capreq_core::{CapabilityError, CheckState};
use thiserror::Error;

/// Result type alias for engine operations.
pub type CheckResult<T> = Result<T, CheckError>;

/// Errors that abort a check.
///
/// None of these is ever reported as an unknown state: unknown is reserved
/// for capabilities that are not registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    /// The requirement does not match the grammar.
    #[error("syntax error in '{requirement}' at column {column}: expected {expected}, found {found}")]
    Parse {
        requirement: String,
        /// 1-based column of the furthest failure.
        column: usize,
        expected: String,
        found: String,
    },

    /// A run of comparison characters that is not a known operator.
    #[error("syntax error in '{requirement}' at column {column}: unknown operator '{operator}'")]
    InvalidOperator {
        requirement: String,
        column: usize,
        operator: String,
    },

    /// A numeric component does not fit in 64 bits.
    #[error("syntax error in '{requirement}' at column {column}: number '{digits}' is out of range")]
    NumberOutOfRange {
        requirement: String,
        column: usize,
        digits: String,
    },

    /// Groups, negations or chained operators nest deeper than the parser
    /// allows.
    #[error("syntax error in '{requirement}' at column {column}: nesting deeper than {limit} levels")]
    TooDeep {
        requirement: String,
        column: usize,
        limit: usize,
    },

    /// A state reporting a failed parse was handed back for a decision.
    #[error("requirement '{requirement}' could not be parsed")]
    Unparsed { requirement: String },

    /// Comparison or registry error while evaluating.
    #[error(transparent)]
    Capability(#[from] CapabilityError),

    /// The requirement compared against an unregistered capability, so the
    /// host cannot decide whether it is fulfilled.
    #[error("required capabilities '{requirement}' are not specific enough: a comparison is performed on an undefined capability; add an existence check as in 'petsc & petsc>=3.9'")]
    Ambiguous { requirement: String },

    /// A capability named in a required-capability filter is not registered.
    #[error("required capability '{name}' is not registered")]
    UnregisteredRequired { name: String },
}

impl CheckError {
    /// Whether the requirement string itself is malformed.
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            CheckError::Parse { .. }
                | CheckError::InvalidOperator { .. }
                | CheckError::NumberOutOfRange { .. }
                | CheckError::TooDeep { .. }
                | CheckError::Unparsed { .. }
        )
    }

    /// The state a value-based boundary should report instead of this error.
    ///
    /// Only syntax errors have one (`PARSE_FAIL`); every other error must be
    /// surfaced as an error.
    pub fn as_state(&self) -> Option<CheckState> {
        self.is_syntax().then_some(CheckState::ParseFail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_syntax_errors_map_to_parse_fail() {
        let parse = CheckError::InvalidOperator {
            requirement: "a=>1".into(),
            column: 2,
            operator: "=>".into(),
        };
        assert_eq!(parse.as_state(), Some(CheckState::ParseFail));

        let deep = CheckError::TooDeep {
            requirement: "((a))".into(),
            column: 2,
            limit: 1,
        };
        assert!(deep.is_syntax());
        assert_eq!(deep.as_state(), Some(CheckState::ParseFail));

        let mismatch = CheckError::from(CapabilityError::type_mismatch("n", 5, "'five'", "int vs string"));
        assert!(!mismatch.is_syntax());
        assert_eq!(mismatch.as_state(), None);
    }
}
