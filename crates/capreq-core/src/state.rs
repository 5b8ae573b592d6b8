//! Externally visible check states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of checking a requirement against a registry.
///
/// The first five states are ordered from certain failure to certain pass
/// and are compared through their integer codes. `ParseFail` sits outside
/// that order and is only produced by boundaries that turn a syntax error
/// into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum CheckState {
    CertainFail = 0,
    PossibleFail = 1,
    Unknown = 2,
    PossiblePass = 3,
    CertainPass = 4,
    ParseFail = 5,
}

impl CheckState {
    /// Every state, in code order.
    pub const ALL: [CheckState; 6] = [
        CheckState::CertainFail,
        CheckState::PossibleFail,
        CheckState::Unknown,
        CheckState::PossiblePass,
        CheckState::CertainPass,
        CheckState::ParseFail,
    ];

    /// The integer code exposed at foreign boundaries.
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// Boundary constant name.
    pub fn name(self) -> &'static str {
        match self {
            CheckState::CertainFail => "CERTAIN_FAIL",
            CheckState::PossibleFail => "POSSIBLE_FAIL",
            CheckState::Unknown => "UNKNOWN",
            CheckState::PossiblePass => "POSSIBLE_PASS",
            CheckState::CertainPass => "CERTAIN_PASS",
            CheckState::ParseFail => "PARSE_FAIL",
        }
    }

    /// Whether this is one of the five ordered logical results.
    pub fn is_logical(self) -> bool {
        self != CheckState::ParseFail
    }

    /// `CertainFail` or `PossibleFail`.
    pub fn is_fail(self) -> bool {
        matches!(self, CheckState::CertainFail | CheckState::PossibleFail)
    }

    /// `PossiblePass` or `CertainPass`.
    pub fn is_pass(self) -> bool {
        matches!(self, CheckState::PossiblePass | CheckState::CertainPass)
    }

    /// `CertainFail` or `CertainPass`.
    pub fn is_certain(self) -> bool {
        matches!(self, CheckState::CertainFail | CheckState::CertainPass)
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(CheckState::CertainFail.code(), 0);
        assert_eq!(CheckState::PossibleFail.code(), 1);
        assert_eq!(CheckState::Unknown.code(), 2);
        assert_eq!(CheckState::PossiblePass.code(), 3);
        assert_eq!(CheckState::CertainPass.code(), 4);
        assert_eq!(CheckState::ParseFail.code(), 5);
        for state in CheckState::ALL {
            assert_eq!(CheckState::from_code(state.code()), Some(state));
        }
        assert_eq!(CheckState::from_code(6), None);
    }

    #[test]
    fn test_classification() {
        assert!(CheckState::PossibleFail.is_fail());
        assert!(!CheckState::Unknown.is_fail());
        assert!(!CheckState::Unknown.is_pass());
        assert!(CheckState::PossiblePass.is_pass());
        assert!(!CheckState::ParseFail.is_logical());
        assert!(!CheckState::ParseFail.is_fail());
        assert!(CheckState::CertainFail.is_certain());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&CheckState::PossiblePass).unwrap(),
            "\"POSSIBLE_PASS\""
        );
        for state in CheckState::ALL {
            assert_eq!(state.to_string(), state.name());
        }
    }
}
