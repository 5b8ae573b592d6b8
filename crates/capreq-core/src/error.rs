//! Error types for the capability registry.

use thiserror::Error;

/// Result type alias for registry operations.
pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// Errors raised by the registry and by comparisons against registered values.
///
/// These are user errors in the requirement logic or in the registry contents.
/// They are never downgraded into an unknown check state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    /// A capability with this name is already registered.
    #[error("capability '{name}' is already registered")]
    Duplicate { name: String },

    /// Capability names must be non-empty.
    #[error("capability name must not be empty")]
    EmptyName,

    /// A comparison was applied to a value kind it cannot be applied to.
    #[error("cannot compare capability '{name}' ({value}) to {operand}: {reason}")]
    TypeMismatch {
        name: String,
        value: String,
        operand: String,
        reason: String,
    },

    /// An enumeration could not be attached to a capability.
    #[error("invalid enumeration for capability '{name}': {reason}")]
    InvalidEnumeration { name: String, reason: String },
}

impl CapabilityError {
    /// Create a type-mismatch error.
    pub fn type_mismatch(
        name: impl Into<String>,
        value: impl ToString,
        operand: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            name: name.into(),
            value: value.to_string(),
            operand: operand.into(),
            reason: reason.into(),
        }
    }

    /// Create an enumeration error.
    pub fn invalid_enumeration(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEnumeration {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
