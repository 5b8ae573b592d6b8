//! A single registered capability.

use serde::{Deserialize, Serialize};

use crate::error::{CapabilityError, CapabilityResult};
use crate::value::CapabilityValue;

/// Doc string used when negation has to synthesize a missing capability.
pub const NEGATED_DOC: &str = "Negated capability";

/// A named fact about the build or runtime environment.
///
/// The name lives in the owning [`Registry`](crate::Registry); the entry
/// carries the value plus the metadata consumed by validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// Current value.
    pub value: CapabilityValue,

    /// Human-readable description.
    pub doc: String,

    /// Must be asserted by a requirement rather than defaulted.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub explicit: bool,

    /// Allowed string values, if constrained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<Vec<String>>,
}

impl Capability {
    /// Create a new capability with no metadata.
    pub fn new(value: impl Into<CapabilityValue>, doc: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            doc: doc.into(),
            explicit: false,
            enumeration: None,
        }
    }

    /// Builder variant of [`Capability::set_explicit`].
    pub fn explicit(mut self) -> Self {
        self.explicit = true;
        self
    }

    /// Mark the capability as explicit.
    pub fn set_explicit(&mut self) -> &mut Self {
        self.explicit = true;
        self
    }

    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    /// Constrain the capability to a set of allowed string values.
    ///
    /// `name` is only used for error reporting. The values are stored
    /// lower-cased and de-duplicated, preserving first-seen order.
    pub fn set_enumeration<I, S>(&mut self, name: &str, values: I) -> CapabilityResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut allowed: Vec<String> = Vec::new();
        for value in values {
            let value = value.as_ref().to_lowercase();
            if value.is_empty() {
                return Err(CapabilityError::invalid_enumeration(
                    name,
                    "enumeration entries must not be empty",
                ));
            }
            if !allowed.contains(&value) {
                allowed.push(value);
            }
        }

        if allowed.is_empty() {
            return Err(CapabilityError::invalid_enumeration(
                name,
                "enumeration must not be empty",
            ));
        }

        let current = self.value.as_str().ok_or_else(|| {
            CapabilityError::invalid_enumeration(
                name,
                format!("value is a {}, not a string", self.value.kind()),
            )
        })?;
        if !allowed.iter().any(|v| v == &current.to_lowercase()) {
            return Err(CapabilityError::invalid_enumeration(
                name,
                format!("value '{}' is not one of {}", current, allowed.join(", ")),
            ));
        }

        self.enumeration = Some(allowed);
        Ok(self)
    }

    pub fn enumeration(&self) -> Option<&[String]> {
        self.enumeration.as_deref()
    }

    /// Flip the sense of this capability for identifier tests.
    ///
    /// Booleans are inverted. Any other value is replaced by `false`,
    /// since a present non-boolean value tests as true.
    pub fn negate_value(&mut self) {
        self.value = match self.value {
            CapabilityValue::Bool(b) => CapabilityValue::Bool(!b),
            _ => CapabilityValue::Bool(false),
        };
        self.enumeration = None;
    }
}
