//! Loading a registry from the document shape shared with foreign callers.
//!
//! The shape is a mapping from capability name to an object with a required
//! `doc` (string) and `value` (bool, integer or string), an optional
//! `explicit` (bool) and an optional `enumeration` (array of strings):
//!
//! ```json
//! {
//!   "petsc":    { "value": "3.19.1", "doc": "PETSc version" },
//!   "compiler": { "value": "gcc", "doc": "Compiler family", "enumeration": ["gcc", "clang"] },
//!   "mpi_procs": { "value": 2, "doc": "Number of MPI processes", "explicit": true }
//! }
//! ```
//!
//! Malformed input fails with [`BoundaryError`], which is separate from
//! [`CapabilityError`] so callers can tell a bad document from bad
//! requirement logic.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::capability::Capability;
use crate::error::CapabilityError;
use crate::registry::Registry;
use crate::value::CapabilityValue;

/// Result type alias for boundary loading.
pub type BoundaryResult<T> = Result<T, BoundaryError>;

/// The error class a boundary failure maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryErrorKind {
    /// A required key is missing.
    Key,
    /// A value has the wrong type.
    Type,
    /// A value has the right type but cannot be used.
    Value,
}

/// Errors raised while decoding a capabilities document.
#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("capability '{name}' is missing required key '{key}'")]
    MissingKey { name: String, key: &'static str },

    #[error("{context}: expected {expected}, found {found}")]
    WrongType {
        context: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{context}: {reason}")]
    InvalidValue { context: String, reason: String },

    #[error("invalid capabilities document: {0}")]
    Json(#[from] serde_json::Error),
}

impl BoundaryError {
    pub fn kind(&self) -> BoundaryErrorKind {
        match self {
            BoundaryError::MissingKey { .. } => BoundaryErrorKind::Key,
            BoundaryError::WrongType { .. } | BoundaryError::Json(_) => BoundaryErrorKind::Type,
            BoundaryError::InvalidValue { .. } => BoundaryErrorKind::Value,
        }
    }

    fn wrong_type(context: impl Into<String>, expected: &'static str, found: &Value) -> Self {
        BoundaryError::WrongType {
            context: context.into(),
            expected,
            found: json_kind(found),
        }
    }
}

impl Registry {
    /// Build a registry from a capabilities document string.
    pub fn from_json_str(text: &str) -> BoundaryResult<Registry> {
        let value: Value = serde_json::from_str(text)?;
        Registry::from_json(&value)
    }

    /// Build a registry from an already decoded capabilities document.
    pub fn from_json(document: &Value) -> BoundaryResult<Registry> {
        let entries = document
            .as_object()
            .ok_or_else(|| BoundaryError::wrong_type("capabilities", "an object", document))?;

        let mut registry = Registry::new();
        for (name, entry) in entries {
            let capability = decode_capability(name, entry)?;
            registry.insert(name.clone(), capability);
        }
        debug!(count = registry.len(), "Loaded capabilities");
        Ok(registry)
    }

    /// Render the registry in the boundary document shape.
    pub fn to_json(&self) -> Value {
        // Registry only holds strings, integers and booleans.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn decode_capability(name: &str, entry: &Value) -> BoundaryResult<Capability> {
    if name.is_empty() {
        return Err(BoundaryError::InvalidValue {
            context: "capabilities".into(),
            reason: CapabilityError::EmptyName.to_string(),
        });
    }
    let fields = entry
        .as_object()
        .ok_or_else(|| BoundaryError::wrong_type(format!("capability '{}'", name), "an object", entry))?;

    let doc = required(name, fields, "doc")?;
    let doc = doc
        .as_str()
        .ok_or_else(|| BoundaryError::wrong_type(format!("capability '{}' doc", name), "a string", doc))?;

    let value = decode_value(name, required(name, fields, "value")?)?;
    let mut capability = Capability::new(value, doc);

    match fields.get("explicit") {
        None | Some(Value::Null) => {}
        Some(Value::Bool(explicit)) => capability.explicit = *explicit,
        Some(other) => {
            return Err(BoundaryError::wrong_type(
                format!("capability '{}' explicit", name),
                "a bool",
                other,
            ))
        }
    }

    match fields.get("enumeration") {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            let context = format!("capability '{}' enumeration", name);
            let values = items
                .iter()
                .map(|item| {
                    item.as_str().ok_or_else(|| BoundaryError::InvalidValue {
                        context: context.clone(),
                        reason: format!("entries must be strings, found {}", json_kind(item)),
                    })
                })
                .collect::<BoundaryResult<Vec<&str>>>()?;
            capability
                .set_enumeration(name, values)
                .map_err(|e| BoundaryError::InvalidValue {
                    context,
                    reason: e.to_string(),
                })?;
        }
        Some(other) => {
            return Err(BoundaryError::InvalidValue {
                context: format!("capability '{}' enumeration", name),
                reason: format!("cannot iterate over {}", json_kind(other)),
            })
        }
    }

    Ok(capability)
}

fn required<'a>(name: &str, fields: &'a Map<String, Value>, key: &'static str) -> BoundaryResult<&'a Value> {
    fields.get(key).ok_or_else(|| BoundaryError::MissingKey {
        name: name.to_string(),
        key,
    })
}

fn decode_value(name: &str, value: &Value) -> BoundaryResult<CapabilityValue> {
    match value {
        Value::Bool(b) => Ok(CapabilityValue::Bool(*b)),
        Value::String(s) => Ok(CapabilityValue::String(s.clone())),
        Value::Number(n) if n.is_u64() || n.is_i64() => {
            n.as_i64()
                .map(CapabilityValue::Int)
                .ok_or_else(|| BoundaryError::InvalidValue {
                    context: format!("capability '{}' value", name),
                    reason: format!("integer {} is out of range", n),
                })
        }
        other => Err(BoundaryError::wrong_type(
            format!("capability '{}' value", name),
            "a bool, integer or string",
            other,
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "an integer",
        Value::Number(_) => "a float",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
