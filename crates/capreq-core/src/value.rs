//! Capability values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The value of one capability.
///
/// Serialized untagged, so a registry document carries plain JSON
/// booleans, integers and strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapabilityValue {
    /// A feature flag.
    Bool(bool),
    /// A count or size, e.g. `dof_id_bytes`.
    Int(i64),
    /// A version (`"3.9.2"`) or a name (`"gcc"`).
    String(String),
}

impl CapabilityValue {
    /// Human-readable name of the active variant.
    pub fn kind(&self) -> &'static str {
        match self {
            CapabilityValue::Bool(_) => "bool",
            CapabilityValue::Int(_) => "int",
            CapabilityValue::String(_) => "string",
        }
    }

    /// Whether this is exactly the boolean `false`.
    pub fn is_false(&self) -> bool {
        matches!(self, CapabilityValue::Bool(false))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CapabilityValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Decompose a string value into dot-separated integer components.
    ///
    /// Returns `None` for non-string values and for strings that are not
    /// made up entirely of unsigned integers separated by single dots.
    pub fn as_version(&self) -> Option<Vec<u64>> {
        self.as_str().and_then(parse_version)
    }
}

/// Parse `"3.9.2"` into `[3, 9, 2]`.
pub fn parse_version(text: &str) -> Option<Vec<u64>> {
    text.split('.')
        .map(|part| {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                None
            } else {
                part.parse::<u64>().ok()
            }
        })
        .collect()
}

impl fmt::Display for CapabilityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityValue::Bool(b) => write!(f, "{}", b),
            CapabilityValue::Int(i) => write!(f, "{}", i),
            CapabilityValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for CapabilityValue {
    fn from(value: bool) -> Self {
        CapabilityValue::Bool(value)
    }
}

impl From<i64> for CapabilityValue {
    fn from(value: i64) -> Self {
        CapabilityValue::Int(value)
    }
}

impl From<i32> for CapabilityValue {
    fn from(value: i32) -> Self {
        CapabilityValue::Int(value.into())
    }
}

impl From<&str> for CapabilityValue {
    fn from(value: &str) -> Self {
        CapabilityValue::String(value.to_string())
    }
}

impl From<String> for CapabilityValue {
    fn from(value: String) -> Self {
        CapabilityValue::String(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("3.9.2"), Some(vec![3, 9, 2]));
        assert_eq!(parse_version("10"), Some(vec![10]));
        assert_eq!(parse_version("3..2"), None);
        assert_eq!(parse_version("3.9-rc1"), None);
        assert_eq!(parse_version(""), None);
        assert_eq!(parse_version("+3"), None);
    }

    #[test]
    fn test_as_version_only_for_strings() {
        assert_eq!(CapabilityValue::from("9.10").as_version(), Some(vec![9, 10]));
        assert_eq!(CapabilityValue::from(9).as_version(), None);
        assert_eq!(CapabilityValue::from(true).as_version(), None);
    }

    #[test]
    fn test_untagged_serde() {
        let values: Vec<CapabilityValue> =
            serde_json::from_str(r#"[true, 4, "gcc"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                CapabilityValue::Bool(true),
                CapabilityValue::Int(4),
                CapabilityValue::String("gcc".into()),
            ]
        );
        assert_eq!(serde_json::to_string(&values).unwrap(), r#"[true,4,"gcc"]"#);
    }

    #[test]
    fn test_is_false() {
        assert!(CapabilityValue::Bool(false).is_false());
        assert!(!CapabilityValue::Bool(true).is_false());
        assert!(!CapabilityValue::Int(0).is_false());
        assert!(!CapabilityValue::from("").is_false());
    }
}
