//! Core data model for capability requirement checks.
//!
//! A [`Registry`] maps capability names to [`Capability`] entries, each
//! holding a [`CapabilityValue`] (boolean, integer or string) and its
//! documentation. Requirement expressions are evaluated against a registry
//! by `capreq-engine` and reduce to a [`CheckState`].
//!
//! ## Copy-then-mutate
//!
//! Registries are plain values. "What-if" checks (extra capabilities merged
//! in, named capabilities negated) produce an independent copy through
//! [`Registry::merged`], [`Registry::negated`] and [`Registry::augmented`],
//! leaving the base registry untouched and safe to share across threads.
//!
//! ```
//! use capreq_core::{CapabilityValue, Registry};
//!
//! let mut registry = Registry::new();
//! registry.add("superlu", true, "has SuperLU").unwrap();
//!
//! let negated = registry.negated(["superlu"]).unwrap();
//! assert_eq!(negated.query("superlu").unwrap().value, CapabilityValue::Bool(false));
//! assert_eq!(registry.query("superlu").unwrap().value, CapabilityValue::Bool(true));
//! ```

mod boundary;
mod capability;
mod error;
mod registry;
mod state;
mod value;

pub use boundary::{BoundaryError, BoundaryErrorKind, BoundaryResult};
pub use capability::{Capability, NEGATED_DOC};
pub use error::{CapabilityError, CapabilityResult};
pub use registry::Registry;
pub use state::CheckState;
pub use value::{parse_version, CapabilityValue};
