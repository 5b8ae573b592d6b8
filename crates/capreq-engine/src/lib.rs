//! Parser and evaluator for capability requirement expressions.
//!
//! A requirement such as `superlu & petsc>=3.9 & !debug` is parsed into an
//! [`Expr`] and reduced against a [`capreq_core::Registry`] in a five-valued
//! logic ([`Tri`]). Absent capabilities are not errors: a bare test on an
//! unregistered name leans false, and a comparison on one is unknown.
//!
//! ```
//! use capreq_core::{CheckState, Registry};
//! use capreq_engine::check;
//!
//! let mut registry = Registry::new();
//! registry.add("petsc", "3.9.2", "PETSc version").unwrap();
//!
//! let verdict = check("petsc & petsc>=3.9", &registry).unwrap();
//! assert_eq!(verdict.status, CheckState::CertainPass);
//!
//! let verdict = check("slepc>=3.9", &registry).unwrap();
//! assert_eq!(verdict.status, CheckState::Unknown);
//! ```
//!
//! The [`harness`] module layers test selection on top: per-test
//! capabilities, negated what-if copies and the `--only` style filter.

mod check;
mod error;
mod evaluate;
mod grammar;
pub mod harness;
mod parser;
mod trinary;

pub use check::{check, Fulfillment, Verdict, EMPTY_REQUIREMENTS};
pub use error::{CheckError, CheckResult};
pub use evaluate::evaluate;
pub use grammar::{Expr, LogicOperator, Operand, Operator};
pub use harness::{augment_capability, skip_reason, CheckRequest, RequiredCapability};
pub use parser::{parse, MAX_DEPTH};
pub use trinary::Tri;
