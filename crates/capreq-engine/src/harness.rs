//! Test-selection helpers built on [`check`].
//!
//! A test declares a requirement string. The runner checks it against the
//! application's registry plus any per-test capabilities, optionally with
//! some capabilities negated to find out whether the test depends on them.

use std::fmt;

use capreq_core::{
    Capability, CapabilityError, CapabilityResult, CapabilityValue, CheckState, Registry,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::check::{check, Fulfillment, Verdict};
use crate::error::{CheckError, CheckResult};

/// Record a per-test capability (`mpi_procs`, `num_threads`, ...) into
/// `augmented`.
///
/// Fails with [`CapabilityError::Duplicate`] when the application already
/// registers `name` or it has already been augmented.
pub fn augment_capability<'a>(
    base: &Registry,
    augmented: &'a mut Registry,
    name: &str,
    value: impl Into<CapabilityValue>,
    doc: impl Into<String>,
    explicit: bool,
) -> CapabilityResult<&'a mut Capability> {
    if base.contains(name) {
        return Err(CapabilityError::Duplicate {
            name: name.to_string(),
        });
    }
    let capability = augmented.add(name, value, doc)?;
    if explicit {
        capability.set_explicit();
    }
    info!(capability = %name, "Augmented capability");
    Ok(capability)
}

/// A requirement check with optional extra and negated capabilities.
#[derive(Debug, Clone, Serialize)]
pub struct CheckRequest {
    /// The requirement string.
    pub requirement: String,

    /// Capabilities added to (or overriding) the base registry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Registry>,

    /// Capabilities negated in the working copy.
    pub negate: Vec<String>,

    /// The application may register more capabilities at run time, so an
    /// unknown result does not rule the test out.
    pub dynamic: bool,
}

impl CheckRequest {
    pub fn new(requirement: impl Into<String>) -> Self {
        Self {
            requirement: requirement.into(),
            extra: None,
            negate: vec![],
            dynamic: false,
        }
    }

    /// Add capabilities on top of the base registry.
    pub fn with_extra(mut self, extra: Registry) -> Self {
        self.extra = Some(extra);
        self
    }

    /// Negate the named capabilities.
    pub fn with_negated(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.negate.extend(names.into_iter().map(|s| s.into()));
        self
    }

    /// Set the dynamic flag.
    pub fn dynamic(mut self, dynamic: bool) -> Self {
        self.dynamic = dynamic;
        self
    }

    /// Check against a working copy of `base`; `base` itself is never
    /// modified.
    pub fn run(&self, base: &Registry) -> CheckResult<Verdict> {
        if self.extra.is_none() && self.negate.is_empty() {
            return check(&self.requirement, base);
        }
        let working = base.augmented(self.extra.as_ref(), &self.negate)?;
        check(&self.requirement, &working)
    }

    /// Whether the test may run.
    pub fn passes(&self, base: &Registry) -> CheckResult<bool> {
        let verdict = self.run(base)?;
        Ok(self.accepts(verdict.status))
    }

    /// Host decision on a verdict from [`CheckRequest::run`].
    ///
    /// A dynamic request defers an unknown result to the application
    /// instead of failing as ambiguous.
    pub fn fulfillment(&self, verdict: &Verdict) -> CheckResult<Fulfillment> {
        if self.dynamic && verdict.status == CheckState::Unknown {
            debug!(requirement = %self.requirement, "Deferring unknown result");
            return Ok(Fulfillment::Deferred);
        }
        verdict.fulfillment(&self.requirement)
    }

    fn accepts(&self, status: CheckState) -> bool {
        let floor = if self.dynamic {
            CheckState::Unknown
        } else {
            CheckState::PossiblePass
        };
        status.is_logical() && status.code() >= floor.code()
    }
}

/// A capability the user wants selected tests to depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredCapability {
    pub name: String,
    /// Written as `!name`: select tests that depend on it being false.
    pub negated: bool,
}

impl RequiredCapability {
    /// Parse `name` / `!name` entries, each of which must be registered.
    pub fn parse_all<I, S>(registry: &Registry, entries: I) -> CheckResult<Vec<Self>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        entries
            .into_iter()
            .map(|entry| {
                let entry = entry.as_ref().trim();
                let (name, negated) = match entry.strip_prefix('!') {
                    Some(rest) => (rest.trim(), true),
                    None => (entry, false),
                };
                if !registry.contains(name) {
                    return Err(CheckError::UnregisteredRequired {
                        name: name.to_string(),
                    });
                }
                Ok(Self {
                    name: name.to_string(),
                    negated,
                })
            })
            .collect()
    }

    /// How a test that does not depend on this capability is reported.
    fn complement(&self) -> String {
        if self.negated {
            self.name.clone()
        } else {
            format!("!{}", self.name)
        }
    }
}

impl fmt::Display for RequiredCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "!{}", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// Why a test should be skipped, or `None` when it should run.
///
/// With a non-empty `required` list, a test runs only if flipping each
/// required capability would make it fail, i.e. it depends on all of them.
pub fn skip_reason(
    base: &Registry,
    request: &CheckRequest,
    required: &[RequiredCapability],
) -> CheckResult<Option<String>> {
    if request.requirement.is_empty() {
        if required.is_empty() {
            return Ok(None);
        }
        return Ok(Some(join_complements(required.iter())));
    }

    if !request.passes(base)? {
        return Ok(Some(format!("Need {}", request.requirement)));
    }

    let mut independent = Vec::new();
    for capability in required {
        let negated = request
            .clone()
            .dynamic(true)
            .with_negated([capability.name.as_str()]);
        if negated.passes(base)? {
            debug!(capability = %capability, "Test does not depend on required capability");
            independent.push(capability);
        }
    }

    if independent.is_empty() {
        Ok(None)
    } else {
        Ok(Some(join_complements(independent.into_iter())))
    }
}

fn join_complements<'a>(required: impl Iterator<Item = &'a RequiredCapability>) -> String {
    required
        .map(RequiredCapability::complement)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Registry {
        let mut registry = Registry::new();
        registry.add("petsc", "3.9.2", "PETSc version").unwrap();
        registry.add("superlu", true, "has SuperLU").unwrap();
        registry.add("mumps", true, "has MUMPS").unwrap();
        registry.add("debug", false, "debug build").unwrap();
        registry
    }

    fn required(entries: &[&str]) -> Vec<RequiredCapability> {
        RequiredCapability::parse_all(&base(), entries).unwrap()
    }

    #[test]
    fn test_augment_rejects_registered_and_repeated_names() {
        let base = base();
        let mut augmented = Registry::new();

        augment_capability(&base, &mut augmented, "mpi_procs", 4, "MPI ranks", false).unwrap();
        let threads =
            augment_capability(&base, &mut augmented, "num_threads", 2, "threads", true).unwrap();
        assert!(threads.is_explicit());

        assert_eq!(
            augment_capability(&base, &mut augmented, "superlu", true, "again", false).unwrap_err(),
            CapabilityError::Duplicate {
                name: "superlu".to_string()
            }
        );
        assert!(matches!(
            augment_capability(&base, &mut augmented, "mpi_procs", 8, "again", false).unwrap_err(),
            CapabilityError::Duplicate { .. }
        ));
        assert_eq!(augmented.len(), 2);
        assert!(!base.contains("mpi_procs"));
    }

    #[test]
    fn test_run_uses_extra_and_negated_copy() {
        let base = base();
        let mut extra = Registry::new();
        extra.add("mpi_procs", 4, "MPI ranks").unwrap();

        let request = CheckRequest::new("superlu & mpi_procs>2")
            .with_extra(extra)
            .with_negated(["superlu"]);
        assert_eq!(request.run(&base).unwrap().status, CheckState::CertainFail);

        let request = CheckRequest::new("superlu & mpi_procs>2").with_extra(request.extra.unwrap());
        assert_eq!(request.run(&base).unwrap().status, CheckState::CertainPass);

        assert_eq!(
            base.query("superlu").unwrap().value,
            CapabilityValue::Bool(true)
        );
        assert!(!base.contains("mpi_procs"));
    }

    #[test]
    fn test_passes_thresholds() {
        let base = base();
        assert!(CheckRequest::new("superlu").passes(&base).unwrap());
        assert!(CheckRequest::new("!unregistered").passes(&base).unwrap());
        assert!(!CheckRequest::new("unregistered").passes(&base).unwrap());
        assert!(!CheckRequest::new("slepc>=3").passes(&base).unwrap());
        assert!(CheckRequest::new("slepc>=3").dynamic(true).passes(&base).unwrap());
        assert!(!CheckRequest::new("unregistered").dynamic(true).passes(&base).unwrap());
    }

    #[test]
    fn test_dynamic_request_defers_unknown() {
        let base = base();

        let strict = CheckRequest::new("slepc>=3");
        let verdict = strict.run(&base).unwrap();
        assert!(matches!(
            strict.fulfillment(&verdict).unwrap_err(),
            CheckError::Ambiguous { .. }
        ));

        let dynamic = strict.clone().dynamic(true);
        assert_eq!(dynamic.fulfillment(&verdict).unwrap(), Fulfillment::Deferred);

        let known = CheckRequest::new("debug").dynamic(true);
        let verdict = known.run(&base).unwrap();
        assert_eq!(known.fulfillment(&verdict).unwrap(), Fulfillment::NotFulfilled);
    }

    #[test]
    fn test_parse_required() {
        let parsed = required(&[" superlu ", "!debug"]);
        assert_eq!(
            parsed,
            vec![
                RequiredCapability {
                    name: "superlu".into(),
                    negated: false
                },
                RequiredCapability {
                    name: "debug".into(),
                    negated: true
                },
            ]
        );
        assert_eq!(parsed[1].to_string(), "!debug");

        assert_eq!(
            RequiredCapability::parse_all(&base(), ["slepc"]).unwrap_err(),
            CheckError::UnregisteredRequired {
                name: "slepc".into()
            }
        );
    }

    #[test]
    fn test_skip_reason_for_empty_requirement() {
        let base = base();
        let request = CheckRequest::new("");
        assert_eq!(skip_reason(&base, &request, &[]).unwrap(), None);
        assert_eq!(
            skip_reason(&base, &request, &required(&["superlu", "mumps"])).unwrap(),
            Some("!superlu, !mumps".to_string())
        );
    }

    #[test]
    fn test_skip_reason_when_requirement_fails() {
        let base = base();
        let request = CheckRequest::new("debug");
        assert_eq!(
            skip_reason(&base, &request, &[]).unwrap(),
            Some("Need debug".to_string())
        );
    }

    #[test]
    fn test_skip_reason_for_independent_tests() {
        let base = base();
        let only = required(&["superlu", "mumps"]);

        let depends_on_both = CheckRequest::new("superlu & mumps");
        assert_eq!(skip_reason(&base, &depends_on_both, &only).unwrap(), None);

        let depends_on_one = CheckRequest::new("superlu & petsc>=3.9");
        assert_eq!(
            skip_reason(&base, &depends_on_one, &only).unwrap(),
            Some("!mumps".to_string())
        );

        let either = CheckRequest::new("superlu | mumps");
        assert_eq!(
            skip_reason(&base, &either, &only).unwrap(),
            Some("!superlu, !mumps".to_string())
        );
    }

    #[test]
    fn test_skip_reason_for_negated_required() {
        let base = base();
        let only = required(&["!debug"]);

        assert_eq!(skip_reason(&base, &CheckRequest::new("!debug"), &only).unwrap(), None);
        assert_eq!(
            skip_reason(&base, &CheckRequest::new("superlu"), &only).unwrap(),
            Some("debug".to_string())
        );
    }

    #[test]
    fn test_skip_reason_propagates_errors() {
        let base = base();
        let request = CheckRequest::new("superlu=1");
        assert!(matches!(
            skip_reason(&base, &request, &[]).unwrap_err(),
            CheckError::Capability(CapabilityError::TypeMismatch { .. })
        ));
    }
}
