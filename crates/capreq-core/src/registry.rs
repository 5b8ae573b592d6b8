//! The capability registry and its non-destructive mutation API.

use std::collections::btree_map::{self, BTreeMap};

use serde::Serialize;
use tracing::debug;

use crate::capability::{Capability, NEGATED_DOC};
use crate::error::{CapabilityError, CapabilityResult};
use crate::value::CapabilityValue;

/// A mapping from capability name to [`Capability`].
///
/// Names are case-sensitive. Cloning is a full value copy, so a copy may be
/// augmented or negated without affecting the original.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Registry {
    capabilities: BTreeMap<String, Capability>,
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new capability.
    ///
    /// Fails if `name` is empty or already present; the existing entry is
    /// left untouched. Returns the new entry so callers can attach metadata.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        value: impl Into<CapabilityValue>,
        doc: impl Into<String>,
    ) -> CapabilityResult<&mut Capability> {
        self.add_capability(name, Capability::new(value, doc))
    }

    /// Register a fully built capability. Same rules as [`Registry::add`].
    pub fn add_capability(
        &mut self,
        name: impl Into<String>,
        capability: Capability,
    ) -> CapabilityResult<&mut Capability> {
        let name = name.into();
        if name.is_empty() {
            return Err(CapabilityError::EmptyName);
        }
        match self.capabilities.entry(name) {
            btree_map::Entry::Occupied(entry) => Err(CapabilityError::Duplicate {
                name: entry.key().clone(),
            }),
            btree_map::Entry::Vacant(entry) => Ok(entry.insert(capability)),
        }
    }

    /// Insert or replace a capability.
    pub fn insert(&mut self, name: impl Into<String>, capability: Capability) -> Option<Capability> {
        self.capabilities.insert(name.into(), capability)
    }

    /// Look up a capability by name.
    pub fn query(&self, name: &str) -> Option<&Capability> {
        self.capabilities.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Iterate over `(name, capability)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Capability)> {
        self.capabilities.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Registered names in name order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.capabilities.keys().map(String::as_str)
    }

    /// Negate a capability in place, adding it as `false` when absent.
    pub fn negate(&mut self, name: &str) -> CapabilityResult<()> {
        match self.capabilities.get_mut(name) {
            Some(capability) => {
                capability.negate_value();
                debug!(capability = %name, value = %capability.value, "Negated capability");
            }
            None => {
                self.add(name, false, NEGATED_DOC)?;
                debug!(capability = %name, "Added absent capability as false");
            }
        }
        Ok(())
    }

    /// Copy with every entry of `extra` added, replacing same-named entries.
    pub fn merged(&self, extra: &Registry) -> Registry {
        let mut copy = self.clone();
        for (name, capability) in extra.iter() {
            if copy.insert(name, capability.clone()).is_some() {
                debug!(capability = %name, "Overriding capability in copy");
            }
        }
        copy
    }

    /// Copy with each named capability negated (or added as `false`).
    pub fn negated<I, S>(&self, names: I) -> CapabilityResult<Registry>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut copy = self.clone();
        for name in names {
            copy.negate(name.as_ref())?;
        }
        Ok(copy)
    }

    /// Copy with `extra` merged in first and `negate` applied afterwards.
    pub fn augmented<I, S>(&self, extra: Option<&Registry>, negate: I) -> CapabilityResult<Registry>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let merged = match extra {
            Some(extra) => self.merged(extra),
            None => self.clone(),
        };
        merged.negated(negate)
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = (&'a String, &'a Capability);
    type IntoIter = btree_map::Iter<'a, String, Capability>;

    fn into_iter(self) -> Self::IntoIter {
        self.capabilities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Registry {
        let mut registry = Registry::new();
        registry.add("petsc", "3.9.2", "PETSc version").unwrap();
        registry.add("superlu", true, "has SuperLU").unwrap();
        registry.add("debug", false, "debug build").unwrap();
        registry
    }

    #[test]
    fn test_add_and_query() {
        let registry = sample();
        assert_eq!(registry.len(), 3);
        let petsc = registry.query("petsc").unwrap();
        assert_eq!(petsc.value, CapabilityValue::from("3.9.2"));
        assert_eq!(petsc.doc, "PETSc version");
        assert!(registry.query("PETSc").is_none());
        assert!(registry.query("slepc").is_none());
    }

    #[test]
    fn test_duplicate_add_keeps_first() {
        let mut registry = sample();
        let err = registry.add("petsc", "3.20", "other").unwrap_err();
        assert_eq!(
            err,
            CapabilityError::Duplicate {
                name: "petsc".into()
            }
        );
        assert_eq!(registry.query("petsc").unwrap().doc, "PETSc version");
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut registry = Registry::new();
        assert_eq!(
            registry.add("", true, "nothing").unwrap_err(),
            CapabilityError::EmptyName
        );
    }

    #[test]
    fn test_add_returns_handle() {
        let mut registry = Registry::new();
        registry.add("mpi_procs", 2, "Number of MPI processes").unwrap().set_explicit();
        assert!(registry.query("mpi_procs").unwrap().is_explicit());
    }

    #[test]
    fn test_negated_copy_is_isolated() {
        let registry = sample();
        let negated = registry.negated(["superlu", "debug", "mumps"]).unwrap();

        assert_eq!(negated.query("superlu").unwrap().value, CapabilityValue::Bool(false));
        assert_eq!(negated.query("debug").unwrap().value, CapabilityValue::Bool(true));
        let mumps = negated.query("mumps").unwrap();
        assert!(mumps.value.is_false());
        assert_eq!(mumps.doc, NEGATED_DOC);

        assert_eq!(registry, sample());
    }

    #[test]
    fn test_merged_overrides() {
        let registry = sample();
        let mut extra = Registry::new();
        extra.add("petsc", "3.20.0", "newer").unwrap();
        extra.add("mpi_procs", 4, "procs").unwrap();

        let merged = registry.merged(&extra);
        assert_eq!(merged.query("petsc").unwrap().value, CapabilityValue::from("3.20.0"));
        assert_eq!(merged.query("mpi_procs").unwrap().value, CapabilityValue::Int(4));
        assert_eq!(registry.query("petsc").unwrap().value, CapabilityValue::from("3.9.2"));
        assert!(!registry.contains("mpi_procs"));
    }

    #[test]
    fn test_augmented_negates_after_merge() {
        let registry = sample();
        let mut extra = Registry::new();
        extra.add("mumps", true, "has MUMPS").unwrap();

        let copy = registry.augmented(Some(&extra), ["mumps"]).unwrap();
        assert!(copy.query("mumps").unwrap().value.is_false());
        assert_eq!(copy.query("mumps").unwrap().doc, "has MUMPS");
    }

    #[test]
    fn test_serialize_as_map() {
        let mut registry = Registry::new();
        registry.add("threads", 2, "Number of threads").unwrap().set_explicit();
        let json = serde_json::to_value(&registry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "threads": { "value": 2, "doc": "Number of threads", "explicit": true }
            })
        );
    }
}
