//! Show and query commands.
//!
//! Print the registry loaded from a capabilities document.

use std::path::PathBuf;

use anyhow::Result;
use capreq_core::{Capability, Registry};
use serde_json::json;

use super::load_base;
use crate::config::OutputFormat;

/// List every capability.
pub fn list(capabilities: Option<&PathBuf>, format: OutputFormat) -> Result<()> {
    let registry = load_base(capabilities)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&registry.to_json())?),
        OutputFormat::Text => print_table(&registry),
    }
    Ok(())
}

/// Show one capability. Returns whether it is registered.
pub fn query(capabilities: Option<&PathBuf>, name: &str, format: OutputFormat) -> Result<bool> {
    let registry = load_base(capabilities)?;
    let Some(capability) = registry.query(name) else {
        eprintln!("Capability '{}' is not registered", name);
        return Ok(false);
    };

    match format {
        OutputFormat::Json => {
            let entry = json!({ name: capability });
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        OutputFormat::Text => println!("{}", describe(name, capability)),
    }
    Ok(true)
}

fn print_table(registry: &Registry) {
    if registry.is_empty() {
        println!("(no capabilities)");
        return;
    }

    println!("{} capabilities", registry.len());
    println!("{:-<40}", "");
    for (name, capability) in registry {
        println!("{}", describe(name, capability));
    }
}

fn describe(name: &str, capability: &Capability) -> String {
    let mut line = format!("{} = {}", name, capability.value);
    if capability.is_explicit() {
        line.push_str(" [explicit]");
    }
    if let Some(values) = capability.enumeration() {
        line.push_str(&format!(" {{{}}}", values.join(", ")));
    }
    line.push_str(&format!("  # {}", capability.doc));
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let mut capability = Capability::new("gcc", "compiler family").explicit();
        capability
            .set_enumeration("compiler", ["gcc", "clang"])
            .unwrap();
        assert_eq!(
            describe("compiler", &capability),
            "compiler = gcc [explicit] {gcc, clang}  # compiler family"
        );
        assert_eq!(
            describe("superlu", &Capability::new(true, "has SuperLU")),
            "superlu = true  # has SuperLU"
        );
    }
}
