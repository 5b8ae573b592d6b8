//! Reduction of a parsed requirement against a registry.

use capreq_core::{CapabilityError, CapabilityResult, CapabilityValue, Registry};
use tracing::{debug, warn};

use crate::grammar::{Expr, LogicOperator, Operand, Operator};
use crate::trinary::Tri;

/// Evaluate `expr` against `registry`.
///
/// Both operands of `&` and `|` are always evaluated, so an invalid
/// comparison is reported even when the other side already decides the
/// result.
pub fn evaluate(expr: &Expr, registry: &Registry) -> CapabilityResult<Tri> {
    match expr {
        Expr::Identifier(name) => Ok(identifier(name, registry)),
        Expr::Comparison { name, op, operand } => comparison(name, *op, operand, registry),
        Expr::Not(inner) => Ok(evaluate(inner, registry)?.negate()),
        Expr::Group(inner) => evaluate(inner, registry),
        Expr::Logic { op, lhs, rhs } => {
            let lhs = evaluate(lhs, registry)?;
            let rhs = evaluate(rhs, registry)?;
            Ok(match op {
                LogicOperator::And => lhs.and(rhs),
                LogicOperator::Or => lhs.or(rhs),
            })
        }
    }
}

/// Bare identifier: unregistered names lean false, since most capabilities
/// are flags that default off.
fn identifier(name: &str, registry: &Registry) -> Tri {
    match registry.query(name) {
        None => Tri::MaybeFalse,
        Some(capability) => Tri::certain(!capability.value.is_false()),
    }
}

fn comparison(name: &str, op: Operator, operand: &Operand, registry: &Registry) -> CapabilityResult<Tri> {
    let Some(capability) = registry.query(name) else {
        debug!(capability = %name, "Comparison on unregistered capability");
        return Ok(Tri::Unknown);
    };
    let value = &capability.value;

    let holds = match (operand, value) {
        (Operand::Version(parts), CapabilityValue::Int(actual)) => {
            let [expected] = parts.as_slice() else {
                return Err(mismatch(name, value, operand, "expected an integer"));
            };
            op.holds(&i128::from(*actual), &i128::from(*expected))
        }
        (Operand::Version(parts), CapabilityValue::String(_)) => {
            let actual = value.as_version().ok_or_else(|| {
                mismatch(name, value, operand, "the value is not a dot-separated version")
            })?;
            op.holds(actual.as_slice(), parts.as_slice())
        }
        (Operand::Text(text), CapabilityValue::String(actual)) => {
            let expected = text.to_lowercase();
            if op.is_ordering() {
                warn!(capability = %name, operator = %op, "Ordering comparison on a plain string");
            }
            op.holds(actual.as_str(), expected.as_str())
        }
        (Operand::Text(_), CapabilityValue::Int(_)) => {
            return Err(mismatch(name, value, operand, "expected a number"));
        }
        (_, CapabilityValue::Bool(_)) => {
            return Err(mismatch(name, value, operand, "boolean capabilities cannot be compared"));
        }
    };

    Ok(Tri::certain(holds))
}

fn mismatch(name: &str, value: &CapabilityValue, operand: &Operand, reason: &str) -> CapabilityError {
    let operand = match operand {
        Operand::Version(_) => operand.to_string(),
        Operand::Text(text) => format!("'{}'", text),
    };
    CapabilityError::type_mismatch(name, format!("{} {}", value.kind(), value), operand, reason)
}
