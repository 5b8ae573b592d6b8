//! Syntax tree for requirement expressions.
//!
//! ```text
//! Expression    <- Bool LogicOperator Expression / Bool
//! Bool          <- Comparison / '!' Bool / Identifier / '(' Expression ')'
//! Comparison    <- Identifier Operator Version / Identifier Operator String
//! Version       <- Number '.' Version / Number
//! Number        <- [0-9]+
//! String        <- [a-zA-Z0-9_-]+
//! Identifier    <- [a-zA-Z] [a-zA-Z0-9_]*
//! Operator      <- [<>=!]+        (one of < > <= >= = == !=)
//! LogicOperator <- '&' / '|'
//! ```
//!
//! `&` and `|` share one precedence level and associate to the right, so
//! `a & b | c` is `a & (b | c)`.

use std::cmp::Ordering;
use std::fmt;

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
}

impl Operator {
    /// Map operator text onto an operator; `=` and `==` are synonyms.
    pub fn parse(text: &str) -> Option<Self> {
        Some(match text {
            "<" => Operator::Less,
            ">" => Operator::Greater,
            "<=" => Operator::LessEqual,
            ">=" => Operator::GreaterEqual,
            "=" | "==" => Operator::Equal,
            "!=" => Operator::NotEqual,
            _ => return None,
        })
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Less => "<",
            Operator::Greater => ">",
            Operator::LessEqual => "<=",
            Operator::GreaterEqual => ">=",
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
        }
    }

    /// `<`, `>`, `<=` or `>=`.
    pub fn is_ordering(self) -> bool {
        !matches!(self, Operator::Equal | Operator::NotEqual)
    }

    /// Apply the operator to `lhs OP rhs`.
    pub fn holds<T: Ord + ?Sized>(self, lhs: &T, rhs: &T) -> bool {
        self.accepts(lhs.cmp(rhs))
    }

    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Operator::Less => ordering == Ordering::Less,
            Operator::Greater => ordering == Ordering::Greater,
            Operator::LessEqual => ordering != Ordering::Greater,
            Operator::GreaterEqual => ordering != Ordering::Less,
            Operator::Equal => ordering == Ordering::Equal,
            Operator::NotEqual => ordering != Ordering::Equal,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Binary logic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicOperator {
    And,
    Or,
}

impl LogicOperator {
    pub fn symbol(self) -> char {
        match self {
            LogicOperator::And => '&',
            LogicOperator::Or => '|',
        }
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    /// Dot-separated integers; a single component doubles as an integer.
    Version(Vec<u64>),
    /// A bare word, kept as written.
    Text(String),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Version(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    write!(f, "{}", part)?;
                }
                Ok(())
            }
            Operand::Text(text) => f.write_str(text),
        }
    }
}

/// A parsed requirement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// Truthiness test on a capability.
    Identifier(String),
    /// `name OP operand`.
    Comparison {
        name: String,
        op: Operator,
        operand: Operand,
    },
    /// `!expr`.
    Not(Box<Expr>),
    /// `(expr)`.
    Group(Box<Expr>),
    /// `lhs & rhs` or `lhs | rhs`.
    Logic {
        op: LogicOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// Capability names referenced by the expression, first appearance first.
    pub fn capability_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expr::Identifier(name) | Expr::Comparison { name, .. } => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Expr::Not(inner) | Expr::Group(inner) => inner.collect_names(names),
            Expr::Logic { lhs, rhs, .. } => {
                lhs.collect_names(names);
                rhs.collect_names(names);
            }
        }
    }
}

/// Renders with implicit right-associative grouping made explicit.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Identifier(name) => f.write_str(name),
            Expr::Comparison { name, op, operand } => write!(f, "{}{}{}", name, op, operand),
            Expr::Not(inner) => write!(f, "!{}", inner),
            Expr::Group(inner) => write!(f, "({})", inner),
            Expr::Logic { op, lhs, rhs } => match rhs.as_ref() {
                Expr::Logic { .. } => write!(f, "{} {} ({})", lhs, op.symbol(), rhs),
                _ => write!(f, "{} {} {}", lhs, op.symbol(), rhs),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_parse() {
        assert_eq!(Operator::parse("="), Some(Operator::Equal));
        assert_eq!(Operator::parse("=="), Some(Operator::Equal));
        assert_eq!(Operator::parse("!="), Some(Operator::NotEqual));
        assert_eq!(Operator::parse(">="), Some(Operator::GreaterEqual));
        assert_eq!(Operator::parse("=>"), None);
        assert_eq!(Operator::parse("<>"), None);
        assert_eq!(Operator::parse("!"), None);
    }

    #[test]
    fn test_operator_holds() {
        assert!(Operator::Less.holds(&1, &2));
        assert!(!Operator::Less.holds(&2, &2));
        assert!(Operator::LessEqual.holds(&2, &2));
        assert!(Operator::GreaterEqual.holds(&[9u64, 10][..], &[9u64, 9][..]));
        assert!(Operator::NotEqual.holds("gcc", "clang"));
        assert!(Operator::Equal.holds("gcc", "gcc"));
    }

    #[test]
    fn test_capability_names_dedup_in_order() {
        let expr = Expr::Logic {
            op: LogicOperator::And,
            lhs: Box::new(Expr::Identifier("petsc".into())),
            rhs: Box::new(Expr::Logic {
                op: LogicOperator::Or,
                lhs: Box::new(Expr::Comparison {
                    name: "petsc".into(),
                    op: Operator::GreaterEqual,
                    operand: Operand::Version(vec![3, 9]),
                }),
                rhs: Box::new(Expr::Not(Box::new(Expr::Identifier("slepc".into())))),
            }),
        };
        assert_eq!(expr.capability_names(), vec!["petsc", "slepc"]);
        assert_eq!(expr.to_string(), "petsc & (petsc>=3.9 | !slepc)");
    }
}
