//! Packrat parser for requirement expressions.
//!
//! Alternatives are tried in order and the first match wins, as in a PEG.
//! Results of the `Expression` and `Bool` rules are memoized per input
//! position, so each rule runs at most once per position even though both
//! rules re-try a prefix after a failed longer alternative.
//!
//! Spaces and tabs are skipped before every token.
//!
//! Groups, negations and the right-hand side of `&`/`|` each add one level
//! of nesting; more than [`MAX_DEPTH`] levels is a syntax error.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{CheckError, CheckResult};
use crate::grammar::{Expr, LogicOperator, Operand, Operator};

/// Deepest nesting the parser accepts.
pub const MAX_DEPTH: usize = 256;

/// Parse a requirement into an expression tree.
///
/// The whole input must match. The empty requirement is not handled here;
/// see [`check`](crate::check).
pub fn parse(requirement: &str) -> CheckResult<Expr> {
    let mut parser = Parser::new(requirement);
    let parsed = parser.expression(0)?;

    if let Some((expr, end)) = parsed {
        let end = parser.skip_whitespace(end);
        if end == requirement.len() {
            debug!(requirement, parsed = %expr, "Parsed requirement");
            return Ok(expr);
        }
        parser.fail(end, "'&', '|' or end of input");
    }

    Err(parser.syntax_error())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Rule {
    Expression,
    Bool,
}

type Match<T> = Option<(T, usize)>;

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    memo: HashMap<(Rule, usize), Match<Expr>>,
    farthest: usize,
    expected: Vec<&'static str>,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            memo: HashMap::new(),
            farthest: 0,
            expected: Vec::new(),
            depth: 0,
        }
    }

    // Expression <- Bool LogicOperator Expression / Bool
    fn expression(&mut self, pos: usize) -> CheckResult<Match<Expr>> {
        if let Some(cached) = self.memo.get(&(Rule::Expression, pos)) {
            return Ok(cached.clone());
        }

        let mut result = None;
        if let Some((lhs, after_lhs)) = self.bool(pos)? {
            if let Some((op, after_op)) = self.logic_operator(after_lhs) {
                self.descend(after_op)?;
                let rhs = self.expression(after_op)?;
                self.depth -= 1;
                if let Some((rhs, end)) = rhs {
                    result = Some((
                        Expr::Logic {
                            op,
                            lhs: Box::new(lhs),
                            rhs: Box::new(rhs),
                        },
                        end,
                    ));
                }
            }
        }
        if result.is_none() {
            result = self.bool(pos)?;
        }

        self.memo.insert((Rule::Expression, pos), result.clone());
        Ok(result)
    }

    // Bool <- Comparison / '!' Bool / Identifier / '(' Expression ')'
    fn bool(&mut self, pos: usize) -> CheckResult<Match<Expr>> {
        if let Some(cached) = self.memo.get(&(Rule::Bool, pos)) {
            return Ok(cached.clone());
        }

        let result = match self.comparison(pos)? {
            Some(found) => Some(found),
            None => match self.negation(pos)? {
                Some(found) => Some(found),
                None => match self.identifier(pos) {
                    Some((name, end)) => Some((Expr::Identifier(name), end)),
                    None => self.group(pos)?,
                },
            },
        };

        self.memo.insert((Rule::Bool, pos), result.clone());
        Ok(result)
    }

    // '!' Bool
    fn negation(&mut self, pos: usize) -> CheckResult<Match<Expr>> {
        let Some(after_bang) = self.literal(pos, b'!', "'!'") else {
            return Ok(None);
        };
        self.descend(after_bang)?;
        let inner = self.bool(after_bang)?;
        self.depth -= 1;
        Ok(inner.map(|(inner, end)| (Expr::Not(Box::new(inner)), end)))
    }

    // '(' Expression ')'
    fn group(&mut self, pos: usize) -> CheckResult<Match<Expr>> {
        let Some(after_open) = self.literal(pos, b'(', "'('") else {
            return Ok(None);
        };
        self.descend(after_open)?;
        let inner = self.expression(after_open)?;
        self.depth -= 1;
        let Some((inner, after_inner)) = inner else {
            return Ok(None);
        };
        Ok(self
            .literal(after_inner, b')', "')'")
            .map(|end| (Expr::Group(Box::new(inner)), end)))
    }

    // Comparison <- Identifier Operator Version / Identifier Operator String
    fn comparison(&mut self, pos: usize) -> CheckResult<Match<Expr>> {
        let Some((name, after_name)) = self.identifier(pos) else {
            return Ok(None);
        };
        let Some((op, after_op)) = self.operator(after_name)? else {
            return Ok(None);
        };

        let operand = match self.version(after_op)? {
            Some((parts, end)) => Some((Operand::Version(parts), end)),
            None => self
                .string(after_op)
                .map(|(text, end)| (Operand::Text(text), end)),
        };

        Ok(operand.map(|(operand, end)| (Expr::Comparison { name, op, operand }, end)))
    }

    // Identifier <- [a-zA-Z] [a-zA-Z0-9_]*
    fn identifier(&mut self, pos: usize) -> Match<String> {
        let start = self.skip_whitespace(pos);
        if !self.bytes.get(start).is_some_and(u8::is_ascii_alphabetic) {
            self.fail(start, "identifier");
            return None;
        }
        let end = self.scan(start + 1, |b| b.is_ascii_alphanumeric() || b == b'_');
        Some((self.input[start..end].to_string(), end))
    }

    // Operator <- [<>=!]+
    fn operator(&mut self, pos: usize) -> CheckResult<Match<Operator>> {
        let start = self.skip_whitespace(pos);
        let end = self.scan(start, |b| matches!(b, b'<' | b'>' | b'=' | b'!'));
        if end == start {
            self.fail(start, "comparison operator");
            return Ok(None);
        }
        let text = &self.input[start..end];
        match Operator::parse(text) {
            Some(op) => Ok(Some((op, end))),
            None => Err(CheckError::InvalidOperator {
                requirement: self.input.to_string(),
                column: self.column(start),
                operator: text.to_string(),
            }),
        }
    }

    // Version <- Number '.' Version / Number
    fn version(&mut self, pos: usize) -> CheckResult<Match<Vec<u64>>> {
        let Some((first, mut end)) = self.number(pos)? else {
            return Ok(None);
        };
        let mut parts = vec![first];
        while self.bytes.get(end) == Some(&b'.')
            && self.bytes.get(end + 1).is_some_and(u8::is_ascii_digit)
        {
            let Some((part, after)) = self.number(end + 1)? else {
                break;
            };
            parts.push(part);
            end = after;
        }
        Ok(Some((parts, end)))
    }

    // Number <- [0-9]+
    fn number(&mut self, pos: usize) -> CheckResult<Match<u64>> {
        let start = self.skip_whitespace(pos);
        let end = self.scan(start, |b| b.is_ascii_digit());
        if end == start {
            self.fail(start, "version number");
            return Ok(None);
        }
        let digits = &self.input[start..end];
        match digits.parse::<u64>() {
            Ok(value) => Ok(Some((value, end))),
            Err(_) => Err(CheckError::NumberOutOfRange {
                requirement: self.input.to_string(),
                column: self.column(start),
                digits: digits.to_string(),
            }),
        }
    }

    // String <- [a-zA-Z0-9_-]+
    fn string(&mut self, pos: usize) -> Match<String> {
        let start = self.skip_whitespace(pos);
        let end = self.scan(start, |b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        if end == start {
            self.fail(start, "value");
            return None;
        }
        Some((self.input[start..end].to_string(), end))
    }

    // LogicOperator <- '&' / '|'
    fn logic_operator(&mut self, pos: usize) -> Match<LogicOperator> {
        let start = self.skip_whitespace(pos);
        match self.bytes.get(start) {
            Some(b'&') => Some((LogicOperator::And, start + 1)),
            Some(b'|') => Some((LogicOperator::Or, start + 1)),
            _ => {
                self.fail(start, "'&' or '|'");
                None
            }
        }
    }

    fn literal(&mut self, pos: usize, byte: u8, label: &'static str) -> Option<usize> {
        let start = self.skip_whitespace(pos);
        if self.bytes.get(start) == Some(&byte) {
            Some(start + 1)
        } else {
            self.fail(start, label);
            None
        }
    }

    fn descend(&mut self, pos: usize) -> CheckResult<()> {
        if self.depth >= MAX_DEPTH {
            return Err(CheckError::TooDeep {
                requirement: self.input.to_string(),
                column: self.column(pos),
                limit: MAX_DEPTH,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn skip_whitespace(&self, pos: usize) -> usize {
        self.scan(pos, |b| b == b' ' || b == b'\t')
    }

    fn scan(&self, pos: usize, accept: impl Fn(u8) -> bool) -> usize {
        let mut end = pos;
        while self.bytes.get(end).is_some_and(|b| accept(*b)) {
            end += 1;
        }
        end
    }

    /// Record that `what` was expected at `pos`; only the furthest position
    /// is kept for error reporting.
    fn fail(&mut self, pos: usize, what: &'static str) {
        if pos > self.farthest {
            self.farthest = pos;
            self.expected.clear();
        }
        if pos == self.farthest && !self.expected.contains(&what) {
            self.expected.push(what);
        }
    }

    fn column(&self, pos: usize) -> usize {
        self.input[..pos].chars().count() + 1
    }

    fn syntax_error(&self) -> CheckError {
        let found = match self.input[self.farthest..].chars().next() {
            Some(c) => format!("'{}'", c),
            None => "end of input".to_string(),
        };
        let expected = if self.expected.is_empty() {
            "a requirement".to_string()
        } else {
            self.expected.join(", ")
        };
        CheckError::Parse {
            requirement: self.input.to_string(),
            column: self.column(self.farthest),
            expected,
            found,
        }
    }
}
