//! Composer-style version constraints for the `php-version` condition.
//!
//! Supported grammar:
//!
//! ```text
//! constraint  := alternative ( ("||" | "|") alternative )*
//! alternative := range | clause ( ("," | " ") clause )*
//! range       := version " - " version
//! clause      := [op] version | "^" version | "~" version | wildcard | "*"
//! op          := ">=" | "<=" | ">" | "<" | "=" | "==" | "!=" | "<>"
//! wildcard    := digits ("." digits)* ".*"   (or ".x")
//! ```
//!
//! Versions compare on four numeric components.  Anything after `-` or `+`
//! (pre-release, build metadata) is ignored.
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::SymlinksError;

const COMPONENTS: usize = 4;

/// A numeric version such as `8.2.12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    parts: [u64; COMPONENTS],
}

impl Version {
    /// Build a version from its first three components.
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            parts: [major, minor, patch, 0],
        }
    }

    /// Parse a version, returning it together with the number of components
    /// that were actually written.
    fn parse_partial(text: &str) -> Option<(Self, usize)> {
        let text = text.trim();
        let text = text.strip_prefix(['v', 'V']).unwrap_or(text);
        let numeric = text.split(['-', '+']).next().unwrap_or_default();
        if numeric.is_empty() {
            return None;
        }

        let mut parts = [0u64; COMPONENTS];
        let mut count = 0;
        for (slot, piece) in parts.iter_mut().zip(numeric.split('.')) {
            *slot = piece.parse().ok()?;
            count += 1;
        }
        if numeric.split('.').count() > COMPONENTS {
            return None;
        }
        Some((Self { parts }, count))
    }

    /// The smallest version above every version sharing the first `len`
    /// components with `self`.
    fn bump(self, len: usize) -> Self {
        let len = len.clamp(1, COMPONENTS);
        let mut parts = [0u64; COMPONENTS];
        for (i, slot) in parts.iter_mut().enumerate().take(len) {
            *slot = self.parts.get(i).copied().unwrap_or_default();
        }
        if let Some(last) = parts.get_mut(len - 1) {
            *last = last.saturating_add(1);
        }
        Self { parts }
    }
}

impl FromStr for Version {
    type Err = SymlinksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_partial(s)
            .map(|(v, _)| v)
            .ok_or_else(|| SymlinksError::invalid(format!("Invalid version \"{s}\"")))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.parts;
        if d == 0 {
            write!(f, "{a}.{b}.{c}")
        } else {
            write!(f, "{a}.{b}.{c}.{d}")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Op {
    fn accepts(self, ord: Ordering) -> bool {
        match self {
            Self::Eq => ord == Ordering::Equal,
            Self::Ne => ord != Ordering::Equal,
            Self::Gt => ord == Ordering::Greater,
            Self::Ge => ord != Ordering::Less,
            Self::Lt => ord == Ordering::Less,
            Self::Le => ord != Ordering::Greater,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bound {
    op: Op,
    version: Version,
}

impl Bound {
    const fn new(op: Op, version: Version) -> Self {
        Self { op, version }
    }

    fn matches(&self, version: &Version) -> bool {
        self.op.accepts(version.cmp(&self.version))
    }
}

/// A parsed constraint: a disjunction of conjunctions of bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    alternatives: Vec<Vec<Bound>>,
}

impl Constraint {
    /// Whether `version` satisfies at least one alternative.
    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives
            .iter()
            .any(|all| all.iter().all(|b| b.matches(version)))
    }
}

impl FromStr for Constraint {
    type Err = SymlinksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SymlinksError::invalid(format!("Invalid version constraint \"{s}\""));

        let alternatives = s
            .split('|')
            .map(str::trim)
            .filter(|alt| !alt.is_empty())
            .map(|alt| parse_alternative(alt).ok_or_else(invalid))
            .collect::<Result<Vec<_>, _>>()?;

        if alternatives.is_empty() {
            return Err(invalid());
        }
        Ok(Self { alternatives })
    }
}

fn parse_alternative(text: &str) -> Option<Vec<Bound>> {
    let tokens = tokenize(text);

    if let [low, dash, high] = tokens.as_slice()
        && dash == "-"
    {
        return parse_hyphen_range(low, high);
    }

    let mut bounds = Vec::new();
    for token in &tokens {
        bounds.extend(parse_clause(token)?);
    }
    Some(bounds)
}

/// Split on commas and whitespace, gluing a bare operator to the version
/// that follows it (`>= 8.1` becomes `>=8.1`).
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut pending_op: Option<String> = None;

    for raw in text.split([',', ' ', '\t']).filter(|t| !t.is_empty()) {
        let is_bare_op = raw.chars().all(|c| matches!(c, '<' | '>' | '=' | '!' | '^' | '~'));
        if is_bare_op {
            pending_op = Some(raw.to_string());
            continue;
        }
        match pending_op.take() {
            Some(op) => tokens.push(format!("{op}{raw}")),
            None => tokens.push(raw.to_string()),
        }
    }
    if let Some(op) = pending_op {
        tokens.push(op);
    }
    tokens
}

fn parse_hyphen_range(low: &str, high: &str) -> Option<Vec<Bound>> {
    let (low, _) = Version::parse_partial(low)?;
    let (high, written) = Version::parse_partial(high)?;
    let upper = if written >= 3 {
        Bound::new(Op::Le, high)
    } else {
        Bound::new(Op::Lt, high.bump(written))
    };
    Some(vec![Bound::new(Op::Ge, low), upper])
}

fn parse_clause(token: &str) -> Option<Vec<Bound>> {
    if token == "*" || token.eq_ignore_ascii_case("x") {
        return Some(Vec::new());
    }

    if let Some(rest) = token.strip_prefix('^') {
        let (v, written) = Version::parse_partial(rest)?;
        let significant = v
            .parts
            .iter()
            .take(written)
            .position(|&p| p != 0)
            .map_or(written, |idx| idx + 1);
        return Some(vec![
            Bound::new(Op::Ge, v),
            Bound::new(Op::Lt, v.bump(significant)),
        ]);
    }

    if let Some(rest) = token.strip_prefix('~') {
        let (v, written) = Version::parse_partial(rest)?;
        let keep = if written <= 1 { 1 } else { written - 1 };
        return Some(vec![
            Bound::new(Op::Ge, v),
            Bound::new(Op::Lt, v.bump(keep)),
        ]);
    }

    if let Some(prefix) = token
        .strip_suffix(".*")
        .or_else(|| token.strip_suffix(".x"))
        .or_else(|| token.strip_suffix(".X"))
    {
        let (v, written) = Version::parse_partial(prefix)?;
        return Some(vec![
            Bound::new(Op::Ge, v),
            Bound::new(Op::Lt, v.bump(written)),
        ]);
    }

    let (op, rest) = split_operator(token);
    let (v, _) = Version::parse_partial(rest)?;
    Some(vec![Bound::new(op, v)])
}

fn split_operator(token: &str) -> (Op, &str) {
    const OPERATORS: [(&str, Op); 8] = [
        (">=", Op::Ge),
        ("<=", Op::Le),
        ("!=", Op::Ne),
        ("<>", Op::Ne),
        ("==", Op::Eq),
        (">", Op::Gt),
        ("<", Op::Lt),
        ("=", Op::Eq),
    ];
    OPERATORS
        .iter()
        .find_map(|(prefix, op)| token.strip_prefix(prefix).map(|rest| (*op, rest)))
        .unwrap_or((Op::Eq, token))
}
