//! Boolean-predicate query filters over asset records.
//!
//! Two tiers: a structured grammar (whitespace-separated `field:value`
//! clauses with `+`/`-` prefixes, quoted values, and `*` globs), and a
//! degraded exact-match conjunction used when the structured parse fails.

use nom::{
    branch::alt,
    bytes::complete::{take_until, take_while1},
    character::complete::{char, multispace0},
    combinator::{eof, map, opt},
    multi::many1,
    sequence::{delimited, preceded, terminated},
    IResult,
};
use serde_json::Value;

use crate::error::QueryParseError;
use crate::record::Record;

#[derive(Debug, Clone, PartialEq)]
enum Op {
    /// `field:*` — field present and non-null.
    Exists,
    /// Strict string equality; no type coercion, no substring match.
    Equals(String),
    /// Pattern with `*` wildcards, matched against string values only.
    Glob(String),
}

#[derive(Debug, Clone, PartialEq)]
struct Clause {
    field: String,
    op: Op,
    negated: bool,
}

impl Clause {
    fn matches(&self, record: &Record) -> bool {
        let hit = match &self.op {
            Op::Exists => record.is_present(&self.field),
            Op::Equals(expected) => {
                matches!(record.get(&self.field), Some(Value::String(s)) if s == expected)
            }
            Op::Glob(pattern) => match record.get(&self.field) {
                Some(Value::String(s)) => glob_match(pattern, s),
                _ => false,
            },
        };
        hit != self.negated
    }
}

/// A compiled record predicate. Stateless: safe to apply repeatedly and
/// share across queries.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    /// Compile a query string with the structured grammar.
    pub fn parse(query: &str) -> Result<Self, QueryParseError> {
        match full_query(query) {
            Ok((_, clauses)) => Ok(Self { clauses }),
            Err(err) => Err(QueryParseError {
                query: query.to_string(),
                reason: err.to_string(),
            }),
        }
    }

    /// Build the degraded filter: tokens split once on the first `:`, all
    /// pairs required to match exactly (`*` value means presence).
    pub fn simple(query: &str) -> Self {
        let clauses = query
            .split_whitespace()
            .map(|token| {
                let (field, value) = token.split_once(':').unwrap_or((token, ""));
                let op = if value == "*" {
                    Op::Exists
                } else {
                    Op::Equals(value.to_string())
                };
                Clause {
                    field: field.to_string(),
                    op,
                    negated: false,
                }
            })
            .collect();
        Self { clauses }
    }

    /// Whether the record satisfies every clause.
    pub fn matches(&self, record: &Record) -> bool {
        self.clauses.iter().all(|c| c.matches(record))
    }

    /// Conjunction of two filters.
    pub fn and(mut self, other: Filter) -> Filter {
        self.clauses.extend(other.clauses);
        self
    }

    /// Compile a query, degrading to the simple filter when the structured
    /// parse fails. Returns `None` for the match-all queries (empty, `*:*`).
    pub fn compile(query: &str) -> Option<Self> {
        let query = query.trim();
        if query.is_empty() || query == "*:*" {
            return None;
        }
        match Self::parse(query) {
            Ok(filter) => Some(filter),
            Err(err) => {
                log::error!("{err}; using simple filter");
                Some(Self::simple(query))
            }
        }
    }
}

fn field_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '.' || c == '-')(input)
}

fn quoted_value(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_until("\""), char('"'))(input)
}

fn bare_value(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace())(input)
}

fn clause(input: &str) -> IResult<&str, Clause> {
    let (input, sign) = opt(alt((char('+'), char('-'))))(input)?;
    let (input, field) = field_name(input)?;
    let (input, _) = char(':')(input)?;
    let (input, (value, quoted)) = alt((
        map(quoted_value, |v| (v, true)),
        map(bare_value, |v| (v, false)),
    ))(input)?;

    let op = if quoted {
        Op::Equals(value.to_string())
    } else if value == "*" {
        Op::Exists
    } else if value.contains('*') {
        Op::Glob(value.to_string())
    } else {
        Op::Equals(value.to_string())
    };
    Ok((
        input,
        Clause {
            field: field.to_string(),
            op,
            negated: sign == Some('-'),
        },
    ))
}

fn full_query(input: &str) -> IResult<&str, Vec<Clause>> {
    terminated(
        many1(preceded(multispace0, clause)),
        preceded(multispace0, eof),
    )(input)
}

/// Match `text` against a pattern containing `*` wildcards.
fn glob_match(pattern: &str, text: &str) -> bool {
    let mut parts = pattern.split('*');
    let first = parts.next().unwrap_or("");
    if !text.starts_with(first) {
        return false;
    }
    let mut pos = first.len();
    let mut middle: Vec<&str> = parts.collect();
    let last = if pattern.ends_with('*') {
        None
    } else {
        middle.pop()
    };
    for part in middle {
        if part.is_empty() {
            continue;
        }
        match text[pos..].find(part) {
            Some(i) => pos += i + part.len(),
            None => return false,
        }
    }
    match last {
        Some(suffix) => text[pos..].ends_with(suffix),
        None => true,
    }
}
