//! JSONPath-like locators over policy documents
//!
//! Supported syntax:
//!
//! ```text
//! $.policyHolder.person.birthDate          dotted fields, optional leading $
//! insuredObjects[0].covers[1].premium      array index
//! covers[?(@.code == "FIRE")].premium      first element whose field matches
//! covers[?(@.cover.code != 'THEFT')]       nested discriminant, != operator
//! ['field with spaces']                    bracketed field name
//! ```
//!
//! Reading never fails: a path that does not lead to a node yields `None`.
//! Writing creates whatever structure is missing.

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::PathError;
use crate::value::parse_decimal;

/// Comparison inside a predicate selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateOp {
    Equals,
    NotEquals,
}

/// Literal on the right side of a predicate selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Text(String),
    Number(Decimal),
    Bool(bool),
}

impl Literal {
    fn matches(&self, node: &Value) -> bool {
        match (self, node) {
            (Literal::Text(expected), Value::String(actual)) => expected == actual,
            (Literal::Text(expected), Value::Number(actual)) => *expected == actual.to_string(),
            (Literal::Number(expected), Value::Number(actual)) => {
                parse_decimal(&actual.to_string()) == Some(*expected)
            }
            (Literal::Number(expected), Value::String(actual)) => {
                parse_decimal(actual) == Some(*expected)
            }
            (Literal::Bool(expected), Value::Bool(actual)) => expected == actual,
            _ => false,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Literal::Text(s) => Value::String(s.clone()),
            Literal::Number(d) => serde_json::from_str::<serde_json::Number>(&d.to_string())
                .map(Value::Number)
                .unwrap_or_else(|_| Value::String(d.to_string())),
            Literal::Bool(b) => Value::Bool(*b),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Text(s) => write_quoted(f, s),
            Literal::Number(d) => write!(f, "{}", d),
            Literal::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Element selector `[?(@.field == literal)]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    /// Dotted field path relative to the array element
    pub field: Vec<String>,
    pub op: PredicateOp,
    pub literal: Literal,
}

impl Predicate {
    /// Returns true if the array element satisfies the predicate
    pub fn matches(&self, element: &Value) -> bool {
        let mut current = element;
        for name in &self.field {
            match current.get(name) {
                Some(next) => current = next,
                None => return self.op == PredicateOp::NotEquals,
            }
        }
        let equal = self.literal.matches(current);
        match self.op {
            PredicateOp::Equals => equal,
            PredicateOp::NotEquals => !equal,
        }
    }

    /// Builds a new element that satisfies an equality predicate
    fn seed_element(&self) -> Value {
        let mut element = Value::Object(Map::new());
        if self.op == PredicateOp::Equals {
            let mut current = &mut element;
            for name in &self.field {
                current = ensure_object(current)
                    .entry(name.clone())
                    .or_insert(Value::Null);
            }
            *current = self.literal.to_json();
        }
        element
    }
}

/// One step of a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Field(String),
    Index(usize),
    Filter(Predicate),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Field(name) if is_plain_field(name) => write!(f, ".{}", name),
            Segment::Field(name) => {
                f.write_str("[")?;
                write_quoted(f, name)?;
                f.write_str("]")
            }
            Segment::Index(i) => write!(f, "[{}]", i),
            Segment::Filter(p) => {
                let op = match p.op {
                    PredicateOp::Equals => "==",
                    PredicateOp::NotEquals => "!=",
                };
                write!(f, "[?(@.{} {} {})]", p.field.join("."), op, p.literal)
            }
        }
    }
}

fn is_field_terminator(c: char) -> bool {
    matches!(c, '.' | '[' | '=' | '!' | ')') || c.is_whitespace()
}

/// True if the name can be written after a dot and read back unchanged
fn is_plain_field(name: &str) -> bool {
    !name.is_empty() && !name.contains(is_field_terminator)
}

/// Quoted strings carry no escapes, so pick the quote the text lacks
fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    let quote = if text.contains('"') { '\'' } else { '"' };
    write!(f, "{}{}{}", quote, text, quote)
}

/// A parsed locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// Parses a path expression
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        Parser::new(raw).parse()
    }

    /// Returns the parsed segments
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Appends `other` to this path
    pub fn join(&self, other: &Path) -> Path {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Path { segments }
    }

    /// Returns the node this path points at, if it exists
    pub fn read<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        let mut current = document;
        for segment in &self.segments {
            current = match segment {
                Segment::Field(name) => current.as_object()?.get(name)?,
                Segment::Index(i) => current.as_array()?.get(*i)?,
                Segment::Filter(predicate) => current
                    .as_array()?
                    .iter()
                    .find(|element| predicate.matches(element))?,
            };
        }
        Some(current)
    }

    /// Stores `value` at this path, creating missing objects and arrays
    ///
    /// Arrays are padded with empty objects up to the index. A predicate that
    /// matches no element appends one carrying the discriminant field.
    /// Scalars standing where a container is needed are replaced.
    pub fn write(&self, document: &mut Value, value: Value) {
        let mut current = document;
        for segment in &self.segments {
            current = match segment {
                Segment::Field(name) => ensure_object(current)
                    .entry(name.clone())
                    .or_insert(Value::Null),
                Segment::Index(i) => {
                    let items = ensure_array(current);
                    while items.len() <= *i {
                        items.push(Value::Object(Map::new()));
                    }
                    &mut items[*i]
                }
                Segment::Filter(predicate) => {
                    let items = ensure_array(current);
                    let found = items.iter().position(|e| predicate.matches(e));
                    let position = match found {
                        Some(position) => position,
                        None => {
                            items.push(predicate.seed_element());
                            items.len() - 1
                        }
                    };
                    &mut items[position]
                }
            };
        }
        *current = value;
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.segments {
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced with an object"),
    }
}

fn ensure_array(node: &mut Value) -> &mut Vec<Value> {
    if !node.is_array() {
        *node = Value::Array(Vec::new());
    }
    match node {
        Value::Array(items) => items,
        _ => unreachable!("node was just replaced with an array"),
    }
}

struct Parser<'a> {
    raw: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            raw,
            chars: raw.trim().chars().collect(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<Path, PathError> {
        if self.chars.is_empty() {
            return Err(PathError::Empty);
        }

        if self.peek() == Some('$') {
            self.pos += 1;
            if self.peek() == Some('.') {
                self.pos += 1;
            }
        }

        let mut segments = Vec::new();
        let mut expect_field = true;

        while let Some(c) = self.peek() {
            match c {
                '[' => {
                    segments.push(self.bracket()?);
                    expect_field = false;
                }
                '.' if !expect_field => {
                    self.pos += 1;
                    expect_field = true;
                }
                _ if expect_field => {
                    segments.push(Segment::Field(self.field_name()?));
                    expect_field = false;
                }
                _ => return Err(self.error("expected '.' or '['")),
            }
        }

        if expect_field && !segments.is_empty() {
            return Err(self.error("path ends with '.'"));
        }
        if segments.is_empty() {
            return Err(PathError::Empty);
        }

        Ok(Path { segments })
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn error(&self, message: &str) -> PathError {
        PathError::syntax(self.raw, self.pos, message)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: &str) -> Result<(), PathError> {
        for c in expected.chars() {
            if self.peek() != Some(c) {
                return Err(self.error(&format!("expected '{}'", expected)));
            }
            self.pos += 1;
        }
        Ok(())
    }

    fn field_name(&mut self) -> Result<String, PathError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_field_terminator(c) {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected field name"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn bracket(&mut self) -> Result<Segment, PathError> {
        self.expect("[")?;
        self.skip_whitespace();

        let segment = match self.peek() {
            Some('?') => Segment::Filter(self.predicate()?),
            Some('\'') | Some('"') => Segment::Field(self.quoted()?),
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
                let digits: String = self.chars[start..self.pos].iter().collect();
                let index = digits
                    .parse()
                    .map_err(|_| self.error("array index out of range"))?;
                Segment::Index(index)
            }
            _ => return Err(self.error("expected index, quoted field or predicate")),
        };

        self.skip_whitespace();
        self.expect("]")?;
        Ok(segment)
    }

    fn predicate(&mut self) -> Result<Predicate, PathError> {
        self.expect("?(")?;
        self.skip_whitespace();
        self.expect("@.")?;

        let mut field = vec![self.field_name()?];
        while self.peek() == Some('.') {
            self.pos += 1;
            field.push(self.field_name()?);
        }

        self.skip_whitespace();
        let op = match (self.peek(), self.chars.get(self.pos + 1).copied()) {
            (Some('='), Some('=')) => {
                self.pos += 2;
                PredicateOp::Equals
            }
            (Some('!'), Some('=')) => {
                self.pos += 2;
                PredicateOp::NotEquals
            }
            (Some('='), _) => {
                self.pos += 1;
                PredicateOp::Equals
            }
            _ => return Err(self.error("expected '==' or '!='")),
        };

        self.skip_whitespace();
        let literal = self.literal()?;
        self.skip_whitespace();
        self.expect(")")?;

        Ok(Predicate { field, op, literal })
    }

    fn quoted(&mut self) -> Result<String, PathError> {
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.error("expected quote")),
        };
        self.pos += 1;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == quote {
                let text: String = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                return Ok(text);
            }
            self.pos += 1;
        }
        Err(self.error("unterminated string"))
    }

    fn literal(&mut self) -> Result<Literal, PathError> {
        match self.peek() {
            Some('\'') | Some('"') => Ok(Literal::Text(self.quoted()?)),
            Some(_) => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c != ')' && !c.is_whitespace()) {
                    self.pos += 1;
                }
                let token: String = self.chars[start..self.pos].iter().collect();
                match token.as_str() {
                    "true" => Ok(Literal::Bool(true)),
                    "false" => Ok(Literal::Bool(false)),
                    _ => Decimal::from_str(&token)
                        .map(Literal::Number)
                        .map_err(|_| self.error("expected quoted text, number or boolean")),
                }
            }
            None => Err(self.error("expected literal")),
        }
    }
}
