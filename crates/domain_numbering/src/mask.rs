//! Number masks
//!
//! A mask is literal text with `{TOKEN}` placeholders:
//!
//! | Token      | Expands to                                          |
//! |------------|-----------------------------------------------------|
//! | `{YYYY}`   | four-digit year                                     |
//! | `{YY}`     | two-digit year                                      |
//! | `{MM}`     | two-digit month                                     |
//! | `{DD}`     | two-digit day                                       |
//! | `{XXXX}`   | the counter, zero padded to the number of `X`s      |
//! | `{OTHER}`  | the caller's value for `OTHER`, or nothing          |
//!
//! [`Mask::parse`] rejects unclosed and empty placeholders when a generator
//! is configured. [`Mask::lenient`] never fails: a brace without a partner is
//! kept as text, so a stored mask always expands.

use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use std::fmt;

use crate::error::NumberingError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Year,
    ShortYear,
    Month,
    Day,
    Counter(usize),
    Value(String),
}

impl Segment {
    fn token(name: &str) -> Self {
        match name {
            "YYYY" => Segment::Year,
            "YY" => Segment::ShortYear,
            "MM" => Segment::Month,
            "DD" => Segment::Day,
            _ if !name.is_empty() && name.chars().all(|c| c == 'X') => Segment::Counter(name.len()),
            _ => Segment::Value(name.to_string()),
        }
    }
}

/// A parsed number mask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    raw: String,
    segments: Vec<Segment>,
}

impl Mask {
    /// Parses a mask, rejecting unclosed and empty placeholders
    pub fn parse(raw: &str) -> Result<Self, NumberingError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = raw;

        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = match after.find(['{', '}']) {
                Some(i) if after.as_bytes()[i] == b'}' => i,
                _ => {
                    return Err(NumberingError::malformed_mask(
                        raw,
                        format!("unclosed '{{' at offset {}", raw.len() - rest.len() + open),
                    ))
                }
            };
            let name = &after[..close];
            if name.is_empty() {
                return Err(NumberingError::malformed_mask(raw, "empty placeholder '{}'"));
            }
            flush(&mut literal, &mut segments);
            segments.push(Segment::token(name));
            rest = &after[close + 1..];
        }
        literal.push_str(rest);
        flush(&mut literal, &mut segments);

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Parses a mask, keeping braces without a partner as text
    pub fn lenient(raw: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = raw;

        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find(['{', '}']) {
                Some(close) if after.as_bytes()[close] == b'}' => {
                    flush(&mut literal, &mut segments);
                    segments.push(Segment::token(&after[..close]));
                    rest = &after[close + 1..];
                }
                // another '{' first, or none at all
                _ => {
                    literal.push('{');
                    rest = after;
                }
            }
        }
        literal.push_str(rest);
        flush(&mut literal, &mut segments);

        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the mask shows the counter at all
    pub fn has_counter(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Counter(_)))
    }

    /// Formats one number
    ///
    /// `counter` is shown as is; callers apply any XOR obscuring first. A
    /// counter wider than its placeholder is never truncated.
    pub fn expand(&self, counter: u64, today: NaiveDate, values: &HashMap<String, String>) -> String {
        let mut out = String::with_capacity(self.raw.len() + 8);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Year => out.push_str(&format!("{:04}", today.year())),
                Segment::ShortYear => out.push_str(&format!("{:02}", today.year().rem_euclid(100))),
                Segment::Month => out.push_str(&format!("{:02}", today.month())),
                Segment::Day => out.push_str(&format!("{:02}", today.day())),
                Segment::Counter(width) => out.push_str(&format!("{:0width$}", counter, width = *width)),
                Segment::Value(name) => {
                    if let Some(value) = values.get(name) {
                        out.push_str(value);
                    }
                }
            }
        }
        out
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn flush(literal: &mut String, segments: &mut Vec<Segment>) {
    if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(literal)));
    }
}
