//! Inclusive decimal ranges written as `"min-max"`
//!
//! Used by range validation rules and by range columns of coefficient
//! tables. Negative bounds are allowed: `"-10--5"` is the range from -10 to -5.

use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// A closed interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl DecimalRange {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    /// Returns true if `value` lies within the range, bounds included
    pub fn contains(&self, value: Decimal) -> bool {
        self.min <= value && value <= self.max
    }

    /// Parses `"min-max"`, returning `None` for anything else
    pub fn parse(raw: &str) -> Option<Self> {
        let text: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = text.as_bytes();

        // The separator is a '-' that is not a sign: not first, not after another '-'
        for (i, &b) in bytes.iter().enumerate().skip(1) {
            if b != b'-' || matches!(bytes[i - 1], b'-' | b'e' | b'E') {
                continue;
            }
            let (min, max) = (&text[..i], &text[i + 1..]);
            if let (Some(min), Some(max)) = (parse_bound(min), parse_bound(max)) {
                return Some(Self { min, max });
            }
        }
        None
    }
}

fn parse_bound(raw: &str) -> Option<Decimal> {
    let normalised = raw.replace(',', ".");
    Decimal::from_str(&normalised).ok()
}

impl fmt::Display for DecimalRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}
