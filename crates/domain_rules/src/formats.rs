//! Built-in format validators for common policyholder fields

use once_cell::sync::Lazy;
use regex::Regex;

use crate::operator::Operator;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("valid email pattern")
});

static PHONE_RU: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+7|8)\d{10}$").expect("valid phone pattern"));

static PHONE_INTERNATIONAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+\d{7,15}$").expect("valid phone pattern"));

static INN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{10}|\d{12})$").expect("valid INN pattern"));

static SNILS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{3}-\d{3}-\d{3} \d{2}$").expect("valid SNILS pattern"));

static PASSPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4} \d{6}$").expect("valid passport pattern"));

/// Phone numbers are checked with spaces, dashes and brackets removed
fn strip_phone_separators(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '\u{a0}'))
        .collect()
}

pub fn is_email(value: &str) -> bool {
    EMAIL.is_match(value.trim())
}

pub fn is_phone_ru(value: &str) -> bool {
    PHONE_RU.is_match(&strip_phone_separators(value.trim()))
}

pub fn is_phone_international(value: &str) -> bool {
    PHONE_INTERNATIONAL.is_match(&strip_phone_separators(value.trim()))
}

pub fn is_phone(value: &str) -> bool {
    is_phone_ru(value) || is_phone_international(value)
}

pub fn is_inn(value: &str) -> bool {
    INN.is_match(value.trim())
}

pub fn is_snils(value: &str) -> bool {
    SNILS.is_match(value.trim())
}

pub fn is_passport(value: &str) -> bool {
    PASSPORT.is_match(value.trim())
}

/// Applies the format check behind a format operator
///
/// Returns `false` for operators that are not format checks and for empty
/// values.
pub fn check_format(operator: Operator, value: &str) -> bool {
    if value.trim().is_empty() {
        return false;
    }
    match operator {
        Operator::Email => is_email(value),
        Operator::Phone => is_phone(value),
        Operator::PhoneRu => is_phone_ru(value),
        Operator::PhoneInternational => is_phone_international(value),
        Operator::Inn => is_inn(value),
        Operator::Snils => is_snils(value),
        Operator::Passport => is_passport(value),
        _ => false,
    }
}

/// Compiles a user pattern anchored to match the whole value
pub fn full_match(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})$", pattern))
}
