//! Form field validators for the schedule and settings pages.
//!
//! Validators return a [`Validation`] rather than `Result` because an invalid
//! field is an expected outcome that pages render inline, not an error.

#[cfg(test)]
#[path = "validation_test.rs"]
mod validation_test;

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::clock::Clock;
use super::storage::KeyValueStore;
use super::timezone::TimezoneService;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Outcome of checking one field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum Validation {
    Valid,
    Invalid(String),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid(message) => Some(message),
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(str::is_empty)
}

/// `"<field> is required"` for a missing or empty value.
pub fn required(value: Option<&str>, field: &str) -> Validation {
    if is_blank(value) {
        Validation::invalid(format!("{field} is required"))
    } else {
        Validation::Valid
    }
}

pub fn email(value: Option<&str>) -> Validation {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return Validation::invalid("Email is required");
    };
    if EMAIL_RE.is_match(value) {
        Validation::Valid
    } else {
        Validation::invalid("Please enter a valid email address")
    }
}

fn range_message(field: &str, min: impl std::fmt::Display, max: impl std::fmt::Display) -> Validation {
    Validation::invalid(format!("{field} must be between {min} and {max}"))
}

/// Any finite decimal in `[min, max]`. Blank input and hex or binary
/// literals are not numbers here.
pub fn number_in_range(value: &str, min: f64, max: f64, field: &str) -> Validation {
    let Some(n) = value.trim().parse::<f64>().ok().filter(|n| n.is_finite()) else {
        return Validation::invalid(format!("{field} must be a number"));
    };
    if n < min || n > max {
        return range_message(field, min, max);
    }
    Validation::Valid
}

/// Leading integer of `value`, the way HTML number inputs are read:
/// `"12"` and `"12.7"` give 12, `"abc"` gives `None`. Digit runs too long for
/// `i64` saturate so they still report as out of range.
fn leading_integer(value: &str) -> Option<i64> {
    let s = value.trim_start();
    let negative = s.starts_with('-');
    let sign_len = usize::from(s.starts_with(['+', '-']));
    let digits = s[sign_len..].bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let saturated = if negative { i64::MIN } else { i64::MAX };
    Some(s[..sign_len + digits].parse().unwrap_or(saturated))
}

/// Whole number in `[min, max]`.
pub fn integer_in_range(value: &str, min: i64, max: i64, field: &str) -> Validation {
    let Some(n) = leading_integer(value) else {
        return Validation::invalid(format!("{field} must be a whole number"));
    };
    if n < min || n > max {
        return range_message(field, min, max);
    }
    Validation::Valid
}

/// `value` must be one of `allowed`.
pub fn one_of(value: &str, allowed: &[&str], field: &str) -> Validation {
    if allowed.contains(&value) {
        Validation::Valid
    } else {
        Validation::invalid(format!("{field} must be one of: {}", allowed.join(", ")))
    }
}

fn truncate_to_minute(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.duration_trunc(TimeDelta::minutes(1)).unwrap_or(instant)
}

/// A schedule date/time (user's zone) that is not in the past.
///
/// With `allow_today` the comparison ignores the seconds of "now", so the
/// current minute is still accepted.
pub fn future_date<S: KeyValueStore, C: Clock>(
    timezones: &TimezoneService<S, C>,
    date: &str,
    time: &str,
    allow_today: bool,
) -> Validation {
    if date.is_empty() || time.is_empty() {
        return Validation::invalid("Date and time are required");
    }
    let Ok(selected) = timezones.try_convert_to_utc(date, time) else {
        return Validation::invalid("Invalid date or time format");
    };

    let now = timezones.clock().now();
    let now = if allow_today { truncate_to_minute(now) } else { now };
    if selected < now {
        return Validation::invalid("Scheduled time cannot be in the past");
    }
    Validation::Valid
}

/// One field's failure within a [`FormValidation`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Aggregate result for a whole form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FormValidation {
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

/// Collect `(field, result)` pairs into a form-level result, keeping field order.
pub fn validate_form<I, F>(checks: I) -> FormValidation
where
    I: IntoIterator<Item = (F, Validation)>,
    F: Into<String>,
{
    let errors: Vec<FieldError> = checks
        .into_iter()
        .filter_map(|(field, result)| match result {
            Validation::Valid => None,
            Validation::Invalid(message) => Some(FieldError { field: field.into(), message }),
        })
        .collect();
    FormValidation { valid: errors.is_empty(), errors }
}
