//! Structural checks on command inputs
//!
//! These run before any call to the database port. Type-level checks (enumerations, UUIDs,
//! prices) already happen while deserializing, this covers what the types cannot express.

use chrono::{DateTime, NaiveDate};
use std::borrow::Cow;

/// Input checks implemented by every command request that carries user data
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("{field} {reason}")]
pub struct ValidationError {
    /// Name of the offending field, as it appears on the wire
    pub field: &'static str,
    pub reason: Cow<'static, str>,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

pub fn non_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "should not be empty"));
    }
    Ok(())
}

/// Parse an ISO 8601 date string
///
/// Both plain dates (`2000-01-31`) and full timestamps (`2000-01-31T00:00:00Z`) are accepted.
/// Only the date part of a timestamp is kept.
pub fn parse_birthdate(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.date_naive())
        .map_err(|_| ValidationError::new(field, "must be a valid ISO 8601 date string"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use speculoos::prelude::*;

    #[rstest]
    #[case("2000-01-01", (2000, 1, 1))]
    #[case(" 1987-12-31 ", (1987, 12, 31))]
    #[case("2000-02-29T10:15:00Z", (2000, 2, 29))]
    #[case("2010-06-15T23:30:00+02:00", (2010, 6, 15))]
    fn test_parse_birthdate_valid(#[case] input: &str, #[case] expected: (i32, u32, u32)) {
        let (year, month, day) = expected;
        assert_that!(parse_birthdate("birthdate", input))
            .is_ok()
            .is_equal_to(NaiveDate::from_ymd_opt(year, month, day).unwrap());
    }

    #[rstest]
    #[case("")]
    #[case("yesterday")]
    #[case("2001-02-29")]
    #[case("01/02/2000")]
    fn test_parse_birthdate_invalid(#[case] input: &str) {
        assert_that!(parse_birthdate("birthdate", input))
            .is_err()
            .matches(|err| err.field == "birthdate");
    }

    #[rstest]
    #[case("", false)]
    #[case("   ", false)]
    #[case("Jane", true)]
    fn test_non_blank(#[case] input: &str, #[case] valid: bool) {
        assert_that!(non_blank("firstName", input).is_ok()).is_equal_to(valid);
    }

    #[test]
    fn test_error_message() {
        let err = ValidationError::new("name", "should not be empty");
        assert_that!(err.to_string()).is_equal_to("name should not be empty".to_string());
    }
}
