//! Required-field and format checks on incoming request bodies.
//!
//! A missing field reads as the empty string, there is no "leave unchanged"
//! mode. Checks never compare fields against each other, except that the
//! password confirmation must match.

use lazy_static::lazy_static;
use regex::Regex;
use time::{macros::format_description, Date};

use crate::error::{AppError, FieldErrors};

pub mod auth;
pub mod entries;
pub mod profile;

pub use auth::{validate_login, validate_register};
pub use entries::{validate_education, validate_experience};
pub use profile::validate_profile;

/// Outcome of a validator.
#[derive(Debug, Clone, Default)]
pub struct Validation {
    pub errors: FieldErrors,
    pub is_valid: bool,
}

impl Validation {
    /// Turns an invalid outcome into a 400 carrying the error map.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_valid {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

/// Accumulates errors; the first failure recorded for a field wins.
#[derive(Default)]
pub(crate) struct Checks {
    errors: FieldErrors,
}

impl Checks {
    pub(crate) fn fail(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub(crate) fn required(&mut self, field: &str, value: &str, message: &str) -> bool {
        if value.is_empty() {
            self.fail(field, message);
            false
        } else {
            true
        }
    }

    pub(crate) fn length(&mut self, field: &str, value: &str, min: usize, max: usize, message: &str) {
        let len = value.chars().count();
        if len < min || len > max {
            self.fail(field, message);
        }
    }

    pub(crate) fn finish(self) -> Validation {
        let is_valid = self.errors.is_empty();
        Validation {
            errors: self.errors,
            is_valid,
        }
    }
}

/// Absent reads as empty; surrounding whitespace is ignored.
pub(crate) fn text(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or("")
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn is_valid_url(url: &str) -> bool {
    lazy_static! {
        static ref URL_RE: Regex =
            Regex::new(r"^(?i)(https?://)?([a-z0-9](-*[a-z0-9])*\.)+[a-z]{2,}(:\d+)?(/\S*)?$")
                .unwrap();
    }
    URL_RE.is_match(url)
}

/// Parses the `YYYY-MM-DD` form used by the entry forms.
pub fn parse_date(value: &str) -> Option<Date> {
    Date::parse(value, format_description!("[year]-[month]-[day]")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("ada@example.com"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn url_shapes() {
        assert!(is_valid_url("https://github.com/ada"));
        assert!(is_valid_url("www.example.org"));
        assert!(is_valid_url("http://localhost.dev:8080/x?y=1"));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url("https://"));
    }

    #[test]
    fn dates_parse_only_in_iso_form() {
        assert!(parse_date("2020-02-29").is_some());
        assert!(parse_date("2021-02-29").is_none());
        assert!(parse_date("29/02/2020").is_none());
    }

    #[test]
    fn first_failure_per_field_wins() {
        let mut checks = Checks::default();
        checks.fail("handle", "first");
        checks.fail("handle", "second");
        let outcome = checks.finish();
        assert!(!outcome.is_valid);
        assert_eq!(outcome.errors["handle"], "first");
    }
}
