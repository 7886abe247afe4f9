//! Building blocks for [`Validator`](crate::Validator) rules.
//!
//! Each function checks one value and returns a [`ValidationError`] whose
//! `code` and `params` end up in the problem payload.

use std::borrow::Cow;
use validator::{ValidateEmail, ValidationError};

fn error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// Non-empty after trimming whitespace.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("required", "must not be empty"));
    }
    Ok(())
}

/// At most `max` characters.
pub fn max_chars(value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        let mut err = error("length", format!("must be at most {max} characters"));
        err.add_param(Cow::Borrowed("max"), &max);
        return Err(err);
    }
    Ok(())
}

/// At least `min` characters.
pub fn min_chars(value: &str, min: usize) -> Result<(), ValidationError> {
    if value.chars().count() < min {
        let mut err = error("length", format!("must be at least {min} characters"));
        err.add_param(Cow::Borrowed("min"), &min);
        return Err(err);
    }
    Ok(())
}

pub fn at_least(value: i64, min: i64) -> Result<(), ValidationError> {
    if value < min {
        let mut err = error("range", format!("must be greater than or equal to {min}"));
        err.add_param(Cow::Borrowed("min"), &min);
        err.add_param(Cow::Borrowed("value"), &value);
        return Err(err);
    }
    Ok(())
}

/// Inclusive range check.
pub fn between(value: i64, min: i64, max: i64) -> Result<(), ValidationError> {
    if value < min || value > max {
        let mut err = error("range", format!("must be between {min} and {max}"));
        err.add_param(Cow::Borrowed("min"), &min);
        err.add_param(Cow::Borrowed("max"), &max);
        err.add_param(Cow::Borrowed("value"), &value);
        return Err(err);
    }
    Ok(())
}

/// Absent, or one of `allowed` ignoring ASCII case.
pub fn one_of_ignore_case(value: Option<&str>, allowed: &[&str]) -> Result<(), ValidationError> {
    match value {
        None => Ok(()),
        Some(v) if allowed.iter().any(|a| a.eq_ignore_ascii_case(v)) => Ok(()),
        Some(_) => {
            let mut err = error("one_of", format!("must be one of: {}", allowed.join(", ")));
            err.add_param(Cow::Borrowed("allowed"), &allowed);
            Err(err)
        }
    }
}

pub fn email(value: &str) -> Result<(), ValidationError> {
    if !value.validate_email() {
        return Err(error("email", "must be a valid email address"));
    }
    Ok(())
}

/// Non-empty collection.
pub fn not_empty<T>(values: &[T]) -> Result<(), ValidationError> {
    if values.is_empty() {
        return Err(error("required", "must contain at least one entry"));
    }
    Ok(())
}
