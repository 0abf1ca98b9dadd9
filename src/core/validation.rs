//! Field-level validation shared by every form.
//!
//! Each check returns the first failure as [`Error::Validation`] naming the field, so a
//! form can be rejected before anything touches the database.

use crate::{
    entities::Choice,
    errors::{Error, Result},
};
use regex::Regex;
use sea_orm::{ConnectionTrait, EntityTrait, Select};
use std::sync::LazyLock;

#[allow(clippy::expect_used)] // Constant pattern, checked by the tests below
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?1?\d{9,15}$").expect("phone pattern is valid"));

/// Message shown for malformed phone numbers
pub const PHONE_FORMAT_MESSAGE: &str =
    "Phone number must be entered in the format: '+999999999'. Up to 15 digits allowed.";

/// Checks a phone number: optional `+`, optional leading `1`, then 9 to 15 digits.
pub fn validate_phone(field: &'static str, value: &str) -> Result<()> {
    if PHONE_RE.is_match(value) {
        Ok(())
    } else {
        Err(Error::validation(field, PHONE_FORMAT_MESSAGE))
    }
}

/// Like [`validate_phone`] but accepts an empty value.
pub fn validate_optional_phone(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        Ok(())
    } else {
        validate_phone(field, value)
    }
}

/// Trims a required text field and checks it fits in `max_len` characters.
pub fn required(field: &'static str, value: &str, max_len: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, "This field is required."));
    }
    max_length(field, trimmed, max_len)?;
    Ok(trimmed.to_string())
}

/// Checks an optional text field fits in `max_len` characters.
pub fn max_length(field: &'static str, value: &str, max_len: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max_len {
        return Err(Error::validation(
            field,
            format!("Ensure this value has at most {max_len} characters (it has {len})."),
        ));
    }
    Ok(())
}

/// Minimal email shape check: one `@`, non-empty local part, dotted domain.
pub fn validate_email(field: &'static str, value: &str) -> Result<()> {
    let valid = value.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.contains('@')
            && !value.contains(char::is_whitespace)
            && domain
                .split('.')
                .filter(|part| !part.is_empty())
                .count()
                >= 2
            && !domain.starts_with('.')
            && !domain.ends_with('.')
    });
    if valid {
        Ok(())
    } else {
        Err(Error::validation(field, "Enter a valid email address."))
    }
}

/// Integer lower bound.
pub fn min_int(field: &'static str, value: i32, min: i32) -> Result<()> {
    if value < min {
        return Err(Error::validation(
            field,
            format!("Ensure this value is greater than or equal to {min}."),
        ));
    }
    Ok(())
}

/// Decimal lower bound. Rejects NaN and infinities as well.
pub fn min_amount(field: &'static str, value: f64, min: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::validation(field, "Enter a number."));
    }
    if value < min {
        return Err(Error::validation(
            field,
            format!("Ensure this value is greater than or equal to {min}."),
        ));
    }
    Ok(())
}

/// Parses a stored choice value such as `in_progress`.
pub fn parse_choice<E: Choice>(field: &str, value: &str) -> Result<E> {
    E::try_from_value(&value.to_string()).map_err(|_| Error::InvalidChoice {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Fails with [`Error::Duplicate`] when `query` matches any row.
///
/// Callers filter on the unique column and exclude the row being edited.
pub async fn ensure_unique<E, C>(
    db: &C,
    query: Select<E>,
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<()>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    if query.one(db).await?.is_some() {
        return Err(Error::Duplicate {
            entity,
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}
