//! Shared validation helpers for inbound HTTP adapters.
//!
//! Identifiers and amounts are parsed here, before any port is called, so a
//! malformed request never reaches the ledger.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::ledger_errors::field_code;
use crate::domain::{Error, IdentifierError, Money};

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: FieldName,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    fn with_value(self, code: &str, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field.as_str(),
            "value": value.into(),
            "code": code,
        }))
    }
}

/// Monetary amount as sent by clients.
///
/// Both `"1500.25"` and `1500.25` are accepted. Numbers are re-read from
/// their textual form so no binary floating point rounding is involved.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AmountInput {
    /// Decimal string such as `"1500.25"`.
    Text(String),
    /// Bare JSON number.
    Number(serde_json::Number),
}

impl fmt::Display for AmountInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

impl From<&str> for AmountInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let name = field.as_str();
    ValidationError::new(field, format!("{name} must be a valid UUID"))
        .with_value(field_code::INVALID_UUID, value)
}

/// Parse a ledger identifier (`RegisterId`, `CashSessionId`).
pub(crate) fn parse_id<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr<Err = IdentifierError>,
{
    T::from_str(value).map_err(|_| invalid_uuid_error(field, value))
}

/// Parse a non-negative amount with at most four fractional digits.
pub(crate) fn parse_money(value: &AmountInput, field: FieldName) -> Result<Money, Error> {
    let raw = value.to_string();
    raw.parse::<Money>().map_err(|err| {
        let name = field.as_str();
        ValidationError::new(field, format!("{name} is invalid: {err}"))
            .with_value(field_code::INVALID_AMOUNT, raw)
    })
}
