//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper produces an `invalid_request` error whose details carry the
//! offending `field` and a stable machine-readable `code`.

use std::str::FromStr;

use pagination::{DEFAULT_LIMIT, PageRequest};
use serde_json::json;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidValue,
    InvalidBoolean,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::InvalidBoolean => "invalid_boolean",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: ErrorCode, value: Option<&str>) -> Error {
    let mut details = json!({
        "field": field.as_str(),
        "code": code.as_str(),
    });
    if let Some(value) = value {
        details["value"] = json!(value);
    }
    Error::invalid_request(message).with_details(details)
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        format!("missing required field: {name}"),
        ErrorCode::MissingField,
        None,
    )
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let name = field.as_str();
    field_error(
        field,
        format!("{name} must be a valid UUID"),
        ErrorCode::InvalidUuid,
        Some(value),
    )
}

pub(crate) fn invalid_value_error(field: FieldName, value: &str, reason: impl ToString) -> Error {
    field_error(
        field,
        reason.to_string(),
        ErrorCode::InvalidValue,
        Some(value),
    )
}

/// Parse a typed identifier from a path or body value.
pub(crate) fn parse_id<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr,
{
    value
        .parse::<T>()
        .map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_optional_id<T>(value: Option<&str>, field: FieldName) -> Result<Option<T>, Error>
where
    T: FromStr,
{
    value.map(|raw| parse_id(raw, field)).transpose()
}

/// Parse a wire enum such as a status or area code.
pub(crate) fn parse_enum<T>(
    value: &str,
    field: FieldName,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T, Error> {
    parse(value).ok_or_else(|| {
        let name = field.as_str();
        invalid_value_error(field, value, format!("unsupported {name}: {value}"))
    })
}

/// Treat absent or blank query parameters as "no filter".
pub(crate) fn parse_optional_enum<T>(
    value: Option<&str>,
    field: FieldName,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<Option<T>, Error> {
    value
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| parse_enum(raw, field, parse))
        .transpose()
}

/// Parse a `true`/`false` query flag; blank values mean "unset".
pub(crate) fn parse_optional_bool(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<bool>, Error> {
    let Some(raw) = value.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    if raw.eq_ignore_ascii_case("true") {
        Ok(Some(true))
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(Some(false))
    } else {
        let name = field.as_str();
        Err(field_error(
            field,
            format!("{name} must be true or false"),
            ErrorCode::InvalidBoolean,
            Some(raw),
        ))
    }
}

/// Build a page request from raw `page`/`limit` query values.
///
/// Unparseable values fall back to the defaults rather than failing.
pub(crate) fn page_request(page: Option<&str>, limit: Option<&str>) -> PageRequest {
    let parse = |raw: Option<&str>| raw.and_then(|value| value.trim().parse::<u32>().ok());
    PageRequest::lenient(parse(page), parse(limit), DEFAULT_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode as DomainCode, VolunteerId, VolunteerStatus};
    use rstest::rstest;

    const FIELD: FieldName = FieldName::new("id");

    #[rstest]
    fn parses_typed_identifiers() {
        let raw = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
        let id: VolunteerId = parse_id(raw, FIELD).expect("valid id");
        assert_eq!(id.to_string(), raw);
    }

    #[rstest]
    #[case("")]
    #[case("not-a-uuid")]
    fn rejects_malformed_identifiers(#[case] raw: &str) {
        let err = parse_id::<VolunteerId>(raw, FIELD).expect_err("invalid id");
        assert_eq!(err.code(), DomainCode::InvalidRequest);
        assert_eq!(
            err.details(),
            Some(&json!({"field": "id", "code": "invalid_uuid", "value": raw}))
        );
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some("ACTIVO"), Some(VolunteerStatus::Active))]
    fn parses_optional_enums(#[case] raw: Option<&str>, #[case] expected: Option<VolunteerStatus>) {
        let parsed = parse_optional_enum(raw, FieldName::new("status"), VolunteerStatus::parse)
            .expect("parses");
        assert_eq!(parsed, expected);
    }

    #[rstest]
    fn unknown_enum_values_report_the_field() {
        let err = parse_optional_enum(
            Some("DORMIDO"),
            FieldName::new("status"),
            VolunteerStatus::parse,
        )
        .expect_err("unknown status");
        let details = err.details().expect("details");
        assert_eq!(details["field"], "status");
        assert_eq!(details["code"], "invalid_value");
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some("true"), Some(true))]
    #[case(Some("FALSE"), Some(false))]
    #[case(Some(" "), None)]
    fn parses_optional_flags(#[case] raw: Option<&str>, #[case] expected: Option<bool>) {
        assert_eq!(
            parse_optional_bool(raw, FieldName::new("published")).expect("parses"),
            expected
        );
    }

    #[rstest]
    fn rejects_non_boolean_flags() {
        let err = parse_optional_bool(Some("yes"), FieldName::new("published"))
            .expect_err("not a boolean");
        assert_eq!(err.details().expect("details")["code"], "invalid_boolean");
    }

    #[rstest]
    #[case(None, None, 1, 10)]
    #[case(Some("3"), Some("25"), 3, 25)]
    #[case(Some("0"), Some("1000"), 1, 100)]
    #[case(Some("abc"), Some("-4"), 1, 10)]
    fn page_requests_are_lenient(
        #[case] page: Option<&str>,
        #[case] limit: Option<&str>,
        #[case] expected_page: u32,
        #[case] expected_limit: u32,
    ) {
        let request = page_request(page, limit);
        assert_eq!((request.page(), request.limit()), (expected_page, expected_limit));
    }

    #[rstest]
    fn missing_fields_have_no_value() {
        let err = missing_field_error(FieldName::new("email"));
        assert_eq!(
            err.details(),
            Some(&json!({"field": "email", "code": "missing_field"}))
        );
    }
}
