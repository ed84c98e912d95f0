//! Validation of untyped request payloads.
//!
//! A [`ParameterContainer`] wraps one JSON object as received from a client and
//! hands out typed values field by field. Every failure is an
//! `invalid-argument` [`FunctionsError`] with a fixed message format that
//! clients test against. Nothing here performs I/O.

use serde_json::{Map, Value};

use crate::error::FunctionsError;
use crate::ids::Guid;
use crate::utc_date::UtcDate;

/// JavaScript `typeof` of a payload value; `None` is a missing field.
pub fn type_of(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::String(_)) => "string",
        Some(Value::Number(_)) => "number",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Null | Value::Array(_) | Value::Object(_)) => "object",
    }
}

fn describe(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// `Couldn't parse '<field>'. Expected type '<expected>', but got ...`
pub fn type_error(field: &str, expected: &str, value: Option<&Value>) -> FunctionsError {
    let got = match value {
        None | Some(Value::Null) => "undefined or null".to_string(),
        Some(v) => describe(Some(v)),
    };
    FunctionsError::invalid_argument(format!(
        "Couldn't parse '{field}'. Expected type '{expected}', but got {got}."
    ))
}

/// Message for a value outside an enumerated set of strings.
pub fn enum_error(
    context: &str,
    field: &str,
    accepted: &[&str],
    value: Option<&Value>,
) -> FunctionsError {
    let quoted: Vec<String> = accepted.iter().map(|v| format!("'{v}'")).collect();
    let listed = match quoted.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} or {last}", rest.join(", ")),
    };
    FunctionsError::invalid_argument(format!(
        "Couldn't parse {context} parameter '{field}'. Expected values {listed}, but got '{}' from type '{}'.",
        describe(value),
        type_of(value),
    ))
}

/// Match a string field against `(literal, variant)` pairs.
pub fn parse_enum<T: Copy>(
    context: &str,
    field: &str,
    value: Option<&Value>,
    variants: &[(&str, T)],
) -> Result<T, FunctionsError> {
    if let Some(Value::String(s)) = value {
        if let Some((_, variant)) = variants.iter().find(|(literal, _)| literal == s) {
            return Ok(*variant);
        }
    }
    let accepted: Vec<&str> = variants.iter().map(|(literal, _)| *literal).collect();
    Err(enum_error(context, field, &accepted, value))
}

/// A value that can be read out of a request payload.
pub trait FromParameter: Sized {
    /// `value` is the raw field content, `None` when the key is absent.
    fn from_parameter(field: &str, value: Option<&Value>) -> Result<Self, FunctionsError>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterContainer {
    data: Map<String, Value>,
}

impl ParameterContainer {
    pub fn from_map(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// Wrap the top level of a request, which must be an object.
    pub fn from_value(value: &Value) -> Result<Self, FunctionsError> {
        Self::from_field("parameters", Some(value))
    }

    /// Wrap a nested field that must be an object.
    pub fn from_field(field: &str, value: Option<&Value>) -> Result<Self, FunctionsError> {
        match value {
            Some(Value::Object(map)) => Ok(Self::from_map(map.clone())),
            other => Err(type_error(field, "object", other)),
        }
    }

    pub fn raw(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// Present and not null.
    pub fn contains(&self, field: &str) -> bool {
        !matches!(self.data.get(field), None | Some(Value::Null))
    }

    pub fn string(&self, field: &str) -> Result<&str, FunctionsError> {
        match self.raw(field) {
            Some(Value::String(s)) => Ok(s),
            other => Err(type_error(field, "string", other)),
        }
    }

    pub fn optional_string(&self, field: &str) -> Result<Option<&str>, FunctionsError> {
        if !self.contains(field) {
            return Ok(None);
        }
        self.string(field).map(Some)
    }

    pub fn number(&self, field: &str) -> Result<f64, FunctionsError> {
        match self.raw(field) {
            Some(Value::Number(n)) => n.as_f64().ok_or_else(|| type_error(field, "number", self.raw(field))),
            other => Err(type_error(field, "number", other)),
        }
    }

    /// A number without a fractional part.
    pub fn integer(&self, field: &str) -> Result<i64, FunctionsError> {
        let value = self.raw(field);
        match value {
            Some(Value::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    return Ok(i);
                }
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => Ok(f as i64),
                    _ => Err(type_error(field, "integer", value)),
                }
            }
            other => Err(type_error(field, "integer", other)),
        }
    }

    pub fn boolean(&self, field: &str) -> Result<bool, FunctionsError> {
        match self.raw(field) {
            Some(Value::Bool(b)) => Ok(*b),
            other => Err(type_error(field, "boolean", other)),
        }
    }

    pub fn optional_boolean(&self, field: &str) -> Result<Option<bool>, FunctionsError> {
        if !self.contains(field) {
            return Ok(None);
        }
        self.boolean(field).map(Some)
    }

    pub fn object(&self, field: &str) -> Result<ParameterContainer, FunctionsError> {
        Self::from_field(field, self.raw(field))
    }

    /// An ISO-8601 datetime string; the one place a string becomes another type.
    pub fn date(&self, field: &str) -> Result<UtcDate, FunctionsError> {
        let s = self.string(field)?;
        UtcDate::parse(s).map_err(|_| {
            FunctionsError::invalid_argument(format!(
                "Couldn't parse '{field}'. Expected ISO-8601 date string, but got '{s}'."
            ))
        })
    }

    pub fn guid<T: From<Guid>>(&self, field: &str) -> Result<T, FunctionsError> {
        let s = self.string(field)?;
        Guid::parse(s).map(T::from).map_err(|_| {
            FunctionsError::invalid_argument(format!(
                "Couldn't parse '{field}'. Expected a guid string, but got '{s}'."
            ))
        })
    }

    pub fn parse<T: FromParameter>(&self, field: &str) -> Result<T, FunctionsError> {
        T::from_parameter(field, self.raw(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn container(value: Value) -> ParameterContainer {
        ParameterContainer::from_value(&value).unwrap()
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Color {
        Red,
        Green,
        Blue,
    }

    impl FromParameter for Color {
        fn from_parameter(field: &str, value: Option<&Value>) -> Result<Self, FunctionsError> {
            parse_enum(
                "Color",
                field,
                value,
                &[("red", Color::Red), ("green", Color::Green), ("blue", Color::Blue)],
            )
        }
    }

    #[test]
    fn missing_string_message() {
        let err = container(json!({})).string("clubId").unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidArgument);
        assert_eq!(
            err.message,
            "Couldn't parse 'clubId'. Expected type 'string', but got undefined or null."
        );
    }

    #[test]
    fn null_counts_as_missing() {
        let err = container(json!({ "clubId": null })).string("clubId").unwrap_err();
        assert!(err.message.ends_with("but got undefined or null."));
        assert_eq!(container(json!({ "x": null })).optional_string("x").unwrap(), None);
    }

    #[test]
    fn no_coercion_between_types() {
        let params = container(json!({ "n": "12", "s": 12, "b": "true", "o": [1] }));
        assert_eq!(
            params.number("n").unwrap_err().message,
            "Couldn't parse 'n'. Expected type 'number', but got 12."
        );
        assert!(params.string("s").is_err());
        assert!(params.boolean("b").is_err());
        assert!(params.object("o").is_err());
    }

    #[test]
    fn reads_typed_scalars() {
        let params = container(json!({ "s": "x", "n": 2.5, "i": 3, "b": false }));
        assert_eq!(params.string("s").unwrap(), "x");
        assert_eq!(params.number("n").unwrap(), 2.5);
        assert_eq!(params.integer("i").unwrap(), 3);
        assert!(params.integer("n").is_err());
        assert!(!params.boolean("b").unwrap());
    }

    #[test]
    fn enum_message_lists_accepted_values() {
        let err = container(json!({ "color": "purple" })).parse::<Color>("color").unwrap_err();
        assert_eq!(
            err.message,
            "Couldn't parse Color parameter 'color'. Expected values 'red', 'green' or 'blue', but got 'purple' from type 'string'."
        );
        let err = container(json!({})).parse::<Color>("color").unwrap_err();
        assert!(err.message.ends_with("but got 'undefined' from type 'undefined'."));
        let err = container(json!({ "color": 4 })).parse::<Color>("color").unwrap_err();
        assert!(err.message.ends_with("but got '4' from type 'number'."));
    }

    #[test]
    fn date_failure_names_field_and_literal() {
        let params = container(json!({ "date": "14.10.2011" }));
        assert_eq!(
            params.date("date").unwrap_err().message,
            "Couldn't parse 'date'. Expected ISO-8601 date string, but got '14.10.2011'."
        );
        let params = container(json!({ "date": "2011-10-14T10:42:38+0000" }));
        assert_eq!(params.date("date").unwrap().to_string(), "2011-10-14T10:42:38.000Z");
    }

    #[test]
    fn guid_failure_names_literal() {
        let params = container(json!({ "id": "abc" }));
        let err = params.guid::<Guid>("id").unwrap_err();
        assert_eq!(err.message, "Couldn't parse 'id'. Expected a guid string, but got 'abc'.");
    }

    #[test]
    fn nested_failure_is_unchanged() {
        let params = container(json!({ "outer": { "inner": 1 } }));
        let err = params.object("outer").and_then(|o| o.string("inner").map(str::to_string));
        assert_eq!(
            err.unwrap_err().message,
            "Couldn't parse 'inner'. Expected type 'string', but got 1."
        );
    }

    #[test]
    fn top_level_must_be_object() {
        let err = ParameterContainer::from_value(&json!("text")).unwrap_err();
        assert_eq!(
            err.message,
            "Couldn't parse 'parameters'. Expected type 'object', but got text."
        );
    }
}
