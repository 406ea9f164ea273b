use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(value) => value as f64,
            Number::Float(value) => value,
        }
    }
}

/// A JSON compatible value as it travels to and from the remote API.
///
/// Object keys keep their insertion order so that rendered queries are deterministic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireValue {
    #[default]
    Null,
    Boolean(bool),
    Number(Number),
    String(String),
    List(Vec<WireValue>),
    Object(IndexMap<String, WireValue>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum WireKind {
    Null,
    Boolean,
    Number,
    String,
    List,
    Object,
}

impl WireValue {
    pub fn kind(&self) -> WireKind {
        match self {
            WireValue::Null => WireKind::Null,
            WireValue::Boolean(_) => WireKind::Boolean,
            WireValue::Number(_) => WireKind::Number,
            WireValue::String(_) => WireKind::String,
            WireValue::List(_) => WireKind::List,
            WireValue::Object(_) => WireKind::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, WireValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            WireValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, WireValue>> {
        match self {
            WireValue::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Parses a JSON document, as found in default values and function call payloads.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_string(&self) -> String {
        serde_json::Value::from(self.clone()).to_string()
    }
}

impl From<serde_json::Value> for WireValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => WireValue::Null,
            serde_json::Value::Bool(value) => WireValue::Boolean(value),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(value) => WireValue::Number(Number::Int(value)),
                None => WireValue::Number(Number::Float(number.as_f64().unwrap_or_default())),
            },
            serde_json::Value::String(value) => WireValue::String(value),
            serde_json::Value::Array(values) => WireValue::List(values.into_iter().map(Into::into).collect()),
            serde_json::Value::Object(fields) => {
                WireValue::Object(fields.into_iter().map(|(key, value)| (key, value.into())).collect())
            }
        }
    }
}

impl From<WireValue> for serde_json::Value {
    fn from(value: WireValue) -> Self {
        match value {
            WireValue::Null => serde_json::Value::Null,
            WireValue::Boolean(value) => serde_json::Value::Bool(value),
            WireValue::Number(Number::Int(value)) => serde_json::Value::from(value),
            WireValue::Number(Number::Float(value)) => serde_json::Number::from_f64(value)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            WireValue::String(value) => serde_json::Value::String(value),
            WireValue::List(values) => serde_json::Value::Array(values.into_iter().map(Into::into).collect()),
            WireValue::Object(fields) => {
                serde_json::Value::Object(fields.into_iter().map(|(key, value)| (key, value.into())).collect())
            }
        }
    }
}

impl From<&str> for WireValue {
    fn from(value: &str) -> Self {
        WireValue::String(value.to_string())
    }
}

impl From<String> for WireValue {
    fn from(value: String) -> Self {
        WireValue::String(value)
    }
}

impl From<bool> for WireValue {
    fn from(value: bool) -> Self {
        WireValue::Boolean(value)
    }
}

impl From<i64> for WireValue {
    fn from(value: i64) -> Self {
        WireValue::Number(Number::Int(value))
    }
}

impl From<f64> for WireValue {
    fn from(value: f64) -> Self {
        WireValue::Number(Number::Float(value))
    }
}

impl<T: Into<WireValue>> From<Vec<T>> for WireValue {
    fn from(values: Vec<T>) -> Self {
        WireValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for WireValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_key_order() {
        let value = WireValue::from_json_str(r#"{"z":1,"a":[true,null,"x"],"m":1.5}"#).unwrap();

        insta::assert_debug_snapshot!(value, @r###"
        Object(
            {
                "z": Number(
                    Int(
                        1,
                    ),
                ),
                "a": List(
                    [
                        Boolean(
                            true,
                        ),
                        Null,
                        String(
                            "x",
                        ),
                    ],
                ),
                "m": Number(
                    Float(
                        1.5,
                    ),
                ),
            },
        )
        "###);
        assert_eq!(value.to_json_string(), r#"{"z":1,"a":[true,null,"x"],"m":1.5}"#);
    }

    #[test]
    fn kinds_display_lowercase() {
        assert_eq!(WireValue::from(vec!["a"]).kind().to_string(), "list");
        assert_eq!(WireValue::Null.kind().to_string(), "null");
    }
}
