//! Typed document values.
//!
//! Values serialize in the tagged shape the Firestore REST API speaks
//! (`{"stringValue": "..."}`, `{"integerValue": "42"}`, ...), so the same types
//! are used for the wire format and for in-memory stores.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

pub type Fields = BTreeMap<String, FieldValue>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum FieldValue {
    NullValue(()),
    BooleanValue(bool),
    IntegerValue(#[serde(with = "int64")] i64),
    DoubleValue(f64),
    TimestampValue(DateTime<Utc>),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue {
        #[serde(default)]
        latitude: f64,
        #[serde(default)]
        longitude: f64,
    },
    ArrayValue {
        #[serde(default)]
        values: Vec<FieldValue>,
    },
    MapValue {
        #[serde(default)]
        fields: Fields,
    },
}

impl FieldValue {
    #[must_use]
    pub fn null() -> Self {
        Self::NullValue(())
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::StringValue(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::TimestampValue(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map_or_else(Self::null, Self::StringValue)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::TimestampValue(value)
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::null(),
            Value::Bool(b) => Self::BooleanValue(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::IntegerValue(i),
                None => Self::DoubleValue(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => Self::StringValue(s),
            Value::Array(items) => Self::ArrayValue {
                values: items.into_iter().map(Self::from).collect(),
            },
            Value::Object(map) => Self::MapValue {
                fields: fields_from_json(map),
            },
        }
    }
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::NullValue(()) => Self::Null,
            FieldValue::BooleanValue(b) => Self::Bool(b),
            FieldValue::IntegerValue(i) => Self::Number(i.into()),
            FieldValue::DoubleValue(f) => Number::from_f64(f).map_or(Self::Null, Self::Number),
            FieldValue::TimestampValue(ts) => {
                Self::String(ts.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            FieldValue::StringValue(s)
            | FieldValue::BytesValue(s)
            | FieldValue::ReferenceValue(s) => Self::String(s),
            FieldValue::GeoPointValue {
                latitude,
                longitude,
            } => serde_json::json!({ "latitude": latitude, "longitude": longitude }),
            FieldValue::ArrayValue { values } => {
                Self::Array(values.into_iter().map(Self::from).collect())
            }
            FieldValue::MapValue { fields } => Self::Object(fields_to_json(fields)),
        }
    }
}

#[must_use]
pub fn fields_from_json(map: Map<String, Value>) -> Fields {
    map.into_iter()
        .map(|(key, value)| (key, FieldValue::from(value)))
        .collect()
}

#[must_use]
pub fn fields_to_json(fields: Fields) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(key, value)| (key, Value::from(value)))
        .collect()
}

/// A stored document.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: Fields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
}

impl Document {
    #[must_use]
    pub fn from_fields(fields: Fields) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }
}

// int64 travels as a decimal string; accept bare numbers too.
mod int64 {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text.parse().map_err(D::Error::custom),
            Raw::Number(number) => Ok(number),
        }
    }
}
