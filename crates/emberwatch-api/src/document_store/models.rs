// ── Document store wire types ──
//
// Firestore encodes every field as a single-key object naming its type
// (`{"stringValue": "Fire"}`, `{"doubleValue": 11.0}`). These types mirror
// that encoding one-to-one; domain conversion lives in emberwatch-core.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Field name -> typed value.
pub type Fields = BTreeMap<String, Value>;

/// The only payload a `nullValue` can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NullValue {
    #[serde(rename = "NULL_VALUE")]
    NullValue,
}

/// A single typed field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(NullValue),
    BooleanValue(bool),
    /// int64 values travel as decimal strings.
    IntegerValue(String),
    DoubleValue(f64),
    /// RFC 3339 timestamp.
    TimestampValue(String),
    StringValue(String),
    MapValue(MapValue),
}

/// Nested map of fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(default)]
    pub fields: Fields,
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Self::StringValue(s.into())
    }

    pub fn double(v: f64) -> Self {
        Self::DoubleValue(v)
    }

    pub fn timestamp(at: DateTime<Utc>) -> Self {
        Self::TimestampValue(at.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::StringValue(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the value. Integers are widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::DoubleValue(v) => Some(*v),
            Self::IntegerValue(s) => s.parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::IntegerValue(s) => s.parse().ok(),
            Self::DoubleValue(v) => round_to_i64(*v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Fields> {
        match self {
            Self::MapValue(m) => Some(&m.fields),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::NullValue(_))
    }
}

/// A stored document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name:
    /// `projects/{p}/databases/(default)/documents/{collection}/{id}`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub fields: Fields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl Document {
    pub fn from_fields(fields: Fields) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    /// The document id: last segment of the resource name.
    pub fn id(&self) -> Option<&str> {
        self.name.rsplit('/').next().filter(|s| !s.is_empty())
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Response envelope of `documents.list`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<Document>,
    pub next_page_token: Option<String>,
}

/// Google API error envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
    pub status: Option<String>,
}

/// Round to the nearest integer, `None` outside the `i64` range.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn round_to_i64(v: f64) -> Option<i64> {
    // 2^63; the upper bound itself is not representable.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    let v = v.round();
    (v.is_finite() && (-LIMIT..LIMIT).contains(&v)).then_some(v as i64)
}
