// ── Wire <-> domain conversion ──
//
// Documents from the store and records from the realtime feed are mapped
// into domain types here. Malformed records are dropped from a snapshot
// with a warning; one bad document never poisons the whole list.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use emberwatch_api::{Document, Fields, Value};

use crate::error::CoreError;
use crate::model::{AlertSignal, Emergency, EmergencyId, EmergencyStatus, NewEmergency, SignalType};

// ── Emergencies ──────────────────────────────────────────────────────

/// Convert a full collection listing into a snapshot.
pub(crate) fn emergencies_from_documents(documents: Vec<Document>) -> Vec<Emergency> {
    documents
        .iter()
        .filter_map(|doc| match emergency_from_document(doc) {
            Ok(e) => Some(e),
            Err(e) => {
                warn!(document = %doc.name, error = %e, "skipping malformed emergency document");
                None
            }
        })
        .collect()
}

pub(crate) fn emergency_from_document(doc: &Document) -> Result<Emergency, CoreError> {
    let id = doc.id().ok_or_else(|| invalid("document has no id"))?;

    let latitude = number_field(doc, "latitude")?;
    let longitude = number_field(doc, "longitude")?;
    let kind = string_field(doc, "type")?
        .parse()
        .map_err(|_| invalid("unknown emergency type"))?;
    let status = string_field(doc, "status")?
        .parse()
        .map_err(|_| invalid("unknown emergency status"))?;
    let timestamp = doc
        .field("timestamp")
        .and_then(normalize_timestamp)
        .ok_or_else(|| invalid("missing or unreadable timestamp"))?;

    Ok(Emergency {
        id: EmergencyId::new(id),
        latitude,
        longitude,
        kind,
        status,
        timestamp,
    })
}

/// Fields for a newly created document.
pub(crate) fn fields_for_new(new: &NewEmergency) -> Fields {
    let mut fields = Fields::new();
    fields.insert("latitude".into(), Value::double(new.latitude));
    fields.insert("longitude".into(), Value::double(new.longitude));
    fields.insert("type".into(), Value::string(new.kind.as_ref()));
    fields.insert("status".into(), Value::string(new.status.as_ref()));
    fields.insert("timestamp".into(), Value::timestamp(new.timestamp));
    fields
}

/// Fields for a status-only patch.
pub(crate) fn status_fields(status: EmergencyStatus) -> Fields {
    let mut fields = Fields::new();
    fields.insert("status".into(), Value::string(status.as_ref()));
    fields
}

/// Normalize the shapes a creation time can arrive in.
///
/// Accepts a native timestamp, an RFC 3339 string, a structured
/// `{seconds, nanoseconds}` map, or a bare epoch-milliseconds number.
pub(crate) fn normalize_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::TimestampValue(s) | Value::StringValue(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Value::MapValue(map) => {
            let seconds = map.fields.get("seconds").and_then(Value::as_i64)?;
            let nanos = map
                .fields
                .get("nanoseconds")
                .or_else(|| map.fields.get("nanos"))
                .and_then(Value::as_i64)
                .unwrap_or(0);
            DateTime::from_timestamp(seconds, u32::try_from(nanos).ok()?)
        }
        Value::IntegerValue(_) | Value::DoubleValue(_) => {
            value.as_i64().and_then(DateTime::from_timestamp_millis)
        }
        _ => None,
    }
}

fn number_field(doc: &Document, name: &str) -> Result<f64, CoreError> {
    doc.field(name)
        .and_then(Value::as_f64)
        .ok_or_else(|| invalid(&format!("missing numeric field '{name}'")))
}

fn string_field<'a>(doc: &'a Document, name: &str) -> Result<&'a str, CoreError> {
    doc.field(name)
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(&format!("missing string field '{name}'")))
}

fn invalid(message: &str) -> CoreError {
    CoreError::Validation {
        message: message.into(),
    }
}

// ── Alert signal ─────────────────────────────────────────────────────

/// Realtime record shape: `{lat, long, timestamp, type}`.
#[derive(Debug, Deserialize)]
struct WireSignal {
    lat: f64,
    long: f64,
    timestamp: serde_json::Number,
    #[serde(rename = "type")]
    kind: SignalType,
}

/// Convert a realtime record. `None` in, `None` out.
pub(crate) fn alert_from_record(
    record: Option<serde_json::Value>,
) -> Result<Option<AlertSignal>, CoreError> {
    let Some(record) = record else {
        return Ok(None);
    };

    let wire: WireSignal = serde_json::from_value(record).map_err(|e| CoreError::Validation {
        message: format!("malformed alert record: {e}"),
    })?;

    let observed_at = wire
        .timestamp
        .as_i64()
        .or_else(|| wire.timestamp.as_f64().and_then(round_to_i64))
        .ok_or_else(|| invalid("alert timestamp out of range"))?;

    Ok(Some(AlertSignal {
        latitude: wire.lat,
        longitude: wire.long,
        signal_type: wire.kind,
        observed_at,
    }))
}

/// Round to the nearest integer, `None` outside the `i64` range.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn round_to_i64(v: f64) -> Option<i64> {
    // 2^63; the upper bound itself is not representable.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    let v = v.round();
    (v.is_finite() && (-LIMIT..LIMIT).contains(&v)).then_some(v as i64)
}
