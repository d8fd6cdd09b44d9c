use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

const NAIVE_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Body of `POST /api/message`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageRequest {
    pub message: String,
}

impl MessageRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Top-level response of `POST /api/message`.
///
/// The assistant backend is loose about shapes, so every field tolerates
/// being absent or of the wrong type instead of failing the whole decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ApiEnvelope {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
    #[serde(
        default,
        deserialize_with = "lenient_slots",
        skip_serializing_if = "Option::is_none"
    )]
    pub slots: Option<Vec<TimeSlot>>,
}

impl ApiEnvelope {
    pub fn text(success: bool, message: impl Into<String>) -> Self {
        Self {
            success,
            message: Some(Value::String(message.into())),
            slots: None,
        }
    }

    pub fn with_slots(mut self, slots: Vec<TimeSlot>) -> Self {
        self.slots = Some(slots);
        self
    }

    /// The message, only when the backend sent it as a string.
    pub fn message_text(&self) -> Option<&str> {
        self.message.as_ref().and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeSlot {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub description: String,
}

impl TimeSlot {
    pub fn new(
        start: impl Into<String>,
        end: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            description: description.into(),
        }
    }

    /// Reads each field on its own, so a wrong-typed field only loses itself.
    /// Anything but an object yields an empty slot.
    pub fn from_value(value: &Value) -> Self {
        Self {
            start: field_text(value, "start").unwrap_or_default(),
            end: field_text(value, "end").unwrap_or_default(),
            description: field_text(value, "description").unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Event {
    pub fn from_value(value: &Value) -> Self {
        Self {
            start_time: field_text(value, "start_time"),
            end_time: field_text(value, "end_time"),
            description: field_text(value, "description"),
        }
    }
}

/// Text of one record field. Strings come through as-is, null or missing is
/// `None`, and any other JSON value is kept as its JSON text.
fn field_text(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Converts a JSON array into slots, keeping position for entries that are
/// not slot-shaped (they become empty slots). Anything but an array is `None`.
pub fn slots_from_value(value: &Value) -> Option<Vec<TimeSlot>> {
    let items = value.as_array()?;
    Some(items.iter().map(TimeSlot::from_value).collect())
}

/// Same leniency as [`slots_from_value`] for event records.
pub fn events_from_values(items: &[Value]) -> Vec<Event> {
    items.iter().map(Event::from_value).collect()
}

fn lenient_slots<'de, D>(deserializer: D) -> Result<Option<Vec<TimeSlot>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(slots_from_value))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(matches!(value, Some(Value::Bool(true))))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedTimestamp {
    /// Carried its own offset (RFC 3339 or HTTP date).
    Zoned(DateTime<FixedOffset>),
    /// Wall-clock time without an offset.
    Naive(NaiveDateTime),
}

/// Parses the timestamp spellings the scheduling backend emits: RFC 3339,
/// HTTP dates (`Fri, 08 Mar 2024 11:00:00 GMT`), bare ISO date-times and
/// integer epoch milliseconds.
pub fn parse_timestamp(raw: &str) -> Option<ParsedTimestamp> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis)
            .map(|utc| ParsedTimestamp::Zoned(utc.into()));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(ParsedTimestamp::Zoned(parsed));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(raw) {
        return Some(ParsedTimestamp::Zoned(parsed));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(ParsedTimestamp::Naive)
}
