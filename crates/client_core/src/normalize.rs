//! Turns whatever the assistant backend answered into one displayable
//! transcript body plus the final success flag.
//!
//! The backend sometimes stringifies Python dicts into `message`, so besides
//! plain prose the message may hold a nested envelope or an event list written
//! with single quotes. Each of those is tried as a separate parse attempt, in a
//! fixed order, and a failed attempt never disturbs what was already rendered.

use serde_json::Value;
use shared::{
    domain::{Classification, FAILURE_MARKER, SUCCESS_MARKER},
    protocol::{events_from_values, slots_from_value, ApiEnvelope, Event, TimeSlot},
};
use tracing::{debug, warn};

use crate::format::{format_slots, EventFormatter};

const NESTED_ENVELOPE_HINT: &str = "'message':";
const EVENT_LIST_HINT: &str = "[{";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedResponse {
    pub html: String,
    pub success: bool,
}

impl NormalizedResponse {
    /// The literal marker the status line carries.
    pub fn status_marker(&self) -> &'static str {
        status_marker(self.success)
    }

    /// Classification derived from the rendered text, which is what styling
    /// keys on.
    pub fn classification(&self) -> Classification {
        Classification::from_rendered(&self.html)
    }
}

/// Outcome of one heuristic parse over the message text.
#[derive(Debug)]
pub(crate) enum ParseAttempt<T> {
    NotApplicable,
    Parsed(T),
    Failed(serde_json::Error),
}

#[derive(Debug, Default, PartialEq)]
pub(crate) struct NestedEnvelope {
    pub message: Option<String>,
    pub slots: Option<Vec<TimeSlot>>,
    pub success: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseNormalizer {
    events: EventFormatter,
}

impl ResponseNormalizer {
    pub fn new(events: EventFormatter) -> Self {
        Self { events }
    }

    pub fn normalize(&self, envelope: &ApiEnvelope) -> NormalizedResponse {
        let original = envelope.message_text();
        let mut content = original.unwrap_or_default().to_string();
        let mut success = envelope.success;

        if let Some(slots) = envelope.slots.as_deref().filter(|slots| !slots.is_empty()) {
            content.push_str(&format_slots(slots));
        }

        if let Some(original) = original {
            match parse_nested_envelope(original) {
                ParseAttempt::NotApplicable => {}
                ParseAttempt::Parsed(nested) => {
                    debug!(
                        inner_success = ?nested.success,
                        has_inner_slots = nested.slots.is_some(),
                        "message carried a nested envelope"
                    );
                    if let Some(message) = nested.message {
                        content = message;
                    }
                    if let Some(slots) = nested.slots {
                        content.push_str(&format_slots(&slots));
                    }
                    if let Some(inner_success) = nested.success {
                        success = inner_success;
                    }
                }
                ParseAttempt::Failed(err) => {
                    warn!(error = %err, "nested envelope in message did not parse");
                }
            }

            match parse_event_list(original) {
                ParseAttempt::NotApplicable => {}
                ParseAttempt::Parsed(events) => {
                    debug!(count = events.len(), "message carried events");
                    for event in &events {
                        content.push_str(&self.events.format_event(event));
                    }
                }
                ParseAttempt::Failed(err) => {
                    warn!(error = %err, "event list in message did not parse");
                }
            }
        }

        content.push_str(&status_line(success));
        NormalizedResponse {
            html: content,
            success,
        }
    }
}

fn status_marker(success: bool) -> &'static str {
    if success {
        SUCCESS_MARKER
    } else {
        FAILURE_MARKER
    }
}

fn status_line(success: bool) -> String {
    let tone = if success { "success" } else { "danger" };
    format!(
        "<br><small class=\"text-muted\"><span class=\"text-{tone}\">{}</span></small>",
        status_marker(success)
    )
}

/// The backend writes dicts with single quotes; swapping them is the whole
/// repair, so apostrophes inside values break the parse.
fn requote(raw: &str) -> String {
    raw.replace('\'', "\"")
}

pub(crate) fn parse_nested_envelope(original: &str) -> ParseAttempt<NestedEnvelope> {
    if !original.contains(NESTED_ENVELOPE_HINT) {
        return ParseAttempt::NotApplicable;
    }

    let value: Value = match serde_json::from_str(&requote(original)) {
        Ok(value) => value,
        Err(err) => return ParseAttempt::Failed(err),
    };
    let Value::Object(fields) = value else {
        return ParseAttempt::Parsed(NestedEnvelope::default());
    };

    ParseAttempt::Parsed(NestedEnvelope {
        message: fields.get("message").and_then(truthy_text),
        slots: fields.get("slots").and_then(slots_from_value),
        success: fields.get("success").and_then(Value::as_bool),
    })
}

pub(crate) fn parse_event_list(original: &str) -> ParseAttempt<Vec<Event>> {
    if !(original.contains(EVENT_LIST_HINT) || original.starts_with('{')) {
        return ParseAttempt::NotApplicable;
    }

    let requoted = requote(original);
    let value: Value = match serde_json::from_str(&requoted) {
        Ok(value) => value,
        Err(err) => return ParseAttempt::Failed(err),
    };

    if requoted.contains(EVENT_LIST_HINT) {
        match value {
            Value::Array(items) => ParseAttempt::Parsed(events_from_values(&items)),
            // Looked like a list but decoded to something else; nothing to show.
            _ => ParseAttempt::Parsed(Vec::new()),
        }
    } else {
        ParseAttempt::Parsed(events_from_values(&[value]))
    }
}

/// Text for an inner `message` that is worth displaying. Empty strings, zero,
/// `false` and `null` are not.
fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
#[path = "tests/normalize_tests.rs"]
mod tests;
