//! HTML fragments for bookable slots and scheduled events.

use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};
use shared::protocol::{parse_timestamp, Event, ParsedTimestamp, TimeSlot};

pub const UNTITLED_EVENT: &str = "Untitled Event";
const EVENT_TIME_FORMAT: &str = "%a, %b %-d, %I:%M %p";

/// Renders the slot grid. An empty slice renders nothing.
pub fn format_slots(slots: &[TimeSlot]) -> String {
    if slots.is_empty() {
        return String::new();
    }

    let mut html = String::from(
        "<div class=\"mt-2 mb-1\">Available time slots:</div><div class=\"slot-grid\">",
    );
    for slot in slots {
        let start = format_utc_clock(&slot.start);
        let end = format_utc_clock(&slot.end);
        tracing::trace!(%start, %end, "formatted slot");
        let _ = write!(
            html,
            "<div class=\"time-slot\"><div class=\"slot-time\">{start} - {end}</div><div class=\"slot-desc\">({})</div></div>",
            slot.description
        );
    }
    html.push_str("</div>");
    html
}

/// `HH:MM UTC` for a slot boundary. Offset-less timestamps are already UTC;
/// unparseable input is passed through untouched.
fn format_utc_clock(raw: &str) -> String {
    let utc = match parse_timestamp(raw) {
        Some(ParsedTimestamp::Zoned(zoned)) => zoned.with_timezone(&Utc).naive_utc(),
        Some(ParsedTimestamp::Naive(naive)) => naive,
        None => return raw.to_string(),
    };
    format!("{:02}:{:02} UTC", utc.hour(), utc.minute())
}

/// Renders event cards in one fixed display offset.
#[derive(Debug, Clone, Copy)]
pub struct EventFormatter {
    display_offset: FixedOffset,
}

impl Default for EventFormatter {
    fn default() -> Self {
        Self::utc()
    }
}

impl EventFormatter {
    pub fn utc() -> Self {
        Self {
            display_offset: Utc.fix(),
        }
    }

    pub fn with_offset(display_offset: FixedOffset) -> Self {
        Self { display_offset }
    }

    pub fn display_offset(&self) -> FixedOffset {
        self.display_offset
    }

    pub fn format_event(&self, event: &Event) -> String {
        let start = self.format_optional(event.start_time.as_deref());
        let end = self.format_optional(event.end_time.as_deref());
        let title = event
            .description
            .as_deref()
            .filter(|description| !description.is_empty())
            .unwrap_or(UNTITLED_EVENT);

        format!(
            "<div class=\"event-card\"><div class=\"event-title\">{title}</div><div class=\"event-time\"><i class=\"far fa-clock\"></i> {start} - {end}</div></div>"
        )
    }

    fn format_optional(&self, raw: Option<&str>) -> String {
        match raw {
            Some(raw) if !raw.is_empty() => self.format_date_time(raw),
            _ => String::new(),
        }
    }

    /// `Fri, Mar 8, 11:00 AM`. Offset-less input is taken as display-local
    /// wall time.
    pub fn format_date_time(&self, raw: &str) -> String {
        let local: DateTime<FixedOffset> = match parse_timestamp(raw) {
            Some(ParsedTimestamp::Zoned(zoned)) => zoned.with_timezone(&self.display_offset),
            Some(ParsedTimestamp::Naive(naive)) => {
                match naive.and_local_timezone(self.display_offset).single() {
                    Some(local) => local,
                    None => return raw.to_string(),
                }
            }
            None => return raw.to_string(),
        };
        local.format(EVENT_TIME_FORMAT).to_string()
    }
}

#[cfg(test)]
#[path = "tests/format_tests.rs"]
mod tests;
