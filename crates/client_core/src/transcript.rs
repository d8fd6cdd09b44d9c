//! Session transcript: ordered, append-only apart from the clear-history
//! wipe, which always spares the welcome entry.

use std::sync::Arc;

use shared::domain::{Classification, EntryId, Sender, TranscriptEntry};
use tracing::debug;

pub const WELCOME_MESSAGE: &str = "Hello! I'm your Agentic Assistant. I can help you schedule events, book meetings, and more. Try one of the suggested prompts below or type your own request.";

/// Where transcript changes are drawn. The typing row sits after every entry,
/// so an added entry always lands directly ahead of it.
pub trait RenderSink: Send + Sync {
    fn entry_added(&self, entry: &TranscriptEntry);
    fn entries_removed(&self, removed: &[EntryId]);
    fn scroll_to_end(&self);
}

/// Sink for headless sessions.
pub struct NullRenderSink;

impl RenderSink for NullRenderSink {
    fn entry_added(&self, _entry: &TranscriptEntry) {}

    fn entries_removed(&self, _removed: &[EntryId]) {}

    fn scroll_to_end(&self) {}
}

pub struct TranscriptController {
    entries: Vec<TranscriptEntry>,
    next_id: u64,
    sink: Arc<dyn RenderSink>,
}

impl TranscriptController {
    pub fn new(sink: Arc<dyn RenderSink>) -> Self {
        let mut controller = Self {
            entries: Vec::new(),
            next_id: 0,
            sink,
        };
        controller.add_message(WELCOME_MESSAGE, false);
        controller
    }

    pub fn add_message(&mut self, content: impl Into<String>, is_user: bool) -> EntryId {
        let rendered_html = content.into();
        let (sender, classification) = if is_user {
            (Sender::User, Classification::Neutral)
        } else {
            (Sender::Bot, Classification::from_rendered(&rendered_html))
        };

        let id = EntryId(self.next_id);
        self.next_id += 1;
        let entry = TranscriptEntry {
            id,
            sender,
            rendered_html,
            classification,
        };
        debug!(entry_id = id.0, ?sender, ?classification, "transcript entry added");

        self.sink.entry_added(&entry);
        self.entries.push(entry);
        self.sink.scroll_to_end();
        id
    }

    /// Drops everything but the welcome entry and returns how many entries
    /// went away.
    pub fn clear_all(&mut self) -> usize {
        if self.entries.len() <= 1 {
            return 0;
        }
        let removed: Vec<EntryId> = self.entries.drain(1..).map(|entry| entry.id).collect();
        debug!(removed = removed.len(), "transcript cleared");
        self.sink.entries_removed(&removed);
        removed.len()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }
}

#[cfg(test)]
#[path = "tests/transcript_tests.rs"]
mod tests;
