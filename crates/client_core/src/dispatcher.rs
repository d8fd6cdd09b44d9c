//! Routes user input to the assistant backend and the results into the
//! transcript, bracketing every call with the typing indicator.
//!
//! Requests are neither queued nor de-duplicated. Two sends in flight both
//! proceed, each toggles the indicator on its own, and their replies land in
//! completion order.

use std::sync::Arc;

use shared::{domain::EntryId, protocol::MessageRequest};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{error, info};

use crate::{
    backend::AssistantBackend,
    normalize::ResponseNormalizer,
    transcript::{RenderSink, TranscriptController},
    typing::TypingIndicator,
};

pub const SEND_FAILED_MESSAGE: &str =
    "Sorry, I encountered an error communicating with the server. Please try again later.";
pub const HISTORY_CLEARED_MESSAGE: &str = "Chat history has been cleared successfully.";
pub const CLEAR_FAILED_MESSAGE: &str = "Failed to clear chat history. Please try again later.";

#[derive(Clone)]
pub struct RequestDispatcher {
    backend: Arc<dyn AssistantBackend>,
    normalizer: ResponseNormalizer,
    transcript: Arc<Mutex<TranscriptController>>,
    typing: Arc<TypingIndicator>,
}

impl RequestDispatcher {
    pub fn new(
        backend: Arc<dyn AssistantBackend>,
        normalizer: ResponseNormalizer,
        transcript: Arc<Mutex<TranscriptController>>,
        typing: Arc<TypingIndicator>,
    ) -> Self {
        Self {
            backend,
            normalizer,
            transcript,
            typing,
        }
    }

    /// Builds the transcript and indicator for a fresh session.
    pub fn for_session(
        backend: Arc<dyn AssistantBackend>,
        normalizer: ResponseNormalizer,
        sink: Arc<dyn RenderSink>,
    ) -> Self {
        Self::new(
            backend,
            normalizer,
            Arc::new(Mutex::new(TranscriptController::new(sink))),
            Arc::new(TypingIndicator::new()),
        )
    }

    pub fn transcript(&self) -> &Arc<Mutex<TranscriptController>> {
        &self.transcript
    }

    pub fn typing(&self) -> &Arc<TypingIndicator> {
        &self.typing
    }

    /// Echoes trimmed user input into the transcript and sends it. Blank
    /// input is dropped and `None` returned.
    pub async fn submit(&self, text: &str) -> Option<EntryId> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let id = self.transcript.lock().await.add_message(text, true);
        self.send_message(text).await;
        Some(id)
    }

    pub async fn send_message(&self, text: &str) {
        self.typing.show();
        let result = self.backend.post_message(&MessageRequest::new(text)).await;
        self.typing.hide();

        let mut transcript = self.transcript.lock().await;
        match result {
            Ok(envelope) => {
                let normalized = self.normalizer.normalize(&envelope);
                info!(success = normalized.success, "assistant replied");
                transcript.add_message(normalized.html, false);
            }
            Err(err) => {
                error!(error = %err, "assistant request failed");
                transcript.add_message(SEND_FAILED_MESSAGE, false);
            }
        }
    }

    pub async fn clear_history(&self) {
        self.typing.show();
        let result = self.backend.clear_history().await;
        self.typing.hide();

        let mut transcript = self.transcript.lock().await;
        match result {
            Ok(()) => {
                let removed = transcript.clear_all();
                info!(removed, "chat history cleared");
                transcript.add_message(HISTORY_CLEARED_MESSAGE, false);
            }
            Err(err) => {
                error!(error = %err, "clear history failed");
                transcript.add_message(CLEAR_FAILED_MESSAGE, false);
            }
        }
    }

    /// Fire-and-forget [`Self::submit`].
    pub fn spawn_submit(&self, text: String) -> JoinHandle<()> {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            dispatcher.submit(&text).await;
        })
    }

    /// Fire-and-forget [`Self::clear_history`].
    pub fn spawn_clear_history(&self) -> JoinHandle<()> {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            dispatcher.clear_history().await;
        })
    }
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
