use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::{ApiEnvelope, MessageRequest};
use tracing::debug;
use url::Url;

use crate::error::BackendError;

const MESSAGE_PATH: &str = "api/message";
const CLEAR_HISTORY_PATH: &str = "api/clear-history";

#[async_trait]
pub trait AssistantBackend: Send + Sync {
    async fn post_message(&self, request: &MessageRequest) -> Result<ApiEnvelope, BackendError>;
    /// Only success or failure matters; the body is ignored.
    async fn clear_history(&self) -> Result<(), BackendError>;
}

pub struct MissingAssistantBackend;

#[async_trait]
impl AssistantBackend for MissingAssistantBackend {
    async fn post_message(&self, _request: &MessageRequest) -> Result<ApiEnvelope, BackendError> {
        Err(BackendError::Unavailable(
            "assistant backend is not configured".into(),
        ))
    }

    async fn clear_history(&self) -> Result<(), BackendError> {
        Err(BackendError::Unavailable(
            "assistant backend is not configured".into(),
        ))
    }
}

pub struct HttpAssistantBackend {
    http: Client,
    message_url: Url,
    clear_history_url: Url,
}

impl HttpAssistantBackend {
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, BackendError> {
        let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))?;
        Ok(Self {
            http,
            message_url: base.join(MESSAGE_PATH)?,
            clear_history_url: base.join(CLEAR_HISTORY_PATH)?,
        })
    }

    pub fn message_url(&self) -> &Url {
        &self.message_url
    }

    pub fn clear_history_url(&self) -> &Url {
        &self.clear_history_url
    }
}

#[async_trait]
impl AssistantBackend for HttpAssistantBackend {
    async fn post_message(&self, request: &MessageRequest) -> Result<ApiEnvelope, BackendError> {
        let res = self
            .http
            .post(self.message_url.clone())
            .json(request)
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
            });
        }
        let body = res.text().await?;
        debug!(bytes = body.len(), "assistant response received");
        Ok(serde_json::from_str(&body)?)
    }

    async fn clear_history(&self) -> Result<(), BackendError> {
        let res = self.http.get(self.clear_history_url.clone()).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
