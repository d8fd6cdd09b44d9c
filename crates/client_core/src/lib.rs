pub mod backend;
pub mod dispatcher;
pub mod error;
pub mod format;
pub mod normalize;
pub mod transcript;
pub mod typing;

pub use backend::{AssistantBackend, HttpAssistantBackend, MissingAssistantBackend};
pub use dispatcher::RequestDispatcher;
pub use error::BackendError;
pub use format::{format_slots, EventFormatter};
pub use normalize::{NormalizedResponse, ResponseNormalizer};
pub use transcript::{NullRenderSink, RenderSink, TranscriptController};
pub use typing::TypingIndicator;
