use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);
    };
}

id_newtype!(EntryId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

/// Marker the status line of a normalized bot response carries.
pub const SUCCESS_MARKER: &str = "success: true";
pub const FAILURE_MARKER: &str = "success: false";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Success,
    Error,
    Neutral,
}

impl Classification {
    /// Classifies rendered bot content by the literal status markers it
    /// contains. The success marker wins when both are present.
    pub fn from_rendered(rendered: &str) -> Self {
        if rendered.contains(SUCCESS_MARKER) {
            Self::Success
        } else if rendered.contains(FAILURE_MARKER) {
            Self::Error
        } else {
            Self::Neutral
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub id: EntryId,
    pub sender: Sender,
    pub rendered_html: String,
    pub classification: Classification,
}

impl TranscriptEntry {
    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_reads_status_markers() {
        assert_eq!(
            Classification::from_rendered("ok<br>success: true"),
            Classification::Success
        );
        assert_eq!(
            Classification::from_rendered("nope<br>success: false"),
            Classification::Error
        );
        assert_eq!(
            Classification::from_rendered("Chat history has been cleared successfully."),
            Classification::Neutral
        );
    }

    #[test]
    fn classification_ignores_structured_meaning() {
        // A user-typed marker still classifies; the contract is textual.
        assert_eq!(
            Classification::from_rendered("did it say success: false?"),
            Classification::Error
        );
    }
}
