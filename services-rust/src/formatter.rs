use crate::{AiServicesError, AiServicesResult, Content, Part, Role};
use serde::Deserialize;

/// Input accepted by [`crate::GenerativeAiModel::generate_text`].
///
/// Text and parts become a single user content. A list of contents is
/// passed as-is, but its last entry must come from the user.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Prompt {
    Text(String),
    Content(Content),
    Contents(Vec<Content>),
    Parts(Vec<Part>),
}

impl Prompt {
    pub fn into_contents(self) -> AiServicesResult<Vec<Content>> {
        let contents = match self {
            Self::Text(text) => vec![Content::user([text])],
            Self::Parts(parts) => vec![Content::user(parts)],
            Self::Content(content) => vec![content],
            Self::Contents(contents) => contents,
        };

        match contents.last() {
            None => Err(AiServicesError::Validation(
                "The prompt must contain at least one content".to_string(),
            )),
            Some(last) if last.role != Role::User => Err(AiServicesError::Validation(
                "The last content of the prompt must be a user message".to_string(),
            )),
            Some(_) => Ok(contents),
        }
    }
}

impl From<&str> for Prompt {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Prompt {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<Part>> for Prompt {
    fn from(value: Vec<Part>) -> Self {
        Self::Parts(value)
    }
}

impl From<Content> for Prompt {
    fn from(value: Content) -> Self {
        Self::Content(value)
    }
}

impl From<Vec<Content>> for Prompt {
    fn from(value: Vec<Content>) -> Self {
        Self::Contents(value)
    }
}

/// A system instruction given as text, parts or a full content.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SystemInstruction {
    Text(String),
    Content(Content),
    Parts(Vec<Part>),
}

impl SystemInstruction {
    /// Normalize to a content with the `system` role.
    #[must_use]
    pub fn into_content(self) -> Content {
        match self {
            Self::Text(text) => Content::system([text]),
            Self::Parts(parts) => Content::system(parts),
            Self::Content(content) => Content {
                role: Role::System,
                parts: content.parts,
            },
        }
    }
}

impl From<&str> for SystemInstruction {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SystemInstruction {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<Part>> for SystemInstruction {
    fn from(value: Vec<Part>) -> Self {
        Self::Parts(value)
    }
}

impl From<Content> for SystemInstruction {
    fn from(value: Content) -> Self {
        Self::Content(value)
    }
}
