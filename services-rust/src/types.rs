use crate::{AiServicesError, AiServicesResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt, str::FromStr};

/// The producer of a content.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
    System,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
            Self::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AiServicesError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "model" => Ok(Self::Model),
            "system" => Ok(Self::System),
            other => Err(AiServicesError::Validation(format!(
                "Invalid content role '{other}', expected one of: user, model, system"
            ))),
        }
    }
}

/// A part of a content. Exactly one variant is populated.
///
/// Parts (de)serialize to the shapes `{"text": ...}`,
/// `{"inlineData": {"mimeType": ..., "data": ...}}` and
/// `{"fileData": {"mimeType": ..., "fileUri": ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(try_from = "PartRepr", into = "PartRepr")]
pub enum Part {
    Text(TextPart),
    InlineData(InlineDataPart),
    FileData(FileDataPart),
}

/// A part of the content that contains text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct TextPart {
    pub text: String,
}

/// A part of the content that carries base64-encoded binary data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct InlineDataPart {
    /// The MIME type of the data. E.g. "image/png", "audio/mpeg".
    pub mime_type: String,
    /// The base64-encoded data. May carry a `data:<mime>;base64,` prefix,
    /// which is kept as-is until a provider adapter transforms the part.
    #[serde(rename = "data")]
    pub base64_data: String,
}

/// A part of the content that references a file by URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct FileDataPart {
    /// The MIME type of the file.
    pub mime_type: String,
    /// The URI of the file.
    pub file_uri: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineDataPart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_data: Option<FileDataPart>,
}

impl TryFrom<PartRepr> for Part {
    type Error = AiServicesError;

    fn try_from(repr: PartRepr) -> Result<Self, Self::Error> {
        let part = match (repr.text, repr.inline_data, repr.file_data) {
            (Some(text), None, None) => Self::Text(TextPart { text }),
            (None, Some(inline_data), None) => Self::InlineData(inline_data),
            (None, None, Some(file_data)) => Self::FileData(file_data),
            (None, None, None) => {
                return Err(AiServicesError::Validation(
                    "The part does not match any of the text, inlineData or fileData shapes"
                        .to_string(),
                ))
            }
            _ => {
                return Err(AiServicesError::Validation(
                    "The part must contain exactly one of text, inlineData or fileData"
                        .to_string(),
                ))
            }
        };
        part.validate()?;
        Ok(part)
    }
}

impl From<Part> for PartRepr {
    fn from(part: Part) -> Self {
        match part {
            Part::Text(TextPart { text }) => Self {
                text: Some(text),
                inline_data: None,
                file_data: None,
            },
            Part::InlineData(inline_data) => Self {
                text: None,
                inline_data: Some(inline_data),
                file_data: None,
            },
            Part::FileData(file_data) => Self {
                text: None,
                inline_data: None,
                file_data: Some(file_data),
            },
        }
    }
}

impl Part {
    /// Parse a part from a loosely typed JSON value.
    pub fn from_value(value: Value) -> AiServicesResult<Self> {
        serde_json::from_value(value)
            .map_err(|error| AiServicesError::Validation(format!("Invalid part: {error}")))
    }

    /// The MIME type of a data part, `None` for text.
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::InlineData(part) => Some(&part.mime_type),
            Self::FileData(part) => Some(&part.mime_type),
        }
    }

    fn validate(&self) -> AiServicesResult<()> {
        match self.mime_type() {
            Some(mime_type) if !is_mime_type(mime_type) => Err(AiServicesError::Validation(
                format!("Invalid MIME type '{mime_type}' for part"),
            )),
            _ => Ok(()),
        }
    }
}

fn is_mime_type(value: &str) -> bool {
    value
        .split_once('/')
        .is_some_and(|(kind, subtype)| !kind.trim().is_empty() && !subtype.trim().is_empty())
}

/// A role-tagged, ordered sequence of parts, i.e. one turn of a generation
/// request or response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct Content {
    pub role: Role,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Parse a content from a loosely typed JSON value, validating the role
    /// and every part.
    pub fn from_value(value: Value) -> AiServicesResult<Self> {
        serde_json::from_value(value)
            .map_err(|error| AiServicesError::Validation(format!("Invalid content: {error}")))
    }

    /// Concatenated text of all text parts.
    #[must_use]
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text(text_part) => Some(text_part.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Options that steer how a model generates content. Every field is
/// optional and omitted from provider payloads when unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sequences that stop the generation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    /// The MIME type of the generated output, e.g. "application/json".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    /// The schema the output must adhere to. Only used when
    /// `response_mime_type` is "application/json".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
    /// The number of candidates to generate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_count: Option<u32>,
    /// The maximum number of tokens to generate per candidate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    /// Whether to return the log probabilities of the output tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_logprobs: Option<bool>,
    /// The number of top log probabilities to return per token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<u32>,
    /// Provider-specific arguments merged into the request payload as-is.
    /// Unrecognized keys end up here when parsing a loose mapping.
    #[serde(flatten)]
    pub additional_args: Map<String, Value>,
}

impl GenerationConfig {
    /// Parse a generation config from a loosely typed JSON value.
    pub fn from_value(value: Value) -> AiServicesResult<Self> {
        let config: Self = serde_json::from_value(value).map_err(|error| {
            AiServicesError::Validation(format!("Invalid generation config: {error}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AiServicesResult<()> {
        if self.candidate_count == Some(0) {
            return Err(AiServicesError::Validation(
                "candidateCount must be at least 1".to_string(),
            ));
        }
        if self.max_output_tokens == Some(0) {
            return Err(AiServicesError::Validation(
                "maxOutputTokens must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn expects_json(&self) -> bool {
        self.response_mime_type.as_deref() == Some("application/json")
    }
}

/// One generated alternative returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub content: Content,
    /// The original provider response fragment for this candidate.
    pub raw_metadata: Map<String, Value>,
}

impl Candidate {
    #[must_use]
    pub fn new(content: Content, raw_metadata: Map<String, Value>) -> Self {
        Self {
            content,
            raw_metadata,
        }
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.content.text()
    }

    /// The finish reason reported by the provider, if any.
    #[must_use]
    pub fn finish_reason(&self) -> Option<&str> {
        self.raw_metadata
            .get("finishReason")
            .or_else(|| self.raw_metadata.get("finish_reason"))
            .and_then(Value::as_str)
    }
}

/// A non-empty, ordered list of candidates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Candidates(Vec<Candidate>);

impl Candidates {
    /// Fails when `candidates` is empty.
    pub fn new(candidates: Vec<Candidate>) -> AiServicesResult<Self> {
        if candidates.is_empty() {
            return Err(AiServicesError::NoCandidates(
                "A candidates list must contain at least one candidate".to_string(),
            ));
        }
        Ok(Self(candidates))
    }

    #[must_use]
    pub fn first(&self) -> &Candidate {
        &self.0[0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`, kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.0.iter()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Candidate> {
        self.0.get(index)
    }

    /// Text of the first candidate.
    #[must_use]
    pub fn text(&self) -> String {
        self.first().text()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Candidate> {
        self.0
    }
}

impl TryFrom<Vec<Candidate>> for Candidates {
    type Error = AiServicesError;

    fn try_from(candidates: Vec<Candidate>) -> Result<Self, Self::Error> {
        Self::new(candidates)
    }
}

impl IntoIterator for Candidates {
    type Item = Candidate;
    type IntoIter = std::vec::IntoIter<Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Candidates {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A capability a service or model offers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AiCapability {
    MultimodalInput,
    TextGeneration,
}
