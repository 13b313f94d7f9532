use crate::{mime_utils, Content, FileDataPart, InlineDataPart, Part, Role, TextPart};

impl From<&str> for TextPart {
    fn from(value: &str) -> Self {
        Self {
            text: value.to_string(),
        }
    }
}

impl From<String> for TextPart {
    fn from(value: String) -> Self {
        Self { text: value }
    }
}

impl From<TextPart> for Part {
    fn from(value: TextPart) -> Self {
        Self::Text(value)
    }
}

impl From<InlineDataPart> for Part {
    fn from(value: InlineDataPart) -> Self {
        Self::InlineData(value)
    }
}

impl From<FileDataPart> for Part {
    fn from(value: FileDataPart) -> Self {
        Self::FileData(value)
    }
}

impl From<&str> for Part {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for Part {
    fn from(value: String) -> Self {
        Self::text(value)
    }
}

impl InlineDataPart {
    pub fn new(mime_type: impl Into<String>, base64_data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            base64_data: base64_data.into(),
        }
    }

    /// Encode raw bytes as a `data:<mime>;base64,` URI.
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        let mime_type = mime_type.into();
        let base64_data = mime_utils::to_data_uri(&mime_type, bytes);
        Self {
            mime_type,
            base64_data,
        }
    }
}

impl FileDataPart {
    pub fn new(mime_type: impl Into<String>, file_uri: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            file_uri: file_uri.into(),
        }
    }
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextPart { text: text.into() })
    }

    pub fn inline_data(mime_type: impl Into<String>, base64_data: impl Into<String>) -> Self {
        Self::InlineData(InlineDataPart::new(mime_type, base64_data))
    }

    pub fn file_data(mime_type: impl Into<String>, file_uri: impl Into<String>) -> Self {
        Self::FileData(FileDataPart::new(mime_type, file_uri))
    }
}

impl Content {
    pub fn new<I, P>(role: Role, parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Part>,
    {
        Self {
            role,
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn user<I, P>(parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Part>,
    {
        Self::new(Role::User, parts)
    }

    pub fn model<I, P>(parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Part>,
    {
        Self::new(Role::Model, parts)
    }

    pub fn system<I, P>(parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Part>,
    {
        Self::new(Role::System, parts)
    }
}
