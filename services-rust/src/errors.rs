use thiserror::Error;

#[derive(Error, Debug)]
pub enum AiServicesError {
    /// The input built by the caller is malformed (e.g. an unknown content
    /// role or a part that matches none of the known shapes).
    #[error("Invalid input: {0}")]
    Validation(String),
    /// A transformer table or another piece of static configuration is
    /// invalid. This indicates a programming error rather than bad data.
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    /// The part is not supported by the provider (e.g. a PDF inline part for
    /// Google, or a non-image file reference for `OpenAI`).
    #[error("Unsupported by {0}: {1}")]
    UnsupportedPart(&'static str, String),
    /// The response from the provider lacks a field that must be present.
    #[error("Missing field from {0}: {1}")]
    MissingField(&'static str, String),
    /// A part of the provider response is not recognized by the library,
    /// e.g. a content without a role or a `functionCall` part.
    #[error("Not implemented for {0}: {1}")]
    NotImplemented(&'static str, String),
    /// None of the returned candidates carries usable content. The message
    /// includes every distinct finish reason that was observed.
    #[error("No candidates: {0}")]
    NoCandidates(String),
    /// The request to the provider failed or the body could not be decoded.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The request returns a non-OK status code
    #[error("Status error: {1} (Status {0})")]
    Status(reqwest::StatusCode, String),
}

impl AiServicesError {
    /// Whether the error was caused by input the caller controls, as opposed
    /// to the provider or the network.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Configuration(_))
    }

    /// The HTTP status returned by the provider, if the error carries one.
    #[must_use]
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Status(status, _) => Some(*status),
            Self::Transport(error) => error.status(),
            _ => None,
        }
    }
}

pub type AiServicesResult<T> = Result<T, AiServicesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_errors_are_distinguished_from_provider_errors() {
        assert!(AiServicesError::Validation("bad role".into()).is_caller_error());
        assert!(AiServicesError::Configuration("role".into()).is_caller_error());
        assert!(!AiServicesError::NoCandidates("SAFETY".into()).is_caller_error());
        assert!(!AiServicesError::MissingField("google", "candidates".into()).is_caller_error());
        assert!(!AiServicesError::NotImplemented("google", "functionCall".into()).is_caller_error());
    }

    #[test]
    fn status_error_exposes_http_status() {
        let error =
            AiServicesError::Status(reqwest::StatusCode::TOO_MANY_REQUESTS, "slow down".into());
        assert_eq!(error.status(), Some(reqwest::StatusCode::TOO_MANY_REQUESTS));
        assert_eq!(error.to_string(), "Status error: slow down (Status 429 Too Many Requests)");
    }
}
