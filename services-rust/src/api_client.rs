use crate::AiServicesResult;
use reqwest::Method;
use serde_json::{Map, Value};
use std::{collections::HashMap, time::Duration};

/// Options applied to a single HTTP request, e.g. a timeout or extra headers.
///
/// Header names are case-insensitive. [`RequestOptions::merge`] returns them
/// lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub timeout: Option<Duration>,
    pub headers: HashMap<String, String>,
}

impl RequestOptions {
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Combine `self` as defaults with `overrides`. Values from `overrides`
    /// win for identical keys, comparing header names case-insensitively.
    #[must_use]
    pub fn merge(&self, overrides: &Self) -> Self {
        let mut headers = HashMap::new();
        for (name, value) in &self.headers {
            headers.insert(name.to_ascii_lowercase(), value.clone());
        }
        for (name, value) in &overrides.headers {
            headers.insert(name.to_ascii_lowercase(), value.clone());
        }

        Self {
            timeout: overrides.timeout.or(self.timeout),
            headers,
        }
    }
}

/// A fully built HTTP request, ready to be executed.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
    pub timeout: Option<Duration>,
}

/// Transport used by models and services to talk to a provider.
#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    /// Build the request that generates content with `model`.
    fn build_request(
        &self,
        model: &str,
        payload: Map<String, Value>,
        options: &RequestOptions,
    ) -> AiServicesResult<RequestDescriptor>;

    /// Build the request that lists the available models.
    fn build_list_models_request(
        &self,
        options: &RequestOptions,
    ) -> AiServicesResult<RequestDescriptor>;

    /// Send `request` and decode the JSON response body.
    async fn execute(&self, request: RequestDescriptor) -> AiServicesResult<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_overrides() {
        let defaults = RequestOptions::default()
            .with_timeout(Duration::from_secs(30))
            .with_header("x-trace", "default")
            .with_header("x-team", "core");
        let overrides = RequestOptions::default()
            .with_timeout(Duration::from_secs(5))
            .with_header("x-trace", "call");

        let merged = defaults.merge(&overrides);
        assert_eq!(merged.timeout, Some(Duration::from_secs(5)));
        assert_eq!(merged.headers["x-trace"], "call");
        assert_eq!(merged.headers["x-team"], "core");
    }

    #[test]
    fn merge_compares_header_names_case_insensitively() {
        let mut defaults = RequestOptions::default();
        defaults
            .headers
            .insert("X-Trace".to_string(), "default".to_string());
        let mut overrides = RequestOptions::default();
        overrides
            .headers
            .insert("x-TRACE".to_string(), "call".to_string());

        let merged = defaults.merge(&overrides);
        assert_eq!(merged.headers.len(), 1);
        assert_eq!(merged.headers["x-trace"], "call");
    }

    #[test]
    fn merge_keeps_default_timeout() {
        let defaults = RequestOptions::default().with_timeout(Duration::from_secs(30));
        let merged = defaults.merge(&RequestOptions::default());
        assert_eq!(merged.timeout, Some(Duration::from_secs(30)));
    }
}
