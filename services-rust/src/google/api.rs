use super::PROVIDER;
use crate::{
    client_utils, AiServicesError, AiServicesResult, ApiClient, RequestDescriptor, RequestOptions,
};
use reqwest::{Client, Method};
use serde_json::{Map, Value};
use std::{collections::HashMap, env, time::Duration};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Clone, Default)]
pub struct GoogleAiServiceOptions {
    pub api_key: String,
    pub base_url: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub timeout: Option<Duration>,
    pub client: Option<Client>,
}

impl GoogleAiServiceOptions {
    /// Read the API key from the `GOOGLE_API_KEY` environment variable.
    pub fn from_env() -> AiServicesResult<Self> {
        let api_key = env::var("GOOGLE_API_KEY").map_err(|_| {
            AiServicesError::Configuration("GOOGLE_API_KEY must be set".to_string())
        })?;
        Ok(Self {
            api_key,
            ..Self::default()
        })
    }
}

/// HTTP client for the Google Generative Language REST API.
pub struct GoogleApiClient {
    api_key: String,
    base_url: String,
    client: Client,
    default_options: RequestOptions,
}

impl GoogleApiClient {
    #[must_use]
    pub fn new(options: GoogleAiServiceOptions) -> Self {
        let GoogleAiServiceOptions {
            api_key,
            base_url,
            headers,
            timeout,
            client,
        } = options;

        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            api_key,
            base_url,
            client: client.unwrap_or_default(),
            default_options: RequestOptions {
                timeout,
                headers: headers.unwrap_or_default(),
            },
        }
    }

    fn descriptor(
        &self,
        method: Method,
        url: String,
        body: Option<Value>,
        options: &RequestOptions,
    ) -> RequestDescriptor {
        let RequestOptions {
            timeout,
            mut headers,
        } = self.default_options.merge(options);
        headers.insert(API_KEY_HEADER.to_string(), self.api_key.clone());

        RequestDescriptor {
            method,
            url,
            headers,
            body,
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl ApiClient for GoogleApiClient {
    fn build_request(
        &self,
        model: &str,
        payload: Map<String, Value>,
        options: &RequestOptions,
    ) -> AiServicesResult<RequestDescriptor> {
        let url = format!("{}/{model}:generateContent", self.base_url);
        Ok(self.descriptor(Method::POST, url, Some(Value::Object(payload)), options))
    }

    fn build_list_models_request(
        &self,
        options: &RequestOptions,
    ) -> AiServicesResult<RequestDescriptor> {
        let url = format!("{}/models", self.base_url);
        Ok(self.descriptor(Method::GET, url, None, options))
    }

    async fn execute(&self, request: RequestDescriptor) -> AiServicesResult<Value> {
        client_utils::send_json(&self.client, request, PROVIDER).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_generate_content_request() {
        let client = GoogleApiClient::new(GoogleAiServiceOptions {
            api_key: "secret".to_string(),
            base_url: Some("https://example.com/v1/".to_string()),
            timeout: Some(Duration::from_secs(30)),
            ..Default::default()
        });

        let request = client
            .build_request(
                "models/gemini-1.5-flash",
                Map::new(),
                &RequestOptions::default().with_header("x-request-id", "abc"),
            )
            .unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(
            request.url,
            "https://example.com/v1/models/gemini-1.5-flash:generateContent"
        );
        assert_eq!(request.headers[API_KEY_HEADER], "secret");
        assert_eq!(request.headers["x-request-id"], "abc");
        assert_eq!(request.timeout, Some(Duration::from_secs(30)));
        assert_eq!(request.body, Some(Value::Object(Map::new())));
    }

    #[test]
    fn builds_list_models_request() {
        let client = GoogleApiClient::new(GoogleAiServiceOptions {
            api_key: "secret".to_string(),
            ..Default::default()
        });

        let request = client
            .build_list_models_request(&RequestOptions::default())
            .unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url, format!("{DEFAULT_BASE_URL}/models"));
        assert!(request.body.is_none());
    }
}
