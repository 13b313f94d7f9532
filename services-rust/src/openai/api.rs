use super::PROVIDER;
use crate::{
    client_utils, AiServicesError, AiServicesResult, ApiClient, RequestDescriptor, RequestOptions,
};
use reqwest::{Client, Method};
use serde_json::{Map, Value};
use std::{collections::HashMap, env, time::Duration};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Clone, Default)]
pub struct OpenAiServiceOptions {
    pub api_key: String,
    pub base_url: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub timeout: Option<Duration>,
    pub client: Option<Client>,
}

impl OpenAiServiceOptions {
    /// Read the API key from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> AiServicesResult<Self> {
        let api_key = env::var("OPENAI_API_KEY").map_err(|_| {
            AiServicesError::Configuration("OPENAI_API_KEY must be set".to_string())
        })?;
        Ok(Self {
            api_key,
            ..Self::default()
        })
    }
}

/// HTTP client for the OpenAI REST API.
pub struct OpenAiApiClient {
    api_key: String,
    base_url: String,
    client: Client,
    default_options: RequestOptions,
}

impl OpenAiApiClient {
    #[must_use]
    pub fn new(options: OpenAiServiceOptions) -> Self {
        let OpenAiServiceOptions {
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
        headers.insert(
            "authorization".to_string(),
            format!("Bearer {}", self.api_key),
        );

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
impl ApiClient for OpenAiApiClient {
    fn build_request(
        &self,
        model: &str,
        mut payload: Map<String, Value>,
        options: &RequestOptions,
    ) -> AiServicesResult<RequestDescriptor> {
        payload.insert("model".to_string(), Value::String(model.to_string()));
        let url = format!("{}/chat/completions", self.base_url);
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
