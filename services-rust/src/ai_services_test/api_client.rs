use std::{collections::VecDeque, sync::Mutex};

use reqwest::Method;
use serde_json::{Map, Value};

use crate::{
    errors::{AiServicesError, AiServicesResult},
    ApiClient, RequestDescriptor, RequestOptions,
};

/// Result for a mocked `execute` call.
/// It can either be a decoded response body or an error to return.
pub enum MockApiResult {
    Response(Value),
    Error(AiServicesError),
}

impl MockApiResult {
    /// Construct a result that yields the provided response body.
    pub fn response(response: Value) -> Self {
        Self::Response(response)
    }

    /// Construct a result that yields the provided error.
    pub fn error(error: AiServicesError) -> Self {
        Self::Error(error)
    }
}

impl From<Value> for MockApiResult {
    fn from(response: Value) -> Self {
        Self::response(response)
    }
}

impl From<AiServicesError> for MockApiResult {
    fn from(error: AiServicesError) -> Self {
        Self::error(error)
    }
}

#[derive(Default)]
struct MockApiClientState {
    mocked_results: VecDeque<MockApiResult>,
    tracked_requests: Vec<RequestDescriptor>,
}

impl MockApiClientState {
    fn reset(&mut self) {
        self.tracked_requests.clear();
    }

    fn restore(&mut self) {
        self.mocked_results.clear();
        self.reset();
    }
}

/// An API client for testing that tracks executed requests and yields
/// predefined response bodies instead of talking to a provider.
pub struct MockApiClient {
    provider: &'static str,
    state: Mutex<MockApiClientState>,
}

impl Default for MockApiClient {
    fn default() -> Self {
        Self {
            provider: "mock",
            state: Mutex::new(MockApiClientState::default()),
        }
    }
}

impl MockApiClient {
    /// Construct a new mock API client instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the provider identifier used in errors raised by the mock.
    pub fn set_provider(&mut self, provider: &'static str) {
        self.provider = provider;
    }

    /// Enqueue one or more mocked results.
    pub fn enqueue_results<I>(&self, results: I) -> &Self
    where
        I: IntoIterator<Item = MockApiResult>,
    {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.mocked_results.extend(results);
        drop(state);
        self
    }

    /// Convenience to enqueue a single mocked response body.
    pub fn enqueue_response(&self, response: Value) -> &Self {
        self.enqueue_results(std::iter::once(MockApiResult::response(response)))
    }

    /// Convenience to enqueue a single mocked error.
    pub fn enqueue_error(&self, error: AiServicesError) -> &Self {
        self.enqueue_results(std::iter::once(MockApiResult::error(error)))
    }

    /// Retrieve the requests executed so far.
    pub fn tracked_requests(&self) -> Vec<RequestDescriptor> {
        let state = self.state.lock().expect("mock state poisoned");
        state.tracked_requests.clone()
    }

    /// Retrieve the JSON bodies of the requests executed so far.
    pub fn tracked_payloads(&self) -> Vec<Value> {
        self.tracked_requests()
            .into_iter()
            .filter_map(|request| request.body)
            .collect()
    }

    /// Reset tracked requests without touching enqueued results.
    pub fn reset(&self) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.reset();
    }

    /// Clear both tracked requests and enqueued results.
    pub fn restore(&self) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.restore();
    }
}

#[async_trait::async_trait]
impl ApiClient for MockApiClient {
    fn build_request(
        &self,
        model: &str,
        payload: Map<String, Value>,
        options: &RequestOptions,
    ) -> AiServicesResult<RequestDescriptor> {
        Ok(RequestDescriptor {
            method: Method::POST,
            url: format!("mock://{model}"),
            headers: options.headers.clone(),
            body: Some(Value::Object(payload)),
            timeout: options.timeout,
        })
    }

    fn build_list_models_request(
        &self,
        options: &RequestOptions,
    ) -> AiServicesResult<RequestDescriptor> {
        Ok(RequestDescriptor {
            method: Method::GET,
            url: "mock://models".to_string(),
            headers: options.headers.clone(),
            body: None,
            timeout: options.timeout,
        })
    }

    async fn execute(&self, request: RequestDescriptor) -> AiServicesResult<Value> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.tracked_requests.push(request);

        let result = state.mocked_results.pop_front().ok_or_else(|| {
            AiServicesError::Configuration(format!(
                "no mocked {} results available",
                self.provider
            ))
        })?;

        match result {
            MockApiResult::Response(response) => Ok(response),
            MockApiResult::Error(error) => Err(error),
        }
    }
}
