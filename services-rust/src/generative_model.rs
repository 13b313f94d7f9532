use crate::{AiCapability, AiServicesResult, Candidates, ModelParams, Prompt, RequestOptions};
use std::collections::BTreeMap;

/// A model of a provider, configured once and used for any number of
/// generation requests.
#[async_trait::async_trait]
pub trait GenerativeAiModel: Send + Sync {
    fn provider(&self) -> &'static str;
    /// The model slug, e.g. "gemini-1.5-flash".
    fn model_slug(&self) -> String;
    /// Generate text content. `request_options` override the options the
    /// model was created with.
    async fn generate_text(
        &self,
        prompt: Prompt,
        request_options: &RequestOptions,
    ) -> AiServicesResult<Candidates>;
}

/// A provider of generative models.
#[async_trait::async_trait]
pub trait GenerativeAiService: Send + Sync {
    fn service_slug(&self) -> &'static str;
    fn capabilities(&self) -> Vec<AiCapability>;
    fn default_model_slug(&self) -> &'static str;
    /// Map of the available model slugs and their capabilities.
    async fn list_models(
        &self,
        request_options: &RequestOptions,
    ) -> AiServicesResult<BTreeMap<String, Vec<AiCapability>>>;
    fn get_model(
        &self,
        params: ModelParams,
        request_options: RequestOptions,
    ) -> AiServicesResult<Box<dyn GenerativeAiModel>>;
}
