use super::{GoogleAiModel, GoogleAiServiceOptions, GoogleApiClient, PROVIDER};
use crate::{
    AiCapability, AiServicesError, AiServicesResult, ApiClient, GenerativeAiModel,
    GenerativeAiService, ModelParams, RequestOptions,
};
use serde_json::Value;
use std::{collections::BTreeMap, sync::Arc};

const DEFAULT_MODEL_SLUG: &str = "gemini-1.5-flash";

/// Entry point for Google's Gemini models.
pub struct GoogleAiService {
    api: Arc<dyn ApiClient>,
}

impl GoogleAiService {
    #[must_use]
    pub fn new(options: GoogleAiServiceOptions) -> Self {
        Self::with_api_client(Arc::new(GoogleApiClient::new(options)))
    }

    #[must_use]
    pub fn with_api_client(api: Arc<dyn ApiClient>) -> Self {
        Self { api }
    }

    /// Create a model. Uses the default model when `params.model` is unset.
    pub fn model(
        &self,
        params: ModelParams,
        request_options: RequestOptions,
    ) -> AiServicesResult<GoogleAiModel> {
        let model = params
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL_SLUG.to_string());
        GoogleAiModel::new(Arc::clone(&self.api), model, params, request_options)
    }
}

#[async_trait::async_trait]
impl GenerativeAiService for GoogleAiService {
    fn service_slug(&self) -> &'static str {
        PROVIDER
    }

    fn capabilities(&self) -> Vec<AiCapability> {
        vec![AiCapability::MultimodalInput, AiCapability::TextGeneration]
    }

    fn default_model_slug(&self) -> &'static str {
        DEFAULT_MODEL_SLUG
    }

    async fn list_models(
        &self,
        request_options: &RequestOptions,
    ) -> AiServicesResult<BTreeMap<String, Vec<AiCapability>>> {
        let request = self.api.build_list_models_request(request_options)?;
        let response = self.api.execute(request).await?;

        let models = match response.get("models") {
            Some(Value::Array(models)) if !models.is_empty() => models,
            _ => {
                return Err(AiServicesError::MissingField(
                    PROVIDER,
                    "models".to_string(),
                ))
            }
        };

        Ok(models
            .iter()
            .filter_map(|model| {
                let slug = model
                    .get("baseModelId")
                    .or_else(|| model.get("name"))
                    .and_then(Value::as_str)?;
                let slug = slug.strip_prefix("models/").unwrap_or(slug).to_string();

                let supports_generate_content = model
                    .get("supportedGenerationMethods")
                    .and_then(Value::as_array)
                    .is_some_and(|methods| {
                        methods
                            .iter()
                            .any(|method| method.as_str() == Some("generateContent"))
                    });
                let capabilities = if supports_generate_content {
                    vec![AiCapability::MultimodalInput, AiCapability::TextGeneration]
                } else {
                    Vec::new()
                };

                Some((slug, capabilities))
            })
            .collect())
    }

    fn get_model(
        &self,
        params: ModelParams,
        request_options: RequestOptions,
    ) -> AiServicesResult<Box<dyn GenerativeAiModel>> {
        Ok(Box::new(self.model(params, request_options)?))
    }
}
