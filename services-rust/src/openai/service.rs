use super::{OpenAiApiClient, OpenAiModel, OpenAiServiceOptions, PROVIDER};
use crate::{
    AiCapability, AiServicesError, AiServicesResult, ApiClient, GenerativeAiModel,
    GenerativeAiService, ModelParams, RequestOptions,
};
use serde_json::Value;
use std::{collections::BTreeMap, sync::Arc};

const DEFAULT_MODEL_SLUG: &str = "gpt-4o";

pub struct OpenAiService {
    api: Arc<dyn ApiClient>,
}

impl OpenAiService {
    #[must_use]
    pub fn new(options: OpenAiServiceOptions) -> Self {
        Self::with_api_client(Arc::new(OpenAiApiClient::new(options)))
    }

    #[must_use]
    pub fn with_api_client(api: Arc<dyn ApiClient>) -> Self {
        Self { api }
    }

    pub fn model(
        &self,
        params: ModelParams,
        request_options: RequestOptions,
    ) -> AiServicesResult<OpenAiModel> {
        let model = params
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL_SLUG.to_string());
        OpenAiModel::new(Arc::clone(&self.api), model, params, request_options)
    }
}

#[async_trait::async_trait]
impl GenerativeAiService for OpenAiService {
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

        let Some(Value::Array(models)) = response.get("data") else {
            return Err(AiServicesError::MissingField(
                PROVIDER,
                "data".to_string(),
            ));
        };

        Ok(models
            .iter()
            .filter_map(|model| model.get("id").and_then(Value::as_str))
            .map(|slug| {
                let capabilities = if slug.starts_with("gpt-") {
                    vec![AiCapability::MultimodalInput, AiCapability::TextGeneration]
                } else {
                    Vec::new()
                };
                (slug.to_string(), capabilities)
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
