use super::{SafetySetting, PROVIDER, PROVIDER_LABEL};
use crate::{
    mime_utils,
    transformer::{self, TransformerTable},
    AiServicesError, AiServicesResult, ApiClient, Candidate, Candidates, Content,
    GenerationConfig, GenerativeAiModel, Localizer, ModelParams, Part, Prompt, RequestOptions,
    ResponseReconciler,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;

const MODEL_PREFIX: &str = "models/";

pub struct GoogleAiModel {
    api: Arc<dyn ApiClient>,
    model: String,
    generation_config: Option<GenerationConfig>,
    system_instruction: Option<Content>,
    safety_settings: Vec<SafetySetting>,
    request_options: RequestOptions,
    reconciler: ResponseReconciler,
}

impl GoogleAiModel {
    /// Create a model for `model`. Slugs without a `/` are resolved under
    /// `models/`. `params.model` is ignored.
    pub fn new(
        api: Arc<dyn ApiClient>,
        model: impl Into<String>,
        params: ModelParams,
        request_options: RequestOptions,
    ) -> AiServicesResult<Self> {
        let model = model.into();
        let model = if model.contains('/') {
            model
        } else {
            format!("{MODEL_PREFIX}{model}")
        };

        if let Some(config) = &params.generation_config {
            config.validate()?;
        }

        Ok(Self {
            api,
            model,
            generation_config: params.generation_config,
            system_instruction: params
                .system_instruction
                .map(crate::SystemInstruction::into_content),
            safety_settings: params.safety_settings,
            request_options,
            reconciler: ResponseReconciler::new(PROVIDER_LABEL),
        })
    }

    #[must_use]
    pub fn with_localizer(mut self, localizer: Arc<dyn Localizer>) -> Self {
        self.reconciler = self.reconciler.with_localizer(localizer);
        self
    }

    /// Build the `generateContent` request body for `contents`.
    pub fn generate_content_payload(
        &self,
        contents: &[Content],
    ) -> AiServicesResult<Map<String, Value>> {
        let content_transformers = content_transformers();
        let contents = contents
            .iter()
            .map(|content| transformer::transform_content(content, &content_transformers))
            .map(|result| result.map(Value::Object))
            .collect::<AiServicesResult<Vec<_>>>()?;

        let mut params = Map::new();
        if let Some(config) = &self.generation_config {
            params.extend(config.additional_args.clone());
        }
        params.insert("contents".to_string(), Value::Array(contents));

        if let Some(config) = &self.generation_config {
            let generation_config = transformer::transform_generation_config_params(
                Map::new(),
                config,
                &generation_config_transformers(),
            )?;
            params.insert(
                "generationConfig".to_string(),
                Value::Object(generation_config),
            );
        }
        if let Some(system_instruction) = &self.system_instruction {
            params.insert(
                "systemInstruction".to_string(),
                serde_json::to_value(system_instruction).map_err(|error| {
                    AiServicesError::Validation(format!("Invalid system instruction: {error}"))
                })?,
            );
        }
        if !self.safety_settings.is_empty() {
            params.insert(
                "safetySettings".to_string(),
                serde_json::to_value(&self.safety_settings).map_err(|error| {
                    AiServicesError::Validation(format!("Invalid safety settings: {error}"))
                })?,
            );
        }

        params.retain(|_, value| !transformer::is_falsy(value));
        Ok(params)
    }

    fn parse_response(&self, response: Value) -> AiServicesResult<Candidates> {
        let candidates = match response {
            Value::Object(mut response) => response.remove("candidates"),
            _ => None,
        };
        let entries = match candidates {
            Some(Value::Array(entries)) if !entries.is_empty() => entries,
            _ => {
                return Err(AiServicesError::MissingField(
                    PROVIDER,
                    "candidates".to_string(),
                ))
            }
        };

        self.reconciler
            .reconcile(entries, has_content, finish_reason, to_candidate)
    }
}

#[async_trait::async_trait]
impl GenerativeAiModel for GoogleAiModel {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn model_slug(&self) -> String {
        self.model
            .strip_prefix(MODEL_PREFIX)
            .unwrap_or(&self.model)
            .to_string()
    }

    async fn generate_text(
        &self,
        prompt: Prompt,
        request_options: &RequestOptions,
    ) -> AiServicesResult<Candidates> {
        let model_slug = self.model_slug();
        crate::opentelemetry::trace_generate_text(
            PROVIDER,
            &model_slug,
            self.generation_config.as_ref(),
            || async move {
                let contents = prompt.into_contents()?;
                let payload = self.generate_content_payload(&contents)?;
                let request = self.api.build_request(
                    &self.model,
                    payload,
                    &self.request_options.merge(request_options),
                )?;
                let response = self.api.execute(request).await?;
                self.parse_response(response)
            },
        )
        .await
    }
}

fn has_content(candidate: &Value) -> bool {
    candidate
        .get("content")
        .is_some_and(|content| !content.is_null())
}

fn finish_reason(candidate: &Value) -> Option<String> {
    candidate
        .get("finishReason")
        .filter(|reason| !reason.is_null())
        .map(|reason| match reason {
            Value::String(reason) => reason.clone(),
            other => other.to_string(),
        })
}

fn to_candidate(candidate: Value) -> AiServicesResult<Candidate> {
    let Value::Object(raw_metadata) = candidate else {
        return Err(AiServicesError::MissingField(
            PROVIDER,
            "content".to_string(),
        ));
    };
    let content = raw_metadata
        .get("content")
        .cloned()
        .ok_or_else(|| AiServicesError::MissingField(PROVIDER, "content".to_string()))?;

    let content = serde_json::from_value::<Content>(content).map_err(|error| {
        AiServicesError::NotImplemented(
            PROVIDER,
            format!("Unrecognized candidate content: {error}"),
        )
    })?;

    Ok(Candidate::new(content, raw_metadata))
}

fn content_transformers() -> TransformerTable<Content> {
    TransformerTable::<Content>::new()
        .with("role", |content| Ok(json!(content.role.as_str())))
        .with("parts", convert_to_google_parts)
}

fn convert_to_google_parts(content: &Content) -> AiServicesResult<Value> {
    content
        .parts
        .iter()
        .map(convert_to_google_part)
        .collect::<AiServicesResult<Vec<_>>>()
        .map(Value::Array)
}

fn convert_to_google_part(part: &Part) -> AiServicesResult<Value> {
    match part {
        Part::Text(text_part) => Ok(json!({ "text": text_part.text })),
        Part::InlineData(inline_data) => {
            ensure_image_or_audio(&inline_data.mime_type)?;
            Ok(json!({
                "inlineData": {
                    "mimeType": inline_data.mime_type,
                    // Google expects inline data blobs without the data URI prefix.
                    "data": mime_utils::strip_data_uri_prefix(&inline_data.base64_data),
                }
            }))
        }
        Part::FileData(file_data) => {
            ensure_image_or_audio(&file_data.mime_type)?;
            Ok(json!({
                "fileData": {
                    "mimeType": file_data.mime_type,
                    "fileUri": file_data.file_uri,
                }
            }))
        }
    }
}

fn ensure_image_or_audio(mime_type: &str) -> AiServicesResult<()> {
    if mime_utils::is_image(mime_type) || mime_utils::is_audio(mime_type) {
        Ok(())
    } else {
        Err(AiServicesError::UnsupportedPart(
            PROVIDER,
            format!(
                "The Google AI API only supports text, image, and audio parts, got '{mime_type}'"
            ),
        ))
    }
}

fn generation_config_transformers() -> TransformerTable<GenerationConfig> {
    TransformerTable::<GenerationConfig>::new()
        .with("stopSequences", |config| Ok(json!(config.stop_sequences)))
        .with("responseMimeType", |config| {
            Ok(json!(config.response_mime_type))
        })
        .with("responseSchema", |config| {
            if config.expects_json() {
                Ok(json!(config.response_schema))
            } else {
                Ok(Value::Null)
            }
        })
        .with("candidateCount", |config| Ok(json!(config.candidate_count)))
        .with("maxOutputTokens", |config| {
            Ok(json!(config.max_output_tokens))
        })
        .with("temperature", |config| Ok(json!(config.temperature)))
        .with("topP", |config| Ok(json!(config.top_p)))
        .with("topK", |config| Ok(json!(config.top_k)))
        .with("presencePenalty", |config| Ok(json!(config.presence_penalty)))
        .with("frequencyPenalty", |config| {
            Ok(json!(config.frequency_penalty))
        })
        .with("responseLogprobs", |config| {
            Ok(json!(config.response_logprobs))
        })
        .with("logprobs", |config| Ok(json!(config.logprobs)))
}
