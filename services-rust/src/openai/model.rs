use super::{PROVIDER, PROVIDER_LABEL};
use crate::{
    mime_utils,
    transformer::{self, TransformerTable},
    AiServicesError, AiServicesResult, ApiClient, Candidate, Candidates, Content,
    GenerationConfig, GenerativeAiModel, Localizer, ModelParams, Part, Prompt, RequestOptions,
    ResponseReconciler, Role,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;

const UNSUPPORTED_PART_MESSAGE: &str =
    "The OpenAI API only supports text, image, and audio parts";

pub struct OpenAiModel {
    api: Arc<dyn ApiClient>,
    model: String,
    generation_config: Option<GenerationConfig>,
    system_instruction: Option<Content>,
    request_options: RequestOptions,
    reconciler: ResponseReconciler,
}

impl OpenAiModel {
    /// Create a model for `model`. `params.model` and `params.safety_settings`
    /// are ignored.
    pub fn new(
        api: Arc<dyn ApiClient>,
        model: impl Into<String>,
        params: ModelParams,
        request_options: RequestOptions,
    ) -> AiServicesResult<Self> {
        if let Some(config) = &params.generation_config {
            config.validate()?;
        }

        Ok(Self {
            api,
            model: model.into(),
            generation_config: params.generation_config,
            system_instruction: params
                .system_instruction
                .map(crate::SystemInstruction::into_content),
            request_options,
            reconciler: ResponseReconciler::new(PROVIDER_LABEL),
        })
    }

    #[must_use]
    pub fn with_localizer(mut self, localizer: Arc<dyn Localizer>) -> Self {
        self.reconciler = self.reconciler.with_localizer(localizer);
        self
    }

    /// Build the chat completions request body for `contents`, without the
    /// `model` field.
    pub fn chat_completions_payload(
        &self,
        contents: &[Content],
    ) -> AiServicesResult<Map<String, Value>> {
        let content_transformers = content_transformers();
        let messages = self
            .system_instruction
            .iter()
            .chain(contents)
            .map(|content| transformer::transform_content(content, &content_transformers))
            .map(|result| result.map(Value::Object))
            .collect::<AiServicesResult<Vec<_>>>()?;

        let mut params = Map::new();
        if let Some(config) = &self.generation_config {
            params.extend(config.additional_args.clone());
        }
        params.insert("messages".to_string(), Value::Array(messages));

        if let Some(config) = &self.generation_config {
            params = transformer::transform_generation_config_params(
                params,
                config,
                &generation_config_transformers(),
            )?;
        }

        params.retain(|_, value| !transformer::is_falsy(value));
        Ok(params)
    }

    fn parse_response(&self, response: Value) -> AiServicesResult<Candidates> {
        let Value::Object(mut response) = response else {
            return Err(missing_field("choices"));
        };
        let entries = match response.remove("choices") {
            Some(Value::Array(entries)) if !entries.is_empty() => entries,
            _ => return Err(missing_field("choices")),
        };

        self.reconciler.reconcile(
            entries,
            has_content,
            finish_reason,
            |choice| to_candidate(choice, &response),
        )
    }
}

#[async_trait::async_trait]
impl GenerativeAiModel for OpenAiModel {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn model_slug(&self) -> String {
        self.model.clone()
    }

    async fn generate_text(
        &self,
        prompt: Prompt,
        request_options: &RequestOptions,
    ) -> AiServicesResult<Candidates> {
        crate::opentelemetry::trace_generate_text(
            PROVIDER,
            &self.model,
            self.generation_config.as_ref(),
            || async move {
                let contents = prompt.into_contents()?;
                let payload = self.chat_completions_payload(&contents)?;
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

fn missing_field(field: &str) -> AiServicesError {
    AiServicesError::MissingField(PROVIDER, field.to_string())
}

fn has_content(choice: &Value) -> bool {
    choice
        .get("message")
        .is_some_and(|message| !message.is_null())
}

fn finish_reason(choice: &Value) -> Option<String> {
    choice
        .get("finish_reason")
        .filter(|reason| !reason.is_null())
        .map(|reason| match reason {
            Value::String(reason) => reason.clone(),
            other => other.to_string(),
        })
}

fn to_candidate(choice: Value, response: &Map<String, Value>) -> AiServicesResult<Candidate> {
    let Value::Object(mut raw_metadata) = choice else {
        return Err(missing_field("message"));
    };

    let message = raw_metadata.get("message");
    let text = message
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| missing_field("message"))?
        .to_string();

    // The choice-level role is checked, not the message role.
    let has_message_role = message
        .and_then(|message| message.get("role"))
        .is_some_and(|role| !role.is_null());
    let role = if has_message_role
        && raw_metadata.get("role").and_then(Value::as_str) == Some("user")
    {
        Role::User
    } else {
        Role::Model
    };

    raw_metadata.extend(
        response
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );

    Ok(Candidate::new(Content::new(role, [text]), raw_metadata))
}

fn content_transformers() -> TransformerTable<Content> {
    TransformerTable::<Content>::new()
        .with("role", |content| {
            let role = match content.role {
                Role::Model => "assistant",
                Role::System => "system",
                Role::User => "user",
            };
            Ok(json!(role))
        })
        .with("content", convert_to_openai_parts)
}

fn convert_to_openai_parts(content: &Content) -> AiServicesResult<Value> {
    content
        .parts
        .iter()
        .map(convert_to_openai_part)
        .collect::<AiServicesResult<Vec<_>>>()
        .map(Value::Array)
}

fn convert_to_openai_part(part: &Part) -> AiServicesResult<Value> {
    match part {
        Part::Text(text_part) => Ok(json!({ "type": "text", "text": text_part.text })),
        Part::InlineData(inline_data) => {
            let mime_type = inline_data.mime_type.as_str();
            if mime_utils::is_image(mime_type) {
                Ok(json!({
                    "type": "image_url",
                    "image_url": { "url": inline_data.base64_data },
                }))
            } else if mime_utils::is_audio(mime_type) {
                let format = mime_utils::extension_for_mime_type(mime_type).ok_or_else(|| {
                    AiServicesError::UnsupportedPart(
                        PROVIDER,
                        format!("Unsupported audio format '{mime_type}'"),
                    )
                })?;
                Ok(json!({
                    "type": "input_audio",
                    "input_audio": { "data": inline_data.base64_data, "format": format },
                }))
            } else {
                Err(unsupported_part(mime_type))
            }
        }
        Part::FileData(file_data) => {
            if !mime_utils::is_image(&file_data.mime_type) {
                return Err(unsupported_part(&file_data.mime_type));
            }
            Ok(json!({
                "type": "image_url",
                "image_url": { "url": file_data.file_uri },
            }))
        }
    }
}

fn unsupported_part(mime_type: &str) -> AiServicesError {
    AiServicesError::UnsupportedPart(
        PROVIDER,
        format!("{UNSUPPORTED_PART_MESSAGE}, got '{mime_type}'"),
    )
}

fn response_format(config: &GenerationConfig) -> AiServicesResult<Value> {
    if !config.expects_json() {
        return Ok(Value::Null);
    }
    match &config.response_schema {
        Some(schema) if !transformer::is_falsy(schema) => Ok(json!({
            "type": "json_schema",
            "json_schema": schema,
        })),
        _ => Ok(json!({ "type": "json_object" })),
    }
}

fn generation_config_transformers() -> TransformerTable<GenerationConfig> {
    TransformerTable::<GenerationConfig>::new()
        .with("stop", |config| Ok(json!(config.stop_sequences)))
        .with("response_format", response_format)
        .with("n", |config| Ok(json!(config.candidate_count)))
        .with("max_completion_tokens", |config| {
            Ok(json!(config.max_output_tokens))
        })
        .with("temperature", |config| Ok(json!(config.temperature)))
        .with("top_p", |config| Ok(json!(config.top_p)))
        .with("presence_penalty", |config| Ok(json!(config.presence_penalty)))
        .with("frequency_penalty", |config| {
            Ok(json!(config.frequency_penalty))
        })
        .with("logprobs", |config| Ok(json!(config.response_logprobs)))
        .with("top_logprobs", |config| Ok(json!(config.logprobs)))
}
