use crate::{
    google::SafetySetting, AiServicesError, AiServicesResult, GenerationConfig, SystemInstruction,
};
use serde_json::Value;

/// Parameters used to create a model from a service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelParams {
    /// The model slug. Falls back to the service's default model.
    pub model: Option<String>,
    pub generation_config: Option<GenerationConfig>,
    pub system_instruction: Option<SystemInstruction>,
    /// Only used by Google.
    pub safety_settings: Vec<SafetySetting>,
}

impl ModelParams {
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn with_generation_config(mut self, generation_config: GenerationConfig) -> Self {
        self.generation_config = Some(generation_config);
        self
    }

    #[must_use]
    pub fn with_system_instruction(
        mut self,
        system_instruction: impl Into<SystemInstruction>,
    ) -> Self {
        self.system_instruction = Some(system_instruction.into());
        self
    }

    #[must_use]
    pub fn with_safety_settings(mut self, safety_settings: Vec<SafetySetting>) -> Self {
        self.safety_settings = safety_settings;
        self
    }

    /// Parse from a loose mapping with the keys `model`, `generationConfig`,
    /// `systemInstruction` and `safetySettings`.
    pub fn from_value(value: Value) -> AiServicesResult<Self> {
        let Value::Object(mut map) = value else {
            return Err(AiServicesError::Validation(
                "Model parameters must be an object".to_string(),
            ));
        };

        let model = match map.remove("model") {
            None | Some(Value::Null) => None,
            Some(Value::String(model)) => Some(model),
            Some(_) => {
                return Err(AiServicesError::Validation(
                    "The model parameter must be a string".to_string(),
                ))
            }
        };

        let generation_config = map
            .remove("generationConfig")
            .filter(|value| !value.is_null())
            .map(GenerationConfig::from_value)
            .transpose()?;

        let system_instruction = map
            .remove("systemInstruction")
            .filter(|value| !value.is_null())
            .map(|value| {
                serde_json::from_value::<SystemInstruction>(value).map_err(|_| {
                    AiServicesError::Validation(
                        "The systemInstruction parameter must be a string, a list of parts or a \
                         content"
                            .to_string(),
                    )
                })
            })
            .transpose()?;

        let safety_settings = match map.remove("safetySettings") {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => SafetySetting::list_from_value(value)?,
        };

        Ok(Self {
            model,
            generation_config,
            system_instruction,
            safety_settings,
        })
    }
}
