use crate::{AiServicesError, AiServicesResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A Google safety setting, blocking content of `category` at or above
/// `threshold`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct SafetySetting {
    /// E.g. "`HARM_CATEGORY_HARASSMENT`".
    pub category: String,
    /// E.g. "`BLOCK_MEDIUM_AND_ABOVE`".
    pub threshold: String,
}

impl SafetySetting {
    pub fn new(category: impl Into<String>, threshold: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            threshold: threshold.into(),
        }
    }

    /// Parse a list of safety settings, failing if any element is not a
    /// `{category, threshold}` object.
    pub fn list_from_value(value: Value) -> AiServicesResult<Vec<Self>> {
        let invalid = || {
            AiServicesError::Validation(
                "The safetySettings parameter must contain SafetySetting values".to_string(),
            )
        };

        let Value::Array(items) = value else {
            return Err(invalid());
        };

        items
            .into_iter()
            .map(|item| {
                if !item.is_object() {
                    return Err(invalid());
                }
                serde_json::from_value::<Self>(item).map_err(|_| invalid())
            })
            .collect()
    }
}
