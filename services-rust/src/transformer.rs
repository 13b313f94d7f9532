//! Data-driven conversion of contents and generation configs into provider
//! payload fields.
//!
//! A [`TransformerTable`] maps output field names to pure extraction
//! functions. Adding a provider means writing a new table, not new control
//! flow. Falsy values (null, `false`, zero, empty strings, arrays and
//! objects) are never written, so unset fields stay out of the payload.

use crate::{AiServicesError, AiServicesResult, Content, GenerationConfig};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Extracts the value of one payload field from the source.
pub type Transformer<T> = fn(&T) -> AiServicesResult<Value>;

/// An ordered mapping from payload field name to [`Transformer`].
pub struct TransformerTable<T> {
    entries: Vec<(&'static str, Transformer<T>)>,
}

impl<T> Default for TransformerTable<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> TransformerTable<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: &'static str, transformer: Transformer<T>) -> Self {
        self.entries.push((key, transformer));
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    /// Iterate the entries in order, rejecting blank and duplicate keys.
    fn checked_entries(
        &self,
    ) -> impl Iterator<Item = AiServicesResult<(&'static str, Transformer<T>)>> + '_ {
        let mut seen = HashSet::new();
        self.entries.iter().map(move |&(key, transformer)| {
            if key.trim().is_empty() || !seen.insert(key) {
                return Err(AiServicesError::Configuration(format!(
                    "The transformer for key '{key}' is invalid"
                )));
            }
            Ok((key, transformer))
        })
    }
}

/// Transform `content` into a payload object using `table`.
pub fn transform_content(
    content: &Content,
    table: &TransformerTable<Content>,
) -> AiServicesResult<Map<String, Value>> {
    let mut data = Map::new();

    for entry in table.checked_entries() {
        let (key, transformer) = entry?;
        let value = transformer(content)?;
        if is_falsy(&value) {
            continue;
        }
        data.insert(key.to_string(), value);
    }

    Ok(data)
}

/// Merge `config` into `params` using `table`. Keys already set in `params`
/// take precedence over the derived values.
pub fn transform_generation_config_params(
    mut params: Map<String, Value>,
    config: &GenerationConfig,
    table: &TransformerTable<GenerationConfig>,
) -> AiServicesResult<Map<String, Value>> {
    for entry in table.checked_entries() {
        let (key, transformer) = entry?;

        if params.get(key).is_some_and(|value| !value.is_null()) {
            continue;
        }

        let value = transformer(config)?;
        if is_falsy(&value) {
            continue;
        }
        params.insert(key.to_string(), value);
    }

    Ok(params)
}

#[must_use]
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
