use crate::{AiServicesError, AiServicesResult, Candidate, Candidates};
use serde_json::Value;
use std::{borrow::Cow, fmt, sync::Arc};

/// Formats user-facing messages. Implement this to localize error messages.
pub trait Localizer: Send + Sync {
    /// Translate a message template. Templates use `%s` as placeholder.
    fn translate<'a>(&self, text: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(text)
    }

    /// Join items into a human readable list.
    fn join_list(&self, items: &[String]) -> String {
        items.join(", ")
    }
}

/// English messages, comma separated lists.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultLocalizer;

impl Localizer for DefaultLocalizer {}

const NO_CANDIDATES_MESSAGE: &str =
    "The response from the %s API does not include any candidates with content.";
const FINISH_REASON_MESSAGE: &str = "Finish reason: %s";

/// Separates raw provider candidates with usable content from those that only
/// report why they failed, and turns the former into [`Candidates`].
#[derive(Clone)]
pub struct ResponseReconciler {
    provider_label: &'static str,
    localizer: Arc<dyn Localizer>,
}

impl fmt::Debug for ResponseReconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseReconciler")
            .field("provider_label", &self.provider_label)
            .finish_non_exhaustive()
    }
}

impl ResponseReconciler {
    /// `provider_label` is the display name used in messages, e.g. "Google AI".
    #[must_use]
    pub fn new(provider_label: &'static str) -> Self {
        Self {
            provider_label,
            localizer: Arc::new(DefaultLocalizer),
        }
    }

    #[must_use]
    pub fn with_localizer(mut self, localizer: Arc<dyn Localizer>) -> Self {
        self.localizer = localizer;
        self
    }

    /// Reconcile `entries` into candidates.
    ///
    /// Entries for which `has_content` is false are dropped and their finish
    /// reason, if any, is remembered. When no entry has content the call fails
    /// with [`AiServicesError::NoCandidates`] listing every distinct reason in
    /// the order first seen.
    pub fn reconcile<H, F, C>(
        &self,
        entries: Vec<Value>,
        has_content: H,
        finish_reason: F,
        mut to_candidate: C,
    ) -> AiServicesResult<Candidates>
    where
        H: Fn(&Value) -> bool,
        F: Fn(&Value) -> Option<String>,
        C: FnMut(Value) -> AiServicesResult<Candidate>,
    {
        let mut with_content = Vec::new();
        let mut seen: Vec<String> = Vec::new();

        for entry in entries {
            if has_content(&entry) {
                with_content.push(entry);
                continue;
            }
            if let Some(reason) = finish_reason(&entry) {
                if !seen.contains(&reason) {
                    seen.push(reason);
                }
            }
        }

        if with_content.is_empty() {
            return Err(AiServicesError::NoCandidates(self.no_candidates_message(&seen)));
        }

        if !seen.is_empty() {
            tracing::warn!(
                provider = self.provider_label,
                finish_reasons = %seen.join(","),
                "dropped candidates without content"
            );
        }

        let candidates = with_content
            .into_iter()
            .map(&mut to_candidate)
            .collect::<AiServicesResult<Vec<_>>>()?;

        Candidates::new(candidates)
    }

    fn no_candidates_message(&self, finish_reasons: &[String]) -> String {
        let mut message = self
            .localizer
            .translate(NO_CANDIDATES_MESSAGE)
            .replace("%s", self.provider_label);

        if !finish_reasons.is_empty() {
            let reasons = self.localizer.join_list(finish_reasons);
            message.push(' ');
            message.push_str(
                &self
                    .localizer
                    .translate(FINISH_REASON_MESSAGE)
                    .replace("%s", &reasons),
            );
        }

        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Content;
    use serde_json::json;

    fn has_content(entry: &Value) -> bool {
        entry.get("content").is_some_and(|value| !value.is_null())
    }

    fn finish_reason(entry: &Value) -> Option<String> {
        entry
            .get("finishReason")
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn to_candidate(entry: Value) -> AiServicesResult<Candidate> {
        let text = entry["content"].as_str().unwrap_or_default().to_string();
        Ok(Candidate::new(Content::model([text]), serde_json::Map::new()))
    }

    #[test]
    fn keeps_entries_with_content_in_order() {
        let reconciler = ResponseReconciler::new("Test");
        let candidates = reconciler
            .reconcile(
                vec![
                    json!({ "content": "first" }),
                    json!({ "finishReason": "SAFETY" }),
                    json!({ "content": "second" }),
                ],
                has_content,
                finish_reason,
                to_candidate,
            )
            .unwrap();

        let texts: Vec<String> = candidates.iter().map(Candidate::text).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn aggregates_distinct_finish_reasons() {
        let reconciler = ResponseReconciler::new("Test");
        let error = reconciler
            .reconcile(
                vec![
                    json!({ "finishReason": "SAFETY" }),
                    json!({ "finishReason": "RECITATION" }),
                    json!({ "finishReason": "SAFETY" }),
                ],
                has_content,
                finish_reason,
                to_candidate,
            )
            .unwrap_err();

        match error {
            AiServicesError::NoCandidates(message) => assert_eq!(
                message,
                "The response from the Test API does not include any candidates with content. \
                 Finish reason: SAFETY, RECITATION"
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn generic_message_without_finish_reasons() {
        let reconciler = ResponseReconciler::new("Test");
        let error = reconciler
            .reconcile(vec![json!({})], has_content, finish_reason, to_candidate)
            .unwrap_err();

        match error {
            AiServicesError::NoCandidates(message) => {
                assert!(!message.contains("Finish reason"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    struct Pipes;

    impl Localizer for Pipes {
        fn join_list(&self, items: &[String]) -> String {
            items.join(" | ")
        }
    }

    #[test]
    fn uses_injected_localizer() {
        let reconciler = ResponseReconciler::new("Test").with_localizer(Arc::new(Pipes));
        let error = reconciler
            .reconcile(
                vec![json!({ "finishReason": "A" }), json!({ "finishReason": "B" })],
                has_content,
                finish_reason,
                to_candidate,
            )
            .unwrap_err();

        assert!(error.to_string().ends_with("Finish reason: A | B"));
    }
}
