use crate::{AiServicesResult, Candidates, GenerationConfig};
use opentelemetry::trace::Status;
use std::time::Instant;
use tracing::{info_span, Span};
use tracing_futures::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub struct GenerateSpan {
    span: Span,
    start_time: Instant,
    candidate_count: Option<usize>,
    max_output_tokens: Option<u32>,
    temperature: Option<f64>,
    top_p: Option<f64>,
    top_k: Option<u32>,
    presence_penalty: Option<f64>,
    frequency_penalty: Option<f64>,
}

impl GenerateSpan {
    pub fn new(provider: &str, model_slug: &str, config: Option<&GenerationConfig>) -> Self {
        let span = info_span!("ai_services.generate_text");
        span.set_attribute("gen_ai.operation.name", "generate_content");
        span.set_attribute("gen_ai.provider.name", provider.to_string());
        span.set_attribute("gen_ai.request.model", model_slug.to_string());

        Self {
            span,
            start_time: Instant::now(),
            candidate_count: None,
            max_output_tokens: config.and_then(|c| c.max_output_tokens),
            temperature: config.and_then(|c| c.temperature),
            top_p: config.and_then(|c| c.top_p),
            top_k: config.and_then(|c| c.top_k),
            presence_penalty: config.and_then(|c| c.presence_penalty),
            frequency_penalty: config.and_then(|c| c.frequency_penalty),
        }
    }

    pub async fn instrument_future<F>(&self, future: F) -> F::Output
    where
        F: std::future::Future,
    {
        future.instrument(self.span.clone()).await
    }

    pub fn on_candidates(&mut self, candidates: &Candidates) {
        self.candidate_count = Some(candidates.len());
    }

    pub fn on_error(&mut self, error: &(dyn std::error::Error + 'static)) {
        self.span
            .set_attribute("exception.message", error.to_string());
        self.span.set_status(Status::error(error.to_string()));
    }

    pub fn on_end(&mut self) {
        if let Some(count) = self.candidate_count {
            self.span.set_attribute(
                "gen_ai.response.candidates",
                i64::try_from(count).unwrap_or(i64::MAX),
            );
        }
        self.span.set_attribute(
            "ai_services.duration_seconds",
            self.start_time.elapsed().as_secs_f64(),
        );

        if let Some(max_output_tokens) = self.max_output_tokens {
            self.span
                .set_attribute("gen_ai.request.max_tokens", i64::from(max_output_tokens));
        }
        if let Some(temperature) = self.temperature {
            self.span
                .set_attribute("gen_ai.request.temperature", temperature);
        }
        if let Some(top_p) = self.top_p {
            self.span.set_attribute("gen_ai.request.top_p", top_p);
        }
        if let Some(top_k) = self.top_k {
            self.span
                .set_attribute("gen_ai.request.top_k", i64::from(top_k));
        }
        if let Some(presence_penalty) = self.presence_penalty {
            self.span
                .set_attribute("gen_ai.request.presence_penalty", presence_penalty);
        }
        if let Some(frequency_penalty) = self.frequency_penalty {
            self.span
                .set_attribute("gen_ai.request.frequency_penalty", frequency_penalty);
        }
    }
}

pub async fn trace_generate_text<F, Fut>(
    provider: &str,
    model_slug: &str,
    config: Option<&GenerationConfig>,
    f: F,
) -> AiServicesResult<Candidates>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = AiServicesResult<Candidates>>,
{
    let mut span = GenerateSpan::new(provider, model_slug, config);
    let result = span.instrument_future(f()).await;

    match &result {
        Ok(candidates) => span.on_candidates(candidates),
        Err(error) => span.on_error(error),
    }

    span.on_end();
    result
}
