use ai_services::{
    ai_services_test::MockApiClient,
    google::{GoogleAiService, GoogleAiServiceOptions, SafetySetting},
    AiCapability, AiServicesError, Content, GenerationConfig, GenerativeAiModel,
    GenerativeAiService, ModelParams, Part, Prompt, RequestOptions, Role,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn mock_service() -> (Arc<MockApiClient>, GoogleAiService) {
    let api = Arc::new(MockApiClient::new());
    let service = GoogleAiService::with_api_client(api.clone());
    (api, service)
}

#[tokio::test]
async fn generate_text_round_trips_text_content() {
    let (api, service) = mock_service();
    api.enqueue_response(json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": "Hello" }] },
            "finishReason": "STOP"
        }]
    }));

    let model = service
        .get_model(ModelParams::default(), RequestOptions::default())
        .unwrap();
    assert_eq!(model.model_slug(), "gemini-1.5-flash");

    let candidates = model
        .generate_text(Prompt::from("Hi"), &RequestOptions::default())
        .await
        .expect("generate_text should succeed");

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates.text(), "Hello");
    assert_eq!(candidates.first().content.role, Role::Model);

    let requests = api.tracked_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, "mock://models/gemini-1.5-flash");
    assert_eq!(
        requests[0].body,
        Some(json!({ "contents": [{ "role": "user", "parts": [{ "text": "Hi" }] }] }))
    );
}

#[tokio::test]
async fn safety_blocked_response_has_no_candidates() {
    let (api, service) = mock_service();
    api.enqueue_response(json!({ "candidates": [{ "finishReason": "SAFETY" }] }));

    let model = service
        .get_model(ModelParams::default(), RequestOptions::default())
        .unwrap();
    let error = model
        .generate_text(Prompt::from("Hi"), &RequestOptions::default())
        .await
        .unwrap_err();

    match error {
        AiServicesError::NoCandidates(message) => assert_eq!(
            message,
            "The response from the Google AI API does not include any candidates with content. \
             Finish reason: SAFETY"
        ),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn keeps_only_candidates_with_content() {
    let (api, service) = mock_service();
    api.enqueue_response(json!({
        "candidates": [
            { "content": { "role": "model", "parts": [{ "text": "A" }] }, "finishReason": "STOP" },
            { "finishReason": "RECITATION" }
        ]
    }));

    let candidates = service
        .get_model(ModelParams::default(), RequestOptions::default())
        .unwrap()
        .generate_text(Prompt::from("Hi"), &RequestOptions::default())
        .await
        .unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates.first().finish_reason(), Some("STOP"));
}

#[tokio::test]
async fn pdf_parts_are_rejected_before_sending() {
    let (api, service) = mock_service();
    let model = service
        .get_model(ModelParams::default(), RequestOptions::default())
        .unwrap();

    let error = model
        .generate_text(
            Prompt::from(vec![Part::inline_data("application/pdf", "JVBERi0=")]),
            &RequestOptions::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(error, AiServicesError::UnsupportedPart("google", _)));
    assert!(api.tracked_requests().is_empty());
}

#[tokio::test]
async fn prompt_must_end_with_user_content() {
    let (api, service) = mock_service();
    let model = service
        .get_model(ModelParams::default(), RequestOptions::default())
        .unwrap();

    let error = model
        .generate_text(
            Prompt::from(vec![Content::user(["Hi"]), Content::model(["Hello"])]),
            &RequestOptions::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(error, AiServicesError::Validation(_)));
    assert!(api.tracked_requests().is_empty());
}

#[tokio::test]
async fn model_params_from_loose_mapping() {
    let (api, service) = mock_service();
    api.enqueue_response(json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": "{}" }] } }]
    }));

    let params = ModelParams::from_value(json!({
        "model": "gemini-1.5-pro",
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": { "type": "object" },
            "temperature": 0.0,
            "cachedContent": "cachedContents/abc"
        },
        "systemInstruction": "Reply with JSON.",
        "safetySettings": [{ "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_NONE" }]
    }))
    .unwrap();
    let model = service
        .get_model(params, RequestOptions::default().with_header("x-trace", "1"))
        .unwrap();

    model
        .generate_text(Prompt::from("Hi"), &RequestOptions::default())
        .await
        .unwrap();

    let requests = api.tracked_requests();
    assert_eq!(requests[0].url, "mock://models/gemini-1.5-pro");
    assert_eq!(requests[0].headers["x-trace"], "1");
    assert_eq!(
        requests[0].body,
        Some(json!({
            "cachedContent": "cachedContents/abc",
            "contents": [{ "role": "user", "parts": [{ "text": "Hi" }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": { "type": "object" }
            },
            "systemInstruction": { "role": "system", "parts": [{ "text": "Reply with JSON." }] },
            "safetySettings": [{ "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_NONE" }]
        }))
    );
}

#[tokio::test]
async fn list_models_maps_capabilities() {
    let (api, service) = mock_service();
    api.enqueue_response(json!({
        "models": [
            {
                "name": "models/gemini-1.5-flash-001",
                "baseModelId": "gemini-1.5-flash",
                "supportedGenerationMethods": ["generateContent", "countTokens"]
            },
            {
                "name": "models/text-embedding-004",
                "supportedGenerationMethods": ["embedContent"]
            }
        ]
    }));

    let models = service
        .list_models(&RequestOptions::default())
        .await
        .unwrap();

    assert_eq!(
        models["gemini-1.5-flash"],
        vec![AiCapability::MultimodalInput, AiCapability::TextGeneration]
    );
    assert!(models["text-embedding-004"].is_empty());
    assert_eq!(api.tracked_requests()[0].url, "mock://models");
}

#[tokio::test]
async fn list_models_requires_models_field() {
    let (api, service) = mock_service();
    for response in [json!({}), json!({ "models": [] })] {
        api.enqueue_response(response);

        let error = service
            .list_models(&RequestOptions::default())
            .await
            .unwrap_err();
        assert!(
            matches!(error, AiServicesError::MissingField("google", field) if field == "models")
        );
    }
}

#[tokio::test]
async fn http_client_sends_generate_content_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "Hi" }] }],
            "safetySettings": [{ "category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_ONLY_HIGH" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Hello from Gemini" }] },
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = GoogleAiService::new(GoogleAiServiceOptions {
        api_key: "test-key".to_string(),
        base_url: Some(server.uri()),
        ..Default::default()
    });
    let model = service
        .get_model(
            ModelParams::default()
                .with_generation_config(GenerationConfig::default())
                .with_safety_settings(vec![SafetySetting::new(
                    "HARM_CATEGORY_HARASSMENT",
                    "BLOCK_ONLY_HIGH",
                )]),
            RequestOptions::default(),
        )
        .unwrap();

    let candidates = model
        .generate_text(Prompt::from("Hi"), &RequestOptions::default())
        .await
        .unwrap();
    assert_eq!(candidates.text(), "Hello from Gemini");
}

#[tokio::test]
async fn http_client_reports_status_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .mount(&server)
        .await;

    let service = GoogleAiService::new(GoogleAiServiceOptions {
        api_key: "bad-key".to_string(),
        base_url: Some(server.uri()),
        ..Default::default()
    });
    let error = service
        .get_model(ModelParams::default(), RequestOptions::default())
        .unwrap()
        .generate_text(Prompt::from("Hi"), &RequestOptions::default())
        .await
        .unwrap_err();

    assert_eq!(error.status().map(|status| status.as_u16()), Some(403));
    match error {
        AiServicesError::Status(_, body) => assert_eq!(body, "API key not valid"),
        other => panic!("unexpected error: {other:?}"),
    }
}
