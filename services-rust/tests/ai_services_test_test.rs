use ai_services::{
    ai_services_test::{MockApiClient, MockApiResult},
    AiServicesError, ApiClient, RequestOptions,
};
use serde_json::{json, Map};

#[tokio::test]
async fn mock_api_client_tracks_requests_and_returns_results() {
    let api = MockApiClient::new();
    api.enqueue_response(json!({ "first": true }))
        .enqueue_error(AiServicesError::Validation("mock error".to_string()))
        .enqueue_results([MockApiResult::from(json!({ "third": true }))]);

    let mut payload = Map::new();
    payload.insert("prompt".to_string(), json!("Hi"));
    let request = api
        .build_request("model-a", payload, &RequestOptions::default())
        .unwrap();
    assert_eq!(request.url, "mock://model-a");

    let first = api.execute(request).await.expect("first execute should succeed");
    assert_eq!(first, json!({ "first": true }));
    assert_eq!(api.tracked_payloads(), vec![json!({ "prompt": "Hi" })]);

    let list_request = api
        .build_list_models_request(&RequestOptions::default())
        .unwrap();
    let error = api
        .execute(list_request)
        .await
        .expect_err("second execute should error");
    match error {
        AiServicesError::Validation(message) => assert_eq!(message, "mock error"),
        other => panic!("unexpected error variant: {other:?}"),
    }
    assert_eq!(api.tracked_requests().len(), 2);

    api.reset();
    assert!(api.tracked_requests().is_empty());

    let list_request = api
        .build_list_models_request(&RequestOptions::default())
        .unwrap();
    let third = api.execute(list_request).await.unwrap();
    assert_eq!(third, json!({ "third": true }));
}

#[tokio::test]
async fn mock_api_client_errors_when_queue_is_empty() {
    let api = MockApiClient::new();
    api.enqueue_response(json!({}));
    api.restore();

    let request = api
        .build_list_models_request(&RequestOptions::default())
        .unwrap();
    let error = api.execute(request).await.unwrap_err();
    assert!(matches!(error, AiServicesError::Configuration(_)));
}
