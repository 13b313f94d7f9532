use crate::{AiServicesError, AiServicesResult, RequestDescriptor};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client,
};
use serde_json::Value;
use std::collections::HashMap;

pub(crate) fn to_header_map(
    headers: &HashMap<String, String>,
    provider: &'static str,
) -> AiServicesResult<HeaderMap> {
    let mut header_map = HeaderMap::new();

    for (key, value) in headers {
        let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|error| {
            AiServicesError::Validation(format!("Invalid {provider} header name '{key}': {error}"))
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|error| {
            AiServicesError::Validation(format!(
                "Invalid {provider} header value for '{key}': {error}"
            ))
        })?;
        header_map.insert(header_name, header_value);
    }

    Ok(header_map)
}

/// Send the request and parse the JSON response.
/// Throws error on non OK status code.
pub(crate) async fn send_json(
    client: &Client,
    request: RequestDescriptor,
    provider: &'static str,
) -> AiServicesResult<Value> {
    let RequestDescriptor {
        method,
        url,
        headers,
        body,
        timeout,
    } = request;

    let mut builder = client
        .request(method.clone(), &url)
        .headers(to_header_map(&headers, provider)?);
    if let Some(body) = &body {
        builder = builder.json(body);
    }
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    tracing::debug!(provider, %method, %url, "sending request");

    let response = builder.send().await.inspect_err(|error| {
        tracing::error!(provider, %error, "request failed");
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(provider, %status, "provider returned an error status");
        return Err(AiServicesError::Status(status, body));
    }

    Ok(response.json::<Value>().await?)
}
