//! Thin fetch layer over the shared reqwest client.
//!
//! Providers speak either JSON or feed text; callers get a [`Body`] already
//! classified by the response's declared content type so parsers never have
//! to guess.

use reqwest::header::CONTENT_TYPE;

use crate::REQWEST_CLIENT;
use crate::errors::*;

/// A provider response body.
#[derive(Debug, Clone)]
pub enum Body {
    Json(serde_json::Value),
    Text(String),
}

impl Body {
    /// The parsed JSON value, or `MalformedPayload` when the server sent
    /// something else.
    pub fn json(self) -> Result<serde_json::Value> {
        match self {
            Body::Json(value) => Ok(value),
            Body::Text(_) => Err(Error::malformed("expected a JSON response")),
        }
    }

    /// The body as text, re-serializing if it happened to parse as JSON.
    pub fn text(self) -> String {
        match self {
            Body::Json(value) => value.to_string(),
            Body::Text(text) => text,
        }
    }
}

/// GET `url` with optional extra `headers` and collect the whole body.
///
/// Classification: a content type containing "xml" or "rss", or one that is
/// not JSON-compatible at all, comes back as [`Body::Text`]; otherwise the
/// body goes through the JSON parser with raw text as the fallback.
///
/// Fails with [`Error::Timeout`] when no complete response arrives within
/// [`crate::REQWEST_TIMEOUT`], and [`Error::Network`] on connection-level
/// failures. Never retries internally; retry and fallback belong to the
/// caller.
pub async fn fetch(url: &str, headers: &[(&str, &str)]) -> Result<Body> {
    let mut request = REQWEST_CLIENT.get(url);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    let response = request.send().await?;

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let text = response.text().await?;

    if content_type.contains("xml") || content_type.contains("rss") {
        return Ok(Body::Text(text));
    }
    if !content_type.is_empty() && !content_type.contains("json") {
        return Ok(Body::Text(text));
    }
    match serde_json::from_str(&text) {
        Ok(value) => Ok(Body::Json(value)),
        Err(_) => Ok(Body::Text(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn json_content_type_is_parsed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(r#"{"ok":true}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let body = fetch(&format!("{}/data", server.uri()), &[]).await.unwrap();
        match body {
            Body::Json(value) => assert_eq!(value["ok"], true),
            Body::Text(text) => panic!("expected json, got text: {text}"),
        }
    }

    #[tokio::test]
    async fn rss_content_type_stays_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<rss version=\"2.0\"/>", "application/rss+xml"),
            )
            .mount(&server)
            .await;

        let body = fetch(&server.uri(), &[]).await.unwrap();
        assert!(matches!(body, Body::Text(text) if text.starts_with("<rss")));
    }

    #[tokio::test]
    async fn invalid_json_falls_back_to_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("not json", "application/json"))
            .mount(&server)
            .await;

        let body = fetch(&server.uri(), &[]).await.unwrap();
        assert!(matches!(body, Body::Text(text) if text == "not json"));
    }

    #[tokio::test]
    async fn headers_are_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("apikey", "sesame"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        fetch(&server.uri(), &[("apikey", "sesame")]).await.unwrap();
    }

    #[tokio::test]
    async fn connection_failure_is_a_network_error() {
        // Nothing listens on the reserved discard port.
        let result = fetch("http://127.0.0.1:9/", &[]).await;
        assert!(matches!(result, Err(Error::Network(_))));
    }
}
