//! Google Gemini `generateContent` provider for still-image descriptions

use async_trait::async_trait;
use base64::Engine;
use serde::Serialize;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use onereel_core::constants::STILL_MIME_TYPE;
use onereel_core::models::DescriptionRequest;
use onereel_core::DescriptionServiceConfig;

use crate::service::{fallback_text, DescriptionError, DescriptionService};

const SERVICE_NAME: &str = "Gemini";
const DESCRIPTION_POINTER: &str = "/candidates/0/content/parts/0/text";

// generateContent request structures
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

/// Gemini vision client
pub struct GeminiVisionClient {
    http_client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl Debug for GeminiVisionClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiVisionClient")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiVisionClient {
    pub fn new(config: &DescriptionServiceConfig) -> Result<Self, DescriptionError> {
        if config.api_key.trim().is_empty() {
            return Err(DescriptionError::Configuration {
                service: SERVICE_NAME.to_string(),
                message: "API key is required but not provided".to_string(),
            });
        }

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder
            .build()
            .map_err(|e| DescriptionError::Configuration {
                service: SERVICE_NAME.to_string(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    fn build_request(request: &DescriptionRequest) -> GenerateContentRequest {
        let image_base64 =
            base64::engine::general_purpose::STANDARD.encode(&request.image_bytes);

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::Text {
                        text: request.prompt.clone(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: STILL_MIME_TYPE.to_string(),
                            data: image_base64,
                        },
                    },
                ],
            }],
        }
    }

    /// Pull the first candidate's text out of a response body.
    ///
    /// Invalid JSON is an error; valid JSON without usable text is the fallback.
    fn extract_description(body: &str) -> Result<String, DescriptionError> {
        let json: serde_json::Value =
            serde_json::from_str(body).map_err(|e| DescriptionError::MalformedResponse {
                service: SERVICE_NAME.to_string(),
                message: e.to_string(),
            })?;

        let text = json
            .pointer(DESCRIPTION_POINTER)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty());

        match text {
            Some(text) => Ok(text.to_string()),
            None => {
                tracing::warn!("Gemini response carried no description text");
                Ok(fallback_text(SERVICE_NAME))
            }
        }
    }
}

#[async_trait]
impl DescriptionService for GeminiVisionClient {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    async fn describe_one(&self, request: DescriptionRequest) -> Result<String, DescriptionError> {
        let body = Self::build_request(&request);

        tracing::debug!(
            model = %self.model,
            image_size = request.image_bytes.len(),
            "Sending description request to Gemini"
        );

        let response = self
            .http_client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| DescriptionError::Transport {
                service: SERVICE_NAME.to_string(),
                // reqwest errors embed the URL, which carries the key.
                message: e.without_url().to_string(),
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| DescriptionError::Transport {
                service: SERVICE_NAME.to_string(),
                message: e.without_url().to_string(),
            })?;

        if !status.is_success() {
            return Err(DescriptionError::Status {
                service: SERVICE_NAME.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        let description = Self::extract_description(&text)?;

        tracing::debug!(
            description_length = description.len(),
            "Gemini description received"
        );

        Ok(description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use mockito::Matcher;
    use serde_json::json;

    const ENDPOINT: &str = "/models/gemini-1.5-flash:generateContent";

    fn config(api_base: &str) -> DescriptionServiceConfig {
        DescriptionServiceConfig {
            api_key: "test-key".to_string(),
            api_base: api_base.to_string(),
            model: "gemini-1.5-flash".to_string(),
            timeout_secs: None,
        }
    }

    fn request() -> DescriptionRequest {
        DescriptionRequest {
            image_bytes: Bytes::from_static(&[0xFF, 0xD8, 0xFF, 0xE0]),
            prompt: "Describe this image for AI search filtering".to_string(),
        }
    }

    #[test]
    fn test_new_rejects_empty_key() {
        let mut cfg = config("http://localhost");
        cfg.api_key = String::new();
        assert!(matches!(
            GeminiVisionClient::new(&cfg),
            Err(DescriptionError::Configuration { .. })
        ));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = GeminiVisionClient::new(&config("http://localhost")).unwrap();
        assert!(!format!("{:?}", client).contains("test-key"));
    }

    #[test]
    fn test_build_request_shape() {
        let body = serde_json::to_value(GeminiVisionClient::build_request(&request())).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "text": "Describe this image for AI search filtering" },
                        { "inlineData": { "mimeType": "image/jpeg", "data": "/9j/4A==" } }
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_extract_description() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"A cat on a mat"}]}}]}"#;
        assert_eq!(
            GeminiVisionClient::extract_description(body).unwrap(),
            "A cat on a mat"
        );
    }

    #[test]
    fn test_extract_description_fallbacks() {
        for body in [
            r#"{}"#,
            r#"{"candidates":[]}"#,
            r#"{"candidates":[{"content":{"parts":[]}}]}"#,
            r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#,
            r#"{"candidates":"nope"}"#,
        ] {
            assert_eq!(
                GeminiVisionClient::extract_description(body).unwrap(),
                "No response from Gemini."
            );
        }
    }

    #[test]
    fn test_extract_description_invalid_json() {
        assert!(matches!(
            GeminiVisionClient::extract_description("<html>oops</html>"),
            Err(DescriptionError::MalformedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_describe_one_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", ENDPOINT)
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "text": "Describe this image for AI search filtering" },
                        { "inlineData": { "mimeType": "image/jpeg", "data": "/9j/4A==" } }
                    ]
                }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"A Cat on a mat"}]}}]}"#)
            .create_async()
            .await;

        let client = GeminiVisionClient::new(&config(&server.url())).unwrap();
        let description = client.describe_one(request()).await.unwrap();

        assert_eq!(description, "A Cat on a mat");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_describe_one_missing_text_uses_fallback() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", ENDPOINT)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#)
            .create_async()
            .await;

        let client = GeminiVisionClient::new(&config(&server.url())).unwrap();
        let description = client.describe_one(request()).await.unwrap();

        assert_eq!(description, "No response from Gemini.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_describe_one_error_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", ENDPOINT)
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body(r#"{"error":{"code":500,"message":"internal"}}"#)
            .create_async()
            .await;

        let client = GeminiVisionClient::new(&config(&server.url())).unwrap();
        let result = client.describe_one(request()).await;

        match result {
            Err(DescriptionError::Status { status, body, .. }) => {
                assert_eq!(status, 500);
                assert!(body.contains("internal"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_describe_one_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", ENDPOINT)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = GeminiVisionClient::new(&config(&server.url())).unwrap();
        let result = client.describe_one(request()).await;

        assert!(matches!(
            result,
            Err(DescriptionError::MalformedResponse { .. })
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_describe_one_connection_failure() {
        let client = GeminiVisionClient::new(&config("http://127.0.0.1:1")).unwrap();
        let result = client.describe_one(request()).await;

        match result {
            Err(DescriptionError::Transport { message, .. }) => {
                assert!(!message.contains("test-key"));
            }
            other => panic!("expected transport error, got {:?}", other),
        }
    }
}
