//! Gemini `generateContent` REST client
//!
//! Sends one request per call with `responseMimeType = application/json` and
//! the caller's response schema, so the model answers with schema-shaped JSON
//! instead of prose.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{GenerationRequest, GenerativeModel, GenerativeModelError};
use crate::core::config::GeminiConfig;
use crate::core::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Gemini client holding one configured HTTP client for the process
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build Gemini HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_body(request: &GenerationRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: request.system_instruction.clone(),
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: json!({
                "responseMimeType": "application/json",
                "responseSchema": request.response_schema,
            }),
        }
    }

    /// Pull the generated text out of a `generateContent` response
    fn response_text(response: GenerateContentResponse) -> Result<String, GenerativeModelError> {
        if let Some(reason) = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
        {
            return Err(GenerativeModelError::Blocked(reason));
        }

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or(GenerativeModelError::EmptyResponse)?;

        let text: String = candidate
            .content
            .map(|content| content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return match candidate.finish_reason.as_deref() {
                Some(reason) if reason != "STOP" => {
                    Err(GenerativeModelError::Blocked(reason.to_string()))
                }
                _ => Err(GenerativeModelError::EmptyResponse),
            };
        }

        Ok(text)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate_json(
        &self,
        request: &GenerationRequest,
    ) -> Result<String, GenerativeModelError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerativeModelError::MissingApiKey)?;

        tracing::debug!("Calling Gemini model {}", self.model);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&Self::build_body(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerativeModelError::Timeout
                } else {
                    GenerativeModelError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerativeModelError::Status {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GenerativeModelError::Timeout
            } else {
                GenerativeModelError::Transport(format!("Invalid Gemini response body: {}", e))
            }
        })?;

        Self::response_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(api_key: Option<&str>, base_url: &str) -> GeminiConfig {
        GeminiConfig {
            api_key: api_key.map(str::to_string),
            model: "gemini-1.5-flash".to_string(),
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(2),
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            system_instruction: "Extract the place".to_string(),
            prompt: "URL: https://example.com/cafe-post".to_string(),
            response_schema: json!({"type": "OBJECT"}),
        }
    }

    #[test]
    fn test_build_body_shape() {
        let body = serde_json::to_value(GeminiClient::build_body(&request())).unwrap();

        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "Extract the place"
        );
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_endpoint_uses_model_name() {
        let client = GeminiClient::new(&config(Some("k"), "https://api.test/v1beta")).unwrap();

        assert_eq!(
            client.endpoint(),
            "https://api.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "{\"name\":"}, {"text": "\"Cafe\"}"}]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        let text = GeminiClient::response_text(response).unwrap();
        assert_eq!(text, "{\"name\":\"Cafe\"}");
    }

    #[test]
    fn test_response_text_blocked_prompt() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();

        let result = GeminiClient::response_text(response);
        assert!(matches!(result, Err(GenerativeModelError::Blocked(reason)) if reason == "SAFETY"));
    }

    #[test]
    fn test_response_text_no_candidates() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": []})).unwrap();

        assert!(matches!(
            GeminiClient::response_text(response),
            Err(GenerativeModelError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_network() {
        let client = GeminiClient::new(&config(None, "http://127.0.0.1:1")).unwrap();

        assert!(!client.is_configured());
        let result = client.generate_json(&request()).await;
        assert!(matches!(result, Err(GenerativeModelError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let client = GeminiClient::new(&config(Some("k"), "http://127.0.0.1:1")).unwrap();

        let result = client.generate_json(&request()).await;
        assert!(matches!(
            result,
            Err(GenerativeModelError::Transport(_)) | Err(GenerativeModelError::Timeout)
        ));
    }
}
