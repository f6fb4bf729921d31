use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::spots::dtos::SpotDetails;
use crate::features::spots::services::MetadataService;
use crate::modules::llm::{GenerationRequest, GenerativeModel, GenerativeModelError};
use crate::shared::constants::{
    MSG_EXTRACTION_FAILED, MSG_EXTRACTION_TIMEOUT, MSG_INVALID_PLACE_DATA, MSG_NOT_A_PLACE,
};
use crate::shared::llm::{parse_llm_json, LlmResponse};
use crate::shared::prompts::{
    render_spot_extraction_system_prompt, render_spot_extraction_user_prompt, PromptPageHints,
};

impl LlmResponse for SpotDetails {}

/// Response schema sent with every generation call.
///
/// Gemini accepts an OpenAPI subset only, so this is written out rather than
/// derived.
pub fn spot_response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "description": "Extracted shop or place information",
        "properties": {
            "name": {
                "type": "STRING",
                "description": "Name of the shop or place",
                "nullable": false
            },
            "address": {
                "type": "STRING",
                "description": "Address, as detailed as possible",
                "nullable": false
            },
            "genre": {
                "type": "STRING",
                "description": "Genre (cafe, ramen, sightseeing spot, ...)",
                "nullable": false
            },
            "latitude": {
                "type": "NUMBER",
                "description": "Latitude of the place (decimal degrees)",
                "nullable": false
            },
            "longitude": {
                "type": "NUMBER",
                "description": "Longitude of the place (decimal degrees)",
                "nullable": false
            },
            "description": {
                "type": "STRING",
                "description": "Short introduction or recommended points of the place",
                "nullable": true
            },
            "tags": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Tags describing the place (e.g. scenic, long queue, date spot, solo-friendly)",
                "nullable": true
            }
        },
        "required": ["name", "address", "genre", "latitude", "longitude"]
    })
}

/// Whether the model signalled that the URL is not about a place.
///
/// The prompt asks for blank identifying fields; an explicit `error` member
/// from a model that ignored the response schema counts too.
fn is_not_a_place_signal(value: &serde_json::Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };

    if object.get("error").is_some_and(|e| !e.is_null()) {
        return true;
    }

    let blank = |key: &str| {
        object
            .get(key)
            .and_then(|v| v.as_str())
            .is_none_or(|s| s.trim().is_empty())
    };

    blank("name") && blank("address")
}

/// Turns a URL into validated place details with one generative model call.
pub struct ExtractionService {
    model: Arc<dyn GenerativeModel>,
    metadata: Option<Arc<MetadataService>>,
    timeout: Duration,
}

impl ExtractionService {
    /// `metadata` enables prompt enrichment with fetched page hints.
    pub fn new(
        model: Arc<dyn GenerativeModel>,
        metadata: Option<Arc<MetadataService>>,
        timeout: Duration,
    ) -> Self {
        Self {
            model,
            metadata,
            timeout,
        }
    }

    /// Extract place details for a URL.
    ///
    /// No retries. Every failure other than missing configuration or a
    /// timeout is reported as `Extraction` with a user-safe message.
    pub async fn extract(&self, url: &str) -> Result<SpotDetails> {
        if !self.model.is_configured() {
            return Err(AppError::Configuration(
                "GEMINI_API_KEY is not set".to_string(),
            ));
        }

        let metadata = match &self.metadata {
            Some(fetcher) => fetcher.fetch_metadata(url).await,
            None => None,
        };

        let hints = metadata.as_ref().map(|m| PromptPageHints {
            title: &m.title,
            description: &m.description,
            site_name: &m.site_name,
            body_text: &m.body_text,
        });

        let request = GenerationRequest {
            system_instruction: render_spot_extraction_system_prompt(
                &SpotDetails::json_schema_string(),
            )
            .map_err(|e| AppError::Internal(format!("Failed to render system prompt: {}", e)))?,
            prompt: render_spot_extraction_user_prompt(url, hints.as_ref())
                .map_err(|e| AppError::Internal(format!("Failed to render user prompt: {}", e)))?,
            response_schema: spot_response_schema(),
        };

        tracing::debug!(
            "Extracting spot from {} (enriched={})",
            url,
            metadata.is_some()
        );

        let raw = match tokio::time::timeout(self.timeout, self.model.generate_json(&request)).await
        {
            Ok(Ok(text)) => text,
            Ok(Err(GenerativeModelError::MissingApiKey)) => {
                return Err(AppError::Configuration(
                    "GEMINI_API_KEY is not set".to_string(),
                ));
            }
            Ok(Err(GenerativeModelError::Timeout)) | Err(_) => {
                tracing::warn!(
                    "Spot extraction timed out after {:?} for {}",
                    self.timeout,
                    url
                );
                return Err(AppError::Timeout(MSG_EXTRACTION_TIMEOUT.to_string()));
            }
            Ok(Err(e)) => {
                tracing::error!("Generative model call failed for {}: {}", url, e);
                return Err(AppError::Extraction(MSG_EXTRACTION_FAILED.to_string()));
            }
        };

        tracing::debug!(
            "Raw model response (first 500 chars): {}",
            raw.chars().take(500).collect::<String>()
        );

        Self::interpret_response(&raw)
    }

    /// Parse and validate raw model output into place details
    fn interpret_response(raw: &str) -> Result<SpotDetails> {
        let value: serde_json::Value = parse_llm_json(raw).map_err(|e| {
            tracing::error!("Model response is not valid JSON: {}", e);
            AppError::Extraction(MSG_EXTRACTION_FAILED.to_string())
        })?;

        if is_not_a_place_signal(&value) {
            tracing::info!("Model reported non-place content: {}", value);
            return Err(AppError::Extraction(MSG_NOT_A_PLACE.to_string()));
        }

        let details: SpotDetails = serde_json::from_value(value).map_err(|e| {
            tracing::error!("Model response does not match the spot schema: {}", e);
            AppError::Extraction(MSG_EXTRACTION_FAILED.to_string())
        })?;

        let details = details.normalized();
        details.validate().map_err(|e| {
            tracing::warn!("Model response failed validation: {}", e);
            AppError::Extraction(MSG_INVALID_PLACE_DATA.to_string())
        })?;

        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::FetcherConfig;
    use crate::shared::test_helpers::{FakeModel, FakeReply};

    const BLUE_BOTTLE: &str = r#"{"name":"Blue Bottle","address":"1-1 Chiyoda, Tokyo","genre":"cafe","latitude":35.681,"longitude":139.767,"tags":["quiet","wifi"]}"#;

    fn service(model: Arc<FakeModel>) -> ExtractionService {
        ExtractionService::new(model, None, Duration::from_secs(5))
    }

    fn extraction_message(result: Result<SpotDetails>) -> String {
        match result {
            Err(AppError::Extraction(msg)) => msg,
            other => panic!("expected extraction error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_extract_valid_place() {
        let model = Arc::new(FakeModel::new(FakeReply::Text(BLUE_BOTTLE.to_string())));

        let details = service(model.clone())
            .extract("https://example.com/cafe-post")
            .await
            .unwrap();

        assert_eq!(details.name, "Blue Bottle");
        assert_eq!(details.address, "1-1 Chiyoda, Tokyo");
        assert_eq!(details.latitude, 35.681);
        assert_eq!(
            details.tags,
            Some(vec!["quiet".to_string(), "wifi".to_string()])
        );
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_prompt_embeds_url_and_schema() {
        let model = Arc::new(FakeModel::new(FakeReply::Text(BLUE_BOTTLE.to_string())));

        service(model.clone())
            .extract("https://example.com/cafe-post")
            .await
            .unwrap();

        let request = model.last_request().unwrap();
        assert!(request.prompt.contains("https://example.com/cafe-post"));
        assert!(request
            .system_instruction
            .contains("empty strings for name, address and genre"));
        assert!(request.system_instruction.contains("latitude"));
        assert_eq!(
            request.response_schema["required"],
            json!(["name", "address", "genre", "latitude", "longitude"])
        );
    }

    #[tokio::test]
    async fn test_missing_credential_is_configuration_error_without_call() {
        let model = Arc::new(FakeModel::unconfigured());

        let result = service(model.clone()).extract("https://example.com/x").await;

        assert!(matches!(result, Err(AppError::Configuration(_))));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_not_a_place_error_object() {
        let model = Arc::new(FakeModel::new(FakeReply::Text(
            r#"{"error": "not_a_place", "reason": "news article"}"#.to_string(),
        )));

        let result = service(model).extract("https://example.com/news").await;

        assert_eq!(extraction_message(result), MSG_NOT_A_PLACE);
    }

    #[tokio::test]
    async fn test_not_a_place_blank_fields() {
        let model = Arc::new(FakeModel::new(FakeReply::Text(
            r#"{"name":"","address":"","genre":"","latitude":0,"longitude":0}"#.to_string(),
        )));

        let result = service(model).extract("https://example.com/news").await;

        assert_eq!(extraction_message(result), MSG_NOT_A_PLACE);
    }

    #[tokio::test]
    async fn test_out_of_range_latitude_is_rejected() {
        let model = Arc::new(FakeModel::new(FakeReply::Text(
            r#"{"name":"Blue Bottle","address":"1-1 Chiyoda","genre":"cafe","latitude":95.0,"longitude":139.767}"#
                .to_string(),
        )));

        let result = service(model).extract("https://example.com/cafe-post").await;

        assert_eq!(extraction_message(result), MSG_INVALID_PLACE_DATA);
    }

    #[tokio::test]
    async fn test_missing_required_field_is_extraction_error() {
        let model = Arc::new(FakeModel::new(FakeReply::Text(
            r#"{"name":"Blue Bottle","address":"1-1 Chiyoda","genre":"cafe"}"#.to_string(),
        )));

        let result = service(model).extract("https://example.com/cafe-post").await;

        assert_eq!(extraction_message(result), MSG_EXTRACTION_FAILED);
    }

    #[tokio::test]
    async fn test_prose_response_is_extraction_error() {
        let model = Arc::new(FakeModel::new(FakeReply::Text(
            "Sorry, I cannot help with that.".to_string(),
        )));

        let result = service(model).extract("https://example.com/x").await;

        assert_eq!(extraction_message(result), MSG_EXTRACTION_FAILED);
    }

    #[tokio::test]
    async fn test_transport_failure_is_opaque_extraction_error() {
        let model = Arc::new(FakeModel::new(FakeReply::Transport(
            "connection reset by peer".to_string(),
        )));

        let result = service(model).extract("https://example.com/x").await;

        let message = extraction_message(result);
        assert_eq!(message, MSG_EXTRACTION_FAILED);
        assert!(!message.contains("connection reset"));
    }

    #[tokio::test]
    async fn test_slow_model_times_out() {
        let model = Arc::new(FakeModel::new(FakeReply::Delayed(
            Duration::from_secs(5),
            BLUE_BOTTLE.to_string(),
        )));
        let service = ExtractionService::new(model, None, Duration::from_millis(50));

        let result = service.extract("https://example.com/x").await;

        assert!(matches!(result, Err(AppError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_client_timeout_maps_to_timeout() {
        let model = Arc::new(FakeModel::new(FakeReply::Timeout));

        let result = service(model).extract("https://example.com/x").await;

        assert!(matches!(result, Err(AppError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_unreachable_page_still_extracts_without_hints() {
        let model = Arc::new(FakeModel::new(FakeReply::Text(BLUE_BOTTLE.to_string())));
        let fetcher = Arc::new(
            MetadataService::new(&FetcherConfig {
                timeout: Duration::from_secs(2),
                ..FetcherConfig::default()
            })
            .unwrap(),
        );
        let service = ExtractionService::new(model.clone(), Some(fetcher), Duration::from_secs(5));

        let details = service.extract("http://127.0.0.1:1/post").await.unwrap();

        assert_eq!(details.name, "Blue Bottle");
        let request = model.last_request().unwrap();
        assert!(!request.prompt.contains("Page information"));
    }

    #[tokio::test]
    async fn test_reachable_page_hints_reach_the_prompt() {
        use axum::{response::Html, routing::get, Router};

        let app = Router::new().route(
            "/cafe-post",
            get(|| async {
                Html(
                    r#"<html><head>
                        <meta property="og:title" content="Blue Bottle Coffee Kiyosumi">
                        <meta property="og:site_name" content="Instagram">
                    </head><body><p>Pour-over by the river</p></body></html>"#,
                )
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let model = Arc::new(FakeModel::new(FakeReply::Text(BLUE_BOTTLE.to_string())));
        let fetcher = Arc::new(
            MetadataService::new(&FetcherConfig {
                timeout: Duration::from_secs(5),
                ..FetcherConfig::default()
            })
            .unwrap(),
        );
        let service = ExtractionService::new(model.clone(), Some(fetcher), Duration::from_secs(5));

        let url = format!("http://{}/cafe-post", addr);
        service.extract(&url).await.unwrap();

        let request = model.last_request().unwrap();
        assert!(request.prompt.contains(&url));
        assert!(request.prompt.contains("Page information"));
        assert!(request.prompt.contains("Blue Bottle Coffee Kiyosumi"));
        assert!(request.prompt.contains("Instagram"));
        assert!(request.prompt.contains("Pour-over by the river"));
    }

    #[test]
    fn test_interpret_response_handles_markdown_fence() {
        let raw = format!("```json\n{}\n```", BLUE_BOTTLE);

        let details = ExtractionService::interpret_response(&raw).unwrap();

        assert_eq!(details.genre, "cafe");
    }

    #[test]
    fn test_json_schema_string_lists_fields() {
        let schema = SpotDetails::json_schema_string();

        assert!(schema.contains("name"));
        assert!(schema.contains("address"));
        assert!(schema.contains("latitude"));
        assert!(schema.contains("tags"));
    }
}
