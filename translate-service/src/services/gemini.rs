//! Gemini generative-language client.
//!
//! Wraps the `generateContent` REST endpoint: one request in, one candidate
//! text out. The upstream envelope is decoded into typed branches so that
//! "no candidate", "empty text" and "safety-blocked" are distinct outcomes
//! instead of repeated field probing.

use crate::config::GeminiConfig;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use thiserror::Error;

/// Gemini client holding the HTTP connection pool and credentials.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

/// Failure modes of a single `generateContent` call.
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Gemini API request failed with status {0}")]
    Status(u16),
    #[error("Gemini blocked the response for safety reasons")]
    Blocked,
    #[error("Gemini returned no usable candidate")]
    Empty,
    #[error("failed to reach the Gemini API: {0}")]
    Network(String),
    #[error("failed to decode the Gemini response: {0}")]
    Decode(String),
}

impl From<GeminiError> for AppError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::Status(code) => AppError::UpstreamStatus(code),
            GeminiError::Blocked => AppError::ContentBlocked,
            GeminiError::Empty => AppError::EmptyResponse,
            GeminiError::Network(msg) | GeminiError::Decode(msg) => {
                AppError::InternalError(anyhow::anyhow!(msg))
            }
        }
    }
}

/// Request body for `generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

/// Top-level `generateContent` response envelope. Fields the proxy does not
/// consume (usage metadata, safety ratings) are ignored on decode.
#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    /// Absent when the candidate was blocked before producing content.
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate.
    ///
    /// Empty text counts as absent. A candidate that finished with
    /// `SAFETY` and carries no text maps to `Blocked`; anything else
    /// without text maps to `Empty`.
    fn primary_text(&self) -> Result<String, GeminiError> {
        let candidate = self.candidates.first().ok_or(GeminiError::Empty)?;

        let text = candidate
            .content
            .as_ref()
            .and_then(|content| content.parts.first())
            .map(|part| part.text.as_str())
            .unwrap_or_default();

        if !text.is_empty() {
            return Ok(text.to_string());
        }

        match candidate.finish_reason.as_deref() {
            Some("SAFETY") => Err(GeminiError::Blocked),
            _ => Err(GeminiError::Empty),
        }
    }
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Check if the Gemini credential is set.
    pub fn is_configured(&self) -> bool {
        !self.config.api_key.expose_secret().is_empty()
    }

    /// Call `generateContent` once and return the first candidate's text.
    ///
    /// `response_schema` constrains the model to JSON output matching the
    /// given schema; `None` leaves the output as plain text.
    pub async fn generate(
        &self,
        system_instruction: &str,
        user_text: &str,
        response_schema: Option<serde_json::Value>,
    ) -> Result<String, GeminiError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: user_text.to_string(),
                }],
            }],
            system_instruction: Content {
                parts: vec![Part {
                    text: system_instruction.to_string(),
                }],
            },
            generation_config: response_schema.map(|schema| GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: schema,
            }),
        };

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.api_base_url,
            self.config.model,
            self.config.api_key.expose_secret()
        );

        tracing::debug!(
            model = %self.config.model,
            text_len = user_text.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to send request to Gemini API");
                GeminiError::Network(e.to_string())
            })?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Gemini API returned an error");
            return Err(GeminiError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to read Gemini API response body");
            GeminiError::Network(e.to_string())
        })?;

        let envelope: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, body = %body, "Failed to decode Gemini API response");
            GeminiError::Decode(e.to_string())
        })?;

        envelope.primary_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn test_config(api_key: &str) -> GeminiConfig {
        GeminiConfig {
            api_key: Secret::new(api_key.to_string()),
            model: "gemini-2.5-flash-preview-05-20".to_string(),
            api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }

    #[test]
    fn test_is_configured() {
        let client = GeminiClient::new(test_config("test-key"));
        assert!(client.is_configured());

        let client = GeminiClient::new(test_config(""));
        assert!(!client.is_configured());
    }

    #[test]
    fn primary_text_returns_candidate_text() {
        let envelope: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hej!" }] },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        assert_eq!(envelope.primary_text().unwrap(), "Hej!");
    }

    #[test]
    fn primary_text_maps_safety_block() {
        let envelope: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        }))
        .unwrap();

        assert!(matches!(envelope.primary_text(), Err(GeminiError::Blocked)));
    }

    #[test]
    fn primary_text_treats_empty_text_as_absent() {
        let envelope: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "" }] },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        assert!(matches!(envelope.primary_text(), Err(GeminiError::Empty)));
    }

    #[test]
    fn primary_text_without_candidates_is_empty() {
        let envelope = GenerateContentResponse::default();
        assert!(matches!(envelope.primary_text(), Err(GeminiError::Empty)));
    }

    #[test]
    fn request_serializes_camel_case() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "你好".to_string(),
                }],
            }],
            system_instruction: Content {
                parts: vec![Part {
                    text: "Translate.".to_string(),
                }],
            },
            generation_config: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "你好");
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "Translate.");
        assert!(value.get("generationConfig").is_none());
    }

    #[test]
    fn request_carries_response_schema() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "你好".to_string(),
                }],
            }],
            system_instruction: Content {
                parts: vec![Part {
                    text: "Phrase.".to_string(),
                }],
            },
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: serde_json::json!({ "type": "OBJECT" }),
            }),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(value["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn gemini_error_maps_to_app_error_statuses() {
        assert!(matches!(
            AppError::from(GeminiError::Status(503)),
            AppError::UpstreamStatus(503)
        ));
        assert!(matches!(
            AppError::from(GeminiError::Blocked),
            AppError::ContentBlocked
        ));
        assert!(matches!(
            AppError::from(GeminiError::Empty),
            AppError::EmptyResponse
        ));
        assert!(matches!(
            AppError::from(GeminiError::Network("timeout".to_string())),
            AppError::InternalError(_)
        ));
    }
}
