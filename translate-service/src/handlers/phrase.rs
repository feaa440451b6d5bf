use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::startup::AppState;
use service_core::error::AppError;

#[derive(Debug, Deserialize, Validate)]
pub struct PhraseRequest {
    /// Chinese description of what the caller wants to say.
    #[validate(length(min = 1, message = "Text describing what to say is required."))]
    pub text: String,
    /// Target language for the generated phrase, e.g. "Swedish".
    #[validate(length(min = 1, message = "Target language is required."))]
    pub language: String,
}

/// The model is asked to emit exactly this shape; it is forwarded to the
/// caller unchanged.
#[derive(Debug, Serialize, Deserialize)]
pub struct PhraseResponse {
    pub generated_phrase: String,
    pub chinese_translation: String,
}

fn phrase_system_prompt(language: &str) -> String {
    format!(
        "You are a helpful language assistant. The user will describe, in Chinese, \
         something they want to express. Interpret their intent, generate a natural, \
         idiomatic phrase in {} that conveys it, and provide a literal Chinese \
         translation of that generated phrase. Respond with only a JSON object \
         containing exactly two keys, \"generated_phrase\" and \"chinese_translation\", \
         with no surrounding text, explanations, or markdown.",
        language
    )
}

/// Schema constraint sent with the request so Gemini emits the two-field
/// object directly (Gemini schema types are uppercase).
fn phrase_response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "generated_phrase": { "type": "STRING" },
            "chinese_translation": { "type": "STRING" }
        },
        "required": ["generated_phrase", "chinese_translation"]
    })
}

/// POST /api/phrase
///
/// Same ordering contract as the translate handler: method, then credential,
/// then body.
#[tracing::instrument(skip(state, body))]
pub async fn phrase(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<PhraseResponse>), AppError> {
    if !state.gemini.is_configured() {
        return Err(AppError::NotConfigured);
    }

    let request: PhraseRequest = serde_json::from_slice(&body).map_err(|_| {
        AppError::BadRequest(anyhow::anyhow!(
            "Text and target language are required."
        ))
    })?;
    request.validate()?;

    let raw = state
        .gemini
        .generate(
            &phrase_system_prompt(&request.language),
            &request.text,
            Some(phrase_response_schema()),
        )
        .await?;

    let response: PhraseResponse = serde_json::from_str(raw.trim()).map_err(|e| {
        tracing::error!(error = %e, raw = %raw, "Gemini returned a non-JSON phrase payload");
        AppError::UpstreamFormat
    })?;

    Ok((StatusCode::OK, Json(response)))
}
