use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::startup::AppState;
use service_core::error::AppError;

/// Instruction steering the model toward a bare Chinese-to-Swedish translation.
const TRANSLATE_SYSTEM_PROMPT: &str = "You are an expert translator. Translate the given Chinese text to Swedish. Provide only the direct Swedish translation, without any additional text, explanations, or quotation marks.";

#[derive(Debug, Deserialize, Validate)]
pub struct TranslateRequest {
    #[validate(length(min = 1, message = "Text to translate is required."))]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub translation: String,
}

/// POST /api/translate
///
/// The credential check must precede body parsing, so the handler takes the
/// raw bytes instead of the `Json` extractor.
#[tracing::instrument(skip(state, body))]
pub async fn translate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<TranslateResponse>), AppError> {
    if !state.gemini.is_configured() {
        return Err(AppError::NotConfigured);
    }

    let request: TranslateRequest = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest(anyhow::anyhow!("Text to translate is required.")))?;
    request.validate()?;

    let text = state
        .gemini
        .generate(TRANSLATE_SYSTEM_PROMPT, &request.text, None)
        .await?;

    tracing::info!(translation_len = text.trim().len(), "Translation produced");

    Ok((
        StatusCode::OK,
        Json(TranslateResponse {
            translation: text.trim().to_string(),
        }),
    ))
}
