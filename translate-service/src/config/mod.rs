use anyhow::Result;
use dotenvy::dotenv;
use secrecy::Secret;
use serde::Deserialize;
use std::env;

/// Default Gemini model, matching the deployed frontend's expectations.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-preview-05-20";

/// Default Gemini API base URL.
pub const DEFAULT_GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    /// Port 0 asks the OS for a free port (used by tests).
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct GeminiConfig {
    /// May be empty: the service still starts, but every proxy request
    /// fails with a uniform 500 until the key is provided.
    pub api_key: Secret<String>,
    pub model: String,
    pub api_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("TRANSLATE_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("TRANSLATE_SERVICE_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()?;

        let api_key = env::var("GEMINI_API_KEY").unwrap_or_default();
        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());
        let api_base_url = env::var("GEMINI_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_GEMINI_API_BASE_URL.to_string());

        Ok(Self {
            server: ServerConfig { host, port },
            gemini: GeminiConfig {
                api_key: Secret::new(api_key),
                model,
                api_base_url,
            },
            service_name: "translate-service".to_string(),
        })
    }
}
