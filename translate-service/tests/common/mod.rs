use secrecy::Secret;
use serde_json::json;
use translate_service::config::{Config, GeminiConfig, ServerConfig};
use translate_service::startup::Application;
use wiremock::MockServer;

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_MODEL: &str = "gemini-2.5-flash-preview-05-20";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    /// Stub standing in for the Gemini API.
    pub gemini_server: MockServer,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_api_key(TEST_API_KEY).await
    }

    /// Spawn with an empty API key to exercise the unconfigured paths.
    pub async fn spawn_unconfigured() -> Self {
        Self::spawn_with_api_key("").await
    }

    async fn spawn_with_api_key(api_key: &str) -> Self {
        let gemini_server = MockServer::start().await;

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
            },
            gemini: GeminiConfig {
                api_key: Secret::new(api_key.to_string()),
                model: TEST_MODEL.to_string(),
                api_base_url: gemini_server.uri(),
            },
            service_name: "translate-service-test".to_string(),
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            gemini_server,
        }
    }

    /// Path the service is expected to hit on the Gemini stub.
    pub fn generate_content_path() -> String {
        format!("/models/{}:generateContent", TEST_MODEL)
    }
}

/// Gemini envelope carrying a single candidate with the given text.
pub fn gemini_candidate_body(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

/// Gemini envelope for a candidate blocked by safety filters (no content).
pub fn gemini_safety_blocked_body() -> serde_json::Value {
    json!({
        "candidates": [{
            "finishReason": "SAFETY",
            "safetyRatings": [{ "category": "HARM_CATEGORY_HARASSMENT", "probability": "HIGH" }]
        }]
    })
}
