//! Gemini API client for the generateContent endpoint

use async_trait::async_trait;
use nlq_core::{LanguageModel, LlmError};
use serde::{Deserialize, Serialize};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Temperature is pinned at 0 so translation is as deterministic as the
/// provider allows.
const TEMPERATURE: f32 = 0.0;

/// Client for the Gemini generateContent API
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

/// Request body for generateContent
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

/// Response from generateContent
#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

/// Error detail from the API
#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl GeminiClient {
    /// Create a new client with the given API key and model identifier
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    /// Send a prompt and return the first candidate's text.
    async fn generate_content(&self, prompt: &str) -> Result<String, LlmError> {
        let request = ApiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        };

        let url = format!("{API_BASE}/{}:generateContent", self.model);
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if let Ok(api_err) = serde_json::from_str::<ApiError>(&body) {
                return Err(LlmError(format!(
                    "Gemini API error ({status}): {}",
                    api_err.error.message
                )));
            }
            return Err(LlmError(format!("Gemini API error ({status}): {body}")));
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|e| LlmError(format!("Failed to parse response: {e}")))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| LlmError("No text content in response".to_string()))
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.generate_content(prompt).await
    }
}
