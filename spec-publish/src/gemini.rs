//! Gemini generator: implements [`TreeGenerator`] by sending the generation
//! prompt to `POST {base}/models/{model}:generateContent` and parsing the
//! reply text into a tree.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use spec_publish_core::contract::{SourceDocuments, TreeGenerator};
use spec_publish_core::error::{RemoteError, SourceError};
use spec_publish_core::generate::{build_prompt, parse_generated_tree};
use spec_publish_core::render::{Labels, Locale};
use spec_publish_core::tree::SpecNode;

use crate::load_config::GeminiSettings;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);
const TEMPERATURE: f32 = 0.2;

pub struct GeminiClient {
    api_key: SecretString,
    api_base: String,
    model: String,
    labels: &'static Labels,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    role: String,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text parts of the first candidate, concatenated.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings, locale: Locale) -> Result<Self, RemoteError> {
        let api_base = settings
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();
        let model = settings.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RemoteError::Transport(format!("failed to create HTTP client: {e}")))?;

        info!(api_base = %api_base, model = %model, "Initialized Gemini client");
        Ok(Self {
            api_key: settings.api_key,
            api_base,
            model,
            labels: locale.labels(),
            client,
        })
    }

    fn build_request(&self, prompt: String) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user".to_string(),
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                response_mime_type: "application/json".to_string(),
            },
        }
    }
}

#[async_trait]
impl TreeGenerator for GeminiClient {
    async fn generate(&self, documents: &SourceDocuments) -> Result<SpecNode, SourceError> {
        info!(model = %self.model, documents = documents.len(), "Generating with Gemini");
        let start_time = Instant::now();
        let request = self.build_request(build_prompt(documents, self.labels));
        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(format!("Gemini request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status { status, body }.into());
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(format!("Gemini response: {e}")))?;
        let text = body
            .text()
            .ok_or_else(|| RemoteError::Decode("no text in Gemini response".to_string()))?;

        debug!(
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            chars = text.chars().count(),
            "Received response from Gemini, parsing tree"
        );
        parse_generated_tree(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiClient {
        GeminiClient::new(
            GeminiSettings {
                api_key: SecretString::from("key-123".to_string()),
                model: None,
                api_base: None,
            },
            Locale::Ja,
        )
        .unwrap()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let client = client();
        assert_eq!(client.model, DEFAULT_MODEL);
        assert_eq!(client.api_base, DEFAULT_API_BASE);
        assert!(!format!("{client:?}").contains("key-123"));
    }

    #[test]
    fn request_uses_gemini_field_names() {
        let request = client().build_request("hello".to_string());
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn response_text_joins_first_candidate_parts() {
        let body: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"title\":"},{"text":"\"API\"}"}],"role":"model"}}]}"#,
        )
        .unwrap();
        assert_eq!(body.text().as_deref(), Some("{\"title\":\"API\"}"));
    }

    #[test]
    fn response_without_candidates_has_no_text() {
        let body: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(body.text().is_none());
        let blocked: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(blocked.text().is_none());
    }
}
