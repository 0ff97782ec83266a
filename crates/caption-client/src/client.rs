//! Gemini caption client.
//!
//! The booth asks for exactly one caption per strip, best-effort: a single
//! request, no retries, and a themed fallback for every failure mode. The
//! public entry point is infallible by contract so the caller never has to
//! branch on a caption error.

use std::time::Duration;

use base64::Engine;
use reqwest::Client;
use tracing::{debug, warn};

use snapstrip_common::error::{BoothError, BoothResult};

use crate::types::{GenerateContentRequest, GenerateContentResponse, RequestContent, RequestPart};

/// Fallback when the request fails for any reason (network, HTTP, decode).
pub const OFFLINE_CAPTION: &str = "System Offline. Date Unknown.";

/// Fallback when the model answers but produces no usable text.
pub const CORRUPTED_CAPTION: &str = "Memory Corrupted. [Error 404]";

/// The persona prompt sent alongside the strip image.
const CAPTION_PROMPT: &str = "You are a vintage photo booth machine from the 1980s. \
     Look at this photo strip and write one short, punchy, retro-futuristic \
     caption for it. Fewer than 10 words. No quotation marks.";

/// Configuration for the caption client.
#[derive(Debug, Clone)]
pub struct CaptionClientConfig {
    /// Base URL of the Gemini API.
    pub api_base: String,

    /// Model name used in the request path.
    pub model: String,

    /// API key; None disables captioning (every request falls back).
    pub api_key: Option<String>,

    /// Request timeout.
    pub timeout: Duration,
}

impl Default for CaptionClientConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key: None,
            timeout: Duration::from_secs(20),
        }
    }
}

impl CaptionClientConfig {
    /// Read the key (and optional overrides) from the environment.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base: std::env::var("GEMINI_API_BASE").unwrap_or(defaults.api_base),
            model: std::env::var("GEMINI_MODEL").unwrap_or(defaults.model),
            api_key: std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            timeout: defaults.timeout,
        }
    }
}

/// One-shot caption client.
pub struct CaptionClient {
    http: Client,
    config: CaptionClientConfig,
}

impl CaptionClient {
    pub fn new(config: CaptionClientConfig) -> BoothResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BoothError::caption(format!("HTTP client build failed: {e}")))?;
        Ok(Self { http, config })
    }

    pub fn from_env() -> BoothResult<Self> {
        Self::new(CaptionClientConfig::from_env())
    }

    /// Request a caption for a strip PNG. Always returns a usable string:
    /// the model's text, or a themed fallback when anything goes wrong.
    pub async fn request_caption(&self, strip_png: &[u8]) -> String {
        match self.generate(strip_png).await {
            Ok(Some(text)) => {
                debug!(caption = %text, "Caption generated");
                text
            }
            Ok(None) => {
                warn!("Caption response carried no usable text");
                CORRUPTED_CAPTION.to_string()
            }
            Err(e) => {
                warn!(error = %e, "Caption request failed");
                OFFLINE_CAPTION.to_string()
            }
        }
    }

    /// Single attempt against the generateContent endpoint.
    async fn generate(&self, strip_png: &[u8]) -> BoothResult<Option<String>> {
        let key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| BoothError::caption("No API key configured"))?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base, self.config.model
        );
        let encoded = base64::engine::general_purpose::STANDARD.encode(strip_png);
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart::text(CAPTION_PROMPT), RequestPart::png(encoded)],
            }],
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BoothError::caption(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(BoothError::caption(format!(
                "API returned {}",
                response.status()
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| BoothError::caption(format!("Response decode failed: {e}")))?;

        Ok(parsed.first_text().map(strip_wrapping_quotes))
    }
}

/// Models sometimes quote their answer despite the prompt; unwrap that.
fn strip_wrapping_quotes(text: String) -> String {
    let trimmed = text.trim();
    let unwrapped = trimmed
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(trimmed);
    unwrapped.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> CaptionClient {
        CaptionClient::new(CaptionClientConfig {
            api_base: server.uri(),
            model: "gemini-2.5-flash".to_string(),
            api_key: Some("test-key".to_string()),
            timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    fn caption_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": text}]}}]
        })
    }

    #[tokio::test]
    async fn test_successful_caption_is_returned_trimmed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(caption_body(
                "  \"Chrome hearts, analog souls.\"  ",
            )))
            .mount(&server)
            .await;

        let caption = client_for(&server).request_caption(b"png-bytes").await;
        assert_eq!(caption, "Chrome hearts, analog souls.");
    }

    #[tokio::test]
    async fn test_http_error_falls_back_to_offline() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let caption = client_for(&server).request_caption(b"png-bytes").await;
        assert_eq!(caption, OFFLINE_CAPTION);
    }

    #[tokio::test]
    async fn test_empty_candidates_fall_back_to_corrupted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": []
            })))
            .mount(&server)
            .await;

        let caption = client_for(&server).request_caption(b"png-bytes").await;
        assert_eq!(caption, CORRUPTED_CAPTION);
    }

    #[tokio::test]
    async fn test_blank_text_falls_back_to_corrupted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(caption_body("   ")))
            .mount(&server)
            .await;

        let caption = client_for(&server).request_caption(b"png-bytes").await;
        assert_eq!(caption, CORRUPTED_CAPTION);
    }

    #[tokio::test]
    async fn test_unreachable_server_falls_back_to_offline() {
        let client = CaptionClient::new(CaptionClientConfig {
            api_base: "http://127.0.0.1:1".to_string(),
            api_key: Some("test-key".to_string()),
            timeout: Duration::from_millis(500),
            ..CaptionClientConfig::default()
        })
        .unwrap();

        let caption = client.request_caption(b"png-bytes").await;
        assert_eq!(caption, OFFLINE_CAPTION);
    }

    #[tokio::test]
    async fn test_missing_api_key_falls_back_to_offline() {
        let client = CaptionClient::new(CaptionClientConfig::default()).unwrap();
        let caption = client.request_caption(b"png-bytes").await;
        assert_eq!(caption, OFFLINE_CAPTION);
    }
}
