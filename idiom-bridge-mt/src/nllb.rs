//! NLLB inference server provider for machine translation
//!
//! The neural model runs out of process behind a small HTTP endpoint. This
//! provider only speaks that endpoint's JSON protocol:
//!
//! ```json
//! POST {endpoint}
//! {"text": "...", "src_lang": "eng_Latn", "tgt_lang": "sin_Sinh", "max_length": 256, "num_beams": 5}
//!
//! 200 OK
//! {"translation": "..."}
//! ```
//!
//! # Configuration
//!
//! The provider loads the endpoint URL from the `NLLB_ENDPOINT` environment
//! variable.
//!
//! # Example
//!
//! ```ignore
//! use idiom_bridge::Direction;
//! use idiom_bridge_mt::{MachineTranslator, NllbProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = NllbProvider::from_env()?;
//!     let result = provider.translate("Good morning", Direction::EnToSi).await?;
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```

use crate::error::{MtError, MtResult};
use crate::translator::MachineTranslator;
use async_trait::async_trait;
use idiom_bridge::{Direction, Language};
use serde_json::json;

/// NLLB-200 language code for a supported language
pub fn nllb_code(language: Language) -> &'static str {
    match language {
        Language::English => "eng_Latn",
        Language::Sinhala => "sin_Sinh",
    }
}

/// Client for a remote NLLB translation endpoint
#[derive(Clone)]
pub struct NllbProvider {
    /// HTTP client for async requests
    client: reqwest::Client,
    /// Full URL of the translate endpoint
    endpoint: String,
    /// Generation length limit, in tokens
    max_length: usize,
    /// Beam width used for generation
    num_beams: usize,
}

impl NllbProvider {
    /// Default generation length limit
    pub const DEFAULT_MAX_LENGTH: usize = 256;

    /// Default beam width
    pub const DEFAULT_NUM_BEAMS: usize = 5;

    /// Maximum characters accepted per request
    const MAX_CHARS: usize = 5_000;

    /// Create a new provider for the given endpoint URL
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - New provider instance
    /// * `Err(MtError)` - If the endpoint is empty or HTTP client creation fails
    pub fn new(endpoint: String) -> MtResult<Self> {
        let endpoint = endpoint.trim().to_string();
        if endpoint.is_empty() {
            return Err(MtError::ConfigError("NLLB endpoint cannot be empty".to_string()));
        }
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(MtError::ConfigError(format!(
                "NLLB endpoint must be an http(s) URL: {}",
                endpoint
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| MtError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            max_length: Self::DEFAULT_MAX_LENGTH,
            num_beams: Self::DEFAULT_NUM_BEAMS,
        })
    }

    /// Create a provider from the `NLLB_ENDPOINT` environment variable
    pub fn from_env() -> MtResult<Self> {
        let endpoint = std::env::var("NLLB_ENDPOINT").map_err(|_| {
            MtError::ConfigError("NLLB_ENDPOINT environment variable not set".to_string())
        })?;

        Self::new(endpoint)
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_num_beams(mut self, num_beams: usize) -> Self {
        self.num_beams = num_beams;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// JSON body for one translation request
    fn request_body(&self, text: &str, direction: Direction) -> serde_json::Value {
        json!({
            "text": text,
            "src_lang": nllb_code(direction.source()),
            "tgt_lang": nllb_code(direction.target()),
            "max_length": self.max_length,
            "num_beams": self.num_beams,
        })
    }
}

/// Pull the translated text out of an endpoint reply
fn extract_translation(json: &serde_json::Value) -> MtResult<String> {
    json["translation"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| {
            MtError::TranslationError(
                "Invalid response: missing 'translation' field".to_string(),
            )
        })
}

impl std::fmt::Debug for NllbProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NllbProvider")
            .field("endpoint", &self.endpoint)
            .field("max_length", &self.max_length)
            .field("num_beams", &self.num_beams)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for NllbProvider {
    async fn translate(&self, text: &str, direction: Direction) -> MtResult<String> {
        if text.is_empty() {
            return Ok(String::new());
        }

        if text.chars().count() > Self::MAX_CHARS {
            return Err(MtError::InvalidInput(format!(
                "Text exceeds maximum length of {} characters",
                Self::MAX_CHARS
            )));
        }

        let body = self.request_body(text, direction);
        let response = self.client.post(&self.endpoint).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(if status.is_client_error() {
                MtError::ConfigError(format!("Endpoint client error ({}): {}", status, error_text))
            } else {
                MtError::TranslationError(format!(
                    "Endpoint server error ({}): {}",
                    status, error_text
                ))
            });
        }

        let json: serde_json::Value = response.json().await.map_err(|e| {
            MtError::TranslationError(format!("Failed to parse endpoint response: {}", e))
        })?;

        extract_translation(&json)
    }

    fn provider_name(&self) -> &str {
        "NLLB"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== Initialization Tests ==========

    #[test]
    fn test_new_with_valid_endpoint() {
        let provider = NllbProvider::new("http://localhost:8000/translate".to_string()).unwrap();
        assert_eq!(provider.provider_name(), "NLLB");
        assert_eq!(provider.endpoint(), "http://localhost:8000/translate");
    }

    #[test]
    fn test_new_with_empty_endpoint() {
        match NllbProvider::new("  ".to_string()) {
            Err(MtError::ConfigError(msg)) => assert!(msg.contains("empty")),
            _ => panic!("Expected ConfigError"),
        }
    }

    #[test]
    fn test_new_rejects_non_http_endpoint() {
        assert!(matches!(
            NllbProvider::new("localhost:8000".to_string()),
            Err(MtError::ConfigError(_))
        ));
    }

    // ========== Request Shape Tests ==========

    #[test]
    fn test_language_codes() {
        assert_eq!(nllb_code(Language::English), "eng_Latn");
        assert_eq!(nllb_code(Language::Sinhala), "sin_Sinh");
    }

    #[test]
    fn test_request_body_en_to_si() {
        let provider = NllbProvider::new("http://localhost:8000".to_string()).unwrap();
        let body = provider.request_body("Hello", Direction::EnToSi);

        assert_eq!(body["text"], "Hello");
        assert_eq!(body["src_lang"], "eng_Latn");
        assert_eq!(body["tgt_lang"], "sin_Sinh");
        assert_eq!(body["max_length"], 256);
        assert_eq!(body["num_beams"], 5);
    }

    #[test]
    fn test_request_body_si_to_en_with_overrides() {
        let provider = NllbProvider::new("http://localhost:8000".to_string())
            .unwrap()
            .with_max_length(128)
            .with_num_beams(2);
        let body = provider.request_body("හලෝ", Direction::SiToEn);

        assert_eq!(body["src_lang"], "sin_Sinh");
        assert_eq!(body["tgt_lang"], "eng_Latn");
        assert_eq!(body["max_length"], 128);
        assert_eq!(body["num_beams"], 2);
    }

    // ========== Response Parsing Tests ==========

    #[test]
    fn test_extract_translation() {
        let json = json!({"translation": "ආයුබෝවන්"});
        assert_eq!(extract_translation(&json).unwrap(), "ආයුබෝවන්");
    }

    #[test]
    fn test_extract_translation_missing_field() {
        let json = json!({"result": "x"});
        assert!(matches!(
            extract_translation(&json),
            Err(MtError::TranslationError(_))
        ));
    }

    // ========== Input Validation Tests ==========

    #[tokio::test]
    async fn test_empty_text_short_circuits() {
        // Unroutable endpoint: an actual request would fail
        let provider = NllbProvider::new("http://127.0.0.1:9".to_string()).unwrap();
        let result = provider.translate("", Direction::EnToSi).await.unwrap();
        assert_eq!(result, "");
    }

    #[tokio::test]
    async fn test_oversized_text_rejected() {
        let provider = NllbProvider::new("http://127.0.0.1:9".to_string()).unwrap();
        let text = "a".repeat(5_001);
        assert!(matches!(
            provider.translate(&text, Direction::EnToSi).await,
            Err(MtError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_debug_output() {
        let provider = NllbProvider::new("http://localhost:8000".to_string()).unwrap();
        let debug = format!("{:?}", provider);
        assert!(debug.contains("NllbProvider"));
        assert!(debug.contains("localhost:8000"));
    }

    // ========== Live Endpoint Test ==========

    #[tokio::test]
    #[ignore]
    async fn test_live_translation() {
        let Ok(provider) = NllbProvider::from_env() else {
            eprintln!("⚠️  Skipping: NLLB_ENDPOINT not set");
            return;
        };

        let result = provider.translate("Good morning", Direction::EnToSi).await;
        assert!(result.is_ok(), "Translation failed: {:?}", result);
        assert!(!result.unwrap().is_empty());
    }
}
