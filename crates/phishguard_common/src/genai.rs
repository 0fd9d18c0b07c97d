//! Generative-AI client for simulation content.
//!
//! HTTP client for the Gemini generateContent API: structured JSON
//! generation for simulated attacks, plus TTS synthesis for vishing and
//! deepfake audio. The key travels in a request header, never in the URL,
//! so transport errors cannot echo it back; every provider error message is
//! sanitized before it becomes a `GuardError`.

use crate::config::GenAiSettings;
use crate::error::GuardError;
use serde_json::{json, Value};
use std::time::Duration;

/// Default generation model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default TTS model.
pub const DEFAULT_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";

/// Default API base URL.
pub const GENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default timeout for generation calls (ms).
pub const GENERATE_TIMEOUT_MS: u64 = 60_000;

/// Longest sanitized provider message surfaced to callers.
const MAX_ERROR_LEN: usize = 200;

/// Client for the generative-content provider.
#[derive(Debug, Clone)]
pub struct GenAiClient {
    base_url: String,
    api_key: String,
    model: String,
    tts_model: String,
    timeout_ms: u64,
}

impl GenAiClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            base_url: GENAI_BASE_URL.to_string(),
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            timeout_ms: GENERATE_TIMEOUT_MS,
        }
    }

    /// Build from config settings plus the key from the environment.
    pub fn from_settings(settings: &GenAiSettings, api_key: &str) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            api_key: api_key.to_string(),
            model: settings.model.clone(),
            tts_model: settings.tts_model.clone(),
            timeout_ms: settings.effective_timeout_ms(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn has_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn http(&self) -> Result<reqwest::Client, GuardError> {
        reqwest::Client::builder()
            .timeout(Duration::from_millis(self.timeout_ms))
            .build()
            .map_err(|e| GuardError::UpstreamGeneration(self.sanitize(&e.to_string())))
    }

    /// Replace anything that might carry key material with fixed guidance;
    /// truncate the rest.
    fn sanitize(&self, msg: &str) -> String {
        if msg.is_empty() {
            return "AI request failed".to_string();
        }
        let mentions_key = msg.contains("API key")
            || msg.contains("API_KEY")
            || msg.contains(".env")
            || (!self.api_key.is_empty() && msg.contains(self.api_key.as_str()));
        if mentions_key {
            return "AI provider rejected the API key; check the GEMINI_API_KEY environment \
                    variable"
                .to_string();
        }
        if msg.len() > MAX_ERROR_LEN {
            let cut = msg
                .char_indices()
                .take_while(|(i, _)| *i < MAX_ERROR_LEN)
                .last()
                .map(|(i, c)| i + c.len_utf8())
                .unwrap_or(0);
            format!("{}…", &msg[..cut])
        } else {
            msg.to_string()
        }
    }

    fn upstream(&self, msg: &str) -> GuardError {
        GuardError::UpstreamGeneration(self.sanitize(msg))
    }

    async fn post(&self, model: &str, body: &Value) -> Result<Value, GuardError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let resp = self
            .http()?
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.upstream("AI request timed out")
                } else {
                    self.upstream(&e.to_string())
                }
            })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| self.upstream(&e.to_string()))?;
        if !status.is_success() {
            return Err(self.upstream(&format!("provider returned {}: {}", status, text)));
        }
        serde_json::from_str(&text).map_err(|_| self.upstream("provider returned non-JSON body"))
    }

    fn first_part(&self, data: &Value) -> Result<Value, GuardError> {
        data["candidates"][0]["content"]["parts"][0]
            .as_object()
            .map(|p| Value::Object(p.clone()))
            .ok_or_else(|| self.upstream("provider response had no candidates"))
    }

    /// Non-fatal startup check that the key is accepted.
    pub async fn verify_key(&self) -> Result<(), GuardError> {
        let url = format!("{}/models", self.base_url);
        let resp = self
            .http()?
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| self.upstream(&e.to_string()))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(self.upstream(&format!("key check failed with {}", resp.status())))
        }
    }

    /// Generate a structured JSON artifact constrained by a response schema.
    pub async fn generate_json(
        &self,
        prompt: &str,
        system: Option<&str>,
        schema: &Value,
    ) -> Result<Value, GuardError> {
        let mut body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema,
            },
        });
        if let Some(sys) = system {
            body["systemInstruction"] = json!({ "parts": [{ "text": sys }] });
        }

        let data = self.post(&self.model, &body).await?;
        let part = self.first_part(&data)?;
        let text = part["text"]
            .as_str()
            .ok_or_else(|| self.upstream("provider response had no text part"))?;
        serde_json::from_str(text)
            .map_err(|_| self.upstream("provider returned malformed JSON content"))
    }

    /// Generate free-form text (coach chat).
    pub async fn generate_text(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<String, GuardError> {
        let mut body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });
        if let Some(sys) = system {
            body["systemInstruction"] = json!({ "parts": [{ "text": sys }] });
        }

        let data = self.post(&self.model, &body).await?;
        let part = self.first_part(&data)?;
        part["text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| self.upstream("provider response had no text part"))
    }

    /// Synthesize speech; returns base64-encoded audio.
    pub async fn synthesize(&self, text: &str, voice: &str) -> Result<String, GuardError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": text }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": voice }
                    }
                },
            },
        });

        let data = self.post(&self.tts_model, &body).await?;
        let part = self.first_part(&data)?;
        let audio = part["inlineData"]["data"]
            .as_str()
            .ok_or_else(|| self.upstream("provider response had no audio data"))?;

        use base64::Engine as _;
        if base64::engine::general_purpose::STANDARD
            .decode(audio)
            .is_err()
        {
            return Err(self.upstream("provider returned invalid audio payload"));
        }
        Ok(audio.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GenAiClient {
        GenAiClient::new("AIzaSyTESTKEY0123456789")
    }

    #[test]
    fn test_sanitize_key_mentions() {
        let c = client();
        let out = c.sanitize("400 Bad Request: API key not valid");
        assert!(out.contains("GEMINI_API_KEY"));
        assert!(!out.contains("AIzaSy"));
    }

    #[test]
    fn test_sanitize_literal_key_leak() {
        let c = client();
        let out = c.sanitize("request to ?key=AIzaSyTESTKEY0123456789 failed");
        assert!(!out.contains("AIzaSyTESTKEY0123456789"));
    }

    #[test]
    fn test_sanitize_truncates_long_messages() {
        let c = client();
        let long = "x".repeat(500);
        let out = c.sanitize(&long);
        assert!(out.len() <= MAX_ERROR_LEN + '…'.len_utf8());
        assert!(out.ends_with('…'));
    }

    #[test]
    fn test_sanitize_passes_short_messages() {
        let c = client();
        assert_eq!(c.sanitize("model overloaded"), "model overloaded");
        assert_eq!(c.sanitize(""), "AI request failed");
    }

    #[test]
    fn test_empty_key_detection() {
        assert!(!GenAiClient::new("").has_key());
        assert!(client().has_key());
    }
}
