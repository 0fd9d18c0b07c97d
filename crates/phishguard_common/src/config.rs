//! PhishGuard configuration.
//!
//! Configuration lives in /etc/phishguard/config.toml; every field has a
//! default so a missing or partial file still yields a working daemon.
//! The Gemini API key is read from the environment only and never stored
//! in the config struct.

use crate::genai;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// System configuration directory.
pub const SYSTEM_CONFIG_DIR: &str = "/etc/phishguard";
const CONFIG_FILE: &str = "config.toml";

/// Environment variable holding the provider API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Address the HTTP API binds to. Localhost only by default.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Path of the SQLite store.
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default)]
    pub genai: GenAiSettings,
}

/// Generative-AI provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenAiSettings {
    #[serde(default = "default_genai_base_url")]
    pub base_url: String,

    #[serde(default = "default_genai_model")]
    pub model: String,

    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    /// Generation timeout in ms (valid: 1000-300000).
    #[serde(default = "default_genai_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_listen_addr() -> String {
    "127.0.0.1:7410".to_string()
}

fn default_db_path() -> String {
    crate::store::GUARD_DB_PATH.to_string()
}

fn default_genai_base_url() -> String {
    genai::GENAI_BASE_URL.to_string()
}

fn default_genai_model() -> String {
    genai::DEFAULT_MODEL.to_string()
}

fn default_tts_model() -> String {
    genai::DEFAULT_TTS_MODEL.to_string()
}

fn default_genai_timeout_ms() -> u64 {
    genai::GENERATE_TIMEOUT_MS
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            db_path: default_db_path(),
            genai: GenAiSettings::default(),
        }
    }
}

impl Default for GenAiSettings {
    fn default() -> Self {
        Self {
            base_url: default_genai_base_url(),
            model: default_genai_model(),
            tts_model: default_tts_model(),
            timeout_ms: default_genai_timeout_ms(),
        }
    }
}

impl GenAiSettings {
    /// Timeout clamped to the valid range.
    pub fn effective_timeout_ms(&self) -> u64 {
        self.timeout_ms.clamp(1_000, 300_000)
    }
}

impl GuardConfig {
    fn default_path() -> PathBuf {
        PathBuf::from(SYSTEM_CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Load from the default path, falling back to defaults when the file
    /// is missing or unreadable.
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Load from an explicit path. A missing file yields defaults; a
    /// malformed file is reported and also yields defaults.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(raw) => match toml::from_str(&raw) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("  Malformed config {}: {}; using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Provider API key from the environment, if set.
    pub fn api_key() -> Option<String> {
        std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty())
    }
}
