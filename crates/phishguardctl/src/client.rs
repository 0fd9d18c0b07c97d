//! HTTP client for communicating with phishguardd.

use anyhow::{anyhow, Result};
use serde_json::Value;

/// Override with PHISHGUARD_URL; the daemon binds localhost by default.
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:7410";

/// Client for the daemon's HTTP API.
pub struct GuardClient {
    http: reqwest::Client,
    base_url: String,
}

impl GuardClient {
    pub fn new() -> Self {
        let base_url =
            std::env::var("PHISHGUARD_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .map_err(|e| self.connect_error(e))?;
        Self::decode(resp).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(|e| self.connect_error(e))?;
        Self::decode(resp).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        let resp = self
            .http
            .delete(format!("{}{}", self.base_url, path))
            .send()
            .await
            .map_err(|e| self.connect_error(e))?;
        Self::decode(resp).await
    }

    fn connect_error(&self, e: reqwest::Error) -> anyhow::Error {
        anyhow!(
            "Cannot reach PhishGuard daemon at {}: {}\n\n\
             Is phishguardd running? Start it, or point PHISHGUARD_URL at it.",
            self.base_url,
            e
        )
    }

    async fn decode(resp: reqwest::Response) -> Result<Value> {
        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .map_err(|e| anyhow!("Malformed response from daemon: {}", e))?;
        if !status.is_success() {
            let msg = body["error"].as_str().unwrap_or("unknown error");
            return Err(anyhow!("{} ({})", msg, status));
        }
        Ok(body)
    }
}
