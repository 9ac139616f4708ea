use anyhow::{Context, Result};
use reqwest::{header::CONTENT_TYPE, Client, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::ProxyConfig;

/// Passthrough fetcher behind `/api/proxy/*url`
#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: Client,
}

/// Upstream body, JSON when the upstream says so
#[derive(Debug, Clone, PartialEq)]
pub enum ProxyBody {
    Json(Value),
    Text { content_type: String, body: String },
}

impl ProxyClient {
    pub fn new(config: &ProxyConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to create proxy HTTP client")?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> Result<ProxyBody> {
        let url = parse_target(url)?;
        debug!("Proxying {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to reach proxied URL")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP Error {}", status.as_u16());
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/plain")
            .to_string();

        if is_json(&content_type) {
            let json = response
                .json::<Value>()
                .await
                .context("Failed to parse proxied JSON")?;
            Ok(ProxyBody::Json(json))
        } else {
            let body = response
                .text()
                .await
                .context("Failed to read proxied body")?;
            Ok(ProxyBody::Text { content_type, body })
        }
    }
}

fn is_json(content_type: &str) -> bool {
    content_type.to_lowercase().starts_with("application/json")
}

/// Only absolute http(s) URLs are proxied
fn parse_target(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).with_context(|| format!("Invalid proxy URL: {}", url))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => anyhow::bail!("Unsupported proxy scheme: {}", other),
    }
}
