use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::interface::{LanguageCode, TranslateProvider};
use crate::config::{DataOptions, TranslateConfig};

/// Google Translate over the public `translate_a` endpoints
#[derive(Debug, Clone)]
pub struct GoogleProvider {
    client: Client,
    base_url: String,
    client_name: String,
}

/// Entry of the `translate_a/t` answer. Plain strings when the source
/// language is given, `[text, detected_lang]` pairs under `auto`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListEntry {
    Text(String),
    WithLanguage(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListResponse {
    Many(Vec<ListEntry>),
    Single(String),
}

impl GoogleProvider {
    pub fn new(config: &TranslateConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create translation HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client_name: config.client.clone(),
        })
    }

    /// `dt` parameters: `t`, `rm` and `at` are always needed by the raw decoder
    fn data_types(options: &DataOptions) -> Vec<&'static str> {
        let mut dt = vec!["t", "rm", "at"];
        if options.detailed_translations {
            dt.push("bd");
        }
        if options.definitions {
            dt.push("md");
        }
        if options.examples {
            dt.push("ex");
        }
        if options.collocations {
            dt.push("rw");
        }
        if options.synonyms {
            dt.push("ss");
        }
        dt
    }

    async fn get_json(&self, url: &str, params: &[(&str, &str)]) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .context("Failed to reach translation service")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Translation service error: {} - {}", status, body);
            anyhow::bail!("HTTP Error {}", status.as_u16());
        }

        response
            .json::<Value>()
            .await
            .context("Failed to parse translation response")
    }
}

fn parse_list_response(value: Value) -> Result<Vec<String>> {
    let parsed: ListResponse =
        serde_json::from_value(value).context("Unexpected translation list format")?;

    match parsed {
        ListResponse::Single(text) => Ok(vec![text]),
        ListResponse::Many(entries) => entries
            .into_iter()
            .map(|entry| match entry {
                ListEntry::Text(text) => Ok(text),
                ListEntry::WithLanguage(parts) => parts
                    .into_iter()
                    .next()
                    .context("Empty entry in translation list"),
            })
            .collect(),
    }
}

#[async_trait]
impl TranslateProvider for GoogleProvider {
    async fn translate_raw(
        &self,
        text: &str,
        from: &LanguageCode,
        to: &LanguageCode,
        options: &DataOptions,
    ) -> Result<Value, anyhow::Error> {
        let url = format!("{}/translate_a/single", self.base_url);
        let mut params = vec![
            ("client", self.client_name.as_str()),
            ("sl", from.as_str()),
            ("tl", to.as_str()),
            ("hl", to.as_str()),
            ("q", text),
        ];
        params.extend(Self::data_types(options).into_iter().map(|dt| ("dt", dt)));

        debug!("Requesting raw translation {} -> {}: {}", from, to, text);
        self.get_json(&url, &params).await
    }

    async fn translate_list(
        &self,
        texts: &[String],
        from: &LanguageCode,
        to: &LanguageCode,
    ) -> Result<Vec<String>, anyhow::Error> {
        let url = format!("{}/translate_a/t", self.base_url);
        let mut params = vec![
            ("client", self.client_name.as_str()),
            ("sl", from.as_str()),
            ("tl", to.as_str()),
        ];
        params.extend(texts.iter().map(|t| ("q", t.as_str())));

        debug!("Requesting {} list translation(s) {} -> {}", texts.len(), from, to);
        let value = self.get_json(&url, &params).await?;
        let translated = parse_list_response(value)?;

        if translated.len() != texts.len() {
            warn!(
                "Translation list size mismatch: sent {}, received {}",
                texts.len(),
                translated.len()
            );
        }
        Ok(translated)
    }
}
