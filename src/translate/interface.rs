use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::DataOptions;

/// Provider language tag, e.g. `zh-CN` or `en`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(pub String);

impl LanguageCode {
    pub const CHINESE: &'static str = "zh-CN";
    pub const ENGLISH: &'static str = "en";

    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn chinese() -> Self {
        Self::new(Self::CHINESE)
    }

    pub fn english() -> Self {
        Self::new(Self::ENGLISH)
    }

    pub fn is_chinese(&self) -> bool {
        self.0 == Self::CHINESE
    }

    pub fn is_english(&self) -> bool {
        self.0 == Self::ENGLISH
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the provider is asked to answer and, in turn, how its answer is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeMode {
    /// One call returning the provider's nested positional array
    #[default]
    Raw,
    /// One call returning a flat list of translated strings
    List,
}

/// A single translation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationQuery {
    pub text: String,
    pub from: LanguageCode,
    pub to: LanguageCode,
    /// Ask for the full sentence plus every Han character. Only honoured for Chinese sources.
    #[serde(default)]
    pub extended: bool,
    /// Return the provider response untouched
    #[serde(default)]
    pub raw: bool,
    /// Overrides the configured decode mode
    #[serde(default)]
    pub mode: Option<DecodeMode>,
}

/// Output of the raw-array decoder, before the two transcription sources are merged
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDecoded {
    pub translation: String,
    pub word_transcription: Option<String>,
    pub translation_transcription: Option<String>,
}

/// The normalized shape every decode mode ends in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedResult {
    pub translation: String,
    pub transcription: String,
}

/// What `Translator::translate` hands back to the HTTP layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TranslateOutcome {
    Raw(serde_json::Value),
    Decoded(DecodedResult),
}

/// Upstream translation service
#[async_trait]
pub trait TranslateProvider: Send + Sync {
    /// Translate `text` and return the provider's nested array response as-is
    async fn translate_raw(
        &self,
        text: &str,
        from: &LanguageCode,
        to: &LanguageCode,
        options: &DataOptions,
    ) -> Result<serde_json::Value, anyhow::Error>;

    /// Translate every entry of `texts`, returning one string per entry in the same order
    async fn translate_list(
        &self,
        texts: &[String],
        from: &LanguageCode,
        to: &LanguageCode,
    ) -> Result<Vec<String>, anyhow::Error>;
}

/// Romanization of Chinese text
pub trait PinyinLookup: Send + Sync {
    fn romanize(&self, text: &str) -> Result<String, anyhow::Error>;
}
