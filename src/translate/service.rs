use std::sync::Arc;
use tracing::{debug, info, warn};

use super::decoder::{decode_list, decode_raw, normalize};
use super::encoder::{encode, han_characters};
use super::interface::{
    DecodeMode, PinyinLookup, TranslateOutcome, TranslateProvider, TranslationQuery,
};
use crate::config::DataOptions;
use crate::error::TranslateError;

/// Runs a query through encoder, provider and decoder
#[derive(Clone)]
pub struct Translator {
    provider: Arc<dyn TranslateProvider>,
    pinyin: Arc<dyn PinyinLookup>,
    default_mode: DecodeMode,
    options: DataOptions,
}

impl Translator {
    pub fn new(
        provider: Arc<dyn TranslateProvider>,
        pinyin: Arc<dyn PinyinLookup>,
        default_mode: DecodeMode,
        options: DataOptions,
    ) -> Self {
        Self {
            provider,
            pinyin,
            default_mode,
            options,
        }
    }

    /// Translate `query`, returning the provider answer untouched when `query.raw` is set
    pub async fn translate(
        &self,
        query: &TranslationQuery,
    ) -> Result<TranslateOutcome, TranslateError> {
        let mode = query.mode.unwrap_or(self.default_mode);
        info!(
            "Translating ({:?} mode) {} -> {}: {}",
            mode, query.from, query.to, query.text
        );

        match mode {
            DecodeMode::Raw => self.translate_raw(query).await,
            DecodeMode::List => self.translate_list(query).await,
        }
    }

    async fn translate_raw(
        &self,
        query: &TranslationQuery,
    ) -> Result<TranslateOutcome, TranslateError> {
        let text = encode(&query.text, query.extended, &query.from);
        debug!("Encoded query: {}", text);

        let response = self
            .provider
            .translate_raw(&text, &query.from, &query.to, &self.options)
            .await
            .map_err(|e| provider_failure(&query.text, e))?;

        if query.raw {
            return Ok(TranslateOutcome::Raw(response));
        }

        let decoded = decode_raw(&response)?;
        Ok(TranslateOutcome::Decoded(normalize(decoded)?))
    }

    async fn translate_list(
        &self,
        query: &TranslationQuery,
    ) -> Result<TranslateOutcome, TranslateError> {
        if !(query.from.is_chinese() && query.to.is_english()) {
            return Err(TranslateError::UnsupportedLanguagePair {
                from: query.from.to_string(),
                to: query.to.to_string(),
            });
        }

        let mut texts = vec![query.text.clone()];
        texts.extend(han_characters(&query.text));

        let translated = self
            .provider
            .translate_list(&texts, &query.from, &query.to)
            .await
            .map_err(|e| provider_failure(&query.text, e))?;

        if query.raw {
            return Ok(TranslateOutcome::Raw(serde_json::json!(translated)));
        }

        let pinyin = self.pinyin.romanize(&query.text).map_err(|e| {
            warn!("Pinyin lookup failed for '{}': {}", query.text, e);
            TranslateError::PinyinLookupFailed {
                text: query.text.clone(),
                message: e.to_string(),
            }
        })?;

        let result = decode_list(&translated, &pinyin, &query.text, self.pinyin.as_ref())?;
        Ok(TranslateOutcome::Decoded(result))
    }
}

fn provider_failure(text: &str, err: anyhow::Error) -> TranslateError {
    warn!("Translation provider failed for '{}': {:#}", text, err);
    TranslateError::TranslationFailed {
        text: text.to_string(),
        message: format!("{:#}", err),
    }
}
