use std::sync::Arc;
use anyhow::Result;
use tracing::info;
use crate::config::TranslateConfig;
use super::google::GoogleProvider;
use super::pinyin::PinyinRomanizer;
use super::service::Translator;

/// Factory for building the translator from configuration
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Create a translator backed by Google and the bundled pinyin readings
    ///
    /// # Arguments
    /// * `translate_config` - Translate section of the app configuration
    ///
    /// # Returns
    /// Shared translator, holding its own copy of the provider options
    pub fn create_translator(translate_config: &TranslateConfig) -> Result<Arc<Translator>> {
        info!(
            "Initializing translator: {} ({:?} mode)",
            translate_config.base_url, translate_config.mode
        );

        let provider = GoogleProvider::new(translate_config)?;

        Ok(Arc::new(Translator::new(
            Arc::new(provider),
            Arc::new(PinyinRomanizer::new()),
            translate_config.mode,
            translate_config.data_options.clone(),
        )))
    }
}
