use std::sync::Arc;

use crate::config::Config;
use crate::proxy::ProxyClient;
use crate::translate::{Translator, TranslatorFactory};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub translator: Arc<Translator>,
    pub proxy: Arc<ProxyClient>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let translator = TranslatorFactory::create_translator(&config.translate_config)?;
        Self::with_translator(config, translator)
    }

    /// Build state around an already configured translator
    pub fn with_translator(config: Config, translator: Arc<Translator>) -> anyhow::Result<Self> {
        let proxy = Arc::new(ProxyClient::new(&config.proxy_config)?);

        Ok(Self {
            config: Arc::new(config),
            translator,
            proxy,
        })
    }

    /// Error responses carry the full error chain outside production
    pub fn expose_error_stack(&self) -> bool {
        !self.config.server_config.is_production()
    }
}
