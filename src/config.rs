use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::translate::interface::DecodeMode;

static ENV_PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{(\w+)\}").expect("valid placeholder regex"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server_config: ServerConfig,
    #[serde(default)]
    pub translate_config: TranslateConfig,
    #[serde(default)]
    pub proxy_config: ProxyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origins allowed by CORS. Requests without an Origin header are always allowed.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// `production` hides error stacks from responses
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_environment() -> String {
    "development".to_string()
}

impl ServerConfig {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|o| o == origin)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: Vec::new(),
            environment: default_environment(),
        }
    }
}

/// Extra sections requested from the provider on top of the translation,
/// transliteration and alternative-translation sections that decoding needs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataOptions {
    #[serde(default)]
    pub detailed_translations: bool,
    #[serde(default)]
    pub definitions: bool,
    #[serde(default)]
    pub examples: bool,
    #[serde(default)]
    pub collocations: bool,
    #[serde(default)]
    pub synonyms: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    #[serde(default)]
    pub mode: DecodeMode,
    #[serde(default = "default_translate_base_url")]
    pub base_url: String,
    #[serde(default = "default_client")]
    pub client: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub data_options: DataOptions,
}

fn default_translate_base_url() -> String {
    "https://translate.googleapis.com".to_string()
}

fn default_client() -> String {
    "gtx".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            mode: DecodeMode::default(),
            base_url: default_translate_base_url(),
            client: default_client(),
            timeout_secs: default_timeout_secs(),
            data_options: DataOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Load a YAML or JSON config file, picked by extension
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            anyhow::bail!("Configuration file not found: {}", path);
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &str) -> Result<Self> {
        let content = substitute_env(content);

        let path_lower = path.to_lowercase();
        let config = if path_lower.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON configuration: {}", path))?
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Invalid YAML configuration: {}", path))?
        };
        Ok(config)
    }

    /// Try each candidate path in order, falling back to defaults when none loads
    pub fn discover() -> Result<(Self, Option<String>)> {
        let candidates: Vec<String> = vec![
            std::env::var("CONFIG_PATH").ok(),
            Some("conf.yaml".to_string()),
            Some("conf.yml".to_string()),
            Some("conf.json".to_string()),
        ]
        .into_iter()
        .flatten()
        .collect();

        for path in candidates {
            if !Path::new(&path).exists() {
                continue;
            }
            let mut config = Self::load(&path)?;
            config.apply_env_overrides()?;
            return Ok((config, Some(path)));
        }

        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok((config, None))
    }

    /// `HOST`, `PORT`, `ALLOWED_ORIGINS`, `APP_ENV`/`NODE_ENV` take precedence over the file
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = lookup("HOST") {
            self.server_config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server_config.port = port
                .parse()
                .with_context(|| format!("PORT must be a valid number, got '{}'", port))?;
        }
        if let Some(origins) = lookup("ALLOWED_ORIGINS") {
            self.server_config.allowed_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(env) = lookup("APP_ENV").or_else(|| lookup("NODE_ENV")) {
            self.server_config.environment = env;
        }
        Ok(())
    }
}

/// Replace `${VAR}` with the environment value, leaving unknown variables untouched
fn substitute_env(content: &str) -> String {
    ENV_PLACEHOLDER_RE
        .replace_all(content, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}
