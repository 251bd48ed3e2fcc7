//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::core::chunker::ChunkerConfig;

/// Environment prefix for configuration overrides, e.g. `TRANSLATOR_CHUNK_SIZE`
const ENV_PREFIX: &str = "TRANSLATOR";

/// Configuration for translator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Model identifier, reported as the backend name
    pub model_name: String,
    /// URL the inference requests are posted to
    pub model_endpoint: String,
    /// Bearer token for the model server
    pub api_token: Option<String>,
    /// Generation length limit passed to the model
    pub max_length: usize,
    /// Texts per gateway call
    pub batch_size: usize,
    /// Window length in chars for long texts
    pub chunk_size: usize,
    /// Chars shared by consecutive windows
    pub overlap: usize,
    /// Texts longer than this many chars are chunked
    pub chunk_threshold: usize,
    /// Requests allowed to use the gateway at once
    pub max_concurrent: usize,
    /// Retries after the first failed model request
    pub max_retries: u32,
    /// Base backoff delay, doubled on every retry
    pub retry_delay_ms: u64,
    /// Per-request HTTP timeout
    pub timeout_ms: u64,
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,
}

/// Default model hosted on the Hugging Face inference API
const DEFAULT_MODEL: &str = "facebook/mbart-large-50-many-to-many-mmt";

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL.to_string(),
            model_endpoint: format!(
                "https://api-inference.huggingface.co/models/{}",
                DEFAULT_MODEL
            ),
            api_token: None,
            max_length: 1024,
            batch_size: 8,
            chunk_size: 500,
            overlap: 50,
            chunk_threshold: 1000,
            max_concurrent: 1,
            max_retries: 3,
            retry_delay_ms: 1000,
            timeout_ms: 300_000,
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl TranslatorConfig {
    /// Load configuration from defaults, an optional file and `TRANSLATOR_*` variables
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
            }
            info!("Loading configuration from {}", path.display());
            builder = builder.add_source(config::File::from(path));
        }

        builder =
            builder.add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let mut config: Self = builder.build()?.try_deserialize()?;

        if config.api_token.is_none() {
            config.api_token = std::env::var("HF_API_TOKEN").ok().filter(|t| !t.is_empty());
        }

        Ok(config)
    }

    /// Load from a JSON, YAML or TOML file, with environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Self::load(Some(path.as_ref()))
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.model_endpoint.is_empty() {
            return Err(anyhow::anyhow!("Model endpoint is required"));
        }

        self.chunker_config().validate()?;

        if self.batch_size == 0 {
            return Err(anyhow::anyhow!("batch_size must be greater than 0"));
        }

        if self.chunk_threshold == 0 {
            return Err(anyhow::anyhow!("chunk_threshold must be greater than 0"));
        }

        if self.max_concurrent == 0 {
            return Err(anyhow::anyhow!("max_concurrent must be greater than 0"));
        }

        if self.max_length == 0 {
            return Err(anyhow::anyhow!("max_length must be greater than 0"));
        }

        if self.api_token.is_none() {
            warn!("No API token configured, requests to the model server are unauthenticated");
        }

        Ok(())
    }

    /// Window parameters for long-text splitting
    pub fn chunker_config(&self) -> ChunkerConfig {
        ChunkerConfig {
            chunk_size: self.chunk_size,
            overlap: self.overlap,
        }
    }
}
