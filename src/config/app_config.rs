use serde::Deserialize;
use validator::Validate;

use crate::domain::crag::CragConfig;
use crate::domain::DomainError;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Validate, Default)]
#[serde(default)]
pub struct AppConfig {
    #[validate(nested)]
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
    #[validate(nested)]
    pub crag: CragConfig,
    #[validate(nested)]
    pub qdrant: QdrantSettings,
    #[validate(nested)]
    pub embedding: EmbeddingSettings,
    #[validate(nested)]
    pub llm: LlmSettings,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct ServerConfig {
    #[validate(length(min = 1))]
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

/// Vector index connection
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct QdrantSettings {
    #[validate(url)]
    pub url: String,
    pub api_key: Option<String>,
    #[validate(length(min = 1))]
    pub collection: String,
    #[validate(range(min = 1))]
    pub timeout_secs: u64,
}

/// OpenAI-compatible embeddings endpoint
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct EmbeddingSettings {
    #[validate(url)]
    pub base_url: String,
    pub api_key: Option<String>,
    #[validate(length(min = 1))]
    pub model: String,
    pub query_prefix: String,
}

/// OpenAI-compatible chat endpoint used by the grader, rewriter and generator
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct LlmSettings {
    #[validate(url)]
    pub base_url: String,
    pub api_key: Option<String>,
    #[validate(length(min = 1))]
    pub grader_model: String,
    #[validate(length(min = 1))]
    pub generator_model: String,
    /// Falls back to `generator_model` when unset
    pub rewriter_model: Option<String>,
    #[validate(range(min = 1))]
    pub timeout_secs: u64,
}

impl LlmSettings {
    pub fn rewriter_model(&self) -> &str {
        self.rewriter_model
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.generator_model)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for QdrantSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:6333".to_string(),
            api_key: None,
            collection: "egyptian_law".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            api_key: None,
            model: "intfloat/multilingual-e5-large".to_string(),
            query_prefix: "query: ".to_string(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            api_key: None,
            grader_model: "llama-3.1-8b-instant".to_string(),
            generator_model: "llama3.1".to_string(),
            rewriter_model: None,
            timeout_secs: 60,
        }
    }
}

impl AppConfig {
    /// Load from `config/default`, `config/local` and `APP__*` variables, then validate
    pub fn load() -> Result<Self, DomainError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| DomainError::configuration(e.to_string()))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| DomainError::configuration(e.to_string()))?;

        config.validated()
    }

    pub fn validated(self) -> Result<Self, DomainError> {
        self.validate()
            .map_err(|e| DomainError::configuration(format!("Invalid configuration: {}", e)))?;
        Ok(self)
    }
}
