//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, EmbeddingSettings, LlmSettings, LogFormat, LoggingConfig, MetricsConfig,
    QdrantSettings, ServerConfig,
};
