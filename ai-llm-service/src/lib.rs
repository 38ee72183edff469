//! Shared Ollama access for the support assistant.
//!
//! Two logical profiles are exposed through [`service_profiles::LlmServiceProfiles`]:
//! a **chat** profile used to generate replies and an **embedding** profile used
//! by both the corpus loader and the request path.

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use config::{
    default_config::{config_ollama_chat, config_ollama_embedding},
    llm_model_config::LlmModelConfig,
    llm_provider::LlmProvider,
};
pub use error_handler::{AiLlmError, ConfigError, HealthError};
pub use health_service::{HealthService, HealthStatus};
pub use service_profiles::LlmServiceProfiles;
