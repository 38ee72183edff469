//! Runtime configuration loaded from environment variables.

use std::path::PathBuf;

use rag_store::{DEFAULT_DIALOGUE_LIMIT, DEFAULT_FAQ_LIMIT};

use crate::error::ConfigError;
use crate::feedback::DEFAULT_FEEDBACK_LOG;
use crate::session::DEFAULT_HISTORY_LIMIT;

/// Config bag for the chat core. All fields have defaults via `from_env`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssistantConfig {
    pub faq_limit: usize,
    pub dialogue_limit: usize,
    /// Ring capacity of the chat session.
    pub history_limit: usize,
    pub feedback_log: PathBuf,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            faq_limit: DEFAULT_FAQ_LIMIT,
            dialogue_limit: DEFAULT_DIALOGUE_LIMIT,
            history_limit: DEFAULT_HISTORY_LIMIT,
            feedback_log: PathBuf::from(DEFAULT_FEEDBACK_LOG),
        }
    }
}

impl AssistantConfig {
    /// Build from environment variables; unset or empty variables keep the default.
    ///
    /// # Errors
    /// [`ConfigError::InvalidNumber`] if a limit is set but does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let d = Self::default();
        Ok(Self {
            faq_limit: env_limit("FAQ_LIMIT", d.faq_limit)?,
            dialogue_limit: env_limit("DIALOGUE_LIMIT", d.dialogue_limit)?,
            history_limit: env_limit("CHAT_HISTORY_LIMIT", d.history_limit)?,
            feedback_log: std::env::var("FEEDBACK_LOG")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(d.feedback_log),
        })
    }
}

fn env_limit(var: &'static str, dflt: usize) -> Result<usize, ConfigError> {
    parse_limit(var, std::env::var(var).ok(), dflt)
}

fn parse_limit(var: &'static str, raw: Option<String>, dflt: usize) -> Result<usize, ConfigError> {
    match raw {
        Some(v) if !v.trim().is_empty() => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { var, value: v }),
        _ => Ok(dflt),
    }
}
