//! Support-chat core.
//!
//! Public API: [`ChatService::handle_chat`] runs one exchange (retrieve FAQ
//! pairs and dialogue turns, build the prompt from the last turns of the
//! [`ChatSession`], call the generator, record the pair), and
//! [`FeedbackLog::submit`] appends a rating row.

pub mod cfg;
mod error;
mod exchange;
mod feedback;
pub mod llm;
pub mod prompt;
pub mod session;

pub use cfg::AssistantConfig;
pub use error::{ChatError, ConfigError, FeedbackError};
pub use exchange::{ChatReply, ChatService};
pub use feedback::{DEFAULT_FEEDBACK_LOG, FeedbackLog, FeedbackRecord};
pub use llm::TextGenerator;
pub use prompt::{PROMPT_WINDOW, SYSTEM_INSTRUCTION, build_prompt};
pub use session::{ChatSession, ChatTurn, Role, SessionHandle};
