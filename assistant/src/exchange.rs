//! One chat turn: retrieve → assemble prompt → generate → record.

use std::sync::Arc;

use rag_store::Retriever;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::cfg::AssistantConfig;
use crate::error::ChatError;
use crate::llm::TextGenerator;
use crate::prompt::{PROMPT_WINDOW, build_prompt};
use crate::session::{ChatTurn, SessionHandle};

/// Successful exchange result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub original_input: String,
}

/// Orchestrates a chat exchange against the retriever and the generator.
#[derive(Clone)]
pub struct ChatService {
    retriever: Retriever,
    generator: Arc<dyn TextGenerator>,
    faq_limit: usize,
    dialogue_limit: usize,
}

impl ChatService {
    pub fn new(retriever: Retriever, generator: Arc<dyn TextGenerator>, cfg: &AssistantConfig) -> Self {
        Self {
            retriever,
            generator,
            faq_limit: cfg.faq_limit,
            dialogue_limit: cfg.dialogue_limit,
        }
    }

    /// Runs one exchange against `session`.
    ///
    /// The session is only touched after a successful generation, and the
    /// user/assistant pair is appended under a single lock.
    ///
    /// # Errors
    /// - [`ChatError::Validation`] for empty input
    /// - [`ChatError::Retrieval`] if embedding or search fails
    /// - [`ChatError::Generation`] if the model call fails
    #[instrument(skip_all, fields(input_chars = user_input.len()))]
    pub async fn handle_chat(
        &self,
        session: &SessionHandle,
        user_input: &str,
    ) -> Result<ChatReply, ChatError> {
        if user_input.is_empty() {
            return Err(ChatError::Validation("Missing user_input".into()));
        }

        let (faqs, shots) = tokio::try_join!(
            self.retriever.retrieve_faqs(user_input, self.faq_limit),
            self.retriever
                .retrieve_dialogue_shots(user_input, self.dialogue_limit),
        )?;
        // Dialogue shots are retrieved but not part of the prompt.
        debug!(faqs = faqs.len(), shots = shots.len(), "context retrieved");

        let recent = session.lock().await.recent(PROMPT_WINDOW);
        let prompt = build_prompt(user_input, &recent, &faqs);

        let reply = match self.generator.generate(&prompt).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "generation failed; session left unchanged");
                return Err(e);
            }
        };

        {
            let mut s = session.lock().await;
            s.append(ChatTurn::user(user_input));
            s.append(ChatTurn::assistant(reply.clone()));
        }
        info!(reply_chars = reply.len(), "chat exchange completed");

        Ok(ChatReply {
            reply,
            original_input: user_input.to_string(),
        })
    }
}
