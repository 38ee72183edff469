//! Prompt builder: fixed instruction + FAQ block + recent turns + new input.

use rag_store::FaqExample;

use crate::session::{ChatTurn, Role};

/// Instruction header opening every prompt.
pub const SYSTEM_INSTRUCTION: &str = "You are a helpful telecom support assistant. \
Always give clear, short answers (2-3 sentences max). \
Do NOT simulate entire conversations. \
Base your answers on the following relevant info if useful:\n\n";

/// Number of most recent turns carried into the prompt (two exchanges).
pub const PROMPT_WINDOW: usize = 4;

/// Builds the full generator prompt.
///
/// Only the last [`PROMPT_WINDOW`] entries of `recent_turns` are used, in
/// chronological order. Content is not truncated.
///
/// # Example
/// ```
/// # use assistant::prompt::{build_prompt, SYSTEM_INSTRUCTION};
/// let p = build_prompt("book a plan", &[], &[]);
/// assert_eq!(p, format!("{SYSTEM_INSTRUCTION}User: book a plan\nAssistant:"));
/// ```
pub fn build_prompt(user_input: &str, recent_turns: &[ChatTurn], faqs: &[FaqExample]) -> String {
    let mut out = String::from(SYSTEM_INSTRUCTION);

    if !faqs.is_empty() {
        out.push_str("Relevant FAQs:\n");
        for ex in faqs {
            out.push_str(&format!("- Q: {} A: {}\n", ex.customer_input, ex.answer));
        }
        out.push('\n');
    }

    let start = recent_turns.len().saturating_sub(PROMPT_WINDOW);
    for turn in &recent_turns[start..] {
        let label = match turn.role {
            Role::User => "User",
            Role::Assistant => "Assistant",
        };
        out.push_str(&format!("{label}: {}\n", turn.content));
    }

    out.push_str(&format!("User: {user_input}\nAssistant:"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turns(n: usize) -> Vec<ChatTurn> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    ChatTurn::user(format!("u{i}"))
                } else {
                    ChatTurn::assistant(format!("a{i}"))
                }
            })
            .collect()
    }

    #[test]
    fn empty_context_is_header_plus_cue() {
        let p = build_prompt("book a plan", &[], &[]);
        assert_eq!(
            p,
            "You are a helpful telecom support assistant. Always give clear, short answers \
             (2-3 sentences max). Do NOT simulate entire conversations. Base your answers on \
             the following relevant info if useful:\n\nUser: book a plan\nAssistant:"
        );
        assert!(!p.contains("Relevant FAQs"));
    }

    #[test]
    fn faq_block_keeps_given_order() {
        let faqs = vec![
            FaqExample {
                customer_input: "How do I roam?".into(),
                answer: "Enable roaming in settings.".into(),
            },
            FaqExample {
                customer_input: "Data cap?".into(),
                answer: "50 GB.".into(),
            },
        ];
        let p = build_prompt("hi", &[], &faqs);
        let expected = format!(
            "{SYSTEM_INSTRUCTION}Relevant FAQs:\n\
             - Q: How do I roam? A: Enable roaming in settings.\n\
             - Q: Data cap? A: 50 GB.\n\
             \n\
             User: hi\nAssistant:"
        );
        assert_eq!(p, expected);
    }

    #[test]
    fn only_last_four_turns_are_included() {
        let p = build_prompt("next", &turns(10), &[]);
        let body = p.strip_prefix(SYSTEM_INSTRUCTION).unwrap();
        assert_eq!(
            body,
            "User: u6\nAssistant: a7\nUser: u8\nAssistant: a9\nUser: next\nAssistant:"
        );
        assert!(!p.contains("u4"));
    }

    #[test]
    fn short_history_is_used_whole() {
        let p = build_prompt("again", &turns(2), &[]);
        assert!(p.ends_with("User: u0\nAssistant: a1\nUser: again\nAssistant:"));
    }
}
