//! Prompt assembly for the completion service

use super::persona::{CHAT_PERSONA, SYSTEM_DIRECTIVE};
use crate::conversation::entities::Turn;
use crate::retrieval::aggregate::RetrievalResult;

/// Renders persona, history, retrieved context and the new message into a
/// single prompt string.
///
/// Layout, with empty blocks omitted:
///
/// ```text
/// {persona}
///
/// Previous conversation:
/// User: ...
///
/// Assistant: ...
///
/// Context:
/// {snippet}
/// {snippet}
///
/// User message: {message}
/// ```
#[derive(Debug, Clone)]
pub struct ChatPromptTemplate {
    persona: String,
    system_directive: String,
}

impl Default for ChatPromptTemplate {
    fn default() -> Self {
        Self {
            persona: CHAT_PERSONA.to_string(),
            system_directive: SYSTEM_DIRECTIVE.to_string(),
        }
    }
}

impl ChatPromptTemplate {
    pub fn new(persona: impl Into<String>, system_directive: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
            system_directive: system_directive.into(),
        }
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    pub fn system_directive(&self) -> &str {
        &self.system_directive
    }

    /// Render history as `"{label}: {content}"` blocks separated by blank lines.
    pub fn render_history(history: &[Turn]) -> String {
        history
            .iter()
            .map(|t| format!("{}: {}", t.role.prompt_label(), t.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Build the user-role prompt. Pure string construction.
    pub fn format(&self, history: &[Turn], context: &RetrievalResult, message: &str) -> String {
        self.format_with_context_text(history, &context.context_text(), message)
    }

    /// Same as [`format`](Self::format) for callers that already hold the
    /// joined context text (the LLM proxy endpoint receives it pre-joined).
    pub fn format_with_context_text(
        &self,
        history: &[Turn],
        context_text: &str,
        message: &str,
    ) -> String {
        let mut prompt = String::with_capacity(self.persona.len() + message.len() + 256);
        prompt.push_str(&self.persona);
        prompt.push_str("\n\n");

        if !history.is_empty() {
            prompt.push_str("Previous conversation:\n");
            prompt.push_str(&Self::render_history(history));
            prompt.push_str("\n\n");
        }

        if !context_text.is_empty() {
            prompt.push_str("Context:\n");
            prompt.push_str(context_text);
            prompt.push_str("\n\n");
        }

        prompt.push_str("User message: ");
        prompt.push_str(message);
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::{ContextSnippet, MAX_SNIPPETS, Namespace};

    fn template() -> ChatPromptTemplate {
        ChatPromptTemplate::new("PERSONA", "DIRECTIVE")
    }

    #[test]
    fn test_message_only() {
        let prompt = template().format(&[], &RetrievalResult::empty(), "What is MANA?");
        assert_eq!(prompt, "PERSONA\n\nUser message: What is MANA?");
    }

    #[test]
    fn test_full_layout() {
        let history = vec![Turn::user("hi"), Turn::agent("moo")];
        let context = RetrievalResult::aggregate(
            vec![
                ContextSnippet::new("TREE is a token", 0.4, Namespace::knowledge()),
                ContextSnippet::new("MANA is a seed", 0.9, Namespace::primary()),
            ],
            MAX_SNIPPETS,
        );

        let prompt = template().format(&history, &context, "tell me more");

        assert_eq!(
            prompt,
            "PERSONA\n\n\
             Previous conversation:\nUser: hi\n\nAssistant: moo\n\n\
             Context:\nMANA is a seed\nTREE is a token\n\n\
             User message: tell me more"
        );
    }

    #[test]
    fn test_persona_embedded_unmodified() {
        let prompt = ChatPromptTemplate::default().format(&[], &RetrievalResult::empty(), "x");
        assert!(prompt.starts_with(CHAT_PERSONA));
        assert!(prompt.contains("(oo)\\________"));
    }

    #[test]
    fn test_system_turn_label() {
        let rendered = ChatPromptTemplate::render_history(&[Turn::system("notice")]);
        assert_eq!(rendered, "System: notice");
    }
}
