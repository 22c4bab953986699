//! Complete Reply use case.
//!
//! Formats persona, recent history, context and the new message into one
//! prompt and sends it, with the fixed system directive, to the completion
//! service. A single attempt is made; retry policy belongs to the caller.

use crate::ports::completion::CompletionPort;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::service_error::ServiceError;
use mana_domain::core::string::preview;
use mana_domain::{ChatMessage, ChatPromptTemplate, DomainError, Turn};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Use case for producing the agent's reply text.
#[derive(Clone)]
pub struct CompleteReplyUseCase {
    completion: Arc<dyn CompletionPort>,
    template: ChatPromptTemplate,
    max_prompt_turns: usize,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl CompleteReplyUseCase {
    pub fn new(completion: Arc<dyn CompletionPort>) -> Self {
        Self {
            completion,
            template: ChatPromptTemplate::default(),
            max_prompt_turns: 20,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_template(mut self, template: ChatPromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_max_prompt_turns(mut self, max: usize) -> Self {
        self.max_prompt_turns = max;
        self
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Generate a reply for `message` given prior turns and joined context.
    pub async fn execute(
        &self,
        message: &str,
        history: &[Turn],
        context_text: &str,
    ) -> Result<String, ServiceError> {
        let message = ChatMessage::parse(message).map_err(|e: DomainError| {
            ServiceError::Validation(e.to_string())
        })?;

        let recent = &history[history.len().saturating_sub(self.max_prompt_turns)..];
        let prompt = self
            .template
            .format_with_context_text(recent, context_text, message.content());
        debug!(
            "Prompt assembled: {} chars, {} history turns, {} context chars",
            prompt.len(),
            recent.len(),
            context_text.len()
        );

        let start = Instant::now();
        let result = self
            .completion
            .complete(&prompt, self.template.system_directive())
            .await
            .and_then(|reply| {
                if reply.trim().is_empty() {
                    Err(ServiceError::EmptyCompletion {
                        service: "completion",
                    })
                } else {
                    Ok(reply)
                }
            });
        let duration_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(reply) => {
                info!("Completion received ({} chars, {} ms)", reply.len(), duration_ms);
                self.conversation_logger.log(ConversationEvent::new(
                    "completion",
                    json!({
                        "message": message.content(),
                        "prompt_chars": prompt.len(),
                        "reply": reply,
                        "duration_ms": duration_ms,
                    }),
                ));
            }
            Err(e) => {
                warn!("Completion failed: {}", e);
                self.conversation_logger.log(ConversationEvent::new(
                    "completion_failed",
                    json!({
                        "message": preview(message.content(), 200),
                        "kind": e.kind().as_str(),
                        "error": e.to_string(),
                        "duration_ms": duration_ms,
                    }),
                ));
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::*;
    use mana_domain::{ErrorKind, SYSTEM_DIRECTIVE};

    #[tokio::test]
    async fn test_prompt_and_directive_sent() {
        let completion = Arc::new(MockCompletion::replying("Greetings, seeker."));
        let uc = CompleteReplyUseCase::new(completion.clone())
            .with_template(ChatPromptTemplate::new("PERSONA", "DIRECTIVE"));

        let reply = uc
            .execute("What is MANA?", &[Turn::user("hi"), Turn::agent("moo")], "ctx")
            .await
            .unwrap();

        assert_eq!(reply, "Greetings, seeker.");
        let (prompt, system) = completion.prompts.lock().unwrap()[0].clone();
        assert_eq!(
            prompt,
            "PERSONA\n\nPrevious conversation:\nUser: hi\n\nAssistant: moo\n\nContext:\nctx\n\nUser message: What is MANA?"
        );
        assert_eq!(system, "DIRECTIVE");
    }

    #[tokio::test]
    async fn test_default_template_uses_fixed_directive() {
        let completion = Arc::new(MockCompletion::replying("ok"));
        let uc = CompleteReplyUseCase::new(completion.clone());

        uc.execute("hello", &[], "").await.unwrap();

        assert_eq!(completion.prompts.lock().unwrap()[0].1, SYSTEM_DIRECTIVE);
    }

    #[tokio::test]
    async fn test_prompt_history_capped() {
        let completion = Arc::new(MockCompletion::replying("ok"));
        let uc = CompleteReplyUseCase::new(completion.clone())
            .with_template(ChatPromptTemplate::new("P", "D"))
            .with_max_prompt_turns(1);

        uc.execute("m", &[Turn::user("first"), Turn::agent("second")], "")
            .await
            .unwrap();

        let prompt = completion.last_prompt();
        assert!(prompt.contains("Assistant: second"));
        assert!(!prompt.contains("first"));
    }

    #[tokio::test]
    async fn test_empty_message_is_validation_error() {
        let completion = Arc::new(MockCompletion::replying("unused"));
        let uc = CompleteReplyUseCase::new(completion.clone());

        let err = uc.execute(" \n", &[], "").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "Message is required");
        assert_eq!(completion.call_count(), 0);
    }

    #[tokio::test]
    async fn test_whitespace_reply_is_empty_completion() {
        let completion = Arc::new(MockCompletion::replying("   "));
        let logger = Arc::new(RecordingLogger::default());
        let uc = CompleteReplyUseCase::new(completion).with_conversation_logger(logger.clone());

        let err = uc.execute("m", &[], "").await.unwrap_err();

        assert!(matches!(err, ServiceError::EmptyCompletion { .. }));
        assert_eq!(logger.event_types(), vec!["completion_failed"]);
    }

    #[tokio::test]
    async fn test_upstream_error_propagates_once() {
        let completion = Arc::new(MockCompletion::failing(upstream_error("anthropic", 401)));
        let uc = CompleteReplyUseCase::new(completion.clone());

        let err = uc.execute("m", &[], "").await.unwrap_err();

        assert!(matches!(err, ServiceError::UpstreamStatus { status: 401, .. }));
        assert_eq!(completion.call_count(), 1);
    }
}
