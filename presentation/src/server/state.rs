//! Application state shared across all route handlers.

use mana_application::{
    CompleteReplyUseCase, ConversationLogger, RetrieveContextUseCase, SpeechPort,
    SubmitChatTurnUseCase,
};
use std::sync::Arc;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks. Nothing is
/// mutated between requests; history always arrives with the request.
#[derive(Clone)]
pub struct AppState {
    /// Retrieval for `/api/kb`.
    pub retrieve: Arc<RetrieveContextUseCase>,
    /// Completion for `/api/llm`.
    pub complete: Arc<CompleteReplyUseCase>,
    /// Whole turns for `/api/chat`, never narrated.
    pub chat: Arc<SubmitChatTurnUseCase>,
    /// Speech synthesis for `/api/tts`.
    pub speech: Arc<dyn SpeechPort>,
}

impl AppState {
    pub fn new(
        retrieve: RetrieveContextUseCase,
        complete: CompleteReplyUseCase,
        speech: Arc<dyn SpeechPort>,
    ) -> Self {
        let chat = SubmitChatTurnUseCase::new(retrieve.clone(), complete.clone());
        Self {
            retrieve: Arc::new(retrieve),
            complete: Arc::new(complete),
            chat: Arc::new(chat),
            speech,
        }
    }

    /// Record `/api/chat` turns in the conversation log.
    pub fn with_conversation_logger(self, logger: Arc<dyn ConversationLogger>) -> Self {
        let chat = SubmitChatTurnUseCase::new(
            self.retrieve.as_ref().clone(),
            self.complete.as_ref().clone(),
        )
        .with_conversation_logger(logger);
        Self {
            chat: Arc::new(chat),
            ..self
        }
    }
}
