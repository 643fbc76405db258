//! Pharmacist chat
//!
//! Answers follow-up questions about a scan. Each call is independent: the
//! prompt carries the scan context and the question, nothing else.

use super::context::ChatContext;
use crate::llm::SharedProvider;
use crate::{MedscanError, Result};
use serde::{Deserialize, Serialize};

/// Reply used whenever the model cannot be reached or answers badly
pub const CHAT_FALLBACK_REPLY: &str = "I'm having trouble checking the database.";

/// Who said a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Chat message from an earlier turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// How a chat turn ended
#[derive(Debug)]
pub enum ChatOutcome {
    Answered(String),
    Fallback { reason: MedscanError },
}

impl ChatOutcome {
    /// Collapse to the text returned to the caller
    pub fn into_reply(self) -> String {
        match self {
            ChatOutcome::Answered(text) => text,
            ChatOutcome::Fallback { .. } => CHAT_FALLBACK_REPLY.to_string(),
        }
    }
}

/// Build the free-text prompt for one question
pub fn build_chat_prompt(user_message: &str, context: &ChatContext) -> String {
    format!(
        "You are a friendly AI pharmacist.\n\
         Context - the medications the user scanned:\n\
         {}\n\n\
         Answer the user's question using only this context. If the answer is not \
         covered by it, say so and suggest asking their doctor or pharmacist.\n\n\
         User: {}\n\
         Pharmacist:",
        context.to_prompt_json(),
        user_message
    )
}

/// Conversational orchestrator
pub struct PharmacistChat {
    provider: SharedProvider,
}

impl PharmacistChat {
    pub fn new(provider: SharedProvider) -> Self {
        Self { provider }
    }

    /// Answer a question about the scanned medications. Never fails.
    ///
    /// `history` is accepted for API symmetry with multi-turn clients but is
    /// not sent to the model.
    pub fn chat_about_medicine(
        &self,
        history: &[ChatMessage],
        user_message: &str,
        context: &ChatContext,
    ) -> String {
        let outcome = self.answer(history, user_message, context);
        if let ChatOutcome::Fallback { reason } = &outcome {
            tracing::warn!(error = %reason, "Pharmacist chat failed, returning fallback");
        }
        outcome.into_reply()
    }

    /// Answer a question, keeping the failure reason.
    pub fn answer(
        &self,
        _history: &[ChatMessage],
        user_message: &str,
        context: &ChatContext,
    ) -> ChatOutcome {
        match self.try_answer(user_message, context) {
            Ok(text) => ChatOutcome::Answered(text),
            Err(reason) => ChatOutcome::Fallback { reason },
        }
    }

    fn try_answer(&self, user_message: &str, context: &ChatContext) -> Result<String> {
        let prompt = build_chat_prompt(user_message, context);
        tracing::debug!(
            provider = self.provider.id(),
            medications = context.medications().len(),
            "Asking pharmacist"
        );
        Ok(self.provider.generate_text(&prompt)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{InlineImage, LlmError, LlmProvider};
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct StubProvider {
        reply: std::result::Result<String, LlmError>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubProvider {
        fn new(reply: std::result::Result<String, LlmError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    impl LlmProvider for StubProvider {
        fn id(&self) -> &str {
            "stub"
        }

        fn generate_structured(
            &self,
            _prompt: &str,
            _image: InlineImage<'_>,
            _schema: &serde_json::Value,
        ) -> std::result::Result<String, LlmError> {
            panic!("chat must use text mode")
        }

        fn generate_text(&self, prompt: &str) -> std::result::Result<String, LlmError> {
            self.prompts.lock().push(prompt.to_string());
            self.reply.clone()
        }
    }

    fn context() -> ChatContext {
        ChatContext::parse(r#"{"medications": [{"drug_name": "Brufen", "generic_name": "Ibuprofen"}]}"#)
            .unwrap()
    }

    #[test]
    fn test_reply_is_verbatim() {
        let provider = StubProvider::new(Ok("  Take it with food.\n".to_string()));
        let chat = PharmacistChat::new(provider.clone());

        let reply = chat.chat_about_medicine(&[], "Can I take this on an empty stomach?", &context());
        assert_eq!(reply, "  Take it with food.\n");
    }

    #[test]
    fn test_prompt_contents() {
        let provider = StubProvider::new(Ok("ok".to_string()));
        let chat = PharmacistChat::new(provider.clone());

        chat.chat_about_medicine(&[], "Is it safe with alcohol?", &context());
        let prompts = provider.prompts.lock();
        assert!(prompts[0].contains("friendly AI pharmacist"));
        assert!(prompts[0].contains(r#""generic_name":"Ibuprofen""#));
        assert!(prompts[0].ends_with("User: Is it safe with alcohol?\nPharmacist:"));
    }

    #[test]
    fn test_history_is_not_sent() {
        let provider = StubProvider::new(Ok("ok".to_string()));
        let chat = PharmacistChat::new(provider.clone());

        let history = vec![
            ChatMessage::user("What is Brufen?"),
            ChatMessage::assistant("A brand of ibuprofen."),
        ];
        chat.chat_about_medicine(&history, "How often?", &context());
        let prompts = provider.prompts.lock();
        assert!(!prompts[0].contains("What is Brufen?"));
        assert!(!prompts[0].contains("A brand of ibuprofen."));
    }

    #[test]
    fn test_model_failure_returns_fallback() {
        let provider = StubProvider::new(Err(LlmError::Connection("refused".to_string())));
        let chat = PharmacistChat::new(provider);

        let outcome = chat.answer(&[], "hello", &context());
        assert!(matches!(
            outcome,
            ChatOutcome::Fallback { reason: MedscanError::Llm(LlmError::Connection(_)) }
        ));
        assert_eq!(
            chat.chat_about_medicine(&[], "hello", &context()),
            "I'm having trouble checking the database."
        );
    }
}
