use std::sync::Arc;

use super::provider::LlmProvider;
use super::types::{ChatMessage, ChatRequest};
use crate::core::config::LlmSettings;
use crate::core::errors::ApiError;

const REWRITER_SYSTEM_PROMPT: &str = "You are a question re-writer that converts an input question \
to a better version that is optimized for web search. Look at the input and try to reason about \
the underlying semantic intent. Respond with the improved question only.";

/// Rephrases a question for the web-search fallback. Callers decide what to
/// do with a blank rewrite; this just returns the trimmed model output.
pub struct QuestionRewriter {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f64,
}

impl QuestionRewriter {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: &LlmSettings) -> Self {
        Self {
            provider,
            model: settings.chat_model.clone(),
            temperature: settings.temperature,
        }
    }

    pub async fn rewrite(&self, question: &str) -> Result<String, ApiError> {
        let messages = vec![
            ChatMessage::system(REWRITER_SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Here is the initial question:\n\n{}\n\nFormulate an improved question.",
                question
            )),
        ];

        let request = ChatRequest::new(messages).with_temperature(self.temperature);
        let rewritten = self.provider.chat(request, &self.model).await?;
        Ok(rewritten.trim().to_string())
    }
}
