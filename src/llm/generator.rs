use std::sync::Arc;

use super::provider::LlmProvider;
use super::types::{ChatMessage, ChatRequest};
use crate::core::config::LlmSettings;
use crate::core::errors::ApiError;
use crate::index::Document;

const RAG_SYSTEM_PROMPT: &str = "You are an assistant for question-answering tasks. \
Use the following pieces of retrieved context to answer the question. \
If you don't know the answer, just say that you don't know. \
Use three sentences maximum and keep the answer concise.";

/// Produces the final answer from the question and the surviving documents.
pub struct AnswerGenerator {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f64,
}

impl AnswerGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: &LlmSettings) -> Self {
        Self {
            provider,
            model: settings.chat_model.clone(),
            temperature: settings.temperature,
        }
    }

    pub async fn generate(
        &self,
        question: &str,
        documents: &[Document],
    ) -> Result<String, ApiError> {
        let context = format_docs(documents);
        let messages = vec![
            ChatMessage::system(RAG_SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Question: {}\nContext: {}\nAnswer:",
                question, context
            )),
        ];

        let request = ChatRequest::new(messages).with_temperature(self.temperature);
        self.provider.chat(request, &self.model).await
    }
}

/// Document texts separated by a blank line; context truncation is left to
/// the model provider.
fn format_docs(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|d| d.page_content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
