use std::sync::Arc;

use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::provider::LlmProvider;
use super::types::{ChatMessage, ChatRequest};
use crate::core::config::LlmSettings;
use crate::core::errors::ApiError;

const GRADER_SYSTEM_PROMPT: &str = "You are a grader assessing relevance of a retrieved document to a user question. \
If the document contains keywords or semantic meaning related to the question, grade it as relevant. \
Give a binary score 'yes' or 'no' to indicate whether the document is relevant to the question.";

/// Structured verdict for one document. `binary_score` is "yes" or "no".
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DocumentGrade {
    pub binary_score: String,
}

impl DocumentGrade {
    pub fn is_relevant(&self) -> bool {
        self.binary_score.trim().eq_ignore_ascii_case("yes")
    }
}

/// Scores one retrieved document against the question with a single
/// schema-constrained completion. Malformed output is an error, not a retry.
pub struct DocumentGrader {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f64,
}

impl DocumentGrader {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: &LlmSettings) -> Self {
        Self {
            provider,
            model: settings.chat_model.clone(),
            temperature: settings.temperature,
        }
    }

    pub async fn grade(&self, question: &str, document: &str) -> Result<DocumentGrade, ApiError> {
        let messages = vec![
            ChatMessage::system(GRADER_SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Retrieved document:\n\n{}\n\nUser question: {}",
                document, question
            )),
        ];

        let request = ChatRequest::new(messages)
            .with_temperature(self.temperature)
            .with_response_format(grade_response_format());

        let content = self.provider.chat(request, &self.model).await?;

        serde_json::from_str::<DocumentGrade>(&content).map_err(|e| {
            ApiError::Internal(format!(
                "relevance grade was not valid JSON ({}): {}",
                e, content
            ))
        })
    }
}

fn grade_response_format() -> serde_json::Value {
    let schema = schema_for!(DocumentGrade);
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "document_grade",
            "schema": serde_json::to_value(schema).unwrap_or_default(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_normalizes_case_and_whitespace() {
        let yes = DocumentGrade {
            binary_score: " Yes ".to_string(),
        };
        let no = DocumentGrade {
            binary_score: "no".to_string(),
        };
        assert!(yes.is_relevant());
        assert!(!no.is_relevant());
    }

    #[test]
    fn unexpected_score_counts_as_irrelevant() {
        let odd = DocumentGrade {
            binary_score: "maybe".to_string(),
        };
        assert!(!odd.is_relevant());
    }

    #[test]
    fn response_format_carries_binary_score_schema() {
        let format = grade_response_format();
        let schema = format["json_schema"]["schema"].to_string();
        assert!(schema.contains("binary_score"));
    }
}
