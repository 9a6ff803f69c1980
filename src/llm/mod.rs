pub mod generator;
pub mod grader;
pub mod openai;
pub mod provider;
pub mod rewriter;
pub mod types;

pub use generator::AnswerGenerator;
pub use grader::{DocumentGrade, DocumentGrader};
pub use openai::OpenAiProvider;
pub use provider::LlmProvider;
pub use rewriter::QuestionRewriter;
pub use types::{ChatMessage, ChatRequest};
