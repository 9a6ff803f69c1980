// Node trait and types
// Base abstraction for graph nodes

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::errors::ApiError;
use crate::index::DocumentSource;
use crate::llm::{AnswerGenerator, DocumentGrader, QuestionRewriter};
use crate::tools::SearchProvider;

use super::state::GraphState;

/// Context passed to nodes during execution
///
/// Holds the pipeline components behind trait objects so tests can swap in
/// offline fakes.
pub struct GraphContext {
    /// Index read side; builds the index on first use.
    pub retriever: Arc<dyn DocumentSource>,
    /// Per-document relevance grader.
    pub grader: Arc<DocumentGrader>,
    /// Question rewriter for the web-search fallback.
    pub rewriter: Arc<QuestionRewriter>,
    /// Final answer generator.
    pub generator: Arc<AnswerGenerator>,
    /// Web-search fallback provider.
    pub search: Arc<dyn SearchProvider>,
}

/// Output from a node execution
#[derive(Debug, Clone)]
pub enum NodeOutput {
    /// Follow the default edge to the next node
    Continue,
    /// Follow the conditional edge matching this label
    Branch(String),
    /// Graph execution complete
    Final,
}

/// Graph execution error
///
/// Includes an `execution_trace` recording the node IDs visited before the
/// error occurred, aiding production debugging.
#[derive(Debug, Clone)]
pub struct GraphError {
    pub node_id: String,
    pub message: String,
    /// Ordered list of node IDs executed before this error, most-recent last.
    pub execution_trace: Vec<String>,
}

impl GraphError {
    pub fn new(node_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            message: message.into(),
            execution_trace: Vec::new(),
        }
    }

    /// Append a node ID to the execution trace (called by the runtime as it
    /// unwinds after failure).
    pub fn with_trace_entry(mut self, node_id: impl Into<String>) -> Self {
        self.execution_trace.push(node_id.into());
        self
    }
}

impl From<GraphError> for ApiError {
    fn from(err: GraphError) -> Self {
        if err.execution_trace.is_empty() {
            ApiError::internal(format!("Graph error in {}: {}", err.node_id, err.message))
        } else {
            ApiError::internal(format!(
                "Graph error in {} (trace: {}): {}",
                err.node_id,
                err.execution_trace.join(" -> "),
                err.message
            ))
        }
    }
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.execution_trace.is_empty() {
            write!(f, "GraphError in {}: {}", self.node_id, self.message)
        } else {
            write!(
                f,
                "GraphError in {} (trace: {}): {}",
                self.node_id,
                self.execution_trace.join(" -> "),
                self.message
            )
        }
    }
}

impl std::error::Error for GraphError {}

/// Node trait - all graph nodes implement this
#[async_trait]
pub trait Node: Send + Sync {
    /// Unique identifier for this node
    fn id(&self) -> &'static str;

    /// Human-readable name for display
    fn name(&self) -> &'static str {
        self.id()
    }

    /// Execute the node logic
    async fn execute(
        &self,
        state: &mut GraphState,
        ctx: &GraphContext,
    ) -> Result<NodeOutput, GraphError>;
}
