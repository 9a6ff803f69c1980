// Web Search Node
// Supplements the graded document set with one merged web result

use async_trait::async_trait;

use crate::graph::node::{GraphContext, GraphError, Node, NodeOutput};
use crate::graph::state::GraphState;
use crate::index::Document;

/// Metadata source recorded on the synthetic document.
pub const WEB_SEARCH_SOURCE: &str = "web_search";

pub struct WebSearchNode;

impl WebSearchNode {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WebSearchNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Node for WebSearchNode {
    fn id(&self) -> &'static str {
        "web_search"
    }

    fn name(&self) -> &'static str {
        "Web Search"
    }

    /// Runs the (possibly rewritten) question through the search provider
    /// and appends all snippets as a single extra document. Keeps the
    /// graded documents either way.
    async fn execute(
        &self,
        state: &mut GraphState,
        ctx: &GraphContext,
    ) -> Result<NodeOutput, GraphError> {
        tracing::info!(question = %state.question, "WebSearch: querying provider");

        let results = ctx
            .search
            .search(&state.question)
            .await
            .map_err(|e| GraphError::new(self.id(), e.to_string()))?;

        if results.is_empty() {
            tracing::warn!("WebSearch: no results, generating from the graded documents only");
            return Ok(NodeOutput::Continue);
        }

        let merged = results
            .iter()
            .map(|r| r.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        tracing::info!("WebSearch: merged {} results into one document", results.len());
        state
            .documents
            .push(Document::new(merged, WEB_SEARCH_SOURCE));

        Ok(NodeOutput::Continue)
    }
}
