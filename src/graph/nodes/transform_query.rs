// Transform Query Node
// Rewrites the question into a form better suited to web search

use async_trait::async_trait;

use crate::graph::node::{GraphContext, GraphError, Node, NodeOutput};
use crate::graph::state::GraphState;

pub struct TransformQueryNode;

impl TransformQueryNode {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TransformQueryNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Node for TransformQueryNode {
    fn id(&self) -> &'static str {
        "transform_query"
    }

    fn name(&self) -> &'static str {
        "Transform Query"
    }

    async fn execute(
        &self,
        state: &mut GraphState,
        ctx: &GraphContext,
    ) -> Result<NodeOutput, GraphError> {
        tracing::info!(question = %state.question, "Transform: rewriting question");

        let rewritten = ctx
            .rewriter
            .rewrite(&state.question)
            .await
            .map_err(|e| GraphError::new(self.id(), e.to_string()))?;

        if rewritten.is_empty() {
            tracing::warn!("Transform: rewriter returned nothing, keeping the original question");
        } else {
            tracing::info!(rewritten = %rewritten, "Transform: question rewritten");
            state.question = rewritten;
        }

        Ok(NodeOutput::Continue)
    }
}
