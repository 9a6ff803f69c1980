// Retrieve Node
// Entry point that pulls the top-k documents from the index

use async_trait::async_trait;

use crate::graph::node::{GraphContext, GraphError, Node, NodeOutput};
use crate::graph::state::GraphState;

pub struct RetrieveNode;

impl RetrieveNode {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RetrieveNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Node for RetrieveNode {
    fn id(&self) -> &'static str {
        "retrieve"
    }

    fn name(&self) -> &'static str {
        "Retrieve Documents"
    }

    async fn execute(
        &self,
        state: &mut GraphState,
        ctx: &GraphContext,
    ) -> Result<NodeOutput, GraphError> {
        tracing::info!(question = %state.question, "Retrieve: querying index");

        let documents = ctx
            .retriever
            .get_relevant(&state.question)
            .await
            .map_err(|e| GraphError::new(self.id(), e.to_string()))?;

        tracing::info!("Retrieve: {} documents", documents.len());
        state.documents = documents;

        Ok(NodeOutput::Continue)
    }
}
