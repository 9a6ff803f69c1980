// Generate Node
// Terminal node that produces the final answer

use async_trait::async_trait;

use crate::graph::node::{GraphContext, GraphError, Node, NodeOutput};
use crate::graph::state::GraphState;

pub struct GenerateNode;

impl GenerateNode {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GenerateNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Node for GenerateNode {
    fn id(&self) -> &'static str {
        "generate"
    }

    fn name(&self) -> &'static str {
        "Generate Answer"
    }

    async fn execute(
        &self,
        state: &mut GraphState,
        ctx: &GraphContext,
    ) -> Result<NodeOutput, GraphError> {
        tracing::info!(
            documents = state.documents.len(),
            "Generate: producing answer"
        );

        let answer = ctx
            .generator
            .generate(&state.question, &state.documents)
            .await
            .map_err(|e| GraphError::new(self.id(), e.to_string()))?;

        state.generation = Some(answer);

        Ok(NodeOutput::Final)
    }
}
