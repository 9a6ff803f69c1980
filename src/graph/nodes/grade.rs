// Grade Documents Node
// Filters retrieved documents by relevance and decides the route

use async_trait::async_trait;

use crate::graph::node::{GraphContext, GraphError, Node, NodeOutput};
use crate::graph::state::{GraphState, WebSearchFlag};

pub struct GradeDocumentsNode;

impl GradeDocumentsNode {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GradeDocumentsNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Node for GradeDocumentsNode {
    fn id(&self) -> &'static str {
        "grade_documents"
    }

    fn name(&self) -> &'static str {
        "Grade Document Relevance"
    }

    /// Grades every retrieved document, keeps the relevant ones, and flags
    /// web search as soon as a single document fails the grade. An empty
    /// retrieval grades trivially clean and goes straight to generation.
    async fn execute(
        &self,
        state: &mut GraphState,
        ctx: &GraphContext,
    ) -> Result<NodeOutput, GraphError> {
        tracing::info!("Grade: checking document relevance");

        let mut relevant = Vec::new();
        let mut any_irrelevant = false;

        for document in std::mem::take(&mut state.documents) {
            let grade = ctx
                .grader
                .grade(&state.question, &document.page_content)
                .await
                .map_err(|e| GraphError::new(self.id(), e.to_string()))?;

            if grade.is_relevant() {
                tracing::info!(source = %document.metadata.source, "Grade: document relevant");
                relevant.push(document);
            } else {
                tracing::info!(source = %document.metadata.source, "Grade: document not relevant");
                any_irrelevant = true;
            }
        }

        state.documents = relevant;
        state.web_search = if any_irrelevant {
            WebSearchFlag::Yes
        } else {
            WebSearchFlag::No
        };

        let route = match state.web_search {
            WebSearchFlag::Yes => "transform_query",
            WebSearchFlag::No => "generate",
        };
        tracing::info!(
            web_search = state.web_search.as_str(),
            kept = state.documents.len(),
            "Grade: routing to {}",
            route
        );

        Ok(NodeOutput::Branch(route.to_string()))
    }
}
