// Graph Builder
// Constructs the retrieval pipeline graph using petgraph

use super::node::GraphError;
use super::nodes::{
    GenerateNode, GradeDocumentsNode, RetrieveNode, TransformQueryNode, WebSearchNode,
};
use super::runtime::{GraphBuilder, GraphRuntime};

/// Build the question-answering graph
///
/// retrieve -> grade_documents, then either straight to generate or through
/// transform_query -> web_search -> generate when grading flags a miss.
/// The graph is acyclic; `max_steps` is a guard against future re-wiring.
pub fn build_rag_graph() -> Result<GraphRuntime, GraphError> {
    GraphBuilder::new()
        .entry("retrieve")
        .max_steps(10)
        // Pipeline nodes
        .node(Box::new(RetrieveNode::new()))
        .node(Box::new(GradeDocumentsNode::new()))
        .node(Box::new(TransformQueryNode::new()))
        .node(Box::new(WebSearchNode::new()))
        .node(Box::new(GenerateNode::new()))
        // Always grade what was retrieved
        .edge("retrieve", "grade_documents")
        // Grading decides the route
        .conditional_edge("grade_documents", "generate", "generate")
        .conditional_edge("grade_documents", "transform_query", "transform_query")
        // Web-search fallback path
        .edge("transform_query", "web_search")
        .edge("web_search", "generate")
        // Build the graph
        .build()
}
