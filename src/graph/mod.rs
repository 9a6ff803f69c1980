// Graph Module
// LangGraph-style StateGraph architecture for Rust

pub mod builder;
pub mod node;
pub mod runtime;
pub mod state;

pub mod nodes;

pub use builder::build_rag_graph;
pub use node::{GraphContext, GraphError, Node, NodeOutput};
pub use runtime::GraphRuntime;
pub use state::{GraphState, WebSearchFlag};
