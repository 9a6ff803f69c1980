// Graph Nodes Module
// Individual node implementations

pub mod generate;
pub mod grade;
pub mod retrieve;
pub mod transform_query;
pub mod web_search;

pub use generate::GenerateNode;
pub use grade::GradeDocumentsNode;
pub use retrieve::RetrieveNode;
pub use transform_query::TransformQueryNode;
pub use web_search::{WebSearchNode, WEB_SEARCH_SOURCE};
