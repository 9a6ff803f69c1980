// Graph State
// GraphState and related types for the StateGraph

use serde::{Deserialize, Serialize};

use crate::index::Document;

/// Verdict of the grading step: does the pipeline need the web-search
/// fallback before generating?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WebSearchFlag {
    Yes,
    #[default]
    No,
}

impl WebSearchFlag {
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "yes" => WebSearchFlag::Yes,
            _ => WebSearchFlag::No,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WebSearchFlag::Yes => "Yes",
            WebSearchFlag::No => "No",
        }
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, WebSearchFlag::Yes)
    }
}

/// Main graph state
///
/// One instance flows through a single question. `documents` starts as the
/// retrieved set, shrinks during grading, and may gain one synthetic
/// web-search document before generation.
#[derive(Debug, Clone, Serialize)]
pub struct GraphState {
    /// The question being answered; `transform_query` may replace it.
    pub question: String,

    /// Final answer, set exactly once by the generate node.
    pub generation: Option<String>,

    /// Set to `Yes` when any retrieved document was graded irrelevant.
    pub web_search: WebSearchFlag,

    /// Working document set for the current question.
    pub documents: Vec<Document>,
}

impl GraphState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            generation: None,
            web_search: WebSearchFlag::No,
            documents: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =======================================================================
    // WebSearchFlag tests
    // =======================================================================

    #[test]
    fn web_search_flag_default_is_no() {
        assert_eq!(WebSearchFlag::default(), WebSearchFlag::No);
    }

    #[test]
    fn web_search_flag_from_str_yes_variants() {
        assert_eq!(WebSearchFlag::from_str("yes"), WebSearchFlag::Yes);
        assert_eq!(WebSearchFlag::from_str("Yes"), WebSearchFlag::Yes);
        assert_eq!(WebSearchFlag::from_str("YES"), WebSearchFlag::Yes);
        assert_eq!(WebSearchFlag::from_str("  yes  "), WebSearchFlag::Yes);
    }

    #[test]
    fn web_search_flag_from_str_anything_else_is_no() {
        assert_eq!(WebSearchFlag::from_str("no"), WebSearchFlag::No);
        assert_eq!(WebSearchFlag::from_str(""), WebSearchFlag::No);
        assert_eq!(WebSearchFlag::from_str("maybe"), WebSearchFlag::No);
    }

    #[test]
    fn web_search_flag_as_str_roundtrip() {
        assert_eq!(WebSearchFlag::Yes.as_str(), "Yes");
        assert_eq!(WebSearchFlag::No.as_str(), "No");

        for flag in [WebSearchFlag::Yes, WebSearchFlag::No] {
            assert_eq!(WebSearchFlag::from_str(flag.as_str()), flag);
        }
    }

    #[test]
    fn web_search_flag_serializes_capitalized() {
        assert_eq!(
            serde_json::to_string(&WebSearchFlag::Yes).unwrap(),
            "\"Yes\""
        );
        assert_eq!(serde_json::to_string(&WebSearchFlag::No).unwrap(), "\"No\"");
    }

    // =======================================================================
    // GraphState construction tests
    // =======================================================================

    #[test]
    fn graph_state_new_initializes_correctly() {
        let state = GraphState::new("what are the types of agent memory?");

        assert_eq!(state.question, "what are the types of agent memory?");
        assert!(state.generation.is_none());
        assert_eq!(state.web_search, WebSearchFlag::No);
        assert!(state.documents.is_empty());
    }
}
