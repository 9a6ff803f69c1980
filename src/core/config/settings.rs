use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::errors::ApiError;

/// Typed view over the merged config document. Unknown keys are ignored so a
/// config written for a newer build still loads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub index: IndexSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

impl Settings {
    pub fn from_value(config: &Value) -> Result<Self, ApiError> {
        serde_json::from_value(config.clone()).map_err(|e| {
            ApiError::BadRequest(format!("Invalid config: {}", e))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Usually supplied via secrets.yml or the OPENAI_API_KEY env var.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
            temperature: 0.0,
            request_timeout_secs: default_request_timeout_secs(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSettings {
    /// Override for the uploads directory; relative paths resolve against the
    /// user data dir.
    #[serde(default)]
    pub data_dir: Option<String>,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_chunk_tokens")]
    pub chunk_tokens: usize,
    #[serde(default)]
    pub chunk_overlap: usize,
    /// How many PDFs from the documents directory feed the index.
    #[serde(default = "default_max_source_documents")]
    pub max_source_documents: usize,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// When non-empty, the index is built from these pages instead of PDFs.
    #[serde(default)]
    pub urls: Vec<String>,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            data_dir: None,
            collection: default_collection(),
            chunk_tokens: default_chunk_tokens(),
            chunk_overlap: 0,
            max_source_documents: default_max_source_documents(),
            top_k: default_top_k(),
            urls: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_search_provider")]
    pub provider: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default)]
    pub tavily_api_key: Option<String>,
    #[serde(default)]
    pub brave_api_key: Option<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            provider: default_search_provider(),
            max_results: default_max_results(),
            tavily_api_key: None,
            brave_api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: Vec::new(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_chat_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_collection() -> String {
    "rag-chroma".to_string()
}

fn default_chunk_tokens() -> usize {
    250
}

fn default_max_source_documents() -> usize {
    2
}

fn default_top_k() -> usize {
    4
}

fn default_search_provider() -> String {
    "tavily".to_string()
}

fn default_max_results() -> usize {
    3
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8642
}
