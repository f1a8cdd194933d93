use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,
    /// Document index (Elasticsearch-compatible) connection settings
    pub index: IndexConfig,
    /// Learned-sparse model deployment settings
    pub model: ModelConfig,
    /// Corpus source for POST /reindex: a JSON array file or a directory
    pub corpus_path: PathBuf,
    /// Results per page
    pub page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Base URL of the document index REST API
    pub base_url: String,
    /// Index name holding the document corpus
    pub index_name: String,
    /// Basic-auth username (only needed for secured clusters)
    pub username: Option<String>,
    /// Basic-auth password
    pub password: Option<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Trained-model id of the learned-sparse encoder
    pub sparse_model_id: String,
    /// Trained-model id of the dense sentence encoder
    pub dense_model_id: String,
    /// Ingest pipeline that attaches sparse embeddings at index time
    pub ingest_pipeline: String,
    /// Maximum readiness polls before deployment is declared failed
    pub max_polls: u32,
    /// Initial poll interval in seconds (doubles per attempt)
    pub poll_interval_secs: u64,
    /// Hard ceiling on one ensure-deployed call, in seconds
    pub deploy_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:9000".to_string(),
            index: IndexConfig::default(),
            model: ModelConfig::default(),
            corpus_path: PathBuf::from("./data.json"),
            page_size: 5,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9200".to_string(),
            index_name: "documents".to_string(),
            username: None,
            password: None,
            request_timeout_secs: 30,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            sparse_model_id: ".elser_model_2".to_string(),
            dense_model_id: "sentence-transformer-mini".to_string(),
            ingest_pipeline: "sparse-ingest-pipeline".to_string(),
            max_polls: 30,
            poll_interval_secs: 2,
            deploy_timeout_secs: 300,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("DOC_SEARCH_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(url) = std::env::var("DOC_SEARCH_INDEX_URL") {
            config.index.base_url = url;
        }
        if let Ok(name) = std::env::var("DOC_SEARCH_INDEX_NAME") {
            config.index.index_name = name;
        }
        if let Ok(user) = std::env::var("DOC_SEARCH_INDEX_USERNAME") {
            config.index.username = Some(user);
        }
        if let Ok(pass) = std::env::var("DOC_SEARCH_INDEX_PASSWORD") {
            config.index.password = Some(pass);
        }
        if let Ok(val) = std::env::var("DOC_SEARCH_INDEX_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.index.request_timeout_secs = v;
            }
        }
        if let Ok(id) = std::env::var("DOC_SEARCH_SPARSE_MODEL_ID") {
            config.model.sparse_model_id = id;
        }
        if let Ok(id) = std::env::var("DOC_SEARCH_DENSE_MODEL_ID") {
            config.model.dense_model_id = id;
        }
        if let Ok(id) = std::env::var("DOC_SEARCH_INGEST_PIPELINE") {
            config.model.ingest_pipeline = id;
        }
        if let Ok(val) = std::env::var("DOC_SEARCH_MODEL_MAX_POLLS") {
            if let Ok(v) = val.parse() {
                config.model.max_polls = v;
            }
        }
        if let Ok(val) = std::env::var("DOC_SEARCH_MODEL_POLL_INTERVAL_SECS") {
            if let Ok(v) = val.parse() {
                config.model.poll_interval_secs = v;
            }
        }
        if let Ok(val) = std::env::var("DOC_SEARCH_MODEL_DEPLOY_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.model.deploy_timeout_secs = v;
            }
        }
        if let Ok(path) = std::env::var("DOC_SEARCH_CORPUS_PATH") {
            config.corpus_path = PathBuf::from(path);
        }
        if let Ok(val) = std::env::var("DOC_SEARCH_PAGE_SIZE") {
            if let Ok(v) = val.parse::<usize>() {
                config.page_size = v.max(1);
            }
        }

        config
    }
}
