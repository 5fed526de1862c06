use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoutError {
    // Reasoning engine errors
    #[error("LLM request failed: {0}")]
    LlmRequest(String),

    #[error("LLM response parse error: {0}")]
    LlmParse(String),

    #[error("LLM provider not supported: {0}")]
    UnsupportedProvider(String),

    // Data provider errors
    #[error("Provider request failed: {provider}: {message}")]
    ProviderRequest { provider: String, message: String },

    #[error("Provider returned an unexpected response: {provider}: {message}")]
    ProviderResponse { provider: String, message: String },

    #[error("Snapshot job {snapshot_id} failed: {message}")]
    Job { snapshot_id: String, message: String },

    // Orchestration errors
    #[error("Graph validation failed: {0}")]
    GraphValidation(String),

    #[error("Graph contains a cycle through: {}", .0.join(", "))]
    CyclicGraph(Vec<String>),

    #[error("Node '{node}' wrote undeclared field '{field}'")]
    UndeclaredWrite { node: String, field: String },

    #[error("State value mismatch for field '{field}': {message}")]
    StateMismatch { field: String, message: String },

    // Config errors
    #[error("Config error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScoutError {
    /// Whether this error comes from the orchestration layer itself rather
    /// than from a node's external calls. Only these abort a workflow run.
    pub fn is_orchestration(&self) -> bool {
        matches!(
            self,
            Self::GraphValidation(_)
                | Self::CyclicGraph(_)
                | Self::UndeclaredWrite { .. }
                | Self::StateMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;
