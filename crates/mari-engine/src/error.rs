use thiserror::Error;

/// Errors from the engine's non-tick surface. Ticking itself never fails.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid engine config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("an entity load is already in progress")]
    LoadInProgress,
    #[error("an entity swap is already in progress")]
    SwapInProgress,
}
