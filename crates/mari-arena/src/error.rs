use thiserror::Error;

/// A coordinator message that could not be understood.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unknown message type `{0}`")]
    UnknownType(String),
}

#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("invalid arena config: {0}")]
    Config(#[source] serde_json::Error),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("no game session yet")]
    NoSession,
    #[error("a solo screen has no coordinator")]
    SoloMode,
}
