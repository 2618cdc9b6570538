use serde::{Deserialize, Serialize};

/// An event leaving the engine towards the embedding screen.
///
/// `Started`, `Stopped` and `Swapped` are produced by the engine itself.
/// Systems produce the rest. Serialized with a `"type"` tag, e.g.
/// `{"type":"score","points":3}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EngineEvent {
    Started,
    Stopped,
    Swapped,
    /// The player is out. The screen stops the engine and reports the loss.
    GameOver,
    /// The player passed another obstacle pair.
    Score { points: u32 },
    /// Anything else a system wants to tell the screen.
    Custom {
        name: String,
        #[serde(default)]
        data: serde_json::Value,
    },
}

impl EngineEvent {
    pub fn custom(name: impl Into<String>) -> Self {
        EngineEvent::Custom {
            name: name.into(),
            data: serde_json::Value::Null,
        }
    }

    /// The wire name of this event's type.
    pub fn kind(&self) -> &str {
        match self {
            EngineEvent::Started => "started",
            EngineEvent::Stopped => "stopped",
            EngineEvent::Swapped => "swapped",
            EngineEvent::GameOver => "game-over",
            EngineEvent::Score { .. } => "score",
            EngineEvent::Custom { name, .. } => name,
        }
    }
}
