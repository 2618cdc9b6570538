//! Messages exchanged with the multiplayer coordinator over the socket.
//! Every message is a `{"type": ..., "data": {...}}` JSON object.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;

/// Coordinator to client.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// We were placed in a game.
    JoinGame { game_id: String, users: Vec<String> },
    /// Another player joined our game.
    NewUser { game_id: String, user_id: String },
    /// The lobby is full: start the countdown.
    StartGame,
    Winner { amount: f64 },
    Loser { amount: f64 },
    Error { message: Option<String> },
    /// Account state changed server-side; the host should reload.
    Refresh,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinGameData {
    game_id: String,
    #[serde(default)]
    users: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewUserData {
    game_id: String,
    user_id: String,
}

#[derive(Deserialize)]
struct AmountData {
    amount: f64,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ErrorData {
    message: Option<String>,
}

/// A missing or null `data` reads as an empty object.
fn payload<T: DeserializeOwned>(data: Value) -> Result<T, ProtocolError> {
    let data = match data {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    Ok(serde_json::from_value(data)?)
}

impl Inbound {
    pub fn parse(json: &str) -> Result<Self, ProtocolError> {
        let Envelope { kind, data } = serde_json::from_str(json)?;
        let message = match kind.as_str() {
            "join-game" => {
                let d: JoinGameData = payload(data)?;
                Inbound::JoinGame {
                    game_id: d.game_id,
                    users: d.users,
                }
            }
            "new-user" => {
                let d: NewUserData = payload(data)?;
                Inbound::NewUser {
                    game_id: d.game_id,
                    user_id: d.user_id,
                }
            }
            "start-game" => Inbound::StartGame,
            "winner" => Inbound::Winner {
                amount: payload::<AmountData>(data)?.amount,
            },
            "loser" => Inbound::Loser {
                amount: payload::<AmountData>(data)?.amount,
            },
            "error" => Inbound::Error {
                message: payload::<ErrorData>(data)?.message,
            },
            "refresh" => Inbound::Refresh,
            _ => return Err(ProtocolError::UnknownType(kind)),
        };
        Ok(message)
    }
}

/// Client to coordinator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum Outbound {
    #[serde(rename_all = "camelCase")]
    JoinRandomGame { user_id: String, game_type_id: String },
    #[serde(rename_all = "camelCase")]
    GameOver { game_id: String, user_id: String },
    #[serde(rename_all = "camelCase")]
    UpdateBoard { game_id: String, user_id: String },
}

impl Outbound {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_join_game() {
        let msg = Inbound::parse(r#"{"type":"join-game","data":{"gameId":"g1","users":["a","b"]}}"#)
            .unwrap();
        assert_eq!(
            msg,
            Inbound::JoinGame {
                game_id: "g1".into(),
                users: vec!["a".into(), "b".into()],
            }
        );
    }

    #[test]
    fn parses_new_user_and_results() {
        assert_eq!(
            Inbound::parse(r#"{"type":"new-user","data":{"gameId":"g1","userId":"c"}}"#).unwrap(),
            Inbound::NewUser {
                game_id: "g1".into(),
                user_id: "c".into(),
            }
        );
        assert_eq!(
            Inbound::parse(r#"{"type":"winner","data":{"amount":15}}"#).unwrap(),
            Inbound::Winner { amount: 15.0 }
        );
        assert_eq!(
            Inbound::parse(r#"{"type":"loser","data":{"amount":5}}"#).unwrap(),
            Inbound::Loser { amount: 5.0 }
        );
    }

    #[test]
    fn data_is_optional_for_bare_messages() {
        assert_eq!(Inbound::parse(r#"{"type":"start-game"}"#).unwrap(), Inbound::StartGame);
        assert_eq!(
            Inbound::parse(r#"{"type":"start-game","data":{}}"#).unwrap(),
            Inbound::StartGame
        );
        assert_eq!(
            Inbound::parse(r#"{"type":"refresh","data":{}}"#).unwrap(),
            Inbound::Refresh
        );
        assert_eq!(
            Inbound::parse(r#"{"type":"error"}"#).unwrap(),
            Inbound::Error { message: None }
        );
        assert_eq!(
            Inbound::parse(r#"{"type":"error","data":{"message":"lobby full"}}"#).unwrap(),
            Inbound::Error {
                message: Some("lobby full".into())
            }
        );
    }

    #[test]
    fn rejects_unknown_and_malformed() {
        assert!(matches!(
            Inbound::parse(r#"{"type":"collect-entry","data":{}}"#),
            Err(ProtocolError::UnknownType(t)) if t == "collect-entry"
        ));
        assert!(matches!(
            Inbound::parse(r#"{"type":"join-game","data":{"users":[]}}"#),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(Inbound::parse("not json"), Err(ProtocolError::Malformed(_))));
    }

    #[test]
    fn outbound_wire_format() {
        let json = Outbound::GameOver {
            game_id: "g1".into(),
            user_id: "u1".into(),
        }
        .to_json()
        .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "game-over");
        assert_eq!(value["data"]["gameId"], "g1");
        assert_eq!(value["data"]["userId"], "u1");

        let value = serde_json::to_value(Outbound::JoinRandomGame {
            user_id: "u1".into(),
            game_type_id: "t1".into(),
        })
        .unwrap();
        assert_eq!(value["type"], "join-random-game");
        assert_eq!(value["data"]["gameTypeId"], "t1");
    }
}
