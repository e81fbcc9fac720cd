//! WebSocket protocol message definitions
//! These are the wire types for client-server communication.
//!
//! Every frame is a JSON text message shaped as a named event:
//! `{"event": "<name>", "data": <payload>}`.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::game::entity::Team;
use crate::game::round::Score;

/// Directional intent for the next tick.
///
/// Missing or non-boolean fields read as "not pressed".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementData {
    #[serde(deserialize_with = "lenient_bool")]
    pub left: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub up: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub right: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub down: bool,
    /// Kick the ball if it is within reach
    #[serde(deserialize_with = "lenient_bool")]
    pub kick: bool,
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(matches!(value, Value::Bool(true)))
}

/// Messages sent from client to server.
///
/// Payloads of `chargePower`, `shoot` and `touchBall` are ignored, so
/// `{"event":"shoot","data":{}}` parses the same as `{"event":"shoot"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawClientMsg")]
pub enum ClientMsg {
    /// Directional input, last write wins within a tick
    Movement(MovementData),
    /// Charge button held
    ChargePower,
    /// Release the charged shot
    Shoot,
    /// Ask for ball contact back after scoring
    TouchBall,
}

/// Client frame before the event name is resolved
#[derive(Deserialize)]
struct RawClientMsg {
    event: String,
    #[serde(default)]
    data: Value,
}

impl TryFrom<RawClientMsg> for ClientMsg {
    type Error = String;

    fn try_from(raw: RawClientMsg) -> Result<Self, Self::Error> {
        match raw.event.as_str() {
            "movement" => match raw.data {
                Value::Null => Ok(ClientMsg::Movement(MovementData::default())),
                data => serde_json::from_value(data)
                    .map(ClientMsg::Movement)
                    .map_err(|e| format!("invalid movement payload: {e}")),
            },
            "chargePower" => Ok(ClientMsg::ChargePower),
            "shoot" => Ok(ClientMsg::Shoot),
            "touchBall" => Ok(ClientMsg::TouchBall),
            other => Err(format!("unknown event '{other}'")),
        }
    }
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMsg {
    /// Full state, sent once to a new connection
    Init(GameSnapshot),
    /// Full state, broadcast every tick
    State(GameSnapshot),
    /// A team scored
    Goal(GoalData),
    /// Round locked (true) or unlocked (false)
    SetBlur(bool),
    /// Whole seconds left before play resumes
    Countdown(u32),
    /// A player disconnected
    PlayerLeft(PlayerLeftData),
}

/// Complete world state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Server tick number
    pub tick: u64,
    pub players: HashMap<Uuid, PlayerView>,
    pub ball: BallView,
    pub score: Score,
}

/// Player state as seen by clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub color: Team,
    pub can_move: bool,
    pub can_kick: bool,
    /// 0-100
    pub charge: f32,
}

/// Ball state as seen by clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallView {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalData {
    pub team: Team,
    pub score: Score,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerLeftData {
    pub id: Uuid,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn movement_parses_with_optional_kick() {
        let msg: ClientMsg = serde_json::from_value(json!({
            "event": "movement",
            "data": { "left": true, "up": false, "right": false, "down": true }
        }))
        .unwrap();

        assert_eq!(
            msg,
            ClientMsg::Movement(MovementData {
                left: true,
                down: true,
                ..Default::default()
            })
        );
    }

    #[test]
    fn bad_movement_fields_mean_no_input() {
        let msg: ClientMsg = serde_json::from_value(json!({
            "event": "movement",
            "data": { "left": "yes", "up": 1, "kick": null, "extra": [1, 2] }
        }))
        .unwrap();

        assert_eq!(msg, ClientMsg::Movement(MovementData::default()));
    }

    #[test]
    fn payloadless_events_parse() {
        let msg: ClientMsg = serde_json::from_str(r#"{"event":"chargePower"}"#).unwrap();
        assert_eq!(msg, ClientMsg::ChargePower);
        let msg: ClientMsg = serde_json::from_str(r#"{"event":"shoot"}"#).unwrap();
        assert_eq!(msg, ClientMsg::Shoot);
        let msg: ClientMsg = serde_json::from_str(r#"{"event":"touchBall"}"#).unwrap();
        assert_eq!(msg, ClientMsg::TouchBall);
    }

    #[test]
    fn payloads_on_bare_events_are_ignored() {
        for data in [json!({}), json!(null), json!(true), json!({ "power": 80 })] {
            let msg: ClientMsg =
                serde_json::from_value(json!({ "event": "shoot", "data": data })).unwrap();
            assert_eq!(msg, ClientMsg::Shoot);
        }
        let msg: ClientMsg =
            serde_json::from_value(json!({ "event": "chargePower", "data": {} })).unwrap();
        assert_eq!(msg, ClientMsg::ChargePower);
        let msg: ClientMsg =
            serde_json::from_value(json!({ "event": "touchBall", "data": {} })).unwrap();
        assert_eq!(msg, ClientMsg::TouchBall);
    }

    #[test]
    fn movement_without_payload_is_no_input() {
        let msg: ClientMsg = serde_json::from_str(r#"{"event":"movement"}"#).unwrap();
        assert_eq!(msg, ClientMsg::Movement(MovementData::default()));
        assert!(serde_json::from_str::<ClientMsg>(r#"{"event":"movement","data":"left"}"#).is_err());
    }

    #[test]
    fn unknown_events_are_errors() {
        assert!(serde_json::from_str::<ClientMsg>(r#"{"event":"teleport","data":{}}"#).is_err());
        assert!(serde_json::from_str::<ClientMsg>("not json").is_err());
    }

    #[test]
    fn server_events_use_camel_case_names() {
        let blur = serde_json::to_value(ServerMsg::SetBlur(true)).unwrap();
        assert_eq!(blur, json!({ "event": "setBlur", "data": true }));

        let countdown = serde_json::to_value(ServerMsg::Countdown(3)).unwrap();
        assert_eq!(countdown, json!({ "event": "countdown", "data": 3 }));

        let goal = serde_json::to_value(ServerMsg::Goal(GoalData {
            team: Team::Red,
            score: Score { red: 2, blue: 1 },
        }))
        .unwrap();
        assert_eq!(
            goal,
            json!({ "event": "goal", "data": { "team": "red", "score": { "red": 2, "blue": 1 } } })
        );
    }

    #[test]
    fn player_view_fields_are_camel_case() {
        let view = PlayerView {
            x: 1.0,
            y: 2.0,
            vx: 0.0,
            vy: 0.0,
            color: Team::Blue,
            can_move: false,
            can_kick: true,
            charge: 0.0,
        };
        let value = serde_json::to_value(view).unwrap();
        assert_eq!(value["color"], "blue");
        assert_eq!(value["canMove"], false);
        assert_eq!(value["canKick"], true);
    }
}
