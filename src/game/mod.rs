//! Game simulation modules

pub mod collision;
pub mod entity;
pub mod geometry;
pub mod r#match;
pub mod physics;
pub mod roster;
pub mod round;
pub mod simulation;
pub mod snapshot;

pub use r#match::{GameMatch, MatchHandle};

use tokio::sync::{broadcast, oneshot};
use uuid::Uuid;

use crate::ws::protocol::{ClientMsg, ServerMsg};

/// Message from a WebSocket session to the match loop
#[derive(Debug)]
pub struct PlayerInput {
    pub conn_id: Uuid,
    pub event: SessionEvent,
}

#[derive(Debug)]
pub enum SessionEvent {
    /// New connection; the reply carries its `init` snapshot
    Join { reply: oneshot::Sender<JoinReply> },
    /// Parsed client message
    Client(ClientMsg),
    /// Connection closed
    Leave,
}

/// Answer to `Join`. The event feed starts right after `init`, so the first
/// `state` a session forwards is never older than its `init`.
#[derive(Debug)]
pub struct JoinReply {
    pub init: ServerMsg,
    pub events: broadcast::Receiver<ServerMsg>,
}
