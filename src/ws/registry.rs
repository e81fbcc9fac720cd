//! Registry of open WebSocket sessions

use std::net::SocketAddr;

use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::util::time::unix_millis;

/// Bookkeeping for one connection
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub conn_id: Uuid,
    pub remote_addr: SocketAddr,
    pub connected_at: u64,
}

/// All currently connected sessions
pub struct SessionRegistry {
    sessions: DashMap<Uuid, SessionInfo>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn open(&self, conn_id: Uuid, remote_addr: SocketAddr) -> SessionInfo {
        let info = SessionInfo {
            conn_id,
            remote_addr,
            connected_at: unix_millis(),
        };
        self.sessions.insert(conn_id, info.clone());
        info
    }

    /// Forget a session, returning how long it was connected in milliseconds
    pub fn close(&self, conn_id: &Uuid) -> Option<u64> {
        self.sessions
            .remove(conn_id)
            .map(|(_, info)| unix_millis().saturating_sub(info.connected_at))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn list(&self) -> Vec<SessionInfo> {
        let mut all: Vec<SessionInfo> = self.sessions.iter().map(|s| s.value().clone()).collect();
        all.sort_by_key(|s| s.connected_at);
        all
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
