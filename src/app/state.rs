//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::game::MatchHandle;
use crate::ws::registry::SessionRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub game: MatchHandle,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(config: Config, game: MatchHandle) -> Self {
        Self {
            config: Arc::new(config),
            game,
            sessions: Arc::new(SessionRegistry::new()),
        }
    }
}
