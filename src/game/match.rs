//! Match handle and the authoritative fixed-rate tick loop

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::interval;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::GameConfig;
use crate::util::time::SIMULATION_TPS;
use crate::ws::protocol::{PlayerLeftData, ServerMsg};

use super::simulation::{JoinOutcome, Simulation};
use super::{JoinReply, PlayerInput, SessionEvent};

/// Handle to the running match, cloned into every session
#[derive(Clone)]
pub struct MatchHandle {
    pub input_tx: mpsc::Sender<PlayerInput>,
    pub player_count: Arc<AtomicUsize>,
    pub tick: Arc<AtomicU64>,
}

impl MatchHandle {
    pub fn player_count(&self) -> usize {
        self.player_count.load(Ordering::Relaxed)
    }

    pub fn current_tick(&self) -> u64 {
        self.tick.load(Ordering::Relaxed)
    }
}

/// The authoritative game match
pub struct GameMatch {
    sim: Simulation,
    input_rx: mpsc::Receiver<PlayerInput>,
    snapshot_tx: broadcast::Sender<ServerMsg>,
    player_count: Arc<AtomicUsize>,
    tick: Arc<AtomicU64>,
}

impl GameMatch {
    /// Create a new match
    pub fn new(config: GameConfig) -> (Self, MatchHandle) {
        let (input_tx, input_rx) = mpsc::channel(1024);
        let (snapshot_tx, _) = broadcast::channel(256);
        let player_count = Arc::new(AtomicUsize::new(0));
        let tick = Arc::new(AtomicU64::new(0));

        let handle = MatchHandle {
            input_tx,
            player_count: player_count.clone(),
            tick: tick.clone(),
        };

        let game_match = Self {
            sim: Simulation::new(config),
            input_rx,
            snapshot_tx,
            player_count,
            tick,
        };

        (game_match, handle)
    }

    /// Run the authoritative tick loop until every handle is dropped
    pub async fn run(mut self) {
        info!(tps = SIMULATION_TPS, "Match loop started");

        let tick_duration = Duration::from_micros(1_000_000 / SIMULATION_TPS as u64);
        let mut tick_interval = interval(tick_duration);
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tick_interval.tick().await;

            // Drain input queue
            if !self.process_inputs() {
                break;
            }

            let events = self.sim.step();
            self.tick.store(self.sim.tick, Ordering::Relaxed);

            // Sends only fail when nobody is subscribed
            for event in events {
                let _ = self.snapshot_tx.send(event);
            }
            let _ = self.snapshot_tx.send(ServerMsg::State(self.sim.snapshot()));
        }

        info!(tick = self.sim.tick, "Match loop stopped");
    }

    /// Apply everything queued since the last tick. Returns false once all
    /// senders are gone.
    fn process_inputs(&mut self) -> bool {
        loop {
            match self.input_rx.try_recv() {
                Ok(input) => self.handle_input(input),
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn handle_input(&mut self, input: PlayerInput) {
        let conn_id = input.conn_id;
        match input.event {
            SessionEvent::Join { reply } => self.handle_join(conn_id, reply),
            SessionEvent::Client(msg) => {
                self.sim.queue_input(conn_id, msg);
            }
            SessionEvent::Leave => self.handle_leave(conn_id),
        }
    }

    fn handle_join(&mut self, conn_id: Uuid, reply: oneshot::Sender<JoinReply>) {
        match self.sim.join(conn_id) {
            JoinOutcome::Player { team, slot } => {
                info!(
                    conn_id = %conn_id,
                    team = ?team,
                    slot = ?slot,
                    player_count = self.sim.players.len(),
                    "Player joined"
                );
            }
            JoinOutcome::Spectator => {
                info!(conn_id = %conn_id, "Roster full, joined as spectator");
            }
        }
        self.player_count
            .store(self.sim.players.len(), Ordering::Relaxed);

        // Subscribed between ticks: nothing already broadcast can reach this session
        let reply_msg = JoinReply {
            init: ServerMsg::Init(self.sim.snapshot()),
            events: self.snapshot_tx.subscribe(),
        };
        if reply.send(reply_msg).is_err() {
            debug!(conn_id = %conn_id, "Session gone before init");
        }
    }

    fn handle_leave(&mut self, conn_id: Uuid) {
        if self.sim.leave(conn_id).is_some() {
            self.player_count
                .store(self.sim.players.len(), Ordering::Relaxed);

            let _ = self
                .snapshot_tx
                .send(ServerMsg::PlayerLeft(PlayerLeftData { id: conn_id }));

            info!(
                conn_id = %conn_id,
                player_count = self.sim.players.len(),
                "Player left"
            );
        }
    }
}
