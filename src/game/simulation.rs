//! The authoritative world and its per-tick step

use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use crate::config::GameConfig;
use crate::util::time::tick_delta;
use crate::ws::protocol::{ClientMsg, GameSnapshot, ServerMsg};

use super::collision::CollisionSystem;
use super::entity::{Ball, Player, Team, MAX_CHARGE};
use super::physics::PhysicsSystem;
use super::roster::Roster;
use super::round::RoundController;
use super::snapshot::SnapshotBuilder;

/// Result of a connection asking to join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Player { team: Team, slot: Option<usize> },
    /// Roster full; the connection only watches
    Spectator,
}

/// World state (owned by the match task)
pub struct Simulation {
    pub config: GameConfig,
    pub tick: u64,
    pub players: HashMap<Uuid, Player>,
    pub ball: Ball,
    pub round: RoundController,
    roster: Roster,
    next_join_seq: u64,
}

impl Simulation {
    pub fn new(config: GameConfig) -> Self {
        let ball = Ball::at_rest(config.center(), config.ball_radius);
        let roster = Roster::new(&config);
        Self {
            config,
            tick: 0,
            players: HashMap::new(),
            ball,
            round: RoundController::new(),
            roster,
            next_join_seq: 0,
        }
    }

    /// Create a player for a new connection
    pub fn join(&mut self, id: Uuid) -> JoinOutcome {
        if self.players.contains_key(&id) {
            let p = &self.players[&id];
            return JoinOutcome::Player {
                team: p.team,
                slot: p.slot,
            };
        }
        if self.players.len() >= self.config.max_players {
            return JoinOutcome::Spectator;
        }

        let (slot, spawn) = self.roster.assign(id, &self.config);
        let team = Team::for_join_index(slot.unwrap_or(self.players.len()));

        let mut player = Player::new(id, team, slot, spawn, self.next_join_seq);
        player.can_move = !self.round.is_locked();
        self.next_join_seq += 1;
        self.players.insert(id, player);

        JoinOutcome::Player { team, slot }
    }

    /// Remove a player, freeing its roster slot
    pub fn leave(&mut self, id: Uuid) -> Option<Player> {
        let player = self.players.remove(&id)?;
        if let Some(slot) = player.slot {
            self.roster.release(slot, id);
        }
        Some(player)
    }

    /// Record a client message for the next tick.
    ///
    /// Returns false when `id` owns no player (spectator or already gone).
    pub fn queue_input(&mut self, id: Uuid, msg: ClientMsg) -> bool {
        let Some(player) = self.players.get_mut(&id) else {
            debug!(conn_id = %id, "Input for unknown player ignored");
            return false;
        };

        match msg {
            ClientMsg::Movement(movement) => player.inbox.movement = Some(movement),
            ClientMsg::ChargePower => player.inbox.charging = true,
            ClientMsg::Shoot => player.inbox.shoot = true,
            ClientMsg::TouchBall => player.can_touch_ball = true,
        }
        true
    }

    /// Advance the world by one tick, returning the events it produced
    pub fn step(&mut self) -> Vec<ServerMsg> {
        self.tick += 1;

        if self.round.is_locked() {
            for player in self.players.values_mut() {
                player.inbox.clear();
            }
            let events = self.round.advance(&mut self.players, tick_delta());
            PhysicsSystem::update_ball(&mut self.ball, &self.config);
            return events;
        }

        let struck = self.apply_inputs();
        PhysicsSystem::update_ball(&mut self.ball, &self.config);

        let touched = CollisionSystem::resolve_all(&mut self.players, &mut self.ball, &self.config);
        for player in self.players.values_mut() {
            PhysicsSystem::clamp_player(player, &self.config);
        }
        if struck || !touched.is_empty() {
            self.lift_touch_restriction();
        }

        self.round
            .detect_goal(&mut self.players, &mut self.ball, &self.config)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        SnapshotBuilder::build(self.tick, &self.players, &self.ball, self.round.score)
    }

    /// Returns true if a kick or shot reached the ball
    fn apply_inputs(&mut self) -> bool {
        let config = &self.config;
        let mut struck = false;
        for player in self.players.values_mut() {
            let input = player.inbox.take();
            if !player.can_move {
                continue;
            }

            if input.charging {
                player.charge = (player.charge + config.charge_rate).min(MAX_CHARGE);
            }
            if let Some(movement) = &input.movement {
                PhysicsSystem::update_player(player, movement, config);
                if movement.kick {
                    struck |= CollisionSystem::kick(player, &mut self.ball, config);
                }
            }
            if input.shoot {
                struck |= CollisionSystem::shoot(player, &mut self.ball, config);
            }
        }
        struck
    }

    /// Someone allowed to touch the ball has done so: the kickoff is taken
    fn lift_touch_restriction(&mut self) {
        for player in self.players.values_mut() {
            player.can_touch_ball = true;
        }
    }
}
