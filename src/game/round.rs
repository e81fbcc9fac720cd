//! Goal detection and the post-goal lock/countdown cycle

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::GameConfig;
use crate::ws::protocol::{GoalData, ServerMsg};

use super::entity::{Ball, Player, Team};
use super::geometry::{normal, Vec2};
use super::physics::PhysicsSystem;

/// Round phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoundState {
    /// Normal play
    Active,
    /// After a goal, players frozen until the countdown runs out
    Locked { remaining: f32 },
}

/// Which end of the field a goal mouth sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalSide {
    Left,
    Right,
}

/// Goals per team
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub red: u32,
    pub blue: u32,
}

impl Score {
    pub fn add(&mut self, team: Team) {
        match team {
            Team::Red => self.red += 1,
            Team::Blue => self.blue += 1,
        }
    }
}

/// Where the ball is put back after a goal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallPlacement {
    /// Field centre
    Center,
    /// Centre line, shifted toward the half of the team that conceded
    ConcedingHalf,
    /// Next to the first player of the team that conceded
    ConcedingPlayer,
}

impl FromStr for BallPlacement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "center" | "centre" => Ok(BallPlacement::Center),
            "conceding_half" => Ok(BallPlacement::ConcedingHalf),
            "conceding_player" => Ok(BallPlacement::ConcedingPlayer),
            other => Err(format!("unknown ball placement '{other}'")),
        }
    }
}

/// Geometric goal-mouth test
pub struct GoalDetector;

impl GoalDetector {
    /// Goal mouth containing the ball's centre, if any
    pub fn check(ball: Vec2, config: &GameConfig) -> Option<GoalSide> {
        let center_y = config.field_height / 2.0;
        if (ball.y - center_y).abs() > config.goal_half_height {
            return None;
        }
        if ball.x <= config.goal_depth {
            Some(GoalSide::Left)
        } else if ball.x >= config.field_width - config.goal_depth {
            Some(GoalSide::Right)
        } else {
            None
        }
    }

    /// Team credited for a ball entering `side`
    pub fn scorer(side: GoalSide, config: &GameConfig) -> Team {
        match side {
            GoalSide::Left => config.left_goal_scorer,
            GoalSide::Right => config.left_goal_scorer.opponent(),
        }
    }
}

/// Owns the round state machine and the score
#[derive(Debug, Clone)]
pub struct RoundController {
    pub state: RoundState,
    pub score: Score,
}

impl RoundController {
    pub fn new() -> Self {
        Self {
            state: RoundState::Active,
            score: Score::default(),
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.state, RoundState::Locked { .. })
    }

    /// Check the ball against both mouths and lock the round on a goal.
    ///
    /// Edge-triggered: does nothing while already locked.
    pub fn detect_goal(
        &mut self,
        players: &mut HashMap<Uuid, Player>,
        ball: &mut Ball,
        config: &GameConfig,
    ) -> Vec<ServerMsg> {
        if self.is_locked() {
            return Vec::new();
        }
        match GoalDetector::check(ball.position, config) {
            Some(side) => self.score_goal(side, players, ball, config),
            None => Vec::new(),
        }
    }

    fn score_goal(
        &mut self,
        side: GoalSide,
        players: &mut HashMap<Uuid, Player>,
        ball: &mut Ball,
        config: &GameConfig,
    ) -> Vec<ServerMsg> {
        let scorer = GoalDetector::scorer(side, config);
        self.score.add(scorer);

        for player in players.values_mut() {
            player.reset_to_home();
            player.can_move = false;
            if config.restrict_scorer_touch {
                player.can_touch_ball = player.team != scorer;
            }
        }

        let spot = Self::kickoff_spot(side, scorer.opponent(), players, config);
        ball.place(PhysicsSystem::clamp_to_field(spot, ball.radius, config));

        self.state = RoundState::Locked {
            remaining: config.countdown_secs,
        };

        info!(
            team = ?scorer,
            red = self.score.red,
            blue = self.score.blue,
            "Goal scored"
        );

        vec![
            ServerMsg::Goal(GoalData {
                team: scorer,
                score: self.score,
            }),
            ServerMsg::SetBlur(true),
            ServerMsg::Countdown(whole_seconds(config.countdown_secs)),
        ]
    }

    fn kickoff_spot(
        side: GoalSide,
        conceding: Team,
        players: &HashMap<Uuid, Player>,
        config: &GameConfig,
    ) -> Vec2 {
        let center = config.center();
        let toward_conceding_half = match side {
            GoalSide::Left => Vec2::new(center.x - config.kickoff_offset, center.y),
            GoalSide::Right => Vec2::new(center.x + config.kickoff_offset, center.y),
        };

        match config.ball_placement {
            BallPlacement::Center => center,
            BallPlacement::ConcedingHalf => toward_conceding_half,
            BallPlacement::ConcedingPlayer => players
                .values()
                .filter(|p| p.team == conceding)
                .min_by_key(|p| p.join_seq)
                .and_then(|p| {
                    normal(p.home, center).map(|n| {
                        p.home.add(n.scale(config.ball_collision_distance + 1.0))
                    })
                })
                .unwrap_or(toward_conceding_half),
        }
    }

    /// Advance the countdown by one tick while locked.
    pub fn advance(&mut self, players: &mut HashMap<Uuid, Player>, dt: f32) -> Vec<ServerMsg> {
        let RoundState::Locked { remaining } = self.state else {
            return Vec::new();
        };

        let remaining = remaining - dt;
        if remaining > 0.0 {
            self.state = RoundState::Locked { remaining };
            return vec![ServerMsg::Countdown(whole_seconds(remaining))];
        }

        self.state = RoundState::Active;
        for player in players.values_mut() {
            player.can_move = true;
        }
        info!("Round unlocked");
        vec![ServerMsg::SetBlur(false)]
    }
}

impl Default for RoundController {
    fn default() -> Self {
        Self::new()
    }
}

/// Countdown shown to clients, truncated to whole seconds
fn whole_seconds(remaining: f32) -> u32 {
    remaining.max(0.0) as u32
}
