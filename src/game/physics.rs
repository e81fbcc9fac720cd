//! Per-tick integration of player and ball motion

use std::str::FromStr;

use crate::config::GameConfig;
use crate::ws::protocol::MovementData;

use super::entity::{Ball, Player};
use super::geometry::Vec2;

/// What happens to the ball's velocity when it meets a side line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BouncePolicy {
    /// Mirror the velocity component, keeping its magnitude
    Elastic,
    /// Mirror and subtract a fixed loss, never crossing zero
    Damped { loss: f32 },
}

/// Loss used by `damped` when no explicit value is given
pub const DEFAULT_BOUNCE_LOSS: f32 = 0.5;

impl FromStr for BouncePolicy {
    type Err = String;

    /// Accepts `elastic`, `damped` or `damped:<loss>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.split_once(':') {
            None if s == "elastic" => Ok(BouncePolicy::Elastic),
            None if s == "damped" => Ok(BouncePolicy::Damped {
                loss: DEFAULT_BOUNCE_LOSS,
            }),
            Some(("damped", loss)) => loss
                .parse::<f32>()
                .ok()
                .filter(|l| *l >= 0.0)
                .map(|loss| BouncePolicy::Damped { loss })
                .ok_or_else(|| format!("invalid bounce loss '{loss}'")),
            _ => Err(format!("unknown bounce policy '{s}'")),
        }
    }
}

impl BouncePolicy {
    /// Velocity component after bouncing off a wall. `away` is the sign
    /// pointing back into the field.
    fn rebound(self, component: f32, away: f32) -> f32 {
        let magnitude = match self {
            BouncePolicy::Elastic => component.abs(),
            BouncePolicy::Damped { loss } => (component.abs() - loss).max(0.0),
        };
        magnitude * away
    }
}

/// Physics system for updating players and the ball
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Apply one tick of directional input to a player.
    ///
    /// Friction is applied before acceleration, so a held direction settles
    /// at `accel / (1 - friction)` per tick.
    pub fn update_player(player: &mut Player, input: &MovementData, config: &GameConfig) {
        let mut vel = player.velocity.scale(config.player_friction);

        if input.left {
            vel.x -= config.player_accel;
        }
        if input.up {
            vel.y -= config.player_accel;
        }
        if input.right {
            vel.x += config.player_accel;
        }
        if input.down {
            vel.y += config.player_accel;
        }

        player.velocity = vel;
        player.position = player.position.add(vel);
        Self::clamp_player(player, config);
    }

    /// Hard clamp inside the field, margin included. No bounce.
    pub fn clamp_player(player: &mut Player, config: &GameConfig) {
        player.position = Self::clamp_to_field(player.position, config.player_margin, config);
    }

    pub fn clamp_to_field(pos: Vec2, margin: f32, config: &GameConfig) -> Vec2 {
        Vec2::new(
            pos.x.clamp(margin, config.field_width - margin),
            pos.y.clamp(margin, config.field_height - margin),
        )
    }

    /// Advance the ball one tick: move, slow down, bounce off the side
    /// lines, then snap near-zero velocity components to rest.
    pub fn update_ball(ball: &mut Ball, config: &GameConfig) {
        ball.position = ball.position.add(ball.velocity);
        ball.velocity = ball.velocity.scale(config.ball_friction);

        let r = ball.radius;
        let max_x = config.field_width - r;
        let max_y = config.field_height - r;

        if ball.position.x < r {
            ball.position.x = r;
            ball.velocity.x = config.bounce.rebound(ball.velocity.x, 1.0);
        } else if ball.position.x > max_x {
            ball.position.x = max_x;
            ball.velocity.x = config.bounce.rebound(ball.velocity.x, -1.0);
        }

        if ball.position.y < r {
            ball.position.y = r;
            ball.velocity.y = config.bounce.rebound(ball.velocity.y, 1.0);
        } else if ball.position.y > max_y {
            ball.position.y = max_y;
            ball.velocity.y = config.bounce.rebound(ball.velocity.y, -1.0);
        }

        if ball.velocity.x.abs() < config.ball_stop_speed {
            ball.velocity.x = 0.0;
        }
        if ball.velocity.y.abs() < config.ball_stop_speed {
            ball.velocity.y = 0.0;
        }
    }
}
