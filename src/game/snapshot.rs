//! Snapshot building for network transmission

use std::collections::HashMap;

use uuid::Uuid;

use crate::ws::protocol::{BallView, GameSnapshot, PlayerView};

use super::entity::{Ball, Player};
use super::round::Score;

/// Builds full-state snapshots for `init` and `state`
pub struct SnapshotBuilder;

impl SnapshotBuilder {
    /// Build a full snapshot (never a delta)
    pub fn build(
        tick: u64,
        players: &HashMap<Uuid, Player>,
        ball: &Ball,
        score: Score,
    ) -> GameSnapshot {
        let players = players
            .values()
            .map(|p| {
                (
                    p.id,
                    PlayerView {
                        x: p.position.x,
                        y: p.position.y,
                        vx: p.velocity.x,
                        vy: p.velocity.y,
                        color: p.team,
                        can_move: p.can_move,
                        can_kick: p.can_touch_ball,
                        charge: p.charge,
                    },
                )
            })
            .collect();

        GameSnapshot {
            tick,
            players,
            ball: BallView {
                x: ball.position.x,
                y: ball.position.y,
                vx: ball.velocity.x,
                vy: ball.velocity.y,
                radius: ball.radius,
            },
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::Team;
    use crate::game::geometry::Vec2;

    #[test]
    fn snapshot_mirrors_world_state() {
        let player = Player::new(Uuid::new_v4(), Team::Blue, Some(1), Vec2::new(900.0, 350.0), 1);
        let id = player.id;
        let players = HashMap::from([(id, player)]);
        let mut ball = Ball::at_rest(Vec2::new(500.0, 350.0), 15.0);
        ball.velocity = Vec2::new(1.5, -0.5);

        let snapshot = SnapshotBuilder::build(42, &players, &ball, Score { red: 1, blue: 0 });

        assert_eq!(snapshot.tick, 42);
        let view = &snapshot.players[&id];
        assert_eq!((view.x, view.y), (900.0, 350.0));
        assert_eq!(view.color, Team::Blue);
        assert!(view.can_move);
        assert_eq!(snapshot.ball.vx, 1.5);
        assert_eq!(snapshot.ball.radius, 15.0);
        assert_eq!(snapshot.score.red, 1);
    }
}
