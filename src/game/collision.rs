//! Overlap detection and push-apart correction between bodies

use std::collections::HashMap;

use uuid::Uuid;

use crate::config::GameConfig;

use super::entity::{Ball, Player, MAX_CHARGE};
use super::geometry::{distance, normal};

/// Collision system for player/player and player/ball contacts
pub struct CollisionSystem;

impl CollisionSystem {
    /// Push two overlapping players apart, each by half the overlap.
    /// Returns true if a correction was applied.
    pub fn separate_players(a: &mut Player, b: &mut Player, config: &GameConfig) -> bool {
        let min_dist = config.player_collision_distance;
        let dist = distance(a.position, b.position);
        if dist >= min_dist {
            return false;
        }

        // Coincident centres have no push direction; leave them for this tick
        let Some(n) = normal(a.position, b.position) else {
            return false;
        };

        let push = n.scale((min_dist - dist) / 2.0);
        a.position = a.position.sub(push);
        b.position = b.position.add(push);
        true
    }

    /// Resolve a player touching the ball. The player is pushed back by the
    /// full overlap and the ball picks up an impulse along the same normal.
    pub fn resolve_player_ball(player: &mut Player, ball: &mut Ball, config: &GameConfig) -> bool {
        if !player.can_touch_ball {
            return false;
        }

        let min_dist = config.ball_collision_distance;
        let dist = distance(player.position, ball.position);
        if dist >= min_dist {
            return false;
        }

        let Some(n) = normal(player.position, ball.position) else {
            return false;
        };

        let overlap = min_dist - dist;
        player.position = player.position.sub(n.scale(overlap));

        let impulse = overlap * config.kick_strength + player.speed() * config.kick_speed_factor;
        ball.velocity = ball.velocity.add(n.scale(impulse));
        true
    }

    /// All-pairs player separation followed by player/ball contacts.
    ///
    /// O(n²) in the player count. Players are visited in join order so the
    /// result does not depend on map iteration order. Returns the ids of
    /// players that touched the ball this tick.
    pub fn resolve_all(
        players: &mut HashMap<Uuid, Player>,
        ball: &mut Ball,
        config: &GameConfig,
    ) -> Vec<Uuid> {
        let mut ordered: Vec<&mut Player> = players.values_mut().collect();
        ordered.sort_by_key(|p| p.join_seq);

        for i in 0..ordered.len() {
            let (head, tail) = ordered.split_at_mut(i + 1);
            let a = &mut *head[i];
            for b in tail.iter_mut() {
                Self::separate_players(a, b, config);
            }
        }

        let mut touched = Vec::new();
        for player in ordered {
            if Self::resolve_player_ball(player, ball, config) {
                touched.push(player.id);
            }
        }
        touched
    }

    /// Explicit kick: a fixed impulse when the ball is within reach
    pub fn kick(player: &Player, ball: &mut Ball, config: &GameConfig) -> bool {
        if !player.can_touch_ball || distance(player.position, ball.position) >= config.kick_range {
            return false;
        }
        match normal(player.position, ball.position) {
            Some(n) => {
                ball.velocity = ball.velocity.add(n.scale(config.kick_impulse));
                true
            }
            None => false,
        }
    }

    /// Release the player's charge as a shot. The charge is spent even if
    /// the ball is out of reach.
    pub fn shoot(player: &mut Player, ball: &mut Ball, config: &GameConfig) -> bool {
        let charge = player.charge.clamp(0.0, MAX_CHARGE);
        player.charge = 0.0;

        if !player.can_touch_ball || distance(player.position, ball.position) >= config.kick_range {
            return false;
        }
        let Some(n) = normal(player.position, ball.position) else {
            return false;
        };

        let power = config.shot_power_min
            + (charge / MAX_CHARGE) * (config.shot_power_max - config.shot_power_min);
        ball.velocity = ball.velocity.add(n.scale(power));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::Team;
    use crate::game::geometry::Vec2;

    fn player_at(x: f32, y: f32, join_seq: u64) -> Player {
        Player::new(Uuid::new_v4(), Team::for_join_index(join_seq as usize), None, Vec2::new(x, y), join_seq)
    }

    #[test]
    fn overlapping_players_split_the_overlap() {
        let config = GameConfig::default();
        let mut a = player_at(100.0, 100.0, 0);
        let mut b = player_at(110.0, 100.0, 1);

        assert!(CollisionSystem::separate_players(&mut a, &mut b, &config));

        assert_eq!(a.position, Vec2::new(85.0, 100.0));
        assert_eq!(b.position, Vec2::new(125.0, 100.0));
        assert_eq!(distance(a.position, b.position), 40.0);
    }

    #[test]
    fn player_separation_is_symmetric() {
        let config = GameConfig::default();
        let (pa, pb) = (Vec2::new(300.0, 200.0), Vec2::new(312.0, 209.0));

        let mut a1 = player_at(pa.x, pa.y, 0);
        let mut b1 = player_at(pb.x, pb.y, 1);
        CollisionSystem::separate_players(&mut a1, &mut b1, &config);

        let mut a2 = player_at(pa.x, pa.y, 0);
        let mut b2 = player_at(pb.x, pb.y, 1);
        CollisionSystem::separate_players(&mut b2, &mut a2, &config);

        assert!(distance(a1.position, a2.position) < 1e-4);
        assert!(distance(b1.position, b2.position) < 1e-4);
        assert!((distance(a1.position, b1.position) - 40.0).abs() < 1e-3);
    }

    #[test]
    fn separated_players_are_left_alone() {
        let config = GameConfig::default();
        let mut a = player_at(100.0, 100.0, 0);
        let mut b = player_at(150.0, 100.0, 1);

        assert!(!CollisionSystem::separate_players(&mut a, &mut b, &config));
        assert!(!CollisionSystem::separate_players(&mut a, &mut b, &config));
        assert_eq!(a.position, Vec2::new(100.0, 100.0));
        assert_eq!(b.position, Vec2::new(150.0, 100.0));

        // Exactly at the threshold after a correction
        let mut a = player_at(100.0, 100.0, 0);
        let mut b = player_at(110.0, 100.0, 1);
        CollisionSystem::separate_players(&mut a, &mut b, &config);
        let (before_a, before_b) = (a.position, b.position);
        assert!(!CollisionSystem::separate_players(&mut a, &mut b, &config));
        assert_eq!((a.position, b.position), (before_a, before_b));
    }

    #[test]
    fn coincident_players_are_skipped() {
        let config = GameConfig::default();
        let mut a = player_at(200.0, 200.0, 0);
        let mut b = player_at(200.0, 200.0, 1);

        assert!(!CollisionSystem::separate_players(&mut a, &mut b, &config));
        assert_eq!(a.position, b.position);
    }

    #[test]
    fn player_on_top_of_ball_is_skipped() {
        let config = GameConfig::default();
        let mut ball = Ball::at_rest(Vec2::new(500.0, 350.0), 15.0);
        let mut player = player_at(500.0, 350.0, 0);
        player.charge = 60.0;

        assert!(!CollisionSystem::resolve_player_ball(&mut player, &mut ball, &config));
        assert!(!CollisionSystem::kick(&player, &mut ball, &config));
        assert!(!CollisionSystem::shoot(&mut player, &mut ball, &config));

        assert_eq!(player.position, Vec2::new(500.0, 350.0));
        assert_eq!(ball.position, Vec2::new(500.0, 350.0));
        assert_eq!(ball.velocity, Vec2::ZERO);
    }

    #[test]
    fn player_pushes_ball_away() {
        let config = GameConfig::default();
        let mut ball = Ball::at_rest(Vec2::new(500.0, 350.0), 15.0);
        let mut player = player_at(470.0, 350.0, 0);
        player.velocity = Vec2::new(2.0, 0.0);

        assert!(CollisionSystem::resolve_player_ball(&mut player, &mut ball, &config));

        // overlap 5: player backs off 5, ball gets 5 * 0.5 along +x
        assert_eq!(player.position, Vec2::new(465.0, 350.0));
        assert_eq!(ball.position, Vec2::new(500.0, 350.0));
        assert_eq!(ball.velocity, Vec2::new(2.5, 0.0));
    }

    #[test]
    fn speed_factor_adds_to_ball_impulse() {
        let config = GameConfig {
            kick_strength: 0.0,
            kick_speed_factor: 1.0,
            ..GameConfig::default()
        };
        let mut ball = Ball::at_rest(Vec2::new(500.0, 350.0), 15.0);
        let mut player = player_at(500.0, 320.0, 0);
        player.velocity = Vec2::new(0.0, 3.0);

        CollisionSystem::resolve_player_ball(&mut player, &mut ball, &config);
        assert!((ball.velocity.y - 3.0).abs() < 1e-5);
        assert_eq!(ball.velocity.x, 0.0);
    }

    #[test]
    fn restricted_player_passes_through_ball() {
        let config = GameConfig::default();
        let mut ball = Ball::at_rest(Vec2::new(500.0, 350.0), 15.0);
        let mut player = player_at(480.0, 350.0, 0);
        player.can_touch_ball = false;

        assert!(!CollisionSystem::resolve_player_ball(&mut player, &mut ball, &config));
        assert!(!CollisionSystem::kick(&player, &mut ball, &config));
        assert_eq!(ball.velocity, Vec2::ZERO);
        assert_eq!(player.position, Vec2::new(480.0, 350.0));
    }

    #[test]
    fn resolve_all_reports_ball_contacts() {
        let config = GameConfig::default();
        let mut players = HashMap::new();
        let near = player_at(480.0, 350.0, 0);
        let far = player_at(800.0, 350.0, 1);
        let near_id = near.id;
        players.insert(near.id, near);
        players.insert(far.id, far);
        let mut ball = Ball::at_rest(Vec2::new(500.0, 350.0), 15.0);

        let touched = CollisionSystem::resolve_all(&mut players, &mut ball, &config);

        assert_eq!(touched, vec![near_id]);
        assert!(ball.velocity.x > 0.0);
    }

    #[test]
    fn three_overlapping_players_are_all_corrected() {
        let config = GameConfig::default();
        let mut players = HashMap::new();
        for (i, x) in [300.0, 320.0, 340.0].into_iter().enumerate() {
            let p = player_at(x, 200.0, i as u64);
            players.insert(p.id, p);
        }
        let mut ball = Ball::at_rest(Vec2::new(900.0, 600.0), 15.0);

        CollisionSystem::resolve_all(&mut players, &mut ball, &config);

        let mut xs: Vec<f32> = players.values().map(|p| p.position.x).collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!(xs[0] < 300.0);
        assert!(xs[2] > 340.0);
    }

    #[test]
    fn kick_needs_the_ball_in_range() {
        let config = GameConfig::default();
        let mut ball = Ball::at_rest(Vec2::new(500.0, 350.0), 15.0);

        let far = player_at(400.0, 350.0, 0);
        assert!(!CollisionSystem::kick(&far, &mut ball, &config));

        let near = player_at(470.0, 350.0, 0);
        assert!(CollisionSystem::kick(&near, &mut ball, &config));
        assert_eq!(ball.velocity, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn shot_power_scales_with_charge() {
        let config = GameConfig::default();
        let mut ball = Ball::at_rest(Vec2::new(500.0, 350.0), 15.0);
        let mut player = player_at(500.0, 380.0, 0);
        player.charge = 50.0;

        assert!(CollisionSystem::shoot(&mut player, &mut ball, &config));

        // 4 + 0.5 * (20 - 4) straight up
        assert!((ball.velocity.y + 12.0).abs() < 1e-4);
        assert_eq!(player.charge, 0.0);
    }

    #[test]
    fn missed_shot_still_spends_charge() {
        let config = GameConfig::default();
        let mut ball = Ball::at_rest(Vec2::new(500.0, 350.0), 15.0);
        let mut player = player_at(100.0, 350.0, 0);
        player.charge = 80.0;

        assert!(!CollisionSystem::shoot(&mut player, &mut ball, &config));
        assert_eq!(player.charge, 0.0);
        assert_eq!(ball.velocity, Vec2::ZERO);
    }
}
