//! Player and ball records owned by the simulation

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ws::protocol::MovementData;

use super::geometry::Vec2;

/// Highest charge a player can build up
pub const MAX_CHARGE: f32 = 100.0;

/// Team colour, assigned by join order parity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Red,
    Blue,
}

impl Team {
    /// Even join positions play red, odd ones blue
    pub fn for_join_index(index: usize) -> Self {
        if index % 2 == 0 {
            Team::Red
        } else {
            Team::Blue
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Team::Red => Team::Blue,
            Team::Blue => Team::Red,
        }
    }
}

impl FromStr for Team {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(Team::Red),
            "blue" => Ok(Team::Blue),
            other => Err(format!("unknown team '{other}'")),
        }
    }
}

/// Inputs received from a session since the last tick.
///
/// Written by the input drain, read and cleared by the tick.
#[derive(Debug, Clone, Default)]
pub struct PendingInput {
    /// Latest directional intent (last write wins)
    pub movement: Option<MovementData>,
    /// A charge message arrived this tick
    pub charging: bool,
    /// Release the accumulated charge
    pub shoot: bool,
}

impl PendingInput {
    pub fn take(&mut self) -> PendingInput {
        std::mem::take(self)
    }

    pub fn clear(&mut self) {
        *self = PendingInput::default();
    }
}

/// Player state (authoritative)
#[derive(Debug, Clone)]
pub struct Player {
    pub id: Uuid,
    pub team: Team,
    /// Roster slot held by this player, `None` for overflow spawns
    pub slot: Option<usize>,
    /// Where the player returns to after a goal
    pub home: Vec2,
    pub position: Vec2,
    pub velocity: Vec2,
    /// False during the post-goal countdown
    pub can_move: bool,
    /// False while the scoring-team touch restriction is in force
    pub can_touch_ball: bool,
    /// 0..=MAX_CHARGE
    pub charge: f32,
    pub inbox: PendingInput,
    /// Monotonic join counter, used for deterministic iteration order
    pub join_seq: u64,
}

impl Player {
    pub fn new(id: Uuid, team: Team, slot: Option<usize>, spawn: Vec2, join_seq: u64) -> Self {
        Self {
            id,
            team,
            slot,
            home: spawn,
            position: spawn,
            velocity: Vec2::ZERO,
            can_move: true,
            can_touch_ball: true,
            charge: 0.0,
            inbox: PendingInput::default(),
            join_seq,
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Put the player back on its starting spot, at rest
    pub fn reset_to_home(&mut self) {
        self.position = self.home;
        self.velocity = Vec2::ZERO;
        self.charge = 0.0;
        self.inbox.clear();
    }
}

/// The single match ball
#[derive(Debug, Clone)]
pub struct Ball {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
}

impl Ball {
    pub fn at_rest(position: Vec2, radius: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            radius,
        }
    }

    pub fn place(&mut self, position: Vec2) {
        self.position = position;
        self.velocity = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teams_alternate_by_join_index() {
        assert_eq!(Team::for_join_index(0), Team::Red);
        assert_eq!(Team::for_join_index(1), Team::Blue);
        assert_eq!(Team::for_join_index(2), Team::Red);
        assert_eq!(Team::Red.opponent(), Team::Blue);
    }

    #[test]
    fn team_parses_case_insensitively() {
        assert_eq!("Blue".parse::<Team>(), Ok(Team::Blue));
        assert_eq!(" red ".parse::<Team>(), Ok(Team::Red));
        assert!("green".parse::<Team>().is_err());
    }

    #[test]
    fn taking_the_inbox_clears_it() {
        let mut inbox = PendingInput {
            movement: Some(MovementData {
                right: true,
                ..Default::default()
            }),
            charging: true,
            shoot: false,
        };

        let taken = inbox.take();
        assert!(taken.movement.is_some());
        assert!(taken.charging);
        assert!(inbox.movement.is_none());
        assert!(!inbox.charging);
    }

    #[test]
    fn reset_to_home_stops_the_player() {
        let mut player = Player::new(Uuid::new_v4(), Team::Red, Some(0), Vec2::new(100.0, 350.0), 0);
        player.position = Vec2::new(400.0, 200.0);
        player.velocity = Vec2::new(3.0, -2.0);
        player.charge = 40.0;

        player.reset_to_home();

        assert_eq!(player.position, Vec2::new(100.0, 350.0));
        assert_eq!(player.velocity, Vec2::ZERO);
        assert_eq!(player.charge, 0.0);
    }
}
