//! Starting slots handed out to joining players

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use crate::config::GameConfig;

use super::geometry::Vec2;

/// Fixed starting spots, recycled as players leave
pub struct Roster {
    slots: Vec<Vec2>,
    holders: Vec<Option<Uuid>>,
    rng: ChaCha8Rng,
}

impl Roster {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            slots: config.roster_slots.clone(),
            holders: vec![None; config.roster_slots.len()],
            rng: ChaCha8Rng::seed_from_u64(config.seed),
        }
    }

    /// Claim the lowest free slot, or a random spawn once every slot is taken
    pub fn assign(&mut self, id: Uuid, config: &GameConfig) -> (Option<usize>, Vec2) {
        if let Some(index) = self.holders.iter().position(Option::is_none) {
            self.holders[index] = Some(id);
            return (Some(index), self.slots[index]);
        }
        (None, self.random_spawn(config))
    }

    /// Free a slot so the next joiner can reuse it
    pub fn release(&mut self, slot: usize, id: Uuid) {
        if let Some(holder) = self.holders.get_mut(slot) {
            if *holder == Some(id) {
                *holder = None;
            }
        }
    }

    fn random_spawn(&mut self, config: &GameConfig) -> Vec2 {
        let margin = config.player_margin;
        let x = if self.slots.is_empty() {
            self.rng.gen_range(margin..=config.field_width - margin)
        } else {
            self.slots[self.rng.gen_range(0..self.slots.len())].x
        };
        let y = self.rng.gen_range(margin..=config.field_height - margin);
        Vec2::new(x, y)
    }
}
