//! Shared game state passed explicitly to the round controller and spawners.

use bulwark_core::config::GameConfig;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::services::Services;

/// Economy counters, configuration, services and the seeded RNG.
pub struct GameContext {
    pub config: GameConfig,
    pub services: Services,
    pub rng: ChaCha8Rng,
    pub money: u32,
    pub click_count: u32,
    /// Completed rounds. Drives difficulty scaling.
    pub round_count: u32,
    pub is_start_round: bool,
}

impl GameContext {
    pub fn new(config: GameConfig, services: Services, seed: u64) -> Self {
        Self {
            config,
            services,
            rng: ChaCha8Rng::seed_from_u64(seed),
            money: 0,
            click_count: 0,
            round_count: 0,
            is_start_round: false,
        }
    }

    /// One draw from the half-open mining range. A degenerate range yields its minimum.
    pub fn roll_mining_amount(&mut self) -> u32 {
        let (min, max) = self.config.thresholds.mining_money_range;
        if min < max {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Deduct `cost` if affordable.
    pub fn try_spend(&mut self, cost: u32) -> bool {
        match self.money.checked_sub(cost) {
            Some(rest) => {
                self.money = rest;
                true
            }
            None => false,
        }
    }
}
