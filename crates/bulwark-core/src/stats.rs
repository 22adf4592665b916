//! Numeric combat profile of an entity.

use serde::{Deserialize, Serialize};

/// Per-entity stats. Health is kept inside `[0, max_health]` by every setter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    max_health: i32,
    current_health: i32,
    defense: i32,
    attack_damage: i32,
    /// Attacks per second.
    attack_speed: f32,
    attack_range: f32,
    move_speed: f32,
}

/// Additive stat modifiers, applied per completed round by difficulty scaling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatBonus {
    pub health: i32,
    pub defense: i32,
    pub damage: i32,
    pub move_speed: f32,
}

impl StatBlock {
    /// New stat block at full health.
    pub fn new(
        max_health: i32,
        defense: i32,
        attack_damage: i32,
        attack_speed: f32,
        attack_range: f32,
        move_speed: f32,
    ) -> Self {
        let max_health = max_health.max(0);
        Self {
            max_health,
            current_health: max_health,
            defense,
            attack_damage,
            attack_speed: attack_speed.max(0.0),
            attack_range: attack_range.max(0.0),
            move_speed: move_speed.max(0.0),
        }
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn current_health(&self) -> i32 {
        self.current_health
    }

    pub fn defense(&self) -> i32 {
        self.defense
    }

    pub fn attack_damage(&self) -> i32 {
        self.attack_damage
    }

    pub fn attack_speed(&self) -> f32 {
        self.attack_speed
    }

    pub fn attack_range(&self) -> f32 {
        self.attack_range
    }

    pub fn move_speed(&self) -> f32 {
        self.move_speed
    }

    pub fn is_alive(&self) -> bool {
        self.current_health > 0
    }

    pub fn is_full_health(&self) -> bool {
        self.current_health == self.max_health
    }

    /// Seconds between attacks. `fallback` is used when the unit has no attack speed.
    pub fn attack_interval(&self, fallback: f32) -> f32 {
        if self.attack_speed > 0.0 {
            1.0 / self.attack_speed
        } else {
            fallback
        }
    }

    pub fn set_full_health(&mut self) {
        self.current_health = self.max_health;
    }

    pub fn set_health(&mut self, hp: i32) {
        self.current_health = hp.clamp(0, self.max_health);
    }

    /// Changes max health; current health is clamped into the new range.
    pub fn set_max_health(&mut self, max_health: i32) {
        self.max_health = max_health.max(0);
        self.current_health = self.current_health.min(self.max_health);
    }

    pub fn set_defense(&mut self, defense: i32) {
        self.defense = defense;
    }

    pub fn set_attack_damage(&mut self, damage: i32) {
        self.attack_damage = damage;
    }

    pub fn set_attack_speed(&mut self, speed: f32) {
        self.attack_speed = speed.max(0.0);
    }

    pub fn set_move_speed(&mut self, speed: f32) {
        self.move_speed = speed.max(0.0);
    }

    /// Copy with `bonus` applied `times` times, at full health.
    pub fn with_bonus(&self, bonus: &StatBonus, times: u32) -> Self {
        let n = times as i32;
        let mut stats = *self;
        stats.set_max_health(self.max_health + bonus.health * n);
        stats.set_full_health();
        stats.set_defense(self.defense + bonus.defense * n);
        stats.set_attack_damage(self.attack_damage + bonus.damage * n);
        stats.set_move_speed(self.move_speed + bonus.move_speed * times as f32);
        stats
    }
}
