//! Runtime configuration, loaded from JSON.
//!
//! Every section uses `#[serde(default)]`, so a config file only needs the
//! fields it wants to override. `{}` is a valid config.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;
use crate::stats::StatBonus;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub thresholds: Thresholds,
    pub wave: WaveShape,
    pub map: MapConfig,
    pub combat: CombatConfig,
    pub difficulty: Difficulty,
    pub roster: RosterConfig,
    pub firedoor: FiredoorConfig,
}

/// Round gating and economy costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub required_clicks_to_start: u32,
    pub money_needed_to_spawn: u32,
    pub money_needed_to_repair_firedoor: u32,
    /// Half-open `[min, max)` range for a single `Mine`.
    pub mining_money_range: (u32, u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveShape {
    pub enemy_count: u32,
    /// Offset from `(enemy_spawn.x, base_center.y)` where the boss appears.
    pub boss_anchor_offset: Vec2,
    /// Wait between enemy spawns, seconds.
    pub inter_spawn_interval_range: (f64, f64),
}

/// Lane geometry. The base sits at the left end of the lane, enemies enter
/// from the right end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub width: f32,
    pub center_y: f32,
    pub height: f32,
    pub base_width: f32,
    pub far_band_width: f32,
    pub mid_band_width: f32,
    pub near_band_width: f32,
    pub firedoor_width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub target_check_interval_secs: f32,
    pub fallback_attack_cooldown_secs: f32,
    pub stopping_distance: f32,
    pub max_placement_attempts: u32,
}

/// Per-round scaling applied to spawned enemies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Difficulty {
    pub enemy_bonus_per_round: StatBonus,
    pub boss_bonus_per_round: StatBonus,
}

/// Highest unit and enemy codes that random spawns may draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    pub max_unit_code: u32,
    pub max_enemy_code: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiredoorConfig {
    pub max_health: i32,
    pub defense: i32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            required_clicks_to_start: 10,
            money_needed_to_spawn: 100,
            money_needed_to_repair_firedoor: 300,
            mining_money_range: (10, 50),
        }
    }
}

impl Default for WaveShape {
    fn default() -> Self {
        Self {
            enemy_count: WAVE_ENEMY_COUNT,
            boss_anchor_offset: Vec2::ZERO,
            inter_spawn_interval_range: (WAVE_INTERVAL_MIN_SECS, WAVE_INTERVAL_MAX_SECS),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 36.0,
            center_y: 0.0,
            height: 6.0,
            base_width: 4.0,
            far_band_width: 4.0,
            mid_band_width: 4.0,
            near_band_width: 4.0,
            firedoor_width: 1.0,
        }
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            target_check_interval_secs: TARGET_CHECK_INTERVAL_SECS,
            fallback_attack_cooldown_secs: FALLBACK_ATTACK_COOLDOWN_SECS,
            stopping_distance: STOPPING_DISTANCE,
            max_placement_attempts: MAX_PLACEMENT_ATTEMPTS,
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self {
            enemy_bonus_per_round: StatBonus {
                health: 10,
                defense: 1,
                damage: 1,
                move_speed: 0.0,
            },
            boss_bonus_per_round: StatBonus {
                health: 50,
                defense: 2,
                damage: 3,
                move_speed: 0.0,
            },
        }
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            max_unit_code: 1005,
            max_enemy_code: 2003,
        }
    }
}

impl Default for FiredoorConfig {
    fn default() -> Self {
        Self {
            max_health: 500,
            defense: 5,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Reject configs the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (mine_min, mine_max) = self.thresholds.mining_money_range;
        if mine_min > mine_max {
            return Err(ConfigError::Invalid(format!(
                "mining_money_range min {mine_min} exceeds max {mine_max}"
            )));
        }

        let (wait_min, wait_max) = self.wave.inter_spawn_interval_range;
        if !(wait_min.is_finite() && wait_max.is_finite()) || wait_min < 0.0 || wait_max < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "inter_spawn_interval_range ({wait_min}, {wait_max}) must be finite and non-negative"
            )));
        }

        let map = &self.map;
        let lane = map.base_width + map.far_band_width + map.mid_band_width + map.near_band_width;
        if map.width <= 0.0 || lane > map.width {
            return Err(ConfigError::Invalid(format!(
                "map width {} cannot hold base and bands ({lane})",
                map.width
            )));
        }
        if map.height < 0.0 {
            return Err(ConfigError::Invalid("map height must be non-negative".into()));
        }

        if self.combat.target_check_interval_secs <= 0.0 {
            return Err(ConfigError::Invalid(
                "target_check_interval_secs must be positive".into(),
            ));
        }
        if self.combat.fallback_attack_cooldown_secs <= 0.0 {
            return Err(ConfigError::Invalid(
                "fallback_attack_cooldown_secs must be positive".into(),
            ));
        }

        if self.roster.max_unit_code < PLAYER_CODE_MIN {
            return Err(ConfigError::Invalid(format!(
                "max_unit_code must be at least {PLAYER_CODE_MIN}"
            )));
        }
        if self.roster.max_enemy_code < ENEMY_CODE_MIN {
            return Err(ConfigError::Invalid(format!(
                "max_enemy_code must be at least {ENEMY_CODE_MIN}"
            )));
        }

        if self.firedoor.max_health <= 0 {
            return Err(ConfigError::Invalid(
                "firedoor max_health must be positive".into(),
            ));
        }
        Ok(())
    }
}
