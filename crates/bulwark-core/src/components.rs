//! ECS components and template data for hecs entities.
//!
//! Components are plain data structs. Game logic lives in systems and in
//! the pure functions of `bulwark-combat`, not here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::*;
use crate::stats::StatBlock;

/// Identity of a unit: what it is and which template code it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitInfo {
    pub kind: UnitKind,
    /// Template code (1001.. for soldiers, 2001.. for enemies, 0 for structures).
    pub code: u32,
    pub grade: UnitGrade,
}

/// Destination a unit walks toward while not attacking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveOrder {
    pub destination: Vec2,
    /// Distance at which the unit counts as arrived.
    pub stopping_distance: f32,
    /// Cleared once the destination is reached.
    pub active: bool,
}

/// Flight parameters for a ranged unit's projectiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileSpec {
    /// Travel speed (units/s).
    pub speed: f32,
    /// Seconds before the projectile self-destructs.
    pub lifetime_secs: f32,
    /// Maximum steering rate when homing (degrees/s).
    pub turn_rate_deg: f32,
    pub homing: bool,
    /// Contact distance for a hit.
    pub hit_radius: f32,
}

/// Marks a unit whose attacks launch projectiles instead of striking directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangedAttack(pub ProjectileSpec);

/// Everything needed to spawn a unit, resolved from a template name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTemplate {
    pub name: String,
    pub code: u32,
    pub kind: UnitKind,
    pub grade: UnitGrade,
    pub stats: StatBlock,
    pub range_class: RangeClass,
    /// Bounding box size used for overlap checks.
    pub footprint: Vec2,
    /// `Some` for ranged units.
    pub projectile: Option<ProjectileSpec>,
}

impl Default for ProjectileSpec {
    fn default() -> Self {
        Self {
            speed: PROJECTILE_SPEED,
            lifetime_secs: PROJECTILE_LIFETIME_SECS,
            turn_rate_deg: PROJECTILE_TURN_RATE_DEG,
            homing: true,
            hit_radius: PROJECTILE_HIT_RADIUS,
        }
    }
}

impl MoveOrder {
    pub fn to(destination: Vec2, stopping_distance: f32) -> Self {
        Self {
            destination,
            stopping_distance,
            active: true,
        }
    }
}

impl EntityTemplate {
    pub fn faction(&self) -> Faction {
        self.kind.faction()
    }

    pub fn info(&self) -> UnitInfo {
        UnitInfo {
            kind: self.kind,
            code: self.code,
            grade: self.grade,
        }
    }
}
