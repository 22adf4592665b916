//! Game state snapshot: the complete visible state handed to the frontend each tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::SimEvent;
use crate::types::{Position, SimTime};

/// Complete game state produced after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub round: RoundView,
    pub units: Vec<UnitView>,
    pub projectiles: Vec<ProjectileView>,
    /// Events raised during this tick, in emission order.
    pub events: Vec<SimEvent>,
}

/// Round and economy status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundView {
    pub state: RoundState,
    pub round_count: u32,
    pub click_count: u32,
    pub money: u32,
    pub is_start_round: bool,
    pub is_enemy_spawning: bool,
    pub enemies_alive: usize,
    pub players_alive: usize,
}

/// One live unit or structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitView {
    /// Entity handle bits; stable for the entity's lifetime.
    pub id: u64,
    pub kind: UnitKind,
    pub code: u32,
    pub grade: UnitGrade,
    pub position: Position,
    pub current_health: i32,
    pub max_health: i32,
    pub combat: CombatView,
}

/// Combat state of a unit as seen from outside.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state")]
pub enum CombatView {
    #[default]
    Moving,
    Attacking {
        target: u64,
    },
}

/// A projectile in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: u64,
    pub position: Position,
    pub heading: Vec2,
    pub faction: Faction,
}

/// One player unit to rebuild on backup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitPlacement {
    pub unit_code: u32,
    pub position: Vec2,
}

/// Rollback data captured at round start and committed at round end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub money: u32,
    pub round_count: u32,
    /// Player units in spawn order.
    pub unit_placements: Vec<UnitPlacement>,
}
