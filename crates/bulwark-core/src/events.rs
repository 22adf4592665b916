//! Events emitted by the simulation for presentation layers.
//!
//! The core never depends on anyone observing these.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;

/// Everything a UI or audio layer may want to react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// Click counter changed (after a click or a reset).
    ClickCountChanged { count: u32 },
    /// Money balance changed.
    MoneyChanged { money: u32 },
    /// A unit or structure entered the world.
    EntitySpawned {
        entity: u64,
        kind: UnitKind,
        code: u32,
        position: Vec2,
    },
    /// A unit or structure left the world (death or removal).
    EntityRemoved {
        entity: u64,
        kind: UnitKind,
        code: u32,
    },
    /// Round lifecycle transition.
    RoundStateChanged { state: RoundState },
    /// A wave job began.
    WaveStarted { wave_id: u32, enemy_count: u32 },
    /// The last spawn of a wave was dispatched.
    WaveFinished { wave_id: u32 },
    /// A wave was cancelled before dispatching every spawn.
    WaveCancelled { wave_id: u32, enemies_skipped: u32 },
    /// Damage landed (melee strike or projectile hit).
    AttackPerformed {
        attacker: u64,
        target: u64,
        damage: i32,
    },
    /// The base gate has fallen.
    FiredoorDestroyed,
    /// A spawn step was skipped because its template was missing.
    SpawnFailed { template: String },
}
