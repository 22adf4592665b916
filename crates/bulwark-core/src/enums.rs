//! Enumeration types used throughout the simulation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Side an entity fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
}

/// What kind of entity a unit is. Determines faction and registry group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    /// Player-controlled combat unit.
    Soldier,
    /// Regular wave enemy.
    Enemy,
    /// Boss-tier enemy, spawned once per wave.
    Boss,
    /// The gate in front of the player's base. Has health but never attacks.
    Firedoor,
}

/// Attack range bucket that selects a player unit's spawn band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeClass {
    Far,
    Mid,
    #[default]
    Near,
}

/// Rarity grade of a unit template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UnitGrade {
    #[default]
    Common,
    Advanced,
    Epic,
    Unique,
    Legendary,
}

/// Round lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    /// Accepting clicks toward the start threshold.
    #[default]
    Idle,
    /// Threshold met, snapshot being taken.
    Starting,
    /// Wave running, entities alive.
    Active,
    /// Enemies cleared and spawner finished; committing the round.
    Completing,
    /// Operator-triggered rollback to the last snapshot.
    BackingUp,
}

/// Engine run phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Running,
    Paused,
    /// Engine has been shut down; ticks are no-ops.
    Stopped,
}

impl Faction {
    pub fn opponent(self) -> Faction {
        match self {
            Faction::Player => Faction::Enemy,
            Faction::Enemy => Faction::Player,
        }
    }

    /// Unit direction this faction advances in (enemies come from +x).
    pub fn forward(self) -> Vec2 {
        match self {
            Faction::Player => Vec2::X,
            Faction::Enemy => Vec2::NEG_X,
        }
    }
}

impl UnitKind {
    pub fn faction(self) -> Faction {
        match self {
            UnitKind::Soldier | UnitKind::Firedoor => Faction::Player,
            UnitKind::Enemy | UnitKind::Boss => Faction::Enemy,
        }
    }

    pub fn is_enemy(self) -> bool {
        self.faction() == Faction::Enemy
    }
}
