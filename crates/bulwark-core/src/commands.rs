//! Player commands sent from a frontend to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

/// All possible player actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Round ---
    /// Count one click toward the round start threshold.
    Click,
    /// Roll back money and units to the last round snapshot.
    Backup,
    /// Stop the running wave before it dispatches its remaining spawns.
    CancelWave,

    // --- Economy ---
    /// Mine a random amount of money.
    Mine,
    /// Buy a player unit. `None` picks a random code.
    SpawnUnit { code: Option<u32> },
    /// Restore the firedoor to full health.
    RepairFiredoor,

    // --- Simulation control ---
    /// Set time scale (1.0 = normal, 2.0 = double, 0.0 = frozen).
    SetTimeScale { scale: f64 },
    /// Pause the simulation.
    Pause,
    /// Resume the simulation.
    Resume,
}
