//! Components that only exist inside the simulation world.

use bulwark_combat::fsm::Combatant;
use bulwark_combat::projectile::Flight;
use bulwark_core::components::ProjectileSpec;
use bulwark_core::enums::Faction;
use hecs::Entity;

/// Combat state of a unit, targeting other entities by handle.
pub type UnitCombat = Combatant<Entity>;

/// A projectile in flight.
#[derive(Debug, Clone, Copy)]
pub struct Projectile {
    pub owner: Entity,
    /// Homing aim. May no longer exist.
    pub target: Entity,
    pub faction: Faction,
    pub damage: i32,
    pub spec: ProjectileSpec,
    pub flight: Flight,
    /// Hit something or expired; removed at cleanup.
    pub spent: bool,
}
