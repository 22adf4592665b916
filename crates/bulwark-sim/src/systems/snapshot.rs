//! Snapshot system: reads the world and builds a `GameStateSnapshot`.
//!
//! Read-only. Units are listed in registry order (structures, player units,
//! enemies), so two runs with the same seed serialize identically.

use hecs::{Entity, World};

use bulwark_core::components::UnitInfo;
use bulwark_core::enums::GamePhase;
use bulwark_core::events::SimEvent;
use bulwark_core::state::*;
use bulwark_core::stats::StatBlock;
use bulwark_core::types::{Position, SimTime};

use crate::components::{Projectile, UnitCombat};
use crate::registry::EntityRegistry;
use crate::world_setup::entity_id;

pub fn build_snapshot(
    world: &World,
    registry: &EntityRegistry,
    time: &SimTime,
    phase: GamePhase,
    round: RoundView,
    events: Vec<SimEvent>,
) -> GameStateSnapshot {
    let units = registry
        .structures()
        .iter()
        .chain(registry.players())
        .chain(registry.enemies())
        .filter_map(|&entity| build_unit(world, entity))
        .collect();

    GameStateSnapshot {
        time: *time,
        phase,
        round,
        units,
        projectiles: build_projectiles(world),
        events,
    }
}

fn build_unit(world: &World, entity: Entity) -> Option<UnitView> {
    let info = *world.get::<&UnitInfo>(entity).ok()?;
    let position = *world.get::<&Position>(entity).ok()?;
    let (current_health, max_health) = {
        let stats = world.get::<&StatBlock>(entity).ok()?;
        (stats.current_health(), stats.max_health())
    };
    let combat = match world.get::<&UnitCombat>(entity) {
        Ok(combat) => match combat.target() {
            Some(target) => CombatView::Attacking {
                target: entity_id(target),
            },
            None => CombatView::Moving,
        },
        Err(_) => CombatView::default(),
    };
    Some(UnitView {
        id: entity_id(entity),
        kind: info.kind,
        code: info.code,
        grade: info.grade,
        position,
        current_health,
        max_health,
        combat,
    })
}

fn build_projectiles(world: &World) -> Vec<ProjectileView> {
    let mut projectiles: Vec<ProjectileView> = world
        .query::<(&Projectile, &Position)>()
        .iter()
        .filter(|(_, (projectile, _))| !projectile.spent)
        .map(|(entity, (projectile, pos))| ProjectileView {
            id: entity_id(entity),
            position: *pos,
            heading: projectile.flight.heading,
            faction: projectile.faction,
        })
        .collect();

    projectiles.sort_by_key(|p| p.id);
    projectiles
}
