//! Entity spawn factories.
//!
//! Resolves templates through the injected services and builds component
//! bundles for soldiers, enemies, the boss, the firedoor and projectiles.
//! Every unit spawn is registered and announced with `EntitySpawned`.

use hecs::{Entity, EntityBuilder, World};
use log::debug;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use bulwark_combat::placement::{find_non_overlapping, footprints_overlap};
use bulwark_combat::projectile::Flight;
use bulwark_core::components::*;
use bulwark_core::config::{FiredoorConfig, GameConfig};
use bulwark_core::constants::*;
use bulwark_core::enums::*;
use bulwark_core::events::SimEvent;
use bulwark_core::state::UnitPlacement;
use bulwark_core::stats::StatBlock;
use bulwark_core::types::{Footprint, Position, Velocity};
use glam::Vec2;

use crate::components::{Projectile, UnitCombat};
use crate::event_bus::EventBus;
use crate::registry::EntityRegistry;
use crate::services::Services;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpawnError {
    #[error("template `{0}` not found")]
    MissingTemplate(String),
}

impl SpawnError {
    pub fn template(&self) -> &str {
        match self {
            SpawnError::MissingTemplate(name) => name,
        }
    }
}

/// Stable numeric id used in events and views.
pub fn entity_id(entity: Entity) -> u64 {
    entity.to_bits().get()
}

/// Build a unit from a template. `stats` may differ from the template's
/// (difficulty scaling).
fn spawn_unit(
    world: &mut World,
    template: &EntityTemplate,
    stats: StatBlock,
    at: Vec2,
    order: MoveOrder,
) -> Entity {
    let mut builder = EntityBuilder::new();
    builder
        .add(template.info())
        .add(template.faction())
        .add(Position(at))
        .add(Velocity::default())
        .add(stats)
        .add(Footprint(template.footprint))
        .add(UnitCombat::new())
        .add(order);
    if let Some(spec) = template.projectile {
        builder.add(RangedAttack(spec));
    }
    world.spawn(builder.build())
}

fn announce(
    registry: &mut EntityRegistry,
    events: &mut EventBus,
    entity: Entity,
    info: UnitInfo,
    at: Vec2,
) {
    registry.add(entity, info.kind);
    debug!("spawned {:?} {} at {at}", info.kind, info.code);
    events.emit(SimEvent::EntitySpawned {
        entity: entity_id(entity),
        kind: info.kind,
        code: info.code,
        position: at,
    });
}

fn resolve(services: &Services, name: String) -> Result<EntityTemplate, SpawnError> {
    services
        .templates
        .lookup(&name)
        .ok_or(SpawnError::MissingTemplate(name))
}

/// Place the firedoor at full health.
pub fn spawn_firedoor(
    world: &mut World,
    registry: &mut EntityRegistry,
    events: &mut EventBus,
    config: &FiredoorConfig,
    position: Vec2,
) -> Entity {
    let info = UnitInfo {
        kind: UnitKind::Firedoor,
        code: 0,
        grade: UnitGrade::Common,
    };
    let stats = StatBlock::new(config.max_health, config.defense, 0, 0.0, 0.0, 0.0);
    let entity = world.spawn((
        info,
        Faction::Player,
        Position(position),
        stats,
        Footprint::default(),
    ));
    announce(registry, events, entity, info, position);
    entity
}

/// Footprints of player units at the posts they are walking to.
pub fn occupied_posts(world: &World, registry: &EntityRegistry) -> Vec<(Vec2, Vec2)> {
    registry
        .players()
        .iter()
        .filter_map(|&entity| {
            let order = world.get::<&MoveOrder>(entity).ok()?;
            let footprint = world.get::<&Footprint>(entity).ok()?;
            Some((order.destination, footprint.0))
        })
        .collect()
}

/// Player units in registry order, at their posts.
pub fn unit_placements(world: &World, registry: &EntityRegistry) -> Vec<UnitPlacement> {
    registry
        .players()
        .iter()
        .filter_map(|&entity| {
            let info = world.get::<&UnitInfo>(entity).ok()?;
            let position = match world.get::<&MoveOrder>(entity) {
                Ok(order) => order.destination,
                Err(_) => world.get::<&Position>(entity).ok()?.0,
            };
            Some(UnitPlacement {
                unit_code: info.code,
                position,
            })
        })
        .collect()
}

/// Spawn a player unit at the base and send it to a free post in its band.
/// `code` of `None` draws a random code from the configured roster range.
pub fn spawn_player_unit(
    world: &mut World,
    registry: &mut EntityRegistry,
    events: &mut EventBus,
    config: &GameConfig,
    services: &Services,
    rng: &mut ChaCha8Rng,
    code: Option<u32>,
) -> Result<Entity, SpawnError> {
    let code =
        code.unwrap_or_else(|| rng.gen_range(PLAYER_CODE_MIN..=config.roster.max_unit_code));
    let template = resolve(services, player_template_name(code))?;

    let start = services.spawn_points.base_random_point(rng);
    let bounds = services.spawn_points.range_spawn_bounds(template.range_class);
    let occupied = occupied_posts(world, registry);
    let post = find_non_overlapping(
        rng,
        bounds,
        template.footprint,
        start.y,
        config.combat.max_placement_attempts,
        |center, size| {
            occupied
                .iter()
                .any(|&(other, other_size)| footprints_overlap(center, size, other, other_size))
        },
    );

    let order = MoveOrder::to(post, config.combat.stopping_distance);
    let entity = spawn_unit(world, &template, template.stats, start, order);
    announce(registry, events, entity, template.info(), start);
    Ok(entity)
}

/// Rebuild a player unit standing at its saved post.
pub fn restore_player_unit(
    world: &mut World,
    registry: &mut EntityRegistry,
    events: &mut EventBus,
    config: &GameConfig,
    services: &Services,
    placement: &UnitPlacement,
) -> Result<Entity, SpawnError> {
    let template = resolve(services, player_template_name(placement.unit_code))?;
    let order = MoveOrder {
        destination: placement.position,
        stopping_distance: config.combat.stopping_distance,
        active: false,
    };
    let entity = spawn_unit(world, &template, template.stats, placement.position, order);
    announce(registry, events, entity, template.info(), placement.position);
    Ok(entity)
}

/// Spawn the wave boss at the boss anchor, scaled by completed rounds.
pub fn spawn_boss(
    world: &mut World,
    registry: &mut EntityRegistry,
    events: &mut EventBus,
    config: &GameConfig,
    services: &Services,
    round_count: u32,
    rng: &mut ChaCha8Rng,
) -> Result<Entity, SpawnError> {
    let template = resolve(services, BOSS_TEMPLATE_NAME.to_string())?;
    let base = services.spawn_points.base_center();
    let entry = services.spawn_points.enemy_spawn_point(rng);
    let at = Vec2::new(entry.x, base.y) + config.wave.boss_anchor_offset;

    let stats = template
        .stats
        .with_bonus(&config.difficulty.boss_bonus_per_round, round_count);
    let order = MoveOrder::to(base, config.combat.stopping_distance);
    let entity = spawn_unit(world, &template, stats, at, order);
    announce(registry, events, entity, template.info(), at);
    Ok(entity)
}

/// Spawn one random wave enemy at the entry line, marching on the base.
pub fn spawn_wave_enemy(
    world: &mut World,
    registry: &mut EntityRegistry,
    events: &mut EventBus,
    config: &GameConfig,
    services: &Services,
    round_count: u32,
    rng: &mut ChaCha8Rng,
) -> Result<Entity, SpawnError> {
    let code = rng.gen_range(ENEMY_CODE_MIN..=config.roster.max_enemy_code);
    let template = resolve(services, enemy_template_name(code))?;
    let at = services.spawn_points.enemy_spawn_point(rng);

    let stats = template
        .stats
        .with_bonus(&config.difficulty.enemy_bonus_per_round, round_count);
    let order = MoveOrder::to(
        services.spawn_points.base_center(),
        config.combat.stopping_distance,
    );
    let entity = spawn_unit(world, &template, stats, at, order);
    announce(registry, events, entity, template.info(), at);
    Ok(entity)
}

/// Launch a projectile from `origin` toward `aim`.
#[allow(clippy::too_many_arguments)]
pub fn spawn_projectile(
    world: &mut World,
    owner: Entity,
    target: Entity,
    faction: Faction,
    origin: Vec2,
    aim: Vec2,
    damage: i32,
    spec: ProjectileSpec,
) -> Entity {
    let projectile = Projectile {
        owner,
        target,
        faction,
        damage,
        spec,
        flight: Flight::launch(origin, aim, faction.forward()),
        spent: false,
    };
    world.spawn((projectile, Position(origin)))
}
