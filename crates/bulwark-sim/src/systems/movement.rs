//! Movement: walk units toward their move orders, then integrate.

use hecs::World;

use bulwark_combat::fsm::approach_velocity;
use bulwark_core::components::MoveOrder;
use bulwark_core::stats::StatBlock;
use bulwark_core::types::{Position, Velocity};
use glam::Vec2;

use crate::components::UnitCombat;

/// Set velocities from move orders. Attacking and dead units hold still;
/// an order is dropped once its destination is reached.
pub fn steer(world: &mut World, dt: f32) {
    for (_entity, (pos, vel, stats, combat, order)) in world.query_mut::<(
        &Position,
        &mut Velocity,
        &StatBlock,
        &UnitCombat,
        &mut MoveOrder,
    )>() {
        if !stats.is_alive() || combat.is_attacking() || !order.active {
            vel.0 = Vec2::ZERO;
            continue;
        }
        match approach_velocity(
            pos.0,
            order.destination,
            stats.move_speed(),
            order.stopping_distance,
            dt,
        ) {
            Some(v) => vel.0 = v,
            None => {
                vel.0 = Vec2::ZERO;
                order.active = false;
            }
        }
    }
}

/// position += velocity * dt for everything that has a velocity.
pub fn run(world: &mut World, dt: f32) {
    for (_entity, (pos, vel)) in world.query_mut::<(&mut Position, &Velocity)>() {
        pos.0 += vel.0 * dt;
    }
}
