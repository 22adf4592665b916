//! Combat logic for BULWARK.
//!
//! Target acquisition, damage resolution, the per-entity combat state
//! machine, spawn placement and projectile steering. Everything here works
//! on plain data with no ECS dependency, so the simulation crate decides how
//! entities are stored and this crate decides what they do.

pub mod damage;
pub mod fsm;
pub mod placement;
pub mod projectile;
pub mod targeting;

pub use bulwark_core as core;
