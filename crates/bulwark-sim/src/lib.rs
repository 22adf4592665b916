//! Simulation engine for BULWARK.
//!
//! Owns the hecs ECS world, runs the combat systems, the wave scheduler and
//! the round controller on one fixed-step clock, and produces
//! `GameStateSnapshot`s for the frontend.

pub mod components;
pub mod context;
pub mod engine;
pub mod event_bus;
pub mod layout;
pub mod persistence;
pub mod registry;
pub mod roster;
pub mod round;
pub mod services;
pub mod systems;
pub mod world_setup;

pub use bulwark_core as core;
pub use engine::{SimConfig, SimulationEngine};

#[cfg(test)]
mod tests;
