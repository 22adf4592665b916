//! Fundamental geometric and simulation types.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 2D position in world units. x grows toward the enemy side, y is the lane axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub Vec2);

/// 2D velocity in world units per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub Vec2);

/// Axis-aligned bounding box size (width, height) used for spawn placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint(pub Vec2);

/// Closed interval on the x axis inside which a unit may be placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnBounds {
    pub min: f32,
    pub max: f32,
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }
}

impl Velocity {
    pub fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }
}

impl Default for Footprint {
    fn default() -> Self {
        Self(Vec2::ONE)
    }
}

impl SpawnBounds {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Same interval with `min <= max`.
    pub fn normalized(self) -> Self {
        if self.min <= self.max {
            self
        } else {
            Self {
                min: self.max,
                max: self.min,
            }
        }
    }

    pub fn midpoint(&self) -> f32 {
        (self.min + self.max) / 2.0
    }

    pub fn width(&self) -> f32 {
        (self.max - self.min).abs()
    }

    pub fn contains(&self, x: f32) -> bool {
        let b = self.normalized();
        x >= b.min && x <= b.max
    }
}

impl SimTime {
    /// Advance by one tick of `dt` seconds.
    pub fn advance_by(&mut self, dt: f64) {
        self.tick += 1;
        self.elapsed_secs += dt;
    }

    /// Advance by one tick at the default tick rate.
    pub fn advance(&mut self) {
        self.advance_by(crate::constants::DT);
    }
}
