//! Collaborator interfaces the simulation consumes.
//!
//! Template lookup, spawn geometry and snapshot persistence are injected once
//! at construction. The engine never assumes a template name exists or that
//! persistence succeeds.

use bulwark_core::components::EntityTemplate;
use bulwark_core::config::GameConfig;
use bulwark_core::enums::RangeClass;
use bulwark_core::error::PersistenceError;
use bulwark_core::state::RoundSnapshot;
use bulwark_core::types::SpawnBounds;
use glam::Vec2;
use rand_chacha::ChaCha8Rng;

use crate::layout::MapLayout;
use crate::persistence::MemoryPersistence;
use crate::roster::UnitDatabase;

/// Resolves template names (`Unit1001`, `Enemy2002`, `BossEnemy`).
pub trait TemplateLookup: Send {
    fn lookup(&self, name: &str) -> Option<EntityTemplate>;
}

/// Lane geometry: where units appear and where they may stand.
pub trait SpawnPointProvider: Send {
    fn base_center(&self) -> Vec2;
    /// Random point on the base's spawn line.
    fn base_random_point(&self, rng: &mut ChaCha8Rng) -> Vec2;
    /// Random point on the enemy entry line.
    fn enemy_spawn_point(&self, rng: &mut ChaCha8Rng) -> Vec2;
    /// x interval of the band player units of `class` are stationed in.
    fn range_spawn_bounds(&self, class: RangeClass) -> SpawnBounds;
    fn firedoor_position(&self) -> Vec2;
}

/// Storage for the committed round snapshot.
pub trait Persistence: Send {
    fn save_snapshot(&mut self, snapshot: &RoundSnapshot) -> Result<(), PersistenceError>;
    /// `Ok(None)` when nothing has been saved yet.
    fn load_snapshot(&self) -> Result<Option<RoundSnapshot>, PersistenceError>;
}

/// Everything the engine needs from the outside world.
pub struct Services {
    pub templates: Box<dyn TemplateLookup>,
    pub spawn_points: Box<dyn SpawnPointProvider>,
    pub persistence: Box<dyn Persistence>,
}

impl Services {
    /// Built-in roster, a layout from `config.map` and in-memory persistence.
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            templates: Box::new(UnitDatabase::builtin()),
            spawn_points: Box::new(MapLayout::from_config(&config.map)),
            persistence: Box::new(MemoryPersistence::default()),
        }
    }

    pub fn with_persistence(mut self, persistence: impl Persistence + 'static) -> Self {
        self.persistence = Box::new(persistence);
        self
    }

    pub fn with_templates(mut self, templates: impl TemplateLookup + 'static) -> Self {
        self.templates = Box::new(templates);
        self
    }
}
