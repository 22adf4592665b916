//! Registry of live units, grouped by side.
//!
//! Holds hecs handles only; the world owns the entities. Handles are kept in
//! insertion order so iteration is deterministic.

use bulwark_core::enums::UnitKind;
use hecs::Entity;

/// Which list a handle lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Player,
    Enemy,
    /// The firedoor. Player faction, but not a unit placement.
    Structure,
}

impl Group {
    pub fn of(kind: UnitKind) -> Self {
        match kind {
            UnitKind::Soldier => Group::Player,
            UnitKind::Enemy | UnitKind::Boss => Group::Enemy,
            UnitKind::Firedoor => Group::Structure,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    players: Vec<Entity>,
    enemies: Vec<Entity>,
    structures: Vec<Entity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entity: Entity, kind: UnitKind) {
        let list = self.list_mut(Group::of(kind));
        if !list.contains(&entity) {
            list.push(entity);
        }
    }

    /// Drop a handle. Returns the group it was in, `None` if unknown.
    pub fn remove(&mut self, entity: Entity) -> Option<Group> {
        for group in [Group::Player, Group::Enemy, Group::Structure] {
            let list = self.list_mut(group);
            if let Some(index) = list.iter().position(|e| *e == entity) {
                list.remove(index);
                return Some(group);
            }
        }
        None
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.iter_all().any(|e| e == entity)
    }

    pub fn players(&self) -> &[Entity] {
        &self.players
    }

    pub fn enemies(&self) -> &[Entity] {
        &self.enemies
    }

    pub fn structures(&self) -> &[Entity] {
        &self.structures
    }

    pub fn enemies_cleared(&self) -> bool {
        self.enemies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.players.len() + self.enemies.len() + self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter_all(&self) -> impl Iterator<Item = Entity> + '_ {
        self.players
            .iter()
            .chain(&self.enemies)
            .chain(&self.structures)
            .copied()
    }

    pub fn clear(&mut self) {
        self.players.clear();
        self.enemies.clear();
        self.structures.clear();
    }

    fn list_mut(&mut self, group: Group) -> &mut Vec<Entity> {
        match group {
            Group::Player => &mut self.players,
            Group::Enemy => &mut self.enemies,
            Group::Structure => &mut self.structures,
        }
    }
}
