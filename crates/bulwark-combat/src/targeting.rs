//! Nearest-target selection.

use bulwark_core::enums::Faction;
use glam::Vec2;

/// Anything a unit can aim at.
pub trait Targetable {
    fn position(&self) -> Vec2;
    fn faction(&self) -> Faction;
    fn is_alive(&self) -> bool;
}

/// A snapshot of one potential target, carrying an opaque handle back to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<H> {
    pub handle: H,
    pub position: Vec2,
    pub faction: Faction,
    pub alive: bool,
}

impl<H> Targetable for Candidate<H> {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn faction(&self) -> Faction {
        self.faction
    }

    fn is_alive(&self) -> bool {
        self.alive
    }
}

/// `true` when `target` lies within `range` of `origin`. The boundary counts.
pub fn in_range(origin: Vec2, target: Vec2, range: f32) -> bool {
    origin.distance(target) <= range
}

/// Nearest live candidate within `range` that satisfies `predicate`.
///
/// Ties go to the candidate seen first. Dead candidates are never returned.
pub fn find_nearest_target<'a, C, I, P>(
    origin: Vec2,
    range: f32,
    candidates: I,
    predicate: P,
) -> Option<&'a C>
where
    C: Targetable + 'a,
    I: IntoIterator<Item = &'a C>,
    P: Fn(&C) -> bool,
{
    let mut best: Option<(&'a C, f32)> = None;
    for candidate in candidates {
        if !candidate.is_alive() || !predicate(candidate) {
            continue;
        }
        let distance = origin.distance(candidate.position());
        if distance > range {
            continue;
        }
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((candidate, distance)),
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Predicate accepting candidates that fight against `faction`.
pub fn hostile_to<C: Targetable>(faction: Faction) -> impl Fn(&C) -> bool {
    let enemy = faction.opponent();
    move |candidate: &C| candidate.faction() == enemy
}
