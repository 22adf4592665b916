//! Random, non-overlapping spawn placement along the lane.

use bulwark_core::constants::FOOTPRINT_MARGIN;
use bulwark_core::types::SpawnBounds;
use glam::Vec2;
use log::warn;
use rand::Rng;

/// Find an x inside `bounds` (at height `fixed_y`) whose footprint is free.
///
/// Each attempt samples a uniform x, shrinks `footprint` by the placement
/// margin and asks `is_occupied(center, size)`. When every attempt collides
/// (or `max_attempts` is zero) the band midpoint is returned.
pub fn find_non_overlapping<R, F>(
    rng: &mut R,
    bounds: SpawnBounds,
    footprint: Vec2,
    fixed_y: f32,
    max_attempts: u32,
    mut is_occupied: F,
) -> Vec2
where
    R: Rng + ?Sized,
    F: FnMut(Vec2, Vec2) -> bool,
{
    let bounds = bounds.normalized();
    let size = footprint * FOOTPRINT_MARGIN;

    for _ in 0..max_attempts {
        let x = if bounds.min < bounds.max {
            rng.gen_range(bounds.min..=bounds.max)
        } else {
            bounds.min
        };
        let center = Vec2::new(x, fixed_y);
        if !is_occupied(center, size) {
            return center;
        }
    }

    warn!(
        "no free position in [{}, {}] after {} attempts, using midpoint",
        bounds.min, bounds.max, max_attempts
    );
    Vec2::new(bounds.midpoint(), fixed_y)
}

/// Axis-aligned overlap between two boxes given by center and size.
/// Touching edges do not overlap.
pub fn footprints_overlap(center_a: Vec2, size_a: Vec2, center_b: Vec2, size_b: Vec2) -> bool {
    let gap = (center_a - center_b).abs();
    let reach = (size_a + size_b) * 0.5;
    gap.x < reach.x && gap.y < reach.y
}
