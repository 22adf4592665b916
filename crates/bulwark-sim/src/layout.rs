//! Lane layout derived from map widths.
//!
//! The lane runs along x, centered on the origin. From the left edge:
//! the base, then the Far, Mid and Near bands, then the firedoor. Enemies
//! enter at the right edge.

use bulwark_core::config::MapConfig;
use bulwark_core::enums::RangeClass;
use bulwark_core::types::SpawnBounds;
use glam::Vec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::services::SpawnPointProvider;

#[derive(Debug, Clone, PartialEq)]
pub struct MapLayout {
    min_x: f32,
    max_x: f32,
    center_y: f32,
    half_height: f32,
    base_width: f32,
    far: SpawnBounds,
    mid: SpawnBounds,
    near: SpawnBounds,
    firedoor_x: f32,
}

impl MapLayout {
    pub fn from_config(map: &MapConfig) -> Self {
        let min_x = -map.width / 2.0;
        let max_x = map.width / 2.0;
        let far_start = min_x + map.base_width;
        let far = SpawnBounds::new(far_start, far_start + map.far_band_width);
        let mid = SpawnBounds::new(far.max, far.max + map.mid_band_width);
        let near = SpawnBounds::new(mid.max, mid.max + map.near_band_width);
        Self {
            min_x,
            max_x,
            center_y: map.center_y,
            half_height: map.height.max(0.0) / 2.0,
            base_width: map.base_width,
            far,
            mid,
            near,
            firedoor_x: near.max + map.firedoor_width / 2.0,
        }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    fn random_y(&self, rng: &mut ChaCha8Rng) -> f32 {
        if self.half_height > 0.0 {
            rng.gen_range(self.center_y - self.half_height..=self.center_y + self.half_height)
        } else {
            self.center_y
        }
    }
}

impl SpawnPointProvider for MapLayout {
    fn base_center(&self) -> Vec2 {
        Vec2::new(self.min_x + self.base_width / 2.0, self.center_y)
    }

    fn base_random_point(&self, rng: &mut ChaCha8Rng) -> Vec2 {
        Vec2::new(self.min_x + self.base_width / 2.0, self.random_y(rng))
    }

    fn enemy_spawn_point(&self, rng: &mut ChaCha8Rng) -> Vec2 {
        Vec2::new(self.max_x, self.random_y(rng))
    }

    fn range_spawn_bounds(&self, class: RangeClass) -> SpawnBounds {
        match class {
            RangeClass::Far => self.far,
            RangeClass::Mid => self.mid,
            RangeClass::Near => self.near,
        }
    }

    fn firedoor_position(&self) -> Vec2 {
        Vec2::new(self.firedoor_x, self.center_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn bands_are_contiguous_from_base() {
        let layout = MapLayout::from_config(&MapConfig::default());
        assert_eq!(layout.width(), 36.0);
        assert_eq!(layout.base_center(), Vec2::new(-16.0, 0.0));
        assert_eq!(layout.range_spawn_bounds(RangeClass::Far), SpawnBounds::new(-14.0, -10.0));
        assert_eq!(layout.range_spawn_bounds(RangeClass::Mid), SpawnBounds::new(-10.0, -6.0));
        assert_eq!(layout.range_spawn_bounds(RangeClass::Near), SpawnBounds::new(-6.0, -2.0));
        assert_eq!(layout.firedoor_position(), Vec2::new(-1.5, 0.0));
    }

    #[test]
    fn random_points_stay_on_lane() {
        let layout = MapLayout::from_config(&MapConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..100 {
            let p = layout.enemy_spawn_point(&mut rng);
            assert_eq!(p.x, 18.0);
            assert!((-3.0..=3.0).contains(&p.y));
            let b = layout.base_random_point(&mut rng);
            assert_eq!(b.x, -16.0);
        }
    }

    #[test]
    fn flat_map_uses_center_line() {
        let map = MapConfig {
            height: 0.0,
            center_y: 2.0,
            ..MapConfig::default()
        };
        let layout = MapLayout::from_config(&map);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(layout.base_random_point(&mut rng).y, 2.0);
    }
}
