//! Projectile flight: launch heading, bounded homing turn, hit test.

use bulwark_core::components::ProjectileSpec;
use glam::Vec2;

/// Kinematic state of one projectile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flight {
    /// Unit-length direction of travel.
    pub heading: Vec2,
    pub age_secs: f32,
}

/// Signed angle in degrees that rotates `from` onto `to`, in (-180, 180].
pub fn delta_angle_deg(from: Vec2, to: Vec2) -> f32 {
    let a = from.y.atan2(from.x);
    let b = to.y.atan2(to.x);
    let mut delta = (b - a).to_degrees();
    while delta > 180.0 {
        delta -= 360.0;
    }
    while delta <= -180.0 {
        delta += 360.0;
    }
    delta
}

/// Rotate `heading` toward `desired` by at most `turn_rate_deg * dt` degrees.
pub fn steer(heading: Vec2, desired: Vec2, turn_rate_deg: f32, dt: f32) -> Vec2 {
    if desired.length_squared() == 0.0 {
        return heading;
    }
    let delta = delta_angle_deg(heading, desired);
    let max_turn = (turn_rate_deg * dt).max(0.0);
    let turn = delta.clamp(-max_turn, max_turn);
    let angle = heading.y.atan2(heading.x) + turn.to_radians();
    Vec2::from_angle(angle)
}

/// Direction from `origin` to `target`, or `fallback` when they coincide.
pub fn launch_heading(origin: Vec2, target: Vec2, fallback: Vec2) -> Vec2 {
    (target - origin).try_normalize().unwrap_or(fallback)
}

impl Flight {
    pub fn launch(origin: Vec2, target: Vec2, fallback: Vec2) -> Self {
        Self {
            heading: launch_heading(origin, target, fallback),
            age_secs: 0.0,
        }
    }

    /// Advance one step and return the displacement. `target` is the homing
    /// aim point, if the projectile homes and its target still exists.
    pub fn advance(
        &mut self,
        position: Vec2,
        target: Option<Vec2>,
        spec: &ProjectileSpec,
        dt: f32,
    ) -> Vec2 {
        if spec.homing {
            if let Some(aim) = target {
                self.heading = steer(self.heading, aim - position, spec.turn_rate_deg, dt);
            }
        }
        self.age_secs += dt;
        self.heading * spec.speed * dt
    }

    pub fn expired(&self, spec: &ProjectileSpec) -> bool {
        self.age_secs >= spec.lifetime_secs
    }
}

/// Contact test between a projectile and a potential victim.
pub fn is_hit(projectile: Vec2, victim: Vec2, hit_radius: f32) -> bool {
    projectile.distance(victim) <= hit_radius
}
