//! Damage resolution against a stat block.

use bulwark_core::stats::StatBlock;

/// Result of one hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Health actually removed after mitigation and clamping.
    pub applied: i32,
    /// The hit took the target from alive to zero health.
    pub killed: bool,
}

/// Damage left after defense: `max(0, round(raw) - defense)`.
pub fn mitigated_damage(raw: f32, defense: i32) -> i32 {
    (raw.round() as i32).saturating_sub(defense).max(0)
}

/// Apply one hit of `raw` damage. Health is clamped at zero by the stat block.
pub fn apply_damage(target: &mut StatBlock, raw: f32) -> DamageOutcome {
    let was_alive = target.is_alive();
    let before = target.current_health();
    let damage = mitigated_damage(raw, target.defense());
    target.set_health(before.saturating_sub(damage));
    DamageOutcome {
        applied: before - target.current_health(),
        killed: was_alive && !target.is_alive(),
    }
}
