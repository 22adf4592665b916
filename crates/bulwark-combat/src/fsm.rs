//! Per-entity combat state machine.
//!
//! A unit is either walking (`Moving`) or locked onto a target (`Attacking`).
//! Target checks run on a fixed interval of simulated time rather than every
//! tick; the attack cooldown runs every tick while attacking. The machine is
//! generic over the target handle so it never touches the ECS.

use bulwark_core::constants::TIMER_EPSILON;
use glam::Vec2;
use log::debug;

use crate::targeting::in_range;

/// Whether a unit is walking or fighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatState<T> {
    Moving,
    Attacking { target: T },
}

/// Why an attacking unit let go of its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisengageReason {
    /// Despawned or at zero health.
    TargetGone,
    OutOfRange,
}

/// State change produced by a target check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<T> {
    /// Moving → Attacking. The caller clears the unit's velocity.
    Engaged { target: T },
    /// Attacking → Moving.
    Disengaged { target: T, reason: DisengageReason },
}

/// Combat bookkeeping attached to every unit that can fight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Combatant<T> {
    pub state: CombatState<T>,
    /// Seconds until the next target check. Starts at zero so the first
    /// check happens on the unit's first tick.
    pub check_timer: f32,
    /// Seconds accumulated toward the next attack.
    pub cooldown_elapsed: f32,
    /// At least one attack landed on the current target.
    pub has_attacked_target: bool,
}

impl<T> Default for Combatant<T> {
    fn default() -> Self {
        Self {
            state: CombatState::Moving,
            check_timer: 0.0,
            cooldown_elapsed: 0.0,
            has_attacked_target: false,
        }
    }
}

impl<T: Copy> Combatant<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<T> {
        match self.state {
            CombatState::Attacking { target } => Some(target),
            CombatState::Moving => None,
        }
    }

    pub fn is_attacking(&self) -> bool {
        matches!(self.state, CombatState::Attacking { .. })
    }

    /// Count down to the next target check. Returns `true` when a check is due,
    /// and rearms the timer.
    pub fn tick_check_timer(&mut self, dt: f32, interval: f32) -> bool {
        self.check_timer -= dt;
        if self.check_timer <= TIMER_EPSILON {
            self.check_timer = interval;
            true
        } else {
            false
        }
    }

    /// Run one target check.
    ///
    /// `held` is the position of the current target if it is still alive,
    /// `None` if it is gone. `acquire` searches for a new target and is only
    /// called while moving.
    pub fn evaluate_target<F>(
        &mut self,
        origin: Vec2,
        range: f32,
        held: Option<Vec2>,
        acquire: F,
    ) -> Option<Transition<T>>
    where
        F: FnOnce() -> Option<T>,
    {
        match self.state {
            CombatState::Attacking { target } => {
                let reason = match held {
                    None => DisengageReason::TargetGone,
                    Some(pos) if !in_range(origin, pos, range) => DisengageReason::OutOfRange,
                    Some(_) => return None,
                };
                self.disengage();
                Some(Transition::Disengaged { target, reason })
            }
            CombatState::Moving => {
                let target = acquire()?;
                self.state = CombatState::Attacking { target };
                self.cooldown_elapsed = 0.0;
                self.has_attacked_target = false;
                Some(Transition::Engaged { target })
            }
        }
    }

    /// Advance the attack cooldown. Returns the target when an attack is due;
    /// the cooldown restarts from zero.
    pub fn tick_cooldown(&mut self, dt: f32, interval: f32) -> Option<T> {
        let target = self.target()?;
        self.cooldown_elapsed += dt;
        if self.cooldown_elapsed + TIMER_EPSILON >= interval {
            self.cooldown_elapsed = 0.0;
            Some(target)
        } else {
            None
        }
    }

    pub fn cooldown_remaining(&self, interval: f32) -> f32 {
        (interval - self.cooldown_elapsed).max(0.0)
    }

    pub fn record_attack(&mut self) {
        self.has_attacked_target = true;
    }

    /// The target vanished between acquisition and the attack. The attack is
    /// dropped; the next check reverts the unit to `Moving`.
    pub fn abort_attack(&mut self) {
        debug!("attack aborted, target no longer valid");
        self.cooldown_elapsed = 0.0;
    }

    fn disengage(&mut self) {
        self.state = CombatState::Moving;
        self.cooldown_elapsed = 0.0;
        self.has_attacked_target = false;
    }
}

/// Velocity that walks `position` toward `destination` at `speed` without
/// overshooting in one `dt`. `None` once within `stopping_distance`.
pub fn approach_velocity(
    position: Vec2,
    destination: Vec2,
    speed: f32,
    stopping_distance: f32,
    dt: f32,
) -> Option<Vec2> {
    let offset = destination - position;
    let distance = offset.length();
    if distance <= stopping_distance {
        return None;
    }
    let step_speed = if dt > 0.0 {
        speed.min(distance / dt)
    } else {
        speed
    };
    Some(offset / distance * step_speed)
}
