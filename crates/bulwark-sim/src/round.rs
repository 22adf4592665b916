//! Round lifecycle: start gating, commit on completion, rollback on backup.
//!
//! ```text
//! Idle → Starting → Active → Completing → Idle
//!                          ↘ BackingUp  → Idle
//! ```
//!
//! Every state change is recorded so the engine can announce it.

use log::{debug, info, warn};

use bulwark_core::enums::RoundState;
use bulwark_core::state::{RoundSnapshot, UnitPlacement};

use crate::context::GameContext;
use crate::systems::wave_spawner::{WaveProgress, WaveScheduler};

/// Money to restore on backup: the balance when the point was recorded plus
/// one mining bonus drawn at that moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollbackPoint {
    pub money: u32,
    pub bonus: u32,
}

/// Outcome of a start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStart {
    Started,
    /// Not enough clicks yet.
    BelowThreshold,
    /// A round is already in progress.
    Busy,
}

/// Result of a backup: the snapshot to rebuild from, and the wave it
/// cancelled if one was still dispatching.
#[derive(Debug, Clone, PartialEq)]
pub struct Backup {
    pub snapshot: RoundSnapshot,
    pub cancelled_wave: Option<WaveProgress>,
}

#[derive(Debug, Clone, Default)]
pub struct RoundController {
    state: RoundState,
    snapshot: Option<RoundSnapshot>,
    rollback: Option<RollbackPoint>,
    transitions: Vec<RoundState>,
}

impl RoundController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    /// Last captured or committed snapshot.
    pub fn snapshot(&self) -> Option<&RoundSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn rollback_point(&self) -> Option<RollbackPoint> {
        self.rollback
    }

    /// State changes since the last call, oldest first.
    pub fn take_transitions(&mut self) -> Vec<RoundState> {
        std::mem::take(&mut self.transitions)
    }

    /// Start a round if the click threshold is met and no round is running.
    ///
    /// Captures and persists the snapshot, records the rollback point, starts
    /// the wave and finally calls `on_start`.
    pub fn request_round_start<F>(
        &mut self,
        ctx: &mut GameContext,
        scheduler: &mut WaveScheduler,
        placements: Vec<UnitPlacement>,
        now: f64,
        on_start: F,
    ) -> RoundStart
    where
        F: FnOnce(&mut GameContext),
    {
        if self.state != RoundState::Idle {
            return RoundStart::Busy;
        }
        let required = ctx.config.thresholds.required_clicks_to_start;
        if ctx.click_count < required {
            debug!("round start needs {required} clicks, have {}", ctx.click_count);
            return RoundStart::BelowThreshold;
        }

        self.set_state(RoundState::Starting);
        let snapshot = RoundSnapshot {
            money: ctx.money,
            round_count: ctx.round_count,
            unit_placements: placements,
        };
        self.commit(ctx, snapshot);
        self.record_rollback(ctx);

        self.set_state(RoundState::Active);
        ctx.is_start_round = true;
        if !scheduler.start(&ctx.config.wave, now) {
            warn!("round started while the previous wave is still dispatching");
        }
        on_start(ctx);
        RoundStart::Started
    }

    /// Finish the active round. `save_placements` returns the player units to
    /// commit with the new snapshot. Returns `false` unless the round was active.
    pub fn request_round_stop<F>(&mut self, ctx: &mut GameContext, save_placements: F) -> bool
    where
        F: FnOnce(&mut GameContext) -> Vec<UnitPlacement>,
    {
        if self.state != RoundState::Active {
            return false;
        }
        self.set_state(RoundState::Completing);
        ctx.click_count = 0;
        ctx.is_start_round = false;
        self.record_rollback(ctx);
        ctx.round_count += 1;

        let unit_placements = save_placements(ctx);
        let snapshot = RoundSnapshot {
            money: ctx.money,
            round_count: ctx.round_count,
            unit_placements,
        };
        self.commit(ctx, snapshot);
        info!("round {} complete", ctx.round_count);
        self.set_state(RoundState::Idle);
        true
    }

    /// Roll back to the last rollback point and snapshot.
    ///
    /// Returns the snapshot whose placements the caller should rebuild, or
    /// `None` if no rollback point exists yet. Calling it twice in a row
    /// yields the same money.
    pub fn request_backup(
        &mut self,
        ctx: &mut GameContext,
        scheduler: &mut WaveScheduler,
    ) -> Option<Backup> {
        let Some(rollback) = self.rollback else {
            debug!("backup ignored, no rollback point recorded");
            return None;
        };

        self.set_state(RoundState::BackingUp);
        ctx.money = rollback.money.saturating_add(rollback.bonus);

        let snapshot = match ctx.services.persistence.load_snapshot() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => self.snapshot.clone().unwrap_or_default(),
            Err(err) => {
                warn!("snapshot load failed, using in-memory copy: {err}");
                self.snapshot.clone().unwrap_or_default()
            }
        };
        ctx.round_count = snapshot.round_count;

        scheduler.cancel();
        let cancelled_wave = scheduler.flush_cancellation();
        ctx.is_start_round = false;
        ctx.click_count = 0;

        info!(
            "backup: money {} round {} units {}",
            ctx.money,
            ctx.round_count,
            snapshot.unit_placements.len()
        );
        self.set_state(RoundState::Idle);
        Some(Backup {
            snapshot,
            cancelled_wave,
        })
    }

    /// Stop the round once the last enemy is gone and no more are coming.
    ///
    /// Only acts when `triggered`: an enemy was removed this tick, or the wave
    /// just finished or was cancelled. The second case ends a round whose
    /// spawns all failed or whose field was cleared before the cancel.
    pub fn check_completion<F>(
        &mut self,
        ctx: &mut GameContext,
        scheduler: &WaveScheduler,
        triggered: bool,
        enemies_cleared: bool,
        save_placements: F,
    ) -> bool
    where
        F: FnOnce(&mut GameContext) -> Vec<UnitPlacement>,
    {
        if !triggered
            || !enemies_cleared
            || scheduler.is_enemy_spawning()
            || self.state != RoundState::Active
        {
            return false;
        }
        self.request_round_stop(ctx, save_placements)
    }

    fn commit(&mut self, ctx: &mut GameContext, snapshot: RoundSnapshot) {
        if let Err(err) = ctx.services.persistence.save_snapshot(&snapshot) {
            warn!("failed to persist round snapshot: {err}");
        }
        self.snapshot = Some(snapshot);
    }

    fn record_rollback(&mut self, ctx: &mut GameContext) {
        let bonus = ctx.roll_mining_amount();
        self.rollback = Some(RollbackPoint {
            money: ctx.money,
            bonus,
        });
    }

    fn set_state(&mut self, state: RoundState) {
        if self.state != state {
            info!("round state {:?} -> {:?}", self.state, state);
            self.state = state;
            self.transitions.push(state);
        }
    }
}
