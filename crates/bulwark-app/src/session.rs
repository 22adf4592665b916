//! Scripted headless session: mine, buy a garrison, start a round and run it
//! to completion (or a tick cap) as fast as the engine allows.

use log::info;
use serde::Serialize;

use bulwark_core::commands::PlayerCommand;
use bulwark_core::enums::{RoundState, UnitKind};
use bulwark_core::events::SimEvent;
use bulwark_sim::engine::{SimConfig, SimulationEngine};

/// Ticks given to freshly spawned units to reach their posts.
const DEPLOY_TICKS: u64 = 180;
const MAX_MINE_COMMANDS: u32 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Player units to buy before the round.
    pub units: u32,
    /// Hard cap on round ticks.
    pub max_ticks: u64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            units: 4,
            max_ticks: 30 * 300,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSummary {
    pub ticks: u64,
    pub elapsed_secs: f64,
    pub round_state: RoundState,
    pub rounds_completed: u32,
    pub money: u32,
    pub units_spawned: u32,
    pub enemies_spawned: u32,
    pub enemies_removed: u32,
    pub players_lost: u32,
    pub attacks: u32,
    pub firedoor_destroyed: bool,
}

impl SessionSummary {
    fn record(&mut self, event: &SimEvent) {
        match event {
            SimEvent::EntitySpawned { kind, .. } => match kind {
                UnitKind::Soldier => self.units_spawned += 1,
                UnitKind::Enemy | UnitKind::Boss => self.enemies_spawned += 1,
                UnitKind::Firedoor => {}
            },
            SimEvent::EntityRemoved { kind, .. } => match kind {
                UnitKind::Soldier => self.players_lost += 1,
                UnitKind::Enemy | UnitKind::Boss => self.enemies_removed += 1,
                UnitKind::Firedoor => {}
            },
            SimEvent::AttackPerformed { .. } => self.attacks += 1,
            SimEvent::FiredoorDestroyed => self.firedoor_destroyed = true,
            _ => {}
        }
    }
}

/// Run one scripted round on a fresh engine.
pub fn run_scripted(config: SimConfig, options: SessionOptions) -> SessionSummary {
    let mut engine = SimulationEngine::new(config);
    let mut summary = SessionSummary::default();
    let thresholds = engine.context().config.thresholds.clone();

    let budget = thresholds
        .money_needed_to_spawn
        .saturating_mul(options.units);
    let mut mined = 0;
    while engine.money() < budget && mined < MAX_MINE_COMMANDS {
        engine.queue_command(PlayerCommand::Mine);
        step(&mut engine, &mut summary);
        mined += 1;
    }
    info!("mined {mined} times, money {}", engine.money());

    engine.queue_commands((0..options.units).map(|_| PlayerCommand::SpawnUnit { code: None }));
    for _ in 0..DEPLOY_TICKS {
        step(&mut engine, &mut summary);
    }

    engine.queue_commands(
        (0..thresholds.required_clicks_to_start).map(|_| PlayerCommand::Click),
    );
    let start_round = engine.round_count();
    let start_tick = engine.time().tick;
    step(&mut engine, &mut summary);
    while engine.round_count() == start_round
        && engine.round_state() == RoundState::Active
        && engine.time().tick - start_tick < options.max_ticks
    {
        step(&mut engine, &mut summary);
    }

    engine.shutdown();
    summary.ticks = engine.time().tick;
    summary.elapsed_secs = engine.time().elapsed_secs;
    summary.round_state = engine.round_state();
    summary.rounds_completed = engine.round_count();
    summary.money = engine.money();
    summary
}

fn step(engine: &mut SimulationEngine, summary: &mut SessionSummary) {
    for event in engine.tick().events {
        summary.record(&event);
    }
}
