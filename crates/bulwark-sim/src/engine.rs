//! Simulation engine: the core of the game.
//!
//! `SimulationEngine` owns the hecs ECS world, processes player commands,
//! runs all systems, drives the wave scheduler and the round controller, and
//! produces `GameStateSnapshot`s. Completely headless, enabling deterministic
//! testing.

use std::collections::VecDeque;

use hecs::{Entity, World};
use log::{debug, info, warn};

use bulwark_core::commands::PlayerCommand;
use bulwark_core::components::UnitInfo;
use bulwark_core::config::GameConfig;
use bulwark_core::constants::{DT, MAX_TIME_SCALE};
use bulwark_core::enums::{GamePhase, RoundState};
use bulwark_core::events::SimEvent;
use bulwark_core::state::{GameStateSnapshot, RoundSnapshot, RoundView};
use bulwark_core::stats::StatBlock;
use bulwark_core::types::SimTime;

use crate::components::Projectile;
use crate::context::GameContext;
use crate::event_bus::{EventBus, SubscriptionId};
use crate::registry::EntityRegistry;
use crate::round::{RoundController, RoundStart};
use crate::services::Services;
use crate::systems;
use crate::systems::wave_spawner::{WaveProgress, WaveScheduler};
use crate::world_setup::{self, entity_id};

/// Configuration for starting a new simulation.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Initial time scale (1.0 = normal). Paces the game loop only.
    pub time_scale: f64,
    pub game: GameConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            time_scale: 1.0,
            game: GameConfig::default(),
        }
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    phase: GamePhase,
    time_scale: f64,
    ctx: GameContext,
    registry: EntityRegistry,
    scheduler: WaveScheduler,
    round: RoundController,
    events: EventBus,
    firedoor: Entity,
    reported_money: u32,
    command_queue: VecDeque<PlayerCommand>,
    despawn_buffer: Vec<Entity>,
}

impl SimulationEngine {
    /// Create an engine with the built-in roster, a layout from the map
    /// config and in-memory persistence.
    pub fn new(config: SimConfig) -> Self {
        let game = checked_game_config(config.game);
        let services = Services::from_config(&game);
        Self::with_services(SimConfig { game, ..config }, services)
    }

    /// Create an engine with caller-supplied collaborators. A game config
    /// that fails validation is replaced by the defaults.
    pub fn with_services(config: SimConfig, services: Services) -> Self {
        let game = checked_game_config(config.game);
        let mut world = World::new();
        let mut registry = EntityRegistry::new();
        let mut events = EventBus::new();
        let firedoor = world_setup::spawn_firedoor(
            &mut world,
            &mut registry,
            &mut events,
            &game.firedoor,
            services.spawn_points.firedoor_position(),
        );

        Self {
            world,
            time: SimTime::default(),
            phase: GamePhase::default(),
            time_scale: config.time_scale.clamp(0.0, MAX_TIME_SCALE),
            ctx: GameContext::new(game, services, config.seed),
            registry,
            scheduler: WaveScheduler::new(),
            round: RoundController::new(),
            events,
            firedoor,
            reported_money: 0,
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
        }
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one fixed tick and return the resulting snapshot.
    pub fn tick(&mut self) -> GameStateSnapshot {
        self.advance(DT)
    }

    /// Advance the simulation by `dt` seconds as a single step.
    pub fn advance(&mut self, dt: f64) -> GameStateSnapshot {
        if self.phase != GamePhase::Stopped {
            self.process_commands();
            if self.phase == GamePhase::Running && dt > 0.0 {
                self.run_systems(dt);
                self.time.advance_by(dt);
            }
            self.publish_money();
        }
        self.snapshot()
    }

    /// Register an event listener. Listeners run in subscription order.
    pub fn subscribe(
        &mut self,
        subscriber: impl FnMut(&SimEvent) + Send + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Stop the simulation: cancel any wave, drop queued commands and
    /// listeners. Later ticks return snapshots without advancing.
    pub fn shutdown(&mut self) {
        if self.phase == GamePhase::Stopped {
            return;
        }
        self.scheduler.cancel();
        if let Some(progress) = self.scheduler.flush_cancellation() {
            self.announce_wave(progress);
            self.complete_round_if_clear(true);
            self.publish_round_transitions();
        }
        self.command_queue.clear();
        self.events.clear_subscribers();
        self.phase = GamePhase::Stopped;
        info!("simulation stopped at tick {}", self.time.tick);
    }

    /// Get the current game phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Get the current time scale.
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn money(&self) -> u32 {
        self.ctx.money
    }

    pub fn click_count(&self) -> u32 {
        self.ctx.click_count
    }

    pub fn round_count(&self) -> u32 {
        self.ctx.round_count
    }

    pub fn round_state(&self) -> RoundState {
        self.round.state()
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &WaveScheduler {
        &self.scheduler
    }

    pub fn round(&self) -> &RoundController {
        &self.round
    }

    pub fn context(&self) -> &GameContext {
        &self.ctx
    }

    /// Current firedoor health, `None` once destroyed.
    pub fn firedoor_health(&self) -> Option<i32> {
        self.world
            .get::<&StatBlock>(self.firedoor)
            .ok()
            .map(|stats| stats.current_health())
    }

    /// Mutable world access for test setups.
    #[cfg(test)]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[cfg(test)]
    pub fn context_mut(&mut self) -> &mut GameContext {
        &mut self.ctx
    }

    #[cfg(test)]
    pub fn firedoor(&self) -> Entity {
        self.firedoor
    }

    /// Zero the health of every registered enemy; cleanup removes them next tick.
    #[cfg(test)]
    pub fn kill_all_enemies(&mut self) {
        for &enemy in self.registry.enemies() {
            if let Ok(mut stats) = self.world.get::<&mut StatBlock>(enemy) {
                stats.set_health(0);
            }
        }
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
            self.publish_round_transitions();
        }
    }

    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::Click => self.click(),
            PlayerCommand::Backup => self.backup(),
            PlayerCommand::CancelWave => {
                self.scheduler.cancel();
                if let Some(progress) = self.scheduler.flush_cancellation() {
                    self.announce_wave(progress);
                    self.complete_round_if_clear(true);
                }
            }
            PlayerCommand::Mine => {
                let amount = self.ctx.roll_mining_amount();
                self.ctx.money = self.ctx.money.saturating_add(amount);
                debug!("mined {amount}, money now {}", self.ctx.money);
            }
            PlayerCommand::SpawnUnit { code } => self.spawn_unit(code),
            PlayerCommand::RepairFiredoor => self.repair_firedoor(),
            PlayerCommand::SetTimeScale { scale } => {
                self.time_scale = scale.clamp(0.0, MAX_TIME_SCALE);
            }
            PlayerCommand::Pause => {
                if self.phase == GamePhase::Running {
                    self.phase = GamePhase::Paused;
                }
            }
            PlayerCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::Running;
                }
            }
        }
    }

    fn click(&mut self) {
        self.ctx.click_count = self.ctx.click_count.saturating_add(1);
        self.events.emit(SimEvent::ClickCountChanged {
            count: self.ctx.click_count,
        });

        let placements = world_setup::unit_placements(&self.world, &self.registry);
        let outcome = self.round.request_round_start(
            &mut self.ctx,
            &mut self.scheduler,
            placements,
            self.time.elapsed_secs,
            |ctx| info!("round {} started with {} money", ctx.round_count + 1, ctx.money),
        );
        if outcome == RoundStart::Started {
            self.publish_round_transitions();
            if let Some(job) = self.scheduler.job() {
                let event = SimEvent::WaveStarted {
                    wave_id: job.wave_id,
                    enemy_count: job.enemies_remaining,
                };
                self.events.emit(event);
            }
        }
    }

    fn backup(&mut self) {
        let Some(backup) = self.round.request_backup(&mut self.ctx, &mut self.scheduler) else {
            return;
        };
        if let Some(progress) = backup.cancelled_wave {
            self.announce_wave(progress);
        }
        self.restore_world(&backup.snapshot);
    }

    /// Replace every unit and projectile with the snapshot's player units and
    /// a fresh firedoor.
    fn restore_world(&mut self, snapshot: &RoundSnapshot) {
        let units: Vec<(Entity, UnitInfo)> = self
            .registry
            .iter_all()
            .filter_map(|entity| {
                let info = *self.world.get::<&UnitInfo>(entity).ok()?;
                Some((entity, info))
            })
            .collect();
        for (entity, info) in units {
            self.events.emit(SimEvent::EntityRemoved {
                entity: entity_id(entity),
                kind: info.kind,
                code: info.code,
            });
            let _ = self.world.despawn(entity);
        }
        self.registry.clear();

        self.despawn_buffer.clear();
        self.despawn_buffer.extend(
            self.world
                .query::<&Projectile>()
                .iter()
                .map(|(entity, _)| entity),
        );
        for entity in self.despawn_buffer.drain(..) {
            let _ = self.world.despawn(entity);
        }

        for placement in &snapshot.unit_placements {
            let restored = world_setup::restore_player_unit(
                &mut self.world,
                &mut self.registry,
                &mut self.events,
                &self.ctx.config,
                &self.ctx.services,
                placement,
            );
            if let Err(err) = restored {
                warn!("could not restore unit {}: {err}", placement.unit_code);
                self.events.emit(SimEvent::SpawnFailed {
                    template: err.template().to_string(),
                });
            }
        }
        self.rebuild_firedoor();
    }

    fn spawn_unit(&mut self, code: Option<u32>) {
        let cost = self.ctx.config.thresholds.money_needed_to_spawn;
        if self.ctx.money < cost {
            debug!("spawn needs {cost} money, have {}", self.ctx.money);
            return;
        }
        let spawned = world_setup::spawn_player_unit(
            &mut self.world,
            &mut self.registry,
            &mut self.events,
            &self.ctx.config,
            &self.ctx.services,
            &mut self.ctx.rng,
            code,
        );
        match spawned {
            Ok(_) => {
                self.ctx.try_spend(cost);
            }
            Err(err) => {
                warn!("unit spawn skipped: {err}");
                self.events.emit(SimEvent::SpawnFailed {
                    template: err.template().to_string(),
                });
            }
        }
    }

    fn repair_firedoor(&mut self) {
        let cost = self.ctx.config.thresholds.money_needed_to_repair_firedoor;
        let intact = self
            .world
            .get::<&StatBlock>(self.firedoor)
            .ok()
            .map(|stats| stats.is_full_health());
        if intact == Some(true) {
            return;
        }
        if !self.ctx.try_spend(cost) {
            debug!("repair needs {cost} money, have {}", self.ctx.money);
            return;
        }
        let repaired = match self.world.get::<&mut StatBlock>(self.firedoor) {
            Ok(mut stats) if stats.is_alive() => {
                stats.set_full_health();
                true
            }
            _ => false,
        };
        if repaired {
            info!("firedoor repaired");
        } else {
            self.rebuild_firedoor();
            info!("firedoor rebuilt");
        }
    }

    /// Spawn a full-health firedoor, replacing the old one if it still exists.
    fn rebuild_firedoor(&mut self) {
        if self.world.contains(self.firedoor) {
            self.registry.remove(self.firedoor);
            let _ = self.world.despawn(self.firedoor);
        }
        self.firedoor = world_setup::spawn_firedoor(
            &mut self.world,
            &mut self.registry,
            &mut self.events,
            &self.ctx.config.firedoor,
            self.ctx.services.spawn_points.firedoor_position(),
        );
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt: f64) {
        let now = self.time.elapsed_secs + dt;
        let step = dt as f32;
        let check_interval = self.ctx.config.combat.target_check_interval_secs;
        let fallback_cooldown = self.ctx.config.combat.fallback_attack_cooldown_secs;

        // 1. Wave spawning
        let wave = systems::wave_spawner::run(
            &mut self.world,
            &mut self.ctx,
            &mut self.registry,
            &mut self.scheduler,
            &mut self.events,
            now,
        );
        // 2. Target checks
        systems::combat::update_targets(&mut self.world, step, check_interval);
        // 3. Attack cooldowns
        systems::combat::update_attacks(&mut self.world, step, fallback_cooldown, &mut self.events);
        // 4. Projectiles
        systems::projectile::run(&mut self.world, step, &mut self.events);
        // 5. Movement
        systems::movement::steer(&mut self.world, step);
        systems::movement::run(&mut self.world, step);
        // 6. Cleanup
        let removed = systems::cleanup::run(
            &mut self.world,
            &mut self.registry,
            &mut self.despawn_buffer,
            &mut self.events,
        );
        // 7. Round completion
        self.complete_round_if_clear(removed.enemy_removed() || wave.has_ended());
        self.publish_round_transitions();
    }

    /// Stop the active round if no enemies remain and none are coming.
    fn complete_round_if_clear(&mut self, triggered: bool) {
        let world = &self.world;
        let registry = &self.registry;
        self.round.check_completion(
            &mut self.ctx,
            &self.scheduler,
            triggered,
            registry.enemies_cleared(),
            |_| world_setup::unit_placements(world, registry),
        );
    }

    fn announce_wave(&mut self, progress: WaveProgress) {
        systems::wave_spawner::announce(progress, &mut self.events);
    }

    fn publish_round_transitions(&mut self) {
        for state in self.round.take_transitions() {
            self.events.emit(SimEvent::RoundStateChanged { state });
        }
    }

    fn publish_money(&mut self) {
        if self.ctx.money != self.reported_money {
            self.reported_money = self.ctx.money;
            self.events.emit(SimEvent::MoneyChanged {
                money: self.ctx.money,
            });
        }
    }

    fn snapshot(&mut self) -> GameStateSnapshot {
        let round = RoundView {
            state: self.round.state(),
            round_count: self.ctx.round_count,
            click_count: self.ctx.click_count,
            money: self.ctx.money,
            is_start_round: self.ctx.is_start_round,
            is_enemy_spawning: self.scheduler.is_enemy_spawning(),
            enemies_alive: self.registry.enemies().len(),
            players_alive: self.registry.players().len(),
        };
        systems::snapshot::build_snapshot(
            &self.world,
            &self.registry,
            &self.time,
            self.phase,
            round,
            self.events.drain(),
        )
    }
}

fn checked_game_config(game: GameConfig) -> GameConfig {
    match game.validate() {
        Ok(()) => game,
        Err(err) => {
            warn!("invalid game config, using defaults: {err}");
            GameConfig::default()
        }
    }
}
