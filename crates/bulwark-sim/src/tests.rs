//! Tests for the simulation engine, wave scheduling, rounds and combat systems.

use std::sync::{Arc, Mutex};

use glam::Vec2;
use hecs::{Entity, World};

use bulwark_combat::fsm::CombatState;
use bulwark_core::commands::PlayerCommand;
use bulwark_core::components::{MoveOrder, ProjectileSpec, RangedAttack, UnitInfo};
use bulwark_core::config::GameConfig;
use bulwark_core::constants::BOSS_TEMPLATE_NAME;
use bulwark_core::enums::*;
use bulwark_core::events::SimEvent;
use bulwark_core::state::GameStateSnapshot;
use bulwark_core::stats::StatBlock;
use bulwark_core::types::{Footprint, Position, Velocity};

use crate::components::UnitCombat;
use crate::engine::{SimConfig, SimulationEngine};
use crate::persistence::JsonFilePersistence;
use crate::roster::UnitDatabase;
use crate::services::{Persistence, Services};
use crate::systems::wave_spawner::WaveScheduler;
use crate::world_setup::entity_id;

fn engine_with(game: GameConfig) -> SimulationEngine {
    SimulationEngine::new(SimConfig {
        game,
        ..Default::default()
    })
}

/// Wave with `enemy_count` enemies and a fixed wait between them.
fn wave_config(enemy_count: u32, wait: f64) -> GameConfig {
    let mut game = GameConfig::default();
    game.wave.enemy_count = enemy_count;
    game.wave.inter_spawn_interval_range = (wait, wait);
    game
}

/// Queue enough clicks to start a round and run one tick.
fn start_round(engine: &mut SimulationEngine) -> GameStateSnapshot {
    let needed = engine.context().config.thresholds.required_clicks_to_start;
    engine.queue_commands((0..needed).map(|_| PlayerCommand::Click));
    engine.tick()
}

fn run_ticks(engine: &mut SimulationEngine, n: usize) -> Vec<SimEvent> {
    let mut events = Vec::new();
    for _ in 0..n {
        events.extend(engine.tick().events);
    }
    events
}

fn count_stops(events: &[SimEvent]) -> usize {
    events
        .iter()
        .filter(|e| {
            matches!(
                e,
                SimEvent::RoundStateChanged {
                    state: RoundState::Completing
                }
            )
        })
        .count()
}

/// A stationary fighter outside the registry, for combat system tests.
fn spawn_fighter(
    world: &mut World,
    kind: UnitKind,
    at: Vec2,
    stats: StatBlock,
    ranged: Option<ProjectileSpec>,
) -> Entity {
    let info = UnitInfo {
        kind,
        code: 0,
        grade: UnitGrade::Common,
    };
    let entity = world.spawn((
        info,
        kind.faction(),
        Position(at),
        Velocity::default(),
        stats,
        Footprint::default(),
        UnitCombat::new(),
        MoveOrder {
            destination: at,
            stopping_distance: 0.1,
            active: false,
        },
    ));
    if let Some(spec) = ranged {
        world.insert_one(entity, RangedAttack(spec)).unwrap();
    }
    entity
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let mut engine_a = SimulationEngine::new(SimConfig {
        seed: 12345,
        ..Default::default()
    });
    let mut engine_b = SimulationEngine::new(SimConfig {
        seed: 12345,
        ..Default::default()
    });

    for engine in [&mut engine_a, &mut engine_b] {
        engine.context_mut().money = 500;
        engine.queue_commands([
            PlayerCommand::SpawnUnit { code: None },
            PlayerCommand::SpawnUnit { code: None },
            PlayerCommand::Mine,
        ]);
        start_round(engine);
    }

    for _ in 0..300 {
        let snap_a = engine_a.tick();
        let snap_b = engine_b.tick();

        let json_a = serde_json::to_string(&snap_a).unwrap();
        let json_b = serde_json::to_string(&snap_b).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut engine_a = SimulationEngine::new(SimConfig {
        seed: 111,
        ..Default::default()
    });
    let mut engine_b = SimulationEngine::new(SimConfig {
        seed: 222,
        ..Default::default()
    });

    start_round(&mut engine_a);
    start_round(&mut engine_b);

    // Enemy entry points are drawn from the seeded RNG.
    let mut diverged = false;
    for _ in 0..120 {
        let json_a = serde_json::to_string(&engine_a.tick().units).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick().units).unwrap();
        if json_a != json_b {
            diverged = true;
            break;
        }
    }
    assert!(diverged, "different seeds should produce different waves");
}

// ---- Engine lifecycle ----

#[test]
fn test_new_engine_has_firedoor() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    assert_eq!(engine.phase(), GamePhase::Running);
    assert_eq!(engine.round_state(), RoundState::Idle);
    assert_eq!(engine.registry().structures().len(), 1);
    assert_eq!(engine.firedoor_health(), Some(500));

    let snap = engine.tick();
    assert_eq!(snap.units.len(), 1);
    assert_eq!(snap.units[0].kind, UnitKind::Firedoor);
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::EntitySpawned { kind: UnitKind::Firedoor, .. })));
}

#[test]
fn test_tick_advances_time() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    for _ in 0..30 {
        engine.tick();
    }
    assert_eq!(engine.time().tick, 30);
    assert!((engine.time().elapsed_secs - 1.0).abs() < 1e-9);
}

#[test]
fn test_pause_stops_time_but_processes_commands() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.tick();
    engine.queue_command(PlayerCommand::Pause);
    engine.tick();
    assert_eq!(engine.phase(), GamePhase::Paused);
    let paused_at = engine.time().tick;

    engine.queue_command(PlayerCommand::Mine);
    let snap = engine.tick();
    assert_eq!(engine.time().tick, paused_at);
    assert!(engine.money() >= 10 && engine.money() < 50);
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::MoneyChanged { .. })));

    engine.queue_command(PlayerCommand::Resume);
    engine.tick();
    assert_eq!(engine.phase(), GamePhase::Running);
    assert_eq!(engine.time().tick, paused_at + 1);
}

#[test]
fn test_time_scale_clamped() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.queue_command(PlayerCommand::SetTimeScale { scale: 10.0 });
    engine.tick();
    assert_eq!(engine.time_scale(), 4.0);

    engine.queue_command(PlayerCommand::SetTimeScale { scale: -1.0 });
    engine.tick();
    assert_eq!(engine.time_scale(), 0.0);
}

#[test]
fn test_invalid_config_falls_back_to_defaults() {
    let mut game = GameConfig::default();
    game.roster.max_unit_code = 0;
    game.roster.max_enemy_code = 0;
    assert!(game.validate().is_err());

    let mut engine = engine_with(game);
    let defaults = GameConfig::default();
    assert_eq!(
        engine.context().config.roster.max_unit_code,
        defaults.roster.max_unit_code
    );
    assert_eq!(
        engine.context().config.roster.max_enemy_code,
        defaults.roster.max_enemy_code
    );

    engine.context_mut().money = 500;
    engine.queue_command(PlayerCommand::SpawnUnit { code: None });
    start_round(&mut engine);
    assert_eq!(engine.registry().players().len(), 1);
    assert!(!engine.registry().enemies_cleared());
}

#[test]
fn test_shutdown_freezes_engine() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    start_round(&mut engine);
    assert!(engine.scheduler().is_active());

    engine.shutdown();
    assert_eq!(engine.phase(), GamePhase::Stopped);
    assert!(!engine.scheduler().is_active());

    let tick = engine.time().tick;
    engine.queue_command(PlayerCommand::Mine);
    let snap = engine.tick();
    assert_eq!(snap.phase, GamePhase::Stopped);
    assert_eq!(engine.time().tick, tick);
    assert_eq!(engine.money(), 0);
}

#[test]
fn test_subscribers_receive_events_in_order() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let id = engine.subscribe(move |event| {
        if let SimEvent::ClickCountChanged { count } = event {
            sink.lock().unwrap().push(*count);
        }
    });

    engine.queue_commands([PlayerCommand::Click, PlayerCommand::Click, PlayerCommand::Click]);
    engine.tick();
    assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);

    assert!(engine.unsubscribe(id));
    engine.queue_command(PlayerCommand::Click);
    engine.tick();
    assert_eq!(seen.lock().unwrap().len(), 3);
}

// ---- Rounds ----

#[test]
fn test_round_start_below_threshold() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.queue_commands((0..5).map(|_| PlayerCommand::Click));
    let snap = engine.tick();

    assert_eq!(engine.round_state(), RoundState::Idle);
    assert_eq!(engine.click_count(), 5);
    assert!(engine.round().snapshot().is_none());
    assert!(!engine.scheduler().is_active());
    assert!(!snap
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::RoundStateChanged { .. })));
}

#[test]
fn test_round_start_transitions_and_wave() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let snap = start_round(&mut engine);

    assert_eq!(engine.round_state(), RoundState::Active);
    assert!(engine.context().is_start_round);
    assert!(engine.round().snapshot().is_some());
    assert!(engine.round().rollback_point().is_some());

    let states: Vec<RoundState> = snap
        .events
        .iter()
        .filter_map(|e| match e {
            SimEvent::RoundStateChanged { state } => Some(*state),
            _ => None,
        })
        .collect();
    assert_eq!(states, vec![RoundState::Starting, RoundState::Active]);
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::WaveStarted { wave_id: 1, enemy_count: 11 })));

    // The boss spawns on the first poll.
    assert_eq!(engine.registry().enemies().len(), 1);
    assert!(snap.units.iter().any(|u| u.kind == UnitKind::Boss));
}

#[test]
fn test_double_start_is_single_flight() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.queue_commands((0..12).map(|_| PlayerCommand::Click));
    let snap = engine.tick();

    assert_eq!(engine.scheduler().waves_started(), 1);
    let wave_starts = snap
        .events
        .iter()
        .filter(|e| matches!(e, SimEvent::WaveStarted { .. }))
        .count();
    assert_eq!(wave_starts, 1);
    assert_eq!(engine.registry().enemies().len(), 1);
}

#[test]
fn test_scheduler_start_twice_same_tick() {
    let shape = GameConfig::default().wave;
    let mut scheduler = WaveScheduler::new();
    assert!(scheduler.start(&shape, 0.0));
    assert!(!scheduler.start(&shape, 0.0));
    assert_eq!(scheduler.waves_started(), 1);
    assert_eq!(scheduler.job().map(|j| j.enemies_remaining), Some(11));
}

#[test]
fn test_end_to_end_single_stop() {
    let mut engine = engine_with(wave_config(3, 0.0));
    start_round(&mut engine);

    // Zero waits: boss and all three enemies arrive in the first tick.
    assert_eq!(engine.registry().enemies().len(), 4);
    assert!(!engine.scheduler().is_active());
    assert!(!engine.scheduler().is_enemy_spawning());

    engine.kill_all_enemies();
    let mut events = run_ticks(&mut engine, 1);
    assert!(engine.registry().enemies_cleared());
    assert_eq!(engine.round_state(), RoundState::Idle);
    assert_eq!(engine.round_count(), 1);
    assert_eq!(engine.click_count(), 0);
    assert!(!engine.context().is_start_round);

    events.extend(run_ticks(&mut engine, 60));
    assert_eq!(count_stops(&events), 1);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, SimEvent::EntityRemoved { .. }))
            .count(),
        4
    );
}

#[test]
fn test_round_does_not_stop_while_enemies_remain() {
    let mut engine = engine_with(wave_config(3, 0.0));
    start_round(&mut engine);

    let boss = engine
        .registry()
        .enemies()
        .iter()
        .copied()
        .find(|&e| {
            engine
                .world()
                .get::<&UnitInfo>(e)
                .is_ok_and(|i| i.kind == UnitKind::Boss)
        })
        .unwrap();
    engine
        .world_mut()
        .get::<&mut StatBlock>(boss)
        .unwrap()
        .set_health(0);

    let events = run_ticks(&mut engine, 1);
    assert_eq!(engine.registry().enemies().len(), 3);
    assert_eq!(engine.round_state(), RoundState::Active);
    assert_eq!(count_stops(&events), 0);
}

#[test]
fn test_enemy_spawning_clears_before_last_enemy() {
    // Boss, wait 1s, enemy, wait 1s, enemy. The flag drops when the second
    // wait begins, so clearing the field then ends the round early.
    let mut engine = engine_with(wave_config(2, 1.0));
    start_round(&mut engine);
    assert!(engine.scheduler().is_enemy_spawning());
    assert_eq!(engine.registry().enemies().len(), 1);

    run_ticks(&mut engine, 35);
    assert_eq!(engine.registry().enemies().len(), 2);
    assert!(!engine.scheduler().is_enemy_spawning());
    assert!(engine.scheduler().is_active());

    engine.kill_all_enemies();
    run_ticks(&mut engine, 1);
    assert_eq!(engine.round_state(), RoundState::Idle);
    assert_eq!(engine.round_count(), 1);
    assert!(engine.scheduler().is_active());

    let events = run_ticks(&mut engine, 40);
    assert!(!engine.scheduler().is_active());
    assert_eq!(engine.registry().enemies().len(), 1);
    assert_eq!(engine.round_state(), RoundState::Idle);
    assert!(events
        .iter()
        .any(|e| matches!(e, SimEvent::WaveFinished { wave_id: 1 })));
}

#[test]
fn test_cancel_wave_keeps_spawned_enemies() {
    let mut engine = engine_with(wave_config(5, 1.0));
    start_round(&mut engine);
    run_ticks(&mut engine, 35);
    assert_eq!(engine.registry().enemies().len(), 2);

    engine.queue_command(PlayerCommand::CancelWave);
    let snap = engine.tick();
    assert!(!engine.scheduler().is_active());
    assert!(!engine.scheduler().is_enemy_spawning());
    assert!(snap.events.iter().any(|e| matches!(
        e,
        SimEvent::WaveCancelled {
            wave_id: 1,
            enemies_skipped: 4
        }
    )));

    run_ticks(&mut engine, 90);
    assert_eq!(engine.registry().enemies().len(), 2);
    assert_eq!(engine.round_state(), RoundState::Active);

    // Clearing the survivors still ends the round.
    engine.kill_all_enemies();
    run_ticks(&mut engine, 1);
    assert_eq!(engine.round_state(), RoundState::Idle);
}

#[test]
fn test_missing_enemy_templates_skip_spawns() {
    let mut db = UnitDatabase::builtin();
    for code in 2001..=2003 {
        db.remove(&format!("Enemy{code}"));
    }
    let game = wave_config(3, 0.0);
    let services = Services::from_config(&game).with_templates(db);
    let mut engine = SimulationEngine::with_services(
        SimConfig {
            game,
            ..Default::default()
        },
        services,
    );

    let snap = start_round(&mut engine);
    let failures = snap
        .events
        .iter()
        .filter(|e| matches!(e, SimEvent::SpawnFailed { .. }))
        .count();
    assert_eq!(failures, 3);
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::WaveFinished { .. })));
    assert_eq!(engine.registry().enemies().len(), 1);
    assert!(!engine.scheduler().is_active());
}

#[test]
fn test_round_ends_when_every_wave_spawn_fails() {
    let game = wave_config(3, 0.0);
    let mut db = UnitDatabase::builtin();
    db.remove(BOSS_TEMPLATE_NAME);
    for code in 2001..=game.roster.max_enemy_code {
        db.remove(&format!("Enemy{code}"));
    }
    let services = Services::from_config(&game).with_templates(db);
    let mut engine = SimulationEngine::with_services(
        SimConfig {
            game,
            ..Default::default()
        },
        services,
    );

    let snap = start_round(&mut engine);
    assert!(engine.registry().enemies_cleared());
    assert!(!engine.scheduler().is_active());
    assert_eq!(engine.round_state(), RoundState::Idle);
    assert_eq!(engine.round_count(), 1);
    assert_eq!(count_stops(&snap.events), 1);

    // Clicking starts the next round instead of bouncing off a stuck one.
    start_round(&mut engine);
    assert_eq!(engine.scheduler().waves_started(), 2);
    assert_eq!(engine.round_count(), 2);
}

#[test]
fn test_cancel_after_field_cleared_ends_round() {
    let mut engine = engine_with(wave_config(5, 1.0));
    start_round(&mut engine);
    engine.kill_all_enemies();
    run_ticks(&mut engine, 1);
    assert!(engine.registry().enemies_cleared());
    assert!(engine.scheduler().is_enemy_spawning());
    assert_eq!(engine.round_state(), RoundState::Active);

    engine.queue_command(PlayerCommand::CancelWave);
    let snap = engine.tick();
    assert_eq!(engine.round_state(), RoundState::Idle);
    assert_eq!(engine.round_count(), 1);
    assert_eq!(count_stops(&snap.events), 1);
    assert!(snap.events.iter().any(|e| matches!(
        e,
        SimEvent::WaveCancelled {
            wave_id: 1,
            enemies_skipped: 5
        }
    )));

    let events = run_ticks(&mut engine, 60);
    assert_eq!(count_stops(&events), 0);
    assert_eq!(engine.round_state(), RoundState::Idle);
}

#[test]
fn test_difficulty_scales_with_round_count() {
    let mut engine = engine_with(wave_config(0, 0.0));
    engine.context_mut().round_count = 2;
    start_round(&mut engine);

    let boss = engine.registry().enemies()[0];
    let stats = *engine.world().get::<&StatBlock>(boss).unwrap();
    assert_eq!(stats.max_health(), 400 + 2 * 50);
    assert_eq!(stats.defense(), 6 + 2 * 2);
    assert_eq!(stats.attack_damage(), 25 + 2 * 3);
}

// ---- Backup ----

#[test]
fn test_backup_without_rollback_is_noop() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.context_mut().money = 77;
    engine.queue_command(PlayerCommand::Backup);
    let snap = engine.tick();

    assert_eq!(engine.money(), 77);
    assert_eq!(engine.round_state(), RoundState::Idle);
    assert!(!snap
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::RoundStateChanged { .. })));
}

#[test]
fn test_backup_twice_equals_once() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.context_mut().money = 150;
    engine.queue_command(PlayerCommand::SpawnUnit { code: Some(1001) });
    engine.tick();
    assert_eq!(engine.money(), 50);

    start_round(&mut engine);
    let rollback = engine.round().rollback_point().unwrap();
    assert_eq!(rollback.money, 50);
    let post = engine.round().snapshot().unwrap().unit_placements[0].position;

    run_ticks(&mut engine, 10);
    engine.queue_command(PlayerCommand::Backup);
    engine.tick();
    let after_first = engine.money();
    assert_eq!(after_first, rollback.money + rollback.bonus);
    assert_eq!(engine.round_state(), RoundState::Idle);
    assert!(!engine.scheduler().is_active());
    assert!(!engine.scheduler().is_enemy_spawning());
    assert_eq!(engine.click_count(), 0);
    assert!(engine.registry().enemies_cleared());
    assert_eq!(engine.registry().players().len(), 1);
    assert_eq!(engine.registry().structures().len(), 1);

    let soldier = engine.registry().players()[0];
    let at = engine.world().get::<&Position>(soldier).unwrap().0;
    assert!(at.distance(post) < 1e-3);

    engine.queue_command(PlayerCommand::Backup);
    engine.tick();
    assert_eq!(engine.money(), after_first);
    assert_eq!(engine.registry().players().len(), 1);
}

#[test]
fn test_backup_mid_wave_announces_cancel() {
    let mut engine = engine_with(wave_config(5, 1.0));
    start_round(&mut engine);
    run_ticks(&mut engine, 5);
    assert!(engine.scheduler().is_active());

    engine.queue_command(PlayerCommand::Backup);
    let snap = engine.tick();
    assert!(!engine.scheduler().is_active());
    assert!(snap.events.iter().any(|e| matches!(
        e,
        SimEvent::WaveCancelled {
            wave_id: 1,
            enemies_skipped: 5
        }
    )));
}

#[test]
fn test_backup_removes_projectiles_and_restores_firedoor() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    start_round(&mut engine);
    let door = engine.firedoor();
    engine
        .world_mut()
        .get::<&mut StatBlock>(door)
        .unwrap()
        .set_health(10);

    engine.queue_command(PlayerCommand::Backup);
    engine.tick();
    assert_eq!(engine.firedoor_health(), Some(500));
    assert_eq!(engine.registry().structures().len(), 1);
    assert_eq!(engine.world().query::<&crate::components::Projectile>().iter().count(), 0);
}

#[test]
fn test_round_snapshot_persisted_to_json_file() {
    let dir = std::env::temp_dir().join(format!("bulwark_engine_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    let game = GameConfig::default();
    let services =
        Services::from_config(&game).with_persistence(JsonFilePersistence::new(&dir, "round"));
    let mut engine = SimulationEngine::with_services(
        SimConfig {
            game,
            ..Default::default()
        },
        services,
    );
    engine.context_mut().money = 240;
    start_round(&mut engine);

    let stored = JsonFilePersistence::new(&dir, "round")
        .load_snapshot()
        .unwrap()
        .unwrap();
    assert_eq!(stored.money, 240);
    assert_eq!(stored.round_count, 0);
    assert!(stored.unit_placements.is_empty());

    let _ = std::fs::remove_dir_all(&dir);
}

// ---- Economy ----

#[test]
fn test_mine_adds_money_in_range() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    for _ in 0..20 {
        let before = engine.money();
        engine.queue_command(PlayerCommand::Mine);
        engine.tick();
        let gained = engine.money() - before;
        assert!((10..50).contains(&gained), "mined {gained}");
    }
}

#[test]
fn test_spawn_unit_requires_money() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.queue_command(PlayerCommand::SpawnUnit { code: None });
    engine.tick();
    assert!(engine.registry().players().is_empty());

    engine.context_mut().money = 100;
    engine.queue_command(PlayerCommand::SpawnUnit { code: Some(1003) });
    let snap = engine.tick();
    assert_eq!(engine.money(), 0);
    assert_eq!(engine.registry().players().len(), 1);
    assert!(snap.events.iter().any(|e| matches!(
        e,
        SimEvent::EntitySpawned {
            kind: UnitKind::Soldier,
            code: 1003,
            ..
        }
    )));
}

#[test]
fn test_spawn_unknown_code_is_not_charged() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.context_mut().money = 100;
    engine.queue_command(PlayerCommand::SpawnUnit { code: Some(1999) });
    let snap = engine.tick();

    assert_eq!(engine.money(), 100);
    assert!(engine.registry().players().is_empty());
    assert!(snap.events.iter().any(
        |e| matches!(e, SimEvent::SpawnFailed { template } if template.as_str() == "Unit1999")
    ));
}

#[test]
fn test_spawned_unit_walks_to_band_post() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.context_mut().money = 100;
    engine.queue_command(PlayerCommand::SpawnUnit { code: Some(1001) });
    engine.tick();

    let soldier = engine.registry().players()[0];
    let order = *engine.world().get::<&MoveOrder>(soldier).unwrap();
    // Near band is [-6, -2] with the default map.
    assert!(order.destination.x >= -6.0 && order.destination.x <= -2.0);

    run_ticks(&mut engine, 300);
    let order = *engine.world().get::<&MoveOrder>(soldier).unwrap();
    let at = engine.world().get::<&Position>(soldier).unwrap().0;
    assert!(!order.active);
    assert!(at.distance(order.destination) <= order.stopping_distance + 1e-4);
}

#[test]
fn test_spawned_units_do_not_share_posts() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.context_mut().money = 300;
    engine.queue_commands((0..3).map(|_| PlayerCommand::SpawnUnit { code: Some(1004) }));
    engine.tick();

    let placements = crate::world_setup::unit_placements(engine.world(), engine.registry());
    assert_eq!(placements.len(), 3);
    for (i, a) in placements.iter().enumerate() {
        for b in &placements[i + 1..] {
            assert!(a.position.distance(b.position) > 1e-3);
        }
    }
}

// ---- Firedoor ----

#[test]
fn test_repair_firedoor() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let door = engine.firedoor();
    engine
        .world_mut()
        .get::<&mut StatBlock>(door)
        .unwrap()
        .set_health(120);

    engine.queue_command(PlayerCommand::RepairFiredoor);
    engine.tick();
    assert_eq!(engine.firedoor_health(), Some(120));

    engine.context_mut().money = 350;
    engine.queue_command(PlayerCommand::RepairFiredoor);
    engine.tick();
    assert_eq!(engine.firedoor_health(), Some(500));
    assert_eq!(engine.money(), 50);

    engine.context_mut().money = 300;
    engine.queue_command(PlayerCommand::RepairFiredoor);
    engine.tick();
    assert_eq!(engine.money(), 300, "intact firedoor is not charged");
}

#[test]
fn test_firedoor_destroyed_and_rebuilt() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let door = engine.firedoor();
    engine
        .world_mut()
        .get::<&mut StatBlock>(door)
        .unwrap()
        .set_health(0);

    let snap = engine.tick();
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::FiredoorDestroyed)));
    assert_eq!(engine.firedoor_health(), None);
    assert!(engine.registry().structures().is_empty());

    engine.context_mut().money = 300;
    engine.queue_command(PlayerCommand::RepairFiredoor);
    engine.tick();
    assert_eq!(engine.firedoor_health(), Some(500));
    assert_eq!(engine.registry().structures().len(), 1);
    assert_eq!(engine.money(), 0);
}

// ---- Combat ----

#[test]
fn test_target_leaving_range_reverts_to_moving() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let world = engine.world_mut();
    let soldier = spawn_fighter(
        world,
        UnitKind::Soldier,
        Vec2::new(0.0, 0.0),
        StatBlock::new(100, 0, 1, 1.0, 2.0, 0.0),
        None,
    );
    let enemy = spawn_fighter(
        world,
        UnitKind::Enemy,
        Vec2::new(1.0, 0.0),
        StatBlock::new(1000, 0, 0, 1.0, 0.0, 0.0),
        None,
    );

    engine.tick();
    let combat = *engine.world().get::<&UnitCombat>(soldier).unwrap();
    assert_eq!(combat.state, CombatState::Attacking { target: enemy });

    engine.world_mut().get::<&mut Position>(enemy).unwrap().0 = Vec2::new(10.0, 0.0);
    run_ticks(&mut engine, 8);
    let combat = *engine.world().get::<&UnitCombat>(soldier).unwrap();
    assert_eq!(combat.state, CombatState::Moving);
    assert!(!combat.has_attacked_target);
}

#[test]
fn test_melee_attack_applies_mitigated_damage() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let world = engine.world_mut();
    let soldier = spawn_fighter(
        world,
        UnitKind::Soldier,
        Vec2::new(0.0, 0.0),
        StatBlock::new(100, 0, 10, 2.0, 2.0, 0.0),
        None,
    );
    let enemy = spawn_fighter(
        world,
        UnitKind::Enemy,
        Vec2::new(1.0, 0.0),
        StatBlock::new(1000, 4, 0, 1.0, 0.0, 0.0),
        None,
    );

    let events = run_ticks(&mut engine, 30);
    let hits: Vec<i32> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::AttackPerformed {
                attacker, damage, ..
            } if *attacker == entity_id(soldier) => Some(*damage),
            _ => None,
        })
        .collect();
    assert!(!hits.is_empty());
    assert!(hits.iter().all(|&d| d == 6));

    let health = engine.world().get::<&StatBlock>(enemy).unwrap().current_health();
    assert_eq!(health, 1000 - 6 * hits.len() as i32);
}

#[test]
fn test_ranged_attack_hits_with_projectile() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let world = engine.world_mut();
    let archer = spawn_fighter(
        world,
        UnitKind::Soldier,
        Vec2::new(0.0, 0.0),
        StatBlock::new(100, 0, 10, 2.0, 5.0, 0.0),
        Some(ProjectileSpec::default()),
    );
    let enemy = spawn_fighter(
        world,
        UnitKind::Enemy,
        Vec2::new(3.0, 0.0),
        StatBlock::new(1000, 0, 0, 1.0, 0.0, 0.0),
        None,
    );

    let mut saw_projectile = false;
    let mut hit = false;
    for _ in 0..60 {
        let snap = engine.tick();
        saw_projectile |= !snap.projectiles.is_empty();
        hit |= snap.events.iter().any(|e| {
            matches!(
                e,
                SimEvent::AttackPerformed { attacker, target, damage: 10 }
                    if *attacker == entity_id(archer) && *target == entity_id(enemy)
            )
        });
    }
    assert!(saw_projectile);
    assert!(hit);
    let health = engine.world().get::<&StatBlock>(enemy).unwrap().current_health();
    assert!(health < 1000);
}

#[test]
fn test_dead_units_are_removed_and_announced() {
    let mut engine = engine_with(wave_config(0, 0.0));
    start_round(&mut engine);
    let boss = engine.registry().enemies()[0];

    engine.kill_all_enemies();
    let snap = engine.tick();
    assert!(!engine.world().contains(boss));
    assert!(snap.events.iter().any(|e| matches!(
        e,
        SimEvent::EntityRemoved { entity, kind: UnitKind::Boss, .. } if *entity == entity_id(boss)
    )));
    assert!(!snap.units.iter().any(|u| u.id == entity_id(boss)));
}
