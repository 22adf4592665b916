//! Wave scheduling: one boss, then a run of enemies at random intervals.
//!
//! A wave is a `SpawnJob` stepped against the simulation clock. Waits are
//! deadlines, so a long tick can dispatch several steps at once. Only one job
//! runs at a time.

use hecs::World;
use log::{debug, info, warn};
use rand::Rng;

use bulwark_core::config::WaveShape;
use bulwark_core::constants::TIMER_EPSILON;
use bulwark_core::events::SimEvent;

use crate::context::GameContext;
use crate::event_bus::EventBus;
use crate::registry::EntityRegistry;
use crate::world_setup;

/// Cooperative stop flag checked at each step boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct CancellationToken {
    cancelled: bool,
}

impl CancellationToken {
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn reset(&mut self) {
        self.cancelled = false;
    }
}

/// One dispatched spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnStep {
    Boss,
    Enemy,
}

/// State of the running wave.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnJob {
    pub wave_id: u32,
    pub boss_spawned: bool,
    pub enemies_remaining: u32,
    pub interval_range: (f64, f64),
    /// Simulation time (seconds) of the next enemy spawn.
    pub next_fire_at: f64,
}

/// What a poll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveProgress {
    /// No job.
    Idle,
    /// Job still has spawns left.
    Running,
    /// Last spawn dispatched; job dropped.
    Finished { wave_id: u32 },
    /// Token observed; job dropped.
    Cancelled { wave_id: u32, enemies_skipped: u32 },
}

impl WaveProgress {
    /// The job stopped dispatching on this poll.
    pub fn has_ended(self) -> bool {
        matches!(self, Self::Finished { .. } | Self::Cancelled { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct WaveScheduler {
    job: Option<SpawnJob>,
    token: CancellationToken,
    is_enemy_spawning: bool,
    next_wave_id: u32,
}

impl WaveScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a wave at time `now`. Returns `false` if a wave is already running.
    pub fn start(&mut self, shape: &WaveShape, now: f64) -> bool {
        if self.job.is_some() {
            debug!("wave start ignored, wave {} still running", self.next_wave_id);
            return false;
        }
        self.next_wave_id += 1;
        self.job = Some(SpawnJob {
            wave_id: self.next_wave_id,
            boss_spawned: false,
            enemies_remaining: shape.enemy_count,
            interval_range: shape.inter_spawn_interval_range,
            next_fire_at: now,
        });
        self.token.reset();
        self.is_enemy_spawning = true;
        info!(
            "wave {} started: boss + {} enemies",
            self.next_wave_id, shape.enemy_count
        );
        true
    }

    /// Request a stop at the next step boundary. No-op without a running job.
    pub fn cancel(&mut self) {
        if self.job.is_some() {
            self.token.cancel();
        }
    }

    /// Apply a pending cancellation now instead of at the next poll.
    pub fn flush_cancellation(&mut self) -> Option<WaveProgress> {
        if !self.token.is_cancelled() {
            return None;
        }
        self.token.reset();
        self.is_enemy_spawning = false;
        let job = self.job.take()?;
        info!(
            "wave {} cancelled with {} enemies unspawned",
            job.wave_id, job.enemies_remaining
        );
        Some(WaveProgress::Cancelled {
            wave_id: job.wave_id,
            enemies_skipped: job.enemies_remaining,
        })
    }

    pub fn is_active(&self) -> bool {
        self.job.is_some()
    }

    /// True from wave start until the final wait begins.
    pub fn is_enemy_spawning(&self) -> bool {
        self.is_enemy_spawning
    }

    pub fn job(&self) -> Option<&SpawnJob> {
        self.job.as_ref()
    }

    pub fn waves_started(&self) -> u32 {
        self.next_wave_id
    }

    /// Dispatch every step due at `now`. `spawn` performs the actual spawn.
    pub fn poll<R, F>(&mut self, now: f64, rng: &mut R, mut spawn: F) -> WaveProgress
    where
        R: Rng + ?Sized,
        F: FnMut(SpawnStep, &mut R),
    {
        if let Some(progress) = self.flush_cancellation() {
            return progress;
        }
        let Some(job) = self.job.as_mut() else {
            return WaveProgress::Idle;
        };

        if !job.boss_spawned {
            job.boss_spawned = true;
            spawn(SpawnStep::Boss, rng);
            if job.enemies_remaining > 0 {
                Self::schedule_wait(job, &mut self.is_enemy_spawning, rng);
            }
        }

        while job.enemies_remaining > 0 && now + TIMER_EPSILON as f64 >= job.next_fire_at {
            spawn(SpawnStep::Enemy, rng);
            job.enemies_remaining -= 1;
            if job.enemies_remaining > 0 {
                Self::schedule_wait(job, &mut self.is_enemy_spawning, rng);
            }
        }

        if job.enemies_remaining > 0 {
            return WaveProgress::Running;
        }

        let wave_id = job.wave_id;
        self.job = None;
        self.is_enemy_spawning = false;
        info!("wave {wave_id} finished spawning");
        WaveProgress::Finished { wave_id }
    }

    /// Push the deadline out by one random wait. The wait before the last
    /// enemy clears the spawning flag.
    fn schedule_wait<R: Rng + ?Sized>(
        job: &mut SpawnJob,
        is_enemy_spawning: &mut bool,
        rng: &mut R,
    ) {
        let (min, max) = job.interval_range;
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        let wait = if lo < hi { rng.gen_range(lo..hi) } else { lo };
        job.next_fire_at += wait;
        if job.enemies_remaining == 1 {
            *is_enemy_spawning = false;
        }
    }
}

/// Step the scheduler and spawn whatever is due. Returns what the poll did.
pub fn run(
    world: &mut World,
    ctx: &mut GameContext,
    registry: &mut EntityRegistry,
    scheduler: &mut WaveScheduler,
    events: &mut EventBus,
    now: f64,
) -> WaveProgress {
    let config = &ctx.config;
    let services = &ctx.services;
    let round_count = ctx.round_count;
    let progress = scheduler.poll(now, &mut ctx.rng, |step, rng| {
        let result = match step {
            SpawnStep::Boss => world_setup::spawn_boss(
                world,
                registry,
                events,
                config,
                services,
                round_count,
                rng,
            ),
            SpawnStep::Enemy => world_setup::spawn_wave_enemy(
                world,
                registry,
                events,
                config,
                services,
                round_count,
                rng,
            ),
        };
        if let Err(err) = result {
            warn!("wave spawn skipped: {err}");
            events.emit(SimEvent::SpawnFailed {
                template: err.template().to_string(),
            });
        }
    });

    announce(progress, events);
    progress
}

/// Emit the event for a finished or cancelled wave.
pub fn announce(progress: WaveProgress, events: &mut EventBus) {
    match progress {
        WaveProgress::Finished { wave_id } => events.emit(SimEvent::WaveFinished { wave_id }),
        WaveProgress::Cancelled {
            wave_id,
            enemies_skipped,
        } => events.emit(SimEvent::WaveCancelled {
            wave_id,
            enemies_skipped,
        }),
        WaveProgress::Idle | WaveProgress::Running => {}
    }
}
