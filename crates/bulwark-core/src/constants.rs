//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 30;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

/// Tolerance when comparing accumulated float timers against deadlines.
pub const TIMER_EPSILON: f32 = 1e-4;

/// Maximum time scale accepted by `SetTimeScale`.
pub const MAX_TIME_SCALE: f64 = 4.0;

// --- Combat ---

/// Seconds of simulated time between target checks.
pub const TARGET_CHECK_INTERVAL_SECS: f32 = 0.2;

/// Cooldown used by units whose attack speed is zero.
pub const FALLBACK_ATTACK_COOLDOWN_SECS: f32 = 1.0;

/// Distance at which a walking unit counts as arrived.
pub const STOPPING_DISTANCE: f32 = 0.1;

// --- Projectiles ---

pub const PROJECTILE_SPEED: f32 = 10.0;

pub const PROJECTILE_LIFETIME_SECS: f32 = 5.0;

/// Homing turn rate (degrees per second).
pub const PROJECTILE_TURN_RATE_DEG: f32 = 200.0;

pub const PROJECTILE_HIT_RADIUS: f32 = 0.3;

// --- Placement ---

/// Candidate footprints are shrunk by this factor before overlap checks.
pub const FOOTPRINT_MARGIN: f32 = 0.9;

/// Attempts before the allocator falls back to the band midpoint.
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 20;

// --- Templates ---

/// First player unit code.
pub const PLAYER_CODE_MIN: u32 = 1001;

/// First enemy code.
pub const ENEMY_CODE_MIN: u32 = 2001;

pub const PLAYER_TEMPLATE_PREFIX: &str = "Unit";

pub const ENEMY_TEMPLATE_PREFIX: &str = "Enemy";

pub const BOSS_TEMPLATE_NAME: &str = "BossEnemy";

// --- Wave defaults ---

/// Regular enemies per wave.
pub const WAVE_ENEMY_COUNT: u32 = 11;

/// Minimum wait between enemy spawns (seconds).
pub const WAVE_INTERVAL_MIN_SECS: f64 = 0.5;

/// Maximum wait between enemy spawns (seconds).
pub const WAVE_INTERVAL_MAX_SECS: f64 = 2.1;

/// Format the template name for a player unit code.
pub fn player_template_name(code: u32) -> String {
    format!("{PLAYER_TEMPLATE_PREFIX}{code}")
}

/// Format the template name for an enemy code.
pub fn enemy_template_name(code: u32) -> String {
    format!("{ENEMY_TEMPLATE_PREFIX}{code}")
}
