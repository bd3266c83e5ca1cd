use std::{
    env,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

// Runtime/server constants (not gameplay tuning).

pub fn http_port() -> u16 {
    env::var("ARENA_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3001)
}

/// Half-extent of the arena on x.
pub fn world_width() -> f32 {
    positive_f32("WORLD_WIDTH").unwrap_or(100.0)
}

/// Half-extent of the arena on y.
pub fn world_height() -> f32 {
    positive_f32("WORLD_HEIGHT").unwrap_or(100.0)
}

// Fixed seed for reproducible runs; falls back to the wall clock.
pub fn sim_seed() -> u64 {
    env::var("SIM_SEED")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        })
}

fn positive_f32(key: &str) -> Option<f32> {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<f32>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
}

pub const INPUT_CHANNEL_CAPACITY: usize = 1024;
pub const WORLD_BROADCAST_CAPACITY: usize = 128;

pub const TICK_INTERVAL: Duration = Duration::from_millis(1000 / 60);
