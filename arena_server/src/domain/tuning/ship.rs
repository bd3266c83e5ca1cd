/// Gameplay tuning for player-controlled ships.
///
/// Keep this separate from runtime/server configuration (tick rates, buffer sizes, etc.).

#[derive(Debug, Clone, Copy)]
pub struct ShipTuning {
    /// Velocity added along the nose per `up` command.
    pub thrust: f32,

    /// Velocity added along the nose per `down` command (negative: brake/reverse).
    pub reverse_thrust: f32,

    /// Degrees turned per `left`/`right` command.
    pub turn_step: f32,

    /// Starting health.
    pub max_health: i32,

    /// Shots allowed per 60 ticks.
    pub fire_rate: f32,

    /// Spawn attempts before settling for the last sampled position.
    pub spawn_attempts: u32,

    /// Minimum distance a fresh spawn keeps from every live ship.
    pub spawn_separation: f32,

    /// Size of the centred spawn box as a fraction of the world extents.
    pub spawn_spread: f32,
}

impl Default for ShipTuning {
    fn default() -> Self {
        Self {
            thrust: 0.03,
            reverse_thrust: -0.02,
            turn_step: 2.5,
            max_health: 100,
            fire_rate: 1.0,
            spawn_attempts: 30,
            spawn_separation: 80.0,
            spawn_spread: 0.9,
        }
    }
}
