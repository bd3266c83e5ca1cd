/// Gameplay tuning for projectiles.

#[derive(Debug, Clone, Copy)]
pub struct ProjectileTuning {
    /// Speed added along the shooter's nose on top of the ship's velocity.
    pub muzzle_speed: f32,

    /// Lifetime in ticks before the projectile is despawned.
    pub ttl_ticks: u64,

    /// Health removed from a ship on hit.
    pub damage: i32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            muzzle_speed: 2.0,
            ttl_ticks: 100,
            damage: 10,
        }
    }
}
