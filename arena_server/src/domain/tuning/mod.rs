// Gameplay tuning, kept apart from runtime/server configuration.

pub mod projectile;
pub mod ship;
