// Use-case level inputs/outputs for the world loop.

use crate::domain::{Command, PlayerId, ProjectileSnapshot, ShipSnapshot};

#[derive(Debug, Clone)]
pub enum GameEvent {
    Join { player_id: PlayerId, username: String },
    Leave { player_id: PlayerId },
    Input { player_id: PlayerId, command: Command },
}

#[derive(Debug, Clone)]
pub struct WorldUpdate {
    pub tick: u64,
    pub ships: Vec<ShipSnapshot>,
    pub projectiles: Vec<ProjectileSnapshot>,
}
