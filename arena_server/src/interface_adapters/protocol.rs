// Wire protocol DTOs and conversions for public arena server messages.

use crate::domain::{ProjectileSnapshot, ShipSnapshot};
use crate::use_cases::WorldUpdate;
use serde::{Deserialize, Serialize};

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // Assigned identity for the connection after Join is accepted.
    Identity { player_id: String },
    // Snapshot of the world for a given tick.
    WorldUpdate(WorldUpdateDto),
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    // Initial handshake carrying the pilot name shown to others.
    Join(JoinPayload),
    // One command string per message after a successful Join.
    Input(InputPayload),
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinPayload {
    #[serde(default)]
    pub username: String,
}

/// Raw command string; parsed into a `Command` by the adapter so unknown
/// values can be dropped without failing the whole message.
#[derive(Debug, Clone, Deserialize)]
pub struct InputPayload {
    pub input: String,
}

/// Snapshot of the world sent to clients on each tick.
#[derive(Debug, Clone, Serialize)]
pub struct WorldUpdateDto {
    pub tick: u64,
    pub ships: Vec<ShipStateDto>,
    pub projectiles: Vec<ProjectileStateDto>,
}

impl From<WorldUpdate> for WorldUpdateDto {
    fn from(update: WorldUpdate) -> Self {
        Self {
            tick: update.tick,
            ships: update.ships.iter().map(ShipStateDto::from).collect(),
            projectiles: update
                .projectiles
                .iter()
                .map(ProjectileStateDto::from)
                .collect(),
        }
    }
}

/// Flattened ship state for wire transmission in world updates.
#[derive(Debug, Clone, Serialize)]
pub struct ShipStateDto {
    pub id: String,
    pub player_id: String,
    pub username: String,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub health: i32,
}

impl From<&ShipSnapshot> for ShipStateDto {
    fn from(ship: &ShipSnapshot) -> Self {
        Self {
            id: ship.id.to_string(),
            player_id: ship.player_id.to_string(),
            username: ship.username.clone(),
            x: ship.x,
            y: ship.y,
            angle: ship.angle,
            health: ship.health,
        }
    }
}

/// Flattened projectile state for wire transmission in world updates.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectileStateDto {
    pub id: String,
    pub player_id: String,
    pub owner_id: String,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

impl From<&ProjectileSnapshot> for ProjectileStateDto {
    fn from(projectile: &ProjectileSnapshot) -> Self {
        Self {
            id: projectile.id.to_string(),
            player_id: projectile.player_id.to_string(),
            owner_id: projectile.owner_id.to_string(),
            x: projectile.x,
            y: projectile.y,
            angle: projectile.angle,
        }
    }
}
