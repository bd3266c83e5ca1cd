// Cosmetic cues for an optional presentation layer (sound, camera, HUD).
//
// Nothing in the simulation reads these back; dropping them changes no outcome.

use super::entities::{EntityKind, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cue {
    /// An entity was pushed back inside the world extents.
    WallBounce {
        kind: EntityKind,
        local_player: bool,
    },
    /// The local player fired; shake the camera by `magnitude`.
    FireShake { magnitude: f32 },
    /// A player without a ship asked to start over.
    RestartRequested { player_id: PlayerId },
    /// Any on-screen announcement should be cleared.
    AnnouncementCleared,
}

/// Receiver for cues emitted during a tick.
pub trait Presentation: Send {
    /// Player whose ship the viewer controls, if any.
    fn local_player(&self) -> Option<PlayerId> {
        None
    }

    fn cue(&mut self, cue: Cue);
}
