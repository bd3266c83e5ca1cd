use std::sync::{Arc, Mutex};

use glam::Vec2;

use crate::domain::entities::{Body, EntityId, PlayerId, Projectile, Ship};
use crate::domain::presentation::{Cue, Presentation};
use crate::domain::tuning::ship::ShipTuning;

// Ship at `position` with default tuning; the world assigns the real id.
pub(crate) fn ship_at(player_id: PlayerId, position: Vec2) -> Ship {
    let tuning = ShipTuning::default();
    Ship {
        id: 0,
        player_id,
        username: format!("pilot-{player_id}"),
        body: Body {
            position,
            ..Body::default()
        },
        health: tuning.max_health,
        fire_rate: tuning.fire_rate,
        cooldown: None,
    }
}

pub(crate) fn projectile_at(player_id: PlayerId, owner_id: EntityId, position: Vec2) -> Projectile {
    Projectile {
        id: 0,
        player_id,
        owner_id,
        body: Body {
            position,
            ..Body::default()
        },
        damage: 10,
        spawn_tick: 0,
    }
}

// Presentation double that records every cue; clones share the same log.
#[derive(Clone, Default)]
pub(crate) struct RecordingPresentation {
    pub local_player: Option<PlayerId>,
    pub cues: Arc<Mutex<Vec<Cue>>>,
}

impl RecordingPresentation {
    pub(crate) fn for_player(player_id: PlayerId) -> Self {
        Self {
            local_player: Some(player_id),
            ..Self::default()
        }
    }

    pub(crate) fn recorded(&self) -> Vec<Cue> {
        self.cues.lock().expect("cue log mutex poisoned").clone()
    }
}

impl Presentation for RecordingPresentation {
    fn local_player(&self) -> Option<PlayerId> {
        self.local_player
    }

    fn cue(&mut self, cue: Cue) {
        self.cues.lock().expect("cue log mutex poisoned").push(cue);
    }
}
