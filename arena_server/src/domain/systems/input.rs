use crate::domain::entities::{Cooldown, EntityId, PlayerId, Tick};
use crate::domain::errors::SimFault;
use crate::domain::presentation::Cue;
use crate::domain::systems::factory::EntityFactory;
use crate::domain::world::World;
use serde::Deserialize;
use std::str::FromStr;
use tracing::debug;

/// Player commands as they arrive on the input channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Up,
    Down,
    Left,
    Right,
    Fire,
    Enter,
}

impl FromStr for Command {
    type Err = SimFault;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Command::Up),
            "down" => Ok(Command::Down),
            "left" => Ok(Command::Left),
            "right" => Ok(Command::Right),
            "fire" => Ok(Command::Fire),
            "enter" => Ok(Command::Enter),
            _ => Err(SimFault::InvalidCommand),
        }
    }
}

/// What a single command did to the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputOutcome {
    Thrust { ship_id: EntityId },
    Turned { ship_id: EntityId, angle: f32 },
    Fired { ship_id: EntityId, projectile_id: EntityId },
    CoolingDown { ship_id: EntityId },
    RestartRequested,
    Ignored(SimFault),
}

/// Applies one command from `player_id` at `tick`.
///
/// The player's first ship (lowest id) is the one controlled. Without a ship
/// only `enter` does anything: it asks for a restart.
pub fn process_command(
    world: &mut World,
    factory: &EntityFactory,
    player_id: PlayerId,
    command: Command,
    tick: Tick,
    local_player: Option<PlayerId>,
    cues: &mut Vec<Cue>,
) -> InputOutcome {
    let Some(ship_id) = world.ship_of(player_id) else {
        if command == Command::Enter {
            cues.push(Cue::RestartRequested { player_id });
            cues.push(Cue::AnnouncementCleared);
            return InputOutcome::RestartRequested;
        }
        return InputOutcome::Ignored(SimFault::InvalidCommand);
    };

    let tuning = *factory.ship_tuning();
    match command {
        Command::Up | Command::Down => {
            let amount = if command == Command::Up {
                tuning.thrust
            } else {
                tuning.reverse_thrust
            };
            if let Some(ship) = world.ship_mut(ship_id) {
                let push = ship.body.facing() * amount;
                ship.body.velocity += push;
            }
            InputOutcome::Thrust { ship_id }
        }
        Command::Left | Command::Right => {
            let step = if command == Command::Right {
                tuning.turn_step
            } else {
                -tuning.turn_step
            };
            let mut angle = 0.0;
            if let Some(ship) = world.ship_mut(ship_id) {
                ship.body.angle = (ship.body.angle + step).rem_euclid(360.0);
                angle = ship.body.angle;
            }
            InputOutcome::Turned { ship_id, angle }
        }
        Command::Fire => fire(world, factory, ship_id, tick, local_player, cues),
        // Enter only matters for players without a ship.
        Command::Enter => InputOutcome::Ignored(SimFault::InvalidCommand),
    }
}

fn fire(
    world: &mut World,
    factory: &EntityFactory,
    ship_id: EntityId,
    tick: Tick,
    local_player: Option<PlayerId>,
    cues: &mut Vec<Cue>,
) -> InputOutcome {
    let Some(ship) = world.ship(ship_id) else {
        return InputOutcome::Ignored(SimFault::StaleReference);
    };
    if ship.cooldown.is_some_and(|c| c.is_active(tick)) {
        debug!(ship_id, tick, "fire dropped; cooling down");
        return InputOutcome::CoolingDown { ship_id };
    }
    let shooter = ship.player_id;
    let cooldown = Cooldown {
        started_at: tick,
        ticks: ship.cooldown_ticks(),
    };

    let Some(projectile_id) = factory.make_projectile(world, ship_id, tick) else {
        return InputOutcome::Ignored(SimFault::StaleReference);
    };
    if let Some(ship) = world.ship_mut(ship_id) {
        ship.cooldown = Some(cooldown);
    }

    if local_player == Some(shooter) {
        cues.push(Cue::FireShake {
            magnitude: factory.projectile_tuning().damage as f32,
        });
    }

    InputOutcome::Fired {
        ship_id,
        projectile_id,
    }
}
