use super::types::{GameEvent, WorldUpdate};
use crate::domain::{SimConfig, Simulation};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, broadcast, mpsc};
use tracing::{debug, info};

/// Applies one queued event to the simulation.
fn apply_event(sim: &mut Simulation, ev: GameEvent) {
    match ev {
        GameEvent::Join {
            player_id,
            username,
        } => {
            let ship_id = sim.join(player_id, username);
            info!(player_id, ship_id, "player joined");
        }
        GameEvent::Leave { player_id } => {
            let removed = sim.leave(player_id);
            info!(player_id, removed, "player left");
        }
        GameEvent::Input { player_id, command } => {
            sim.queue_input(player_id, command);
        }
    }
}

fn world_update(sim: &Simulation) -> WorldUpdate {
    WorldUpdate {
        tick: sim.tick(),
        ships: sim.ship_snapshots(),
        projectiles: sim.projectile_snapshots(),
    }
}

/// Authoritative world loop.
///
/// Owns the only `Simulation`; every tick it drains pending events, steps once
/// and broadcasts a snapshot. Exits on `shutdown` or when every input sender is gone.
pub async fn world_task(
    mut input_rx: mpsc::Receiver<GameEvent>,
    world_tx: broadcast::Sender<WorldUpdate>,
    config: SimConfig,
    tick_interval: Duration,
    shutdown: Arc<Notify>,
) {
    let mut sim = Simulation::new(config);
    info!(
        width = config.width,
        height = config.height,
        seed = config.seed,
        "world started"
    );

    // Drive the fixed-step game loop at the configured tick rate.
    let mut interval = tokio::time::interval(tick_interval);

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                info!(tick = sim.tick(), "world shutting down");
                break;
            }
            _ = interval.tick() => {}
        }

        loop {
            match input_rx.try_recv() {
                Ok(ev) => apply_event(&mut sim, ev),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    info!(tick = sim.tick(), "input channel closed; world exiting");
                    return;
                }
            }
        }

        let report = sim.step();
        if report.hits > 0 || report.expired > 0 {
            debug!(
                tick = report.tick,
                hits = report.hits,
                expired = report.expired,
                bounces = report.bounces,
                "tick summary"
            );
        }

        // No subscribers is fine; the update is simply dropped.
        let _ = world_tx.send(world_update(&sim));
    }
}
