use crate::domain::entities::{Body, Entity, EntityId, PlayerId, Projectile, Ship, Tick};
use crate::domain::math::vector_distance;
use crate::domain::scheduler::TaskAction;
use crate::domain::tuning::projectile::ProjectileTuning;
use crate::domain::tuning::ship::ShipTuning;
use crate::domain::world::World;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Result of the spawn search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPlacement {
    pub position: Vec2,
    /// Samples drawn, including the accepted one.
    pub attempts: u32,
    /// False when every attempt was too close and the last sample was kept.
    pub clear: bool,
}

/// Builds ships and projectiles and registers them in the world.
pub struct EntityFactory {
    ship: ShipTuning,
    projectile: ProjectileTuning,
    rng: ChaCha8Rng,
}

impl EntityFactory {
    pub fn new(ship: ShipTuning, projectile: ProjectileTuning, seed: u64) -> Self {
        Self {
            ship,
            projectile,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn ship_tuning(&self) -> &ShipTuning {
        &self.ship
    }

    pub fn projectile_tuning(&self) -> &ProjectileTuning {
        &self.projectile
    }

    /// Rejection-samples a spawn point away from every live ship.
    ///
    /// Samples are uniform over a box `spawn_spread` times the extents in size,
    /// centred on the origin (±0.45 of each extent with default tuning).
    /// If no sample clears `spawn_separation` the last one is used anyway, so a
    /// crowded world can produce overlapping spawns.
    pub fn find_spawn(&mut self, world: &World) -> SpawnPlacement {
        let spread = Vec2::new(world.width, world.height) * self.ship.spawn_spread;
        let attempts = self.ship.spawn_attempts.max(1);
        let mut position = Vec2::ZERO;

        for attempt in 1..=attempts {
            position = Vec2::new(
                self.rng.gen_range(-0.5f32..0.5) * spread.x,
                self.rng.gen_range(-0.5f32..0.5) * spread.y,
            );
            let clear = world.ships().all(|ship| {
                vector_distance(Some(position), Some(ship.body.position)).abs()
                    > self.ship.spawn_separation
            });
            if clear {
                return SpawnPlacement {
                    position,
                    attempts: attempt,
                    clear: true,
                };
            }
        }

        SpawnPlacement {
            position,
            attempts,
            clear: false,
        }
    }

    pub fn make_ship(
        &mut self,
        world: &mut World,
        player_id: PlayerId,
        username: impl Into<String>,
    ) -> EntityId {
        let placement = self.find_spawn(world);
        let ship = Ship {
            id: 0,
            player_id,
            username: username.into(),
            body: Body {
                position: placement.position,
                ..Body::default()
            },
            health: self.ship.max_health,
            fire_rate: self.ship.fire_rate,
            cooldown: None,
        };
        let ship_id = world.add(Entity::Ship(ship));

        debug!(
            ship_id,
            player_id,
            x = placement.position.x,
            y = placement.position.y,
            attempts = placement.attempts,
            clear = placement.clear,
            "ship spawned"
        );
        ship_id
    }

    /// Fires a projectile from `ship_id` and schedules its despawn.
    ///
    /// Returns `None` when the ship no longer exists.
    pub fn make_projectile(
        &self,
        world: &mut World,
        ship_id: EntityId,
        tick: Tick,
    ) -> Option<EntityId> {
        let ship = world.ship(ship_id)?;
        let muzzle = ship.body.facing() * self.projectile.muzzle_speed;
        let projectile = Projectile {
            id: 0,
            player_id: ship.player_id,
            owner_id: ship.id,
            body: Body {
                position: ship.body.position,
                velocity: ship.body.velocity + muzzle,
                angle: ship.body.angle,
            },
            damage: self.projectile.damage,
            spawn_tick: tick,
        };

        let projectile_id = world.add(Entity::Projectile(projectile));
        let due_tick = tick + self.projectile.ttl_ticks;
        world
            .timers
            .schedule(projectile_id, due_tick, TaskAction::Despawn);

        debug!(projectile_id, ship_id, due_tick, "projectile spawned");
        Some(projectile_id)
    }
}
