use crate::domain::entities::{Entity, EntityId, EntityKind, Ship};
use crate::domain::errors::SimFault;
use crate::domain::world::World;
use glam::Vec2;
use std::collections::HashSet;
use tracing::{debug, info};

/// One side of a reported collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Participant {
    pub id: EntityId,
    pub kind: EntityKind,
}

/// Two entities that started overlapping this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub a: Participant,
    pub b: Participant,
}

/// Velocity changes a knockback policy wants applied to two colliding ships.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeparationImpulse {
    pub first: Vec2,
    pub second: Vec2,
}

/// Decides how two colliding ships push each other apart.
pub trait KnockbackPolicy: Send {
    fn separation(&self, first: &Ship, second: &Ship) -> Option<SeparationImpulse>;
}

/// Ships pass through each other untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledKnockback;

impl KnockbackPolicy for DisabledKnockback {
    fn separation(&self, _first: &Ship, _second: &Ship) -> Option<SeparationImpulse> {
        None
    }
}

/// Brute-force bounding-box overlap test that only reports new contacts.
#[derive(Debug, Default)]
pub struct CollisionDetector {
    touching: HashSet<(EntityId, EntityId)>,
}

impl CollisionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns pairs that overlap now but did not on the previous call.
    pub fn detect(&mut self, world: &World) -> Vec<CollisionEvent> {
        let entities: Vec<&Entity> = world.entities().collect();
        let mut touching = HashSet::new();
        let mut started = Vec::new();

        for (i, a) in entities.iter().enumerate() {
            for b in &entities[i + 1..] {
                if !overlaps(a, b) {
                    continue;
                }
                let key = (a.id(), b.id());
                if !self.touching.contains(&key) {
                    started.push(CollisionEvent {
                        a: Participant {
                            id: a.id(),
                            kind: a.kind(),
                        },
                        b: Participant {
                            id: b.id(),
                            kind: b.kind(),
                        },
                    });
                }
                touching.insert(key);
            }
        }

        self.touching = touching;
        started
    }
}

// NaN coordinates make every comparison false, so corrupt entities never overlap.
fn overlaps(a: &Entity, b: &Entity) -> bool {
    let delta = (a.body().position - b.body().position).abs();
    let reach = (a.extents() + b.extents()) * 0.5;
    delta.x <= reach.x && delta.y <= reach.y
}

/// Per-tick tallies from `CollisionResolver::resolve`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    pub hits: u32,
    pub friendly: u32,
    pub malformed: u32,
    pub stale: u32,
    pub knockbacks: u32,
}

impl ResolveSummary {
    fn skip(&mut self, fault: SimFault) {
        match fault {
            SimFault::MalformedState => self.malformed += 1,
            SimFault::StaleReference => self.stale += 1,
            SimFault::InvalidCommand => {}
        }
    }
}

enum Contact {
    ShipProjectile { ship: EntityId, projectile: EntityId },
    ShipShip { first: EntityId, second: EntityId },
    Other,
}

fn classify(event: &CollisionEvent) -> Contact {
    match (event.a.kind, event.b.kind) {
        (EntityKind::Ship, EntityKind::Projectile) => Contact::ShipProjectile {
            ship: event.a.id,
            projectile: event.b.id,
        },
        (EntityKind::Projectile, EntityKind::Ship) => Contact::ShipProjectile {
            ship: event.b.id,
            projectile: event.a.id,
        },
        (EntityKind::Ship, EntityKind::Ship) => Contact::ShipShip {
            first: event.a.id,
            second: event.b.id,
        },
        (EntityKind::Projectile, EntityKind::Projectile) => Contact::Other,
    }
}

/// Applies damage and removal rules to the contacts reported for one tick.
pub struct CollisionResolver {
    knockback: Box<dyn KnockbackPolicy>,
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self::new(Box::new(DisabledKnockback))
    }
}

impl CollisionResolver {
    pub fn new(knockback: Box<dyn KnockbackPolicy>) -> Self {
        Self { knockback }
    }

    pub fn resolve(&self, world: &mut World, events: &[CollisionEvent]) -> ResolveSummary {
        let mut summary = ResolveSummary::default();

        for event in events {
            let result = match classify(event) {
                Contact::ShipProjectile { ship, projectile } => {
                    self.ship_hit(world, ship, projectile, &mut summary)
                }
                Contact::ShipShip { first, second } => {
                    self.ship_contact(world, first, second, &mut summary)
                }
                Contact::Other => Ok(()),
            };
            if let Err(fault) = result {
                debug!(a = event.a.id, b = event.b.id, %fault, "collision skipped");
                summary.skip(fault);
            }
        }

        summary
    }

    fn ship_hit(
        &self,
        world: &mut World,
        ship_id: EntityId,
        projectile_id: EntityId,
        summary: &mut ResolveSummary,
    ) -> Result<(), SimFault> {
        let (shooter, damage) = world
            .projectile(projectile_id)
            .map(|p| (p.player_id, p.damage))
            .ok_or(SimFault::StaleReference)?;
        let ship = world.ship_mut(ship_id).ok_or(SimFault::StaleReference)?;

        if !ship.body.position.is_finite() {
            return Err(SimFault::MalformedState);
        }
        if ship.player_id == shooter {
            summary.friendly += 1;
            return Ok(());
        }

        ship.take_damage(damage);
        info!(
            victim_id = ship.id,
            victim_player = ship.player_id,
            shooter_player = shooter,
            projectile_id,
            victim_health = ship.health,
            "ship hit"
        );
        world.remove(projectile_id);
        summary.hits += 1;
        Ok(())
    }

    fn ship_contact(
        &self,
        world: &mut World,
        first: EntityId,
        second: EntityId,
        summary: &mut ResolveSummary,
    ) -> Result<(), SimFault> {
        let a = world.ship(first).ok_or(SimFault::StaleReference)?;
        let b = world.ship(second).ok_or(SimFault::StaleReference)?;
        if !a.body.position.is_finite() || !b.body.position.is_finite() {
            return Err(SimFault::MalformedState);
        }

        let Some(impulse) = self.knockback.separation(a, b) else {
            return Ok(());
        };
        if let Some(ship) = world.ship_mut(first) {
            ship.body.velocity += impulse.first;
        }
        if let Some(ship) = world.ship_mut(second) {
            ship.body.velocity += impulse.second;
        }
        summary.knockbacks += 1;
        Ok(())
    }
}
