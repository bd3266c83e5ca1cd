// Entity container for one simulation instance.

use super::entities::{Entity, EntityId, PlayerId, Projectile, Ship};
use super::scheduler::TickScheduler;
use std::collections::BTreeMap;

/// Holds every live entity plus the timers aimed at them.
///
/// Extents are symmetric: valid positions are `x` in `[-width, width]` and `y`
/// in `[-height, height]`. Entities are kept in id order, which makes every
/// iteration (and therefore every tick) deterministic.
#[derive(Debug)]
pub struct World {
    pub width: f32,
    pub height: f32,
    pub timers: TickScheduler,
    entities: BTreeMap<EntityId, Entity>,
    next_id: EntityId,
}

impl World {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            timers: TickScheduler::new(),
            entities: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Registers an entity under a fresh id and returns that id.
    pub fn add(&mut self, mut entity: Entity) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        entity.set_id(id);
        self.entities.insert(id, entity);
        id
    }

    /// Removes an entity and cancels its pending timers.
    ///
    /// Removing an id that is already gone is a no-op and returns `None`.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let removed = self.entities.remove(&id)?;
        self.timers.cancel_for(id);
        Some(removed)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn ship(&self, id: EntityId) -> Option<&Ship> {
        match self.entities.get(&id) {
            Some(Entity::Ship(ship)) => Some(ship),
            _ => None,
        }
    }

    pub fn ship_mut(&mut self, id: EntityId) -> Option<&mut Ship> {
        match self.entities.get_mut(&id) {
            Some(Entity::Ship(ship)) => Some(ship),
            _ => None,
        }
    }

    pub fn projectile(&self, id: EntityId) -> Option<&Projectile> {
        match self.entities.get(&id) {
            Some(Entity::Projectile(projectile)) => Some(projectile),
            _ => None,
        }
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn entities_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    pub fn ships(&self) -> impl Iterator<Item = &Ship> {
        self.entities.values().filter_map(|e| match e {
            Entity::Ship(ship) => Some(ship),
            Entity::Projectile(_) => None,
        })
    }

    pub fn projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.entities.values().filter_map(|e| match e {
            Entity::Projectile(projectile) => Some(projectile),
            Entity::Ship(_) => None,
        })
    }

    /// Ids of entities matching `predicate`, in id order.
    pub fn query(&self, predicate: impl Fn(&Entity) -> bool) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| predicate(e))
            .map(Entity::id)
            .collect()
    }

    /// First (lowest id) ship flown by `player_id`.
    pub fn ship_of(&self, player_id: PlayerId) -> Option<EntityId> {
        self.ships().find(|s| s.player_id == player_id).map(|s| s.id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
