// Domain-level simulation entities and snapshot types.

use glam::Vec2;

pub type EntityId = u64;
pub type PlayerId = u64;
pub type Tick = u64;

/// Fixed ship bounding box.
pub const SHIP_WIDTH: f32 = 5.0;
pub const SHIP_HEIGHT: f32 = 6.0;

/// Fixed projectile bounding box.
pub const PROJECTILE_WIDTH: f32 = 1.0;
pub const PROJECTILE_HEIGHT: f32 = 1.0;

/// Discriminant used when systems need to treat ships and projectiles differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Ship,
    Projectile,
}

/// Kinematic state shared by every entity. Angle is in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub angle: f32,
}

impl Body {
    /// Unit vector the body is facing (0 degrees = +X).
    pub fn facing(&self) -> Vec2 {
        let rad = self.angle.to_radians();
        Vec2::new(rad.cos(), rad.sin())
    }
}

/// Active fire cooldown: armed at `started_at`, lasts `ticks`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cooldown {
    pub started_at: Tick,
    pub ticks: f32,
}

impl Cooldown {
    pub fn is_active(&self, now: Tick) -> bool {
        (now.saturating_sub(self.started_at) as f32) < self.ticks
    }
}

#[derive(Debug, Clone)]
pub struct Ship {
    pub id: EntityId,
    pub player_id: PlayerId,
    pub username: String,
    pub body: Body,

    // Combat state.
    pub health: i32,
    pub fire_rate: f32, // shots per 60 ticks
    pub cooldown: Option<Cooldown>,
}

impl Ship {
    /// Cooldown length in ticks. A non-positive fire rate never re-arms.
    pub fn cooldown_ticks(&self) -> f32 {
        if self.fire_rate > 0.0 {
            60.0 / self.fire_rate
        } else {
            f32::INFINITY
        }
    }

    /// Applies damage, never dropping below zero.
    pub fn take_damage(&mut self, damage: i32) {
        self.health = self.health.saturating_sub(damage).max(0);
    }
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: EntityId,
    // Shooter's player; used for same-player exclusion.
    pub player_id: PlayerId,
    // Shooter ship's entity id.
    pub owner_id: EntityId,
    pub body: Body,
    pub damage: i32,
    pub spawn_tick: Tick,
}

#[derive(Debug, Clone)]
pub enum Entity {
    Ship(Ship),
    Projectile(Projectile),
}

impl Entity {
    pub fn id(&self) -> EntityId {
        match self {
            Entity::Ship(s) => s.id,
            Entity::Projectile(p) => p.id,
        }
    }

    pub(crate) fn set_id(&mut self, id: EntityId) {
        match self {
            Entity::Ship(s) => s.id = id,
            Entity::Projectile(p) => p.id = id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Ship(_) => EntityKind::Ship,
            Entity::Projectile(_) => EntityKind::Projectile,
        }
    }

    pub fn body(&self) -> &Body {
        match self {
            Entity::Ship(s) => &s.body,
            Entity::Projectile(p) => &p.body,
        }
    }

    pub fn body_mut(&mut self) -> &mut Body {
        match self {
            Entity::Ship(s) => &mut s.body,
            Entity::Projectile(p) => &mut p.body,
        }
    }

    /// Width and height of the axis-aligned bounding box.
    pub fn extents(&self) -> Vec2 {
        match self {
            Entity::Ship(_) => Vec2::new(SHIP_WIDTH, SHIP_HEIGHT),
            Entity::Projectile(_) => Vec2::new(PROJECTILE_WIDTH, PROJECTILE_HEIGHT),
        }
    }

    /// Player owning this entity (ship pilot or projectile shooter).
    pub fn player_id(&self) -> PlayerId {
        match self {
            Entity::Ship(s) => s.player_id,
            Entity::Projectile(p) => p.player_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShipSnapshot {
    pub id: EntityId,
    pub player_id: PlayerId,
    pub username: String,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub health: i32,
}

#[derive(Debug, Clone)]
pub struct ProjectileSnapshot {
    pub id: EntityId,
    pub player_id: PlayerId,
    pub owner_id: EntityId,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

impl From<&Ship> for ShipSnapshot {
    fn from(s: &Ship) -> Self {
        Self {
            id: s.id,
            player_id: s.player_id,
            username: s.username.clone(),
            x: s.body.position.x,
            y: s.body.position.y,
            angle: s.body.angle,
            health: s.health,
        }
    }
}

impl From<&Projectile> for ProjectileSnapshot {
    fn from(p: &Projectile) -> Self {
        Self {
            id: p.id,
            player_id: p.player_id,
            owner_id: p.owner_id,
            x: p.body.position.x,
            y: p.body.position.y,
            angle: p.body.angle,
        }
    }
}
