// Domain layer: core simulation types and rules.

pub mod entities;
pub mod errors;
pub mod math;
pub mod presentation;
pub mod scheduler;
pub mod simulation;
pub mod systems;
pub mod tuning;
pub mod world;

#[cfg(test)]
pub(crate) mod test_support;

pub use entities::{
    Entity, EntityId, EntityKind, PlayerId, Projectile, ProjectileSnapshot, Ship, ShipSnapshot,
    Tick,
};
pub use errors::SimFault;
pub use presentation::{Cue, Presentation};
pub use simulation::{SimConfig, Simulation, StepReport};
pub use systems::input::{Command, InputOutcome};
pub use world::World;
