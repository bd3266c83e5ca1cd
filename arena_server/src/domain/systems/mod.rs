// Per-tick simulation systems driven by `Simulation::step`.

pub mod boundary;
pub mod collision;
pub mod factory;
pub mod input;
pub mod movement;
