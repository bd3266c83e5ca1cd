use crate::domain::world::World;

/// Integrates every body one tick: `position += velocity`.
pub fn integrate(world: &mut World) {
    for entity in world.entities_mut() {
        let body = entity.body_mut();
        body.position += body.velocity;
    }
}
