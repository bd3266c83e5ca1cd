use crate::domain::entities::{Entity, PlayerId};
use crate::domain::presentation::Cue;
use crate::domain::world::World;

/// Added to the outgoing velocity before it is reflected.
const BOUNCE_BIAS: f32 = 0.4;
/// Reflection factor; above 1 so walls kick entities back harder than they hit.
const BOUNCE_FACTOR: f32 = -1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Overflow {
    PosX,
    NegX,
    PosY,
    NegY,
}

/// Clamps entities that left the world extents and bounces them back.
///
/// Only the first overflowing axis (x+, x-, y+, y-) is corrected per entity per
/// tick. Returns how many entities were corrected.
pub fn correct_bounds(
    world: &mut World,
    local_player: Option<PlayerId>,
    cues: &mut Vec<Cue>,
) -> usize {
    let (width, height) = (world.width, world.height);
    let mut corrected = 0;

    for entity in world.entities_mut() {
        let body = entity.body_mut();
        let overflow = if body.position.x > width {
            Overflow::PosX
        } else if body.position.x < -width {
            Overflow::NegX
        } else if body.position.y > height {
            Overflow::PosY
        } else if body.position.y < -height {
            Overflow::NegY
        } else {
            continue;
        };

        match overflow {
            Overflow::PosX => {
                body.position.x = width;
                body.velocity.x = (body.velocity.x + BOUNCE_BIAS) * BOUNCE_FACTOR;
            }
            Overflow::NegX => {
                body.position.x = -width;
                body.velocity.x = (body.velocity.x - BOUNCE_BIAS) * BOUNCE_FACTOR;
            }
            Overflow::PosY => {
                body.position.y = height;
                body.velocity.y = (body.velocity.y + BOUNCE_BIAS) * BOUNCE_FACTOR;
            }
            Overflow::NegY => {
                body.position.y = -height;
                body.velocity.y = (body.velocity.y - BOUNCE_BIAS) * BOUNCE_FACTOR;
            }
        }
        corrected += 1;

        let is_local = match entity {
            Entity::Ship(ship) => local_player == Some(ship.player_id),
            Entity::Projectile(_) => false,
        };
        cues.push(Cue::WallBounce {
            kind: entity.kind(),
            local_player: is_local,
        });
    }

    corrected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::EntityKind;
    use crate::domain::test_support::{projectile_at, ship_at};
    use glam::Vec2;

    fn world_with(entity: Entity) -> (World, u64) {
        let mut world = World::new(100.0, 100.0);
        let id = world.add(entity);
        (world, id)
    }

    #[test]
    fn bounce_clamps_and_amplifies() {
        let mut ship = ship_at(1, Vec2::new(105.0, 0.0));
        ship.body.velocity = Vec2::new(5.0, 0.0);
        let (mut world, id) = world_with(Entity::Ship(ship));
        let mut cues = Vec::new();

        assert_eq!(correct_bounds(&mut world, None, &mut cues), 1);

        let body = world.get(id).map(|e| *e.body()).expect("ship");
        assert_eq!(body.position.x, 100.0);
        assert!((body.velocity.x - -6.48).abs() < 1e-5);
        assert_eq!(
            cues,
            vec![Cue::WallBounce {
                kind: EntityKind::Ship,
                local_player: false
            }]
        );
    }

    #[test]
    fn negative_boundary_uses_negative_bias() {
        let mut ship = ship_at(1, Vec2::new(0.0, -120.0));
        ship.body.velocity = Vec2::new(0.0, -3.0);
        let (mut world, id) = world_with(Entity::Ship(ship));

        correct_bounds(&mut world, None, &mut Vec::new());

        let body = world.get(id).map(|e| *e.body()).expect("ship");
        assert_eq!(body.position.y, -100.0);
        assert!((body.velocity.y - 4.08).abs() < 1e-5);
    }

    #[test]
    fn only_first_axis_is_corrected_per_tick() {
        let (mut world, id) = world_with(Entity::Ship(ship_at(1, Vec2::new(150.0, 150.0))));

        correct_bounds(&mut world, None, &mut Vec::new());
        let body = world.get(id).map(|e| *e.body()).expect("ship");
        assert_eq!(body.position, Vec2::new(100.0, 150.0));

        correct_bounds(&mut world, None, &mut Vec::new());
        let body = world.get(id).map(|e| *e.body()).expect("ship");
        assert_eq!(body.position, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn entities_inside_extents_are_untouched() {
        let projectile = projectile_at(1, 2, Vec2::new(100.0, -100.0));
        let (mut world, id) = world_with(Entity::Projectile(projectile));
        let mut cues = Vec::new();

        assert_eq!(correct_bounds(&mut world, None, &mut cues), 0);
        assert!(cues.is_empty());
        assert_eq!(
            world.get(id).map(|e| e.body().position),
            Some(Vec2::new(100.0, -100.0))
        );
    }

    #[test]
    fn cue_marks_local_player_ship_only() {
        let mut world = World::new(100.0, 100.0);
        world.add(Entity::Ship(ship_at(1, Vec2::new(101.0, 0.0))));
        world.add(Entity::Ship(ship_at(2, Vec2::new(-101.0, 0.0))));
        world.add(Entity::Projectile(projectile_at(1, 1, Vec2::new(0.0, 101.0))));
        let mut cues = Vec::new();

        correct_bounds(&mut world, Some(1), &mut cues);

        assert_eq!(
            cues,
            vec![
                Cue::WallBounce {
                    kind: EntityKind::Ship,
                    local_player: true
                },
                Cue::WallBounce {
                    kind: EntityKind::Ship,
                    local_player: false
                },
                Cue::WallBounce {
                    kind: EntityKind::Projectile,
                    local_player: false
                },
            ]
        );
    }

    #[test]
    fn every_entity_ends_inside_extents_when_one_axis_overflows() {
        let mut world = World::new(50.0, 30.0);
        for (i, pos) in [
            Vec2::new(75.0, 0.0),
            Vec2::new(-51.0, 10.0),
            Vec2::new(0.0, 31.0),
            Vec2::new(-3.0, -1000.0),
        ]
        .into_iter()
        .enumerate()
        {
            world.add(Entity::Ship(ship_at(i as u64, pos)));
        }

        correct_bounds(&mut world, None, &mut Vec::new());

        for entity in world.entities() {
            let p = entity.body().position;
            assert!((-50.0..=50.0).contains(&p.x), "x out of range: {p:?}");
            assert!((-30.0..=30.0).contains(&p.y), "y out of range: {p:?}");
        }
    }
}
