//! Authoritative simulation for one arena.
//!
//! `Simulation` owns the world, the tick counter and every system. Each call to
//! `step` runs one tick in a fixed order: due timers, queued inputs, movement,
//! collision detection, collision resolution, boundary correction. Cosmetic
//! cues gathered along the way go to the presentation layer if one is attached.

use super::entities::{Entity, EntityId, PlayerId, ProjectileSnapshot, ShipSnapshot, Tick};
use super::presentation::{Cue, Presentation};
use super::scheduler::TaskAction;
use super::systems::collision::{CollisionDetector, CollisionResolver, KnockbackPolicy};
use super::systems::factory::EntityFactory;
use super::systems::input::{Command, InputOutcome, process_command};
use super::systems::{boundary, movement};
use super::tuning::projectile::ProjectileTuning;
use super::tuning::ship::ShipTuning;
use super::world::World;
use tracing::debug;

/// Configuration for a new simulation.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// Half-extent on x; valid positions are `[-width, width]`.
    pub width: f32,
    /// Half-extent on y.
    pub height: f32,
    /// RNG seed for spawn placement. Same seed and inputs = same run.
    pub seed: u64,
    pub ship: ShipTuning,
    pub projectile: ProjectileTuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
            seed: 42,
            ship: ShipTuning::default(),
            projectile: ProjectileTuning::default(),
        }
    }
}

/// What happened during one `step`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    pub tick: Tick,
    pub inputs: Vec<(PlayerId, InputOutcome)>,
    /// Projectiles removed by their time-to-live this tick.
    pub expired: u32,
    pub hits: u32,
    pub bounces: usize,
}

pub struct Simulation {
    world: World,
    tick: Tick,
    factory: EntityFactory,
    detector: CollisionDetector,
    resolver: CollisionResolver,
    pending: Vec<(PlayerId, Command)>,
    cues: Vec<Cue>,
    presentation: Option<Box<dyn Presentation>>,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        Self {
            world: World::new(config.width, config.height),
            tick: 0,
            factory: EntityFactory::new(config.ship, config.projectile, config.seed),
            detector: CollisionDetector::new(),
            resolver: CollisionResolver::default(),
            pending: Vec::new(),
            cues: Vec::new(),
            presentation: None,
        }
    }

    /// Attaches a presentation layer that receives cosmetic cues.
    pub fn with_presentation(mut self, presentation: Box<dyn Presentation>) -> Self {
        self.presentation = Some(presentation);
        self
    }

    /// Replaces the ship-versus-ship knockback policy (disabled by default).
    pub fn with_knockback(mut self, knockback: Box<dyn KnockbackPolicy>) -> Self {
        self.resolver = CollisionResolver::new(knockback);
        self
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Spawns a ship for a player and returns its id.
    pub fn join(&mut self, player_id: PlayerId, username: impl Into<String>) -> EntityId {
        self.factory.make_ship(&mut self.world, player_id, username)
    }

    /// Removes every ship flown by `player_id`, returning how many were removed.
    pub fn leave(&mut self, player_id: PlayerId) -> usize {
        let ships = self
            .world
            .query(|e| matches!(e, Entity::Ship(s) if s.player_id == player_id));
        ships
            .into_iter()
            .filter(|id| self.world.remove(*id).is_some())
            .count()
    }

    /// Queues a command for the next `step`. Commands run in arrival order.
    pub fn queue_input(&mut self, player_id: PlayerId, command: Command) {
        self.pending.push((player_id, command));
    }

    pub fn step(&mut self) -> StepReport {
        self.tick += 1;
        let tick = self.tick;
        let local_player = self.presentation.as_ref().and_then(|p| p.local_player());
        let mut report = StepReport {
            tick,
            ..StepReport::default()
        };

        report.expired = self.run_timers();

        for (player_id, command) in std::mem::take(&mut self.pending) {
            let outcome = process_command(
                &mut self.world,
                &self.factory,
                player_id,
                command,
                tick,
                local_player,
                &mut self.cues,
            );
            if let InputOutcome::Ignored(fault) = outcome {
                debug!(player_id, ?command, %fault, "input ignored");
            }
            report.inputs.push((player_id, outcome));
        }

        movement::integrate(&mut self.world);

        let contacts = self.detector.detect(&self.world);
        report.hits = self.resolver.resolve(&mut self.world, &contacts).hits;

        report.bounces = boundary::correct_bounds(&mut self.world, local_player, &mut self.cues);

        self.flush_cues();
        report
    }

    fn run_timers(&mut self) -> u32 {
        let mut expired = 0;
        for task in self.world.timers.take_due(self.tick) {
            match task.action {
                TaskAction::Despawn => {
                    if self.world.remove(task.target).is_some() {
                        expired += 1;
                    } else {
                        debug!(entity_id = task.target, "despawn timer for missing entity");
                    }
                }
            }
        }
        expired
    }

    fn flush_cues(&mut self) {
        match self.presentation.as_mut() {
            Some(presentation) => {
                for cue in self.cues.drain(..) {
                    presentation.cue(cue);
                }
            }
            None => self.cues.clear(),
        }
    }

    pub fn ship_snapshots(&self) -> Vec<ShipSnapshot> {
        self.world.ships().map(ShipSnapshot::from).collect()
    }

    pub fn projectile_snapshots(&self) -> Vec<ProjectileSnapshot> {
        self.world.projectiles().map(ProjectileSnapshot::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{RecordingPresentation, ship_at};
    use glam::Vec2;

    fn sim() -> Simulation {
        Simulation::new(SimConfig::default())
    }

    #[test]
    fn projectile_expires_exactly_after_ttl() {
        let mut sim = sim();
        sim.join(1, "ace");
        sim.queue_input(1, Command::Fire);
        let fired_at = sim.step().tick;
        assert_eq!(sim.world().projectiles().count(), 1);

        while sim.tick() < fired_at + 99 {
            sim.step();
        }
        assert_eq!(sim.world().projectiles().count(), 1);

        let report = sim.step();
        assert_eq!(report.tick, fired_at + 100);
        assert_eq!(report.expired, 1);
        assert_eq!(sim.world().projectiles().count(), 0);
    }

    #[test]
    fn ttl_after_collision_removal_is_a_no_op() {
        let mut sim = sim();
        sim.join(1, "ace");
        sim.queue_input(1, Command::Fire);
        let fired_at = sim.step().tick;
        let shot = sim.world().projectiles().map(|p| p.id).next().expect("projectile");

        // Removed by another path (as a hit would) before the timer fires.
        assert!(sim.world_mut().remove(shot).is_some());
        assert!(sim.world().timers.pending_for(shot).next().is_none());

        let mut expired = 0;
        while sim.tick() < fired_at + 100 {
            expired += sim.step().expired;
        }
        assert_eq!(expired, 0);
        assert!(!sim.world().contains(shot));
    }

    #[test]
    fn enemy_fire_hits_and_removes_projectile() {
        let mut sim = sim();
        // Shooter faces +x towards a target just ahead.
        let shooter = ship_at(1, Vec2::new(-10.0, 0.0));
        let shooter = sim.world_mut().add(Entity::Ship(shooter));
        let target = sim.world_mut().add(Entity::Ship(ship_at(2, Vec2::ZERO)));

        sim.queue_input(1, Command::Fire);
        let fired_at = sim.tick() + 1;
        let mut hits = 0;
        for _ in 0..10 {
            let report = sim.step();
            hits += report.hits;
            assert_eq!(report.expired, 0);
        }

        assert_eq!(hits, 1);
        assert_eq!(sim.world().ship(target).map(|s| s.health), Some(90));
        assert_eq!(sim.world().ship(shooter).map(|s| s.health), Some(100));
        assert_eq!(sim.world().projectiles().count(), 0);
        assert!(sim.world().timers.is_empty());

        // The projectile's lifetime runs out with nothing left to despawn.
        while sim.tick() < fired_at + 100 {
            let report = sim.step();
            assert_eq!(report.expired, 0);
            assert_eq!(report.hits, 0);
        }
        assert_eq!(sim.world().ship(target).map(|s| s.health), Some(90));
        assert_eq!(sim.world().ships().count(), 2);
    }

    #[test]
    fn despawn_timer_for_missing_entity_is_a_no_op() {
        let mut sim = sim();
        let ship = sim.join(1, "ace");
        sim.world_mut().timers.schedule(999, 5, TaskAction::Despawn);

        let mut expired = 0;
        while sim.tick() < 5 {
            expired += sim.step().expired;
        }

        assert_eq!(expired, 0);
        assert!(sim.world().contains(ship));
        assert_eq!(sim.world().len(), 1);
        assert!(sim.world().timers.is_empty());
    }

    #[test]
    fn leave_removes_player_ships() {
        let mut sim = sim();
        sim.join(1, "ace");
        sim.join(2, "bob");

        assert_eq!(sim.leave(1), 1);
        assert_eq!(sim.leave(1), 0);
        assert_eq!(sim.ship_snapshots().len(), 1);
        assert_eq!(sim.ship_snapshots()[0].player_id, 2);
    }

    #[test]
    fn same_seed_same_spawns() {
        let mut a = sim();
        let mut b = sim();
        for player in 1..=5 {
            a.join(player, "p");
            b.join(player, "p");
        }
        let pos = |s: &Simulation| {
            s.ship_snapshots()
                .iter()
                .map(|s| (s.x, s.y))
                .collect::<Vec<_>>()
        };
        assert_eq!(pos(&a), pos(&b));
    }

    #[test]
    fn ships_stay_inside_extents_while_thrusting() {
        let mut sim = sim();
        sim.join(1, "ace");
        for _ in 0..600 {
            sim.queue_input(1, Command::Up);
            sim.step();
            for ship in sim.world().ships() {
                assert!(ship.body.position.x.abs() <= 100.0);
                assert!(ship.body.position.y.abs() <= 100.0);
            }
        }
    }

    #[test]
    fn cues_reach_attached_presentation() {
        let presentation = RecordingPresentation::for_player(1);
        let mut sim = sim().with_presentation(Box::new(presentation.clone()));
        sim.join(1, "ace");

        sim.queue_input(1, Command::Fire);
        sim.queue_input(9, Command::Enter);
        sim.step();

        assert_eq!(
            presentation.recorded(),
            vec![
                Cue::FireShake { magnitude: 10.0 },
                Cue::RestartRequested { player_id: 9 },
                Cue::AnnouncementCleared,
            ]
        );
    }

    #[test]
    fn presentation_does_not_change_outcomes() {
        let mut plain = sim();
        let mut shown = sim().with_presentation(Box::new(RecordingPresentation::for_player(1)));
        for s in [&mut plain, &mut shown] {
            s.join(1, "ace");
            s.join(2, "bob");
        }

        for tick in 0..300 {
            let command = if tick % 3 == 0 { Command::Fire } else { Command::Up };
            for s in [&mut plain, &mut shown] {
                s.queue_input(1, command);
                s.queue_input(2, Command::Left);
                s.step();
            }
        }

        let state = |s: &Simulation| {
            s.ship_snapshots()
                .iter()
                .map(|s| (s.x, s.y, s.angle, s.health))
                .collect::<Vec<_>>()
        };
        assert_eq!(state(&plain), state(&shown));
        assert_eq!(plain.projectile_snapshots().len(), shown.projectile_snapshots().len());
    }
}
