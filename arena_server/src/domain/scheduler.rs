// Tick-driven one-shot task scheduler.

use super::entities::{EntityId, Tick};
use std::collections::BTreeMap;

pub type TaskId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    /// Remove the target entity from the world.
    Despawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTask {
    pub id: TaskId,
    pub target: EntityId,
    pub due_tick: Tick,
    pub action: TaskAction,
}

/// Pending tasks ordered by `(due_tick, id)`, so tasks due on the same tick
/// fire in the order they were scheduled.
#[derive(Debug, Default)]
pub struct TickScheduler {
    tasks: BTreeMap<(Tick, TaskId), ScheduledTask>,
    next_id: TaskId,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, target: EntityId, due_tick: Tick, action: TaskAction) -> TaskId {
        self.next_id += 1;
        let id = self.next_id;
        self.tasks.insert(
            (due_tick, id),
            ScheduledTask {
                id,
                target,
                due_tick,
                action,
            },
        );
        id
    }

    /// Cancels a single task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, task_id: TaskId) -> bool {
        let key = self
            .tasks
            .iter()
            .find(|(_, task)| task.id == task_id)
            .map(|(key, _)| *key);
        match key {
            Some(key) => self.tasks.remove(&key).is_some(),
            None => false,
        }
    }

    /// Cancels every task aimed at `target`, returning how many were dropped.
    pub fn cancel_for(&mut self, target: EntityId) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|_, task| task.target != target);
        before - self.tasks.len()
    }

    /// Removes and returns every task due at or before `now`.
    pub fn take_due(&mut self, now: Tick) -> Vec<ScheduledTask> {
        let pending = self.tasks.split_off(&(now.saturating_add(1), 0));
        let due = std::mem::replace(&mut self.tasks, pending);
        due.into_values().collect()
    }

    pub fn pending_for(&self, target: EntityId) -> impl Iterator<Item = &ScheduledTask> {
        self.tasks.values().filter(move |task| task.target == target)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_due_returns_tasks_in_tick_order() {
        let mut scheduler = TickScheduler::new();
        scheduler.schedule(7, 20, TaskAction::Despawn);
        scheduler.schedule(3, 10, TaskAction::Despawn);
        scheduler.schedule(9, 30, TaskAction::Despawn);

        assert!(scheduler.take_due(9).is_empty());

        let due = scheduler.take_due(20);
        let targets: Vec<EntityId> = due.iter().map(|t| t.target).collect();
        assert_eq!(targets, vec![3, 7]);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn cancel_for_drops_every_task_of_target() {
        let mut scheduler = TickScheduler::new();
        scheduler.schedule(1, 5, TaskAction::Despawn);
        scheduler.schedule(1, 6, TaskAction::Despawn);
        scheduler.schedule(2, 5, TaskAction::Despawn);

        assert_eq!(scheduler.cancel_for(1), 2);
        assert_eq!(scheduler.cancel_for(1), 0);
        assert_eq!(scheduler.pending_for(2).count(), 1);
    }

    #[test]
    fn cancel_single_task() {
        let mut scheduler = TickScheduler::new();
        let id = scheduler.schedule(4, 5, TaskAction::Despawn);
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert!(scheduler.is_empty());
    }
}
