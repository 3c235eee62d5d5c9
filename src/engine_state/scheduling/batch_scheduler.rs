//! # Batch Scheduler
//!
//! The shape shared by the data and mesh schedulers: a FIFO of chunk
//! coordinates, a fixed batch size, and an `Idle | Running` state.
//!
//! `step_begin` drains up to one batch from the queue and publishes one task per
//! coordinate to the scheduler's own [`TaskManager`]. `step_complete` polls the
//! workers and, only once every task of the batch has reported back, hands the
//! outputs to the caller in queue order and returns to `Idle`. Partial results
//! are held back, so a batch is merged all at once or not at all.

use std::collections::VecDeque;

use log::{debug, warn};
use web_time::Instant;

use crate::engine_state::task_management::{task::Task, TaskManager};
use crate::engine_state::voxels::coord::ChunkCoordinate;
use crate::error::EngineError;

/// Whether a scheduler has a batch in flight.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    /// No batch in flight; `step_begin` may be called.
    Idle,
    /// A batch is in flight; only `step_complete` may be called.
    Running,
}

/// A FIFO of coordinates processed in fixed-size parallel batches.
pub struct BatchScheduler<T: Task> {
    /// Used in logs and in `AlreadyScheduled` errors
    name: &'static str,
    /// Coordinates waiting for a batch, oldest first
    queue: VecDeque<ChunkCoordinate>,
    /// Maximum coordinates drained per step
    batch_size: usize,
    state: SchedulerState,
    task_manager: TaskManager<T>,
    /// Outputs of the batch in flight, indexed by ticket
    results: Vec<Option<T::Output>>,
    /// How many of `results` have arrived
    received: usize,
    /// When the batch in flight was launched
    batch_started: Option<Instant>,
}

impl<T: Task> BatchScheduler<T> {
    /// Creates an idle scheduler with its own worker pool.
    ///
    /// # Arguments
    /// * `name` - Scheduler name, used for worker threads and logs
    /// * `batch_size` - Coordinates per step; clamped to at least one
    /// * `num_workers` - Worker threads in the pool
    pub fn new(name: &'static str, batch_size: usize, num_workers: usize) -> Self {
        BatchScheduler {
            name,
            queue: VecDeque::new(),
            batch_size: batch_size.max(1),
            state: SchedulerState::Idle,
            task_manager: TaskManager::new(num_workers, name),
            results: Vec::new(),
            received: 0,
            batch_started: None,
        }
    }

    /// Appends coordinates to the queue. Duplicates are not filtered.
    pub fn enqueue(&mut self, coordinates: impl IntoIterator<Item = ChunkCoordinate>) {
        self.queue.extend(coordinates);
    }

    /// Removes every queued coordinate matching `predicate`, returning how many
    /// were removed. The batch in flight is unaffected.
    pub fn remove_queued(&mut self, mut predicate: impl FnMut(ChunkCoordinate) -> bool) -> usize {
        let before = self.queue.len();
        self.queue.retain(|coord| !predicate(*coord));
        before - self.queue.len()
    }

    /// Whether a coordinate is waiting in the queue.
    pub fn is_queued(&self, position: ChunkCoordinate) -> bool {
        self.queue.contains(&position)
    }

    /// Number of coordinates waiting in the queue.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Coordinates drained per step.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Current state.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Whether no batch is in flight.
    pub fn is_idle(&self) -> bool {
        self.state == SchedulerState::Idle
    }

    /// Whether there is queued or in-flight work.
    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty() || self.state == SchedulerState::Running
    }

    /// Number of tasks in the batch in flight.
    pub fn in_flight(&self) -> usize {
        self.results.len()
    }

    /// Launches the next batch.
    ///
    /// Dequeues up to `batch_size` coordinates and asks `build` for a task for each.
    /// A coordinate for which `build` returns `None` is consumed without work.
    /// Stays `Idle` if no task was launched.
    ///
    /// # Returns
    /// The number of tasks launched, or `AlreadyScheduled` if a batch is in flight.
    pub fn step_begin(&mut self, build: impl FnMut(ChunkCoordinate) -> Option<T>) -> Result<usize, EngineError> {
        self.begin_batch(self.batch_size, build)
    }

    fn begin_batch(
        &mut self,
        limit: usize,
        mut build: impl FnMut(ChunkCoordinate) -> Option<T>,
    ) -> Result<usize, EngineError> {
        if self.state == SchedulerState::Running {
            return Err(EngineError::AlreadyScheduled {
                scheduler: self.name,
            });
        }

        let take = limit.min(self.queue.len());
        let batch: Vec<_> = self.queue.drain(..take).collect();
        let mut skipped = 0;
        for position in &batch {
            let Some(task) = build(*position) else {
                skipped += 1;
                continue;
            };
            let ticket = self.results.len();
            self.results.push(None);
            if let Err(err) = self.task_manager.publish_task(ticket, task) {
                // Put the whole batch back in its original order.
                self.results.clear();
                for position in batch.iter().rev() {
                    self.queue.push_front(*position);
                }
                warn!("{} scheduler failed to launch a batch: {}", self.name, err);
                return Err(err);
            }
        }

        if skipped > 0 {
            debug!("{} scheduler skipped {} stale coordinates", self.name, skipped);
        }
        let launched = self.results.len();
        if launched > 0 {
            debug!(
                "{} batch of {} launched ({} queued)",
                self.name,
                launched,
                self.queue.len()
            );
            self.state = SchedulerState::Running;
            self.received = 0;
            self.batch_started = Some(Instant::now());
        }
        Ok(launched)
    }

    /// Collects finished work without blocking.
    ///
    /// Once the whole batch has reported back, every output is passed to `merge`
    /// in queue order and the scheduler returns to `Idle`.
    ///
    /// # Returns
    /// `true` if a batch was merged by this call.
    pub fn step_complete(&mut self, merge: impl FnMut(T::Output)) -> Result<bool, EngineError> {
        if self.state == SchedulerState::Idle {
            return Ok(false);
        }
        let finished = self.task_manager.process_completed_tasks()?;
        self.store(finished);
        if self.received < self.results.len() {
            return Ok(false);
        }
        self.finish_batch(merge);
        Ok(true)
    }

    /// Blocks until the batch in flight completes, then merges it.
    pub fn wait_complete(&mut self, merge: impl FnMut(T::Output)) -> Result<bool, EngineError> {
        if self.state == SchedulerState::Idle {
            return Ok(false);
        }
        let finished = self.task_manager.wait_for_completed_tasks()?;
        self.store(finished);
        self.finish_batch(merge);
        Ok(true)
    }

    /// Runs the entire queue as one batch, blocking until it is merged.
    pub fn drain_blocking(
        &mut self,
        build: impl FnMut(ChunkCoordinate) -> Option<T>,
        merge: impl FnMut(T::Output),
    ) -> Result<usize, EngineError> {
        let launched = self.begin_batch(usize::MAX, build)?;
        self.wait_complete(merge)?;
        Ok(launched)
    }

    fn store(&mut self, finished: Vec<(usize, T::Output)>) {
        for (ticket, output) in finished {
            if let Some(slot) = self.results.get_mut(ticket) {
                if slot.replace(output).is_none() {
                    self.received += 1;
                }
            }
        }
    }

    fn finish_batch(&mut self, mut merge: impl FnMut(T::Output)) {
        let count = self.results.len();
        for output in self.results.drain(..).flatten() {
            merge(output);
        }
        if let Some(started) = self.batch_started.take() {
            debug!(
                "{} batch of {} merged after {:?} ({} queued)",
                self.name,
                count,
                started.elapsed(),
                self.queue.len()
            );
        }
        self.received = 0;
        self.state = SchedulerState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo(ChunkCoordinate);

    impl Task for Echo {
        type Output = ChunkCoordinate;

        fn process(self) -> ChunkCoordinate {
            self.0
        }
    }

    fn coords(n: i32) -> Vec<ChunkCoordinate> {
        (0..n)
            .map(|i| ChunkCoordinate { x: i, y: 0, z: 0 })
            .collect()
    }

    fn complete(scheduler: &mut BatchScheduler<Echo>) -> Vec<ChunkCoordinate> {
        let mut merged = Vec::new();
        let deadline = Instant::now() + web_time::Duration::from_secs(10);
        while Instant::now() < deadline {
            if scheduler.step_complete(|c| merged.push(c)).unwrap() {
                return merged;
            }
            std::thread::yield_now();
        }
        panic!("batch did not complete");
    }

    #[test]
    fn test_empty_enqueue_stays_idle() {
        let mut scheduler = BatchScheduler::new("test", 4, 2);
        scheduler.enqueue(Vec::new());
        assert_eq!(scheduler.step_begin(|c| Some(Echo(c))), Ok(0));
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert!(!scheduler.has_pending());
        assert_eq!(scheduler.step_complete(|_| {}), Ok(false));
    }

    #[test]
    fn test_second_begin_is_already_scheduled() {
        let mut scheduler = BatchScheduler::new("test", 2, 2);
        scheduler.enqueue(coords(5));
        assert_eq!(scheduler.step_begin(|c| Some(Echo(c))), Ok(2));
        assert_eq!(
            scheduler.step_begin(|c| Some(Echo(c))),
            Err(EngineError::AlreadyScheduled { scheduler: "test" })
        );
        assert_eq!(scheduler.queue_len(), 3);
    }

    #[test]
    fn test_queue_shrinks_by_batch_and_merges_in_order() {
        let mut scheduler = BatchScheduler::new("test", 3, 2);
        let all = coords(5);
        scheduler.enqueue(all.clone());

        scheduler.step_begin(|c| Some(Echo(c))).unwrap();
        assert_eq!(complete(&mut scheduler), all[0..3].to_vec());
        assert_eq!(scheduler.queue_len(), 2);
        assert!(scheduler.is_idle());

        scheduler.step_begin(|c| Some(Echo(c))).unwrap();
        assert_eq!(complete(&mut scheduler), all[3..5].to_vec());
        assert_eq!(scheduler.queue_len(), 0);
        assert!(!scheduler.has_pending());
    }

    #[test]
    fn test_stale_coordinates_are_consumed_without_work() {
        let mut scheduler = BatchScheduler::new("test", 4, 1);
        scheduler.enqueue(coords(4));
        let launched = scheduler
            .step_begin(|c| (c.x % 2 == 0).then_some(Echo(c)))
            .unwrap();
        assert_eq!(launched, 2);
        assert_eq!(scheduler.queue_len(), 0);
        assert_eq!(complete(&mut scheduler).len(), 2);

        scheduler.enqueue(coords(2));
        assert_eq!(scheduler.step_begin(|_| None), Ok(0));
        assert!(scheduler.is_idle());
        assert_eq!(scheduler.queue_len(), 0);
    }

    #[test]
    fn test_drain_blocking_runs_whole_queue() {
        let mut scheduler = BatchScheduler::new("test", 2, 3);
        scheduler.enqueue(coords(10));
        let mut merged = Vec::new();
        let launched = scheduler
            .drain_blocking(|c| Some(Echo(c)), |c| merged.push(c))
            .unwrap();
        assert_eq!(launched, 10);
        assert_eq!(merged, coords(10));
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_failed_launch_requeues_the_batch() {
        let mut scheduler = BatchScheduler::new("test", 3, 1);
        scheduler.enqueue(coords(5));
        scheduler.task_manager.disconnect();

        let result = scheduler.step_begin(|c| Some(Echo(c)));
        assert!(matches!(result, Err(EngineError::WorkerDisconnected { .. })));
        assert!(scheduler.is_idle());
        assert_eq!(scheduler.in_flight(), 0);
        assert_eq!(scheduler.queue.iter().copied().collect::<Vec<_>>(), coords(5));
    }

    #[test]
    fn test_remove_queued() {
        let mut scheduler: BatchScheduler<Echo> = BatchScheduler::new("test", 2, 1);
        scheduler.enqueue(coords(6));
        assert_eq!(scheduler.remove_queued(|c| c.x >= 4), 2);
        assert!(!scheduler.is_queued(ChunkCoordinate { x: 5, y: 0, z: 0 }));
        assert_eq!(scheduler.queue_len(), 4);
    }
}
