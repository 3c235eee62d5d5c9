//! # Task Management System
//!
//! A small worker pool used by the data and mesh schedulers to run one batch of
//! independent tasks in parallel without blocking the tick thread.
//!
//! ## Architecture Overview
//! - `TaskManager`: owns the worker threads and distributes tasks round-robin
//! - `Task`: a unit of work that can be executed on a worker
//! - `TaskChannel`: the sending half for one worker, plus its in-flight counter
//!
//! Every worker pushes its results into a single shared result channel, tagged
//! with the worker index and the caller-supplied ticket. The tick thread either
//! polls that channel (`process_completed_tasks`) or blocks on it
//! (`wait_for_completed_tasks`, used only by the initial fill).
//!
//! ## Task Lifecycle
//! 1. Tasks are published via `TaskManager::publish_task()`
//! 2. The manager hands each task to the next worker with spare capacity, or queues it
//! 3. Workers process tasks and send back `(worker, ticket, output)`
//! 4. Completed outputs are collected on the tick thread; queued tasks are then
//!    forwarded to the workers that just freed up
//!
//! ## Example Usage
//! ```ignore
//! let mut task_manager = TaskManager::new(4, "chunk-gen");
//! task_manager.publish_task(0, task)?;
//! let finished = task_manager.process_completed_tasks()?;
//! ```

pub mod task;

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info};
use task::Task;

use crate::error::EngineError;

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Tasks beyond this are held in the manager's own queue, so a single busy
/// worker never accumulates a backlog while others sit idle.
pub const MAX_TASKS_IN_FLIGHT: usize = 2;

/// How often a blocking wait re-checks that its workers are still alive.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A finished task: the worker it ran on, its ticket, and its output.
type Completion<O> = (usize, usize, O);

/// The sending half of one worker thread.
///
/// # Fields
/// - `task_sender`: Sends `(ticket, task)` pairs from the tick thread to the worker
/// - `num_tasks_in_flight`: Number of tasks sent but not yet reported back
/// - `worker`: Handle to the worker thread, joined on drop
#[derive(Debug)]
struct TaskChannel<T: Task> {
    task_sender: Option<Sender<(usize, T)>>,
    num_tasks_in_flight: usize,
    worker: Option<JoinHandle<()>>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// The `TaskManager` is responsible for:
/// - Creating and joining worker threads
/// - Distributing tasks across available workers (round-robin)
/// - Queueing tasks when all workers are at capacity
/// - Collecting finished outputs
pub struct TaskManager<T: Task> {
    channels: Vec<TaskChannel<T>>,
    result_receiver: Receiver<Completion<T::Output>>,
    queued_tasks: VecDeque<(usize, T)>,
    current_channel: usize,
}

impl<T: Task> TaskManager<T> {
    /// Creates a new `TaskManager` with `num_workers` worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads; clamped to at least one
    /// * `name` - Thread name prefix, shows up in panics and profilers
    pub fn new(num_workers: usize, name: &str) -> Self {
        let num_workers = num_workers.max(1);
        let (result_tx, result_rx) = channel::<Completion<T::Output>>();
        let mut channels = Vec::with_capacity(num_workers);

        for worker_index in 0..num_workers {
            let (task_tx, task_rx) = channel::<(usize, T)>();
            let result_tx = result_tx.clone();

            let task_closure = move || {
                while let Ok((ticket, task)) = task_rx.recv() {
                    let output = task.process();
                    if result_tx.send((worker_index, ticket, output)).is_err() {
                        break;
                    }
                }
            };

            let worker = thread::Builder::new()
                .name(format!("{name}-worker-{worker_index}"))
                .spawn(task_closure)
                .ok();

            channels.push(TaskChannel {
                task_sender: Some(task_tx),
                num_tasks_in_flight: 0,
                worker,
            });
        }

        info!(
            "Started {} {} workers (available parallelism: {:?})",
            num_workers,
            name,
            thread::available_parallelism()
        );

        TaskManager {
            channels,
            result_receiver: result_rx,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// Number of worker threads in the pool.
    pub fn num_workers(&self) -> usize {
        self.channels.len()
    }

    /// Number of tasks published but not yet collected.
    pub fn num_outstanding(&self) -> usize {
        self.queued_tasks.len()
            + self
                .channels
                .iter()
                .map(|channel| channel.num_tasks_in_flight)
                .sum::<usize>()
    }

    /// Attempts to send a task to a specific worker channel.
    fn try_send_task(
        &mut self,
        ticket: usize,
        task: T,
        channel_idx: usize,
    ) -> Result<(), EngineError> {
        let channel = &mut self.channels[channel_idx];
        let sender = channel
            .task_sender
            .as_ref()
            .ok_or(EngineError::WorkerDisconnected { worker: channel_idx })?;
        sender
            .send((ticket, task))
            .map_err(|_| EngineError::WorkerDisconnected { worker: channel_idx })?;
        channel.num_tasks_in_flight += 1;
        Ok(())
    }

    /// Finds a worker channel that can accept a new task, round-robin from the
    /// last used channel. Returns `None` when every worker is at capacity.
    fn find_available_channel(&self) -> Option<usize> {
        let len = self.channels.len();
        (0..len)
            .map(|step| (self.current_channel + step) % len)
            .find(|&idx| self.channels[idx].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT)
    }

    /// Publishes a new task for execution.
    ///
    /// The task goes straight to a worker if one has capacity, otherwise it waits
    /// in the manager's FIFO queue until `process_completed_tasks` frees a worker.
    ///
    /// # Returns
    /// - `Ok(true)` if the task was handed to a worker immediately
    /// - `Ok(false)` if it was queued
    pub fn publish_task(&mut self, ticket: usize, task: T) -> Result<bool, EngineError> {
        if !self.queued_tasks.is_empty() {
            self.queued_tasks.push_back((ticket, task));
            return Ok(false);
        }

        match self.find_available_channel() {
            Some(channel_idx) => {
                self.try_send_task(ticket, task, channel_idx)?;
                self.current_channel = (channel_idx + 1) % self.channels.len();
                Ok(true)
            }
            None => {
                self.queued_tasks.push_back((ticket, task));
                Ok(false)
            }
        }
    }

    /// Forwards queued tasks, oldest first, while workers have capacity.
    pub fn process_queued_tasks(&mut self) -> Result<(), EngineError> {
        while !self.queued_tasks.is_empty() {
            let Some(channel_idx) = self.find_available_channel() else {
                break;
            };
            let Some((ticket, task)) = self.queued_tasks.pop_front() else {
                break;
            };
            self.try_send_task(ticket, task, channel_idx)?;
            self.current_channel = (channel_idx + 1) % self.channels.len();
        }
        Ok(())
    }

    fn record_completion(&mut self, worker: usize) {
        let channel = &mut self.channels[worker];
        channel.num_tasks_in_flight = channel.num_tasks_in_flight.saturating_sub(1);
    }

    /// Collects every output that is ready right now without blocking, then
    /// refills the workers from the queue.
    ///
    /// # Returns
    /// `(ticket, output)` pairs in arrival order.
    pub fn process_completed_tasks(&mut self) -> Result<Vec<(usize, T::Output)>, EngineError> {
        let mut finished = Vec::new();
        while let Ok((worker, ticket, output)) = self.result_receiver.try_recv() {
            self.record_completion(worker);
            finished.push((ticket, output));
        }
        self.process_queued_tasks()?;
        Ok(finished)
    }

    /// Blocks until every published task has completed.
    ///
    /// Only the initial world fill uses this; steady-state streaming polls.
    pub fn wait_for_completed_tasks(&mut self) -> Result<Vec<(usize, T::Output)>, EngineError> {
        let mut finished = Vec::new();
        self.process_queued_tasks()?;
        while self.num_outstanding() > 0 {
            match self.result_receiver.recv_timeout(WAIT_POLL_INTERVAL) {
                Ok((worker, ticket, output)) => {
                    self.record_completion(worker);
                    finished.push((ticket, output));
                    self.process_queued_tasks()?;
                }
                Err(RecvTimeoutError::Timeout) => self.check_workers_alive()?,
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(EngineError::WorkerDisconnected {
                        worker: self.current_channel,
                    })
                }
            }
        }
        Ok(finished)
    }

    /// Hangs up every worker so further sends fail.
    #[cfg(test)]
    pub(crate) fn disconnect(&mut self) {
        for channel in &mut self.channels {
            channel.task_sender.take();
        }
    }

    /// Fails if a worker that still owes results has exited.
    fn check_workers_alive(&self) -> Result<(), EngineError> {
        for (index, channel) in self.channels.iter().enumerate() {
            let exited = channel
                .worker
                .as_ref()
                .map_or(true, |worker| worker.is_finished());
            if channel.num_tasks_in_flight > 0 && exited {
                return Err(EngineError::WorkerDisconnected { worker: index });
            }
        }
        Ok(())
    }
}

impl<T: Task> Drop for TaskManager<T> {
    fn drop(&mut self) {
        // Hanging up the senders ends each worker's receive loop.
        for channel in &mut self.channels {
            channel.task_sender.take();
        }
        for (index, channel) in self.channels.iter_mut().enumerate() {
            if let Some(worker) = channel.worker.take() {
                if worker.join().is_err() {
                    debug!("worker {index} panicked before shutdown");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Square(u64);

    impl Task for Square {
        type Output = u64;

        fn process(self) -> u64 {
            self.0 * self.0
        }
    }

    #[test]
    fn test_wait_collects_every_task() {
        let mut manager = TaskManager::new(3, "test");
        for i in 0..20u64 {
            manager.publish_task(i as usize, Square(i)).unwrap();
        }
        let mut results = manager.wait_for_completed_tasks().unwrap();
        results.sort_by_key(|(ticket, _)| *ticket);

        assert_eq!(results.len(), 20);
        for (ticket, output) in results {
            assert_eq!(output, (ticket * ticket) as u64);
        }
        assert_eq!(manager.num_outstanding(), 0);
    }

    #[test]
    fn test_overflow_is_queued() {
        let mut manager = TaskManager::new(1, "test");
        let mut immediate = 0;
        for i in 0..(MAX_TASKS_IN_FLIGHT as u64 + 3) {
            if manager.publish_task(i as usize, Square(i)).unwrap() {
                immediate += 1;
            }
        }
        assert_eq!(immediate, MAX_TASKS_IN_FLIGHT);
        assert_eq!(manager.num_outstanding(), MAX_TASKS_IN_FLIGHT + 3);

        let results = manager.wait_for_completed_tasks().unwrap();
        assert_eq!(results.len(), MAX_TASKS_IN_FLIGHT + 3);
    }

    #[test]
    fn test_polling_eventually_drains() {
        let mut manager = TaskManager::new(2, "test");
        for i in 0..8u64 {
            manager.publish_task(i as usize, Square(i)).unwrap();
        }

        let mut collected = Vec::new();
        let deadline = web_time::Instant::now() + web_time::Duration::from_secs(10);
        while collected.len() < 8 && web_time::Instant::now() < deadline {
            collected.extend(manager.process_completed_tasks().unwrap());
            thread::yield_now();
        }
        assert_eq!(collected.len(), 8);
    }

    #[test]
    fn test_zero_workers_clamped_to_one() {
        let manager: TaskManager<Square> = TaskManager::new(0, "test");
        assert_eq!(manager.num_workers(), 1);
    }
}
