//! # Task System Core Trait
//!
//! A `Task` is one independent unit of work: generating the block data for a
//! single chunk coordinate, or meshing a single chunk. Tasks own everything they
//! read (coordinates, shared immutable buffers behind `Arc`), so a worker never
//! touches the chunk store directly.
//!
//! ## Task Lifecycle
//! 1. A scheduler builds a `Task` per coordinate and publishes it to its `TaskManager`
//! 2. The task's `process()` method runs on a worker thread
//! 3. The `Output` is sent back tagged with the task's position in its batch
//! 4. The scheduler merges every output on the tick thread once the whole batch has joined

/// A unit of work that can be executed on a worker thread.
///
/// # Implementation Guidelines
/// - Must be `Send + 'static` to be transferred between threads
/// - Must be a pure function of its fields; outputs of one batch are written to
///   disjoint locations, so no synchronisation is needed while tasks run
/// - Should not panic; a panicking task disconnects its worker
pub trait Task: Send + 'static {
    /// The value handed back to the tick thread.
    type Output: Send + 'static;

    /// Performs the work and returns its output.
    fn process(self) -> Self::Output;
}
