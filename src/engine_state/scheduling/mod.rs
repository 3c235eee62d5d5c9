//! # Scheduling
//!
//! Batched, tick-driven phases of the streaming pipeline.
//!
//! * `batch_scheduler` - generic FIFO + fixed batch size + `Idle | Running`
//! * `data_scheduler` - block generation for coordinates entering the load region
//! * `mesh_scheduler` - greedy meshing for chunks entering the draw region
//! * `pipeline_scheduler` - the top-level state machine driving one of the two per tick

mod batch_scheduler;
mod data_scheduler;
mod mesh_scheduler;
mod pipeline_scheduler;

pub use batch_scheduler::{BatchScheduler, SchedulerState};
pub use data_scheduler::DataScheduler;
pub use mesh_scheduler::MeshScheduler;
pub use pipeline_scheduler::{PipelinePhase, PipelineScheduler, TickReport};
