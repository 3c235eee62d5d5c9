//! # Pipeline Scheduler
//!
//! Arbitrates between the data and mesh schedulers so at most one heavy phase
//! is driven per tick.
//!
//! ```text
//!            mesh pending               batch merged / nothing launched
//!   Idle ─────────────────► Meshing ───────────────────────────────► Idle
//!     │  data pending (no mesh work)
//!     └───────────────────► Streaming ─────────────────────────────► Idle
//! ```
//!
//! From `Idle`, pending mesh work wins. The active phase keeps the tick until
//! its scheduler merges a batch (or finds nothing to launch), then the pipeline
//! returns to `Idle` and re-evaluates on the next tick.

use log::trace;

use crate::engine_state::{
    rendering::meshing::PresentationSink,
    voxels::{coord::ChunkCoordinate, world::World},
};
use crate::error::EngineError;

use super::{data_scheduler::DataScheduler, mesh_scheduler::MeshScheduler};

/// Which scheduler the pipeline is driving.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PipelinePhase {
    /// Neither scheduler has work.
    #[default]
    Idle,
    /// The data scheduler is being driven.
    Streaming,
    /// The mesh scheduler is being driven.
    Meshing,
}

/// What happened during one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The phase that was driven.
    pub phase: PipelinePhase,
    /// Tasks launched this tick.
    pub launched: usize,
    /// Coordinates whose block data landed in the store this tick.
    pub merged_data: Vec<ChunkCoordinate>,
    /// Meshes handed to the presentation layer this tick.
    pub presented: usize,
}

/// The top-level state machine over the two batch schedulers.
pub struct PipelineScheduler {
    phase: PipelinePhase,
    data: DataScheduler,
    mesh: MeshScheduler,
}

impl PipelineScheduler {
    /// Creates an idle pipeline over the given schedulers.
    pub fn new(data: DataScheduler, mesh: MeshScheduler) -> Self {
        PipelineScheduler {
            phase: PipelinePhase::Idle,
            data,
            mesh,
        }
    }

    /// The phase the next tick will drive, or `Idle`.
    pub fn phase(&self) -> PipelinePhase {
        self.phase
    }

    /// The data scheduler.
    pub fn data(&self) -> &DataScheduler {
        &self.data
    }

    /// The data scheduler, for enqueuing and cancelling.
    pub fn data_mut(&mut self) -> &mut DataScheduler {
        &mut self.data
    }

    /// The mesh scheduler.
    pub fn mesh(&self) -> &MeshScheduler {
        &self.mesh
    }

    /// The mesh scheduler, for enqueuing and cancelling.
    pub fn mesh_mut(&mut self) -> &mut MeshScheduler {
        &mut self.mesh
    }

    /// Whether either scheduler has queued or in-flight work.
    pub fn has_pending(&self) -> bool {
        self.data.has_pending() || self.mesh.has_pending()
    }

    fn select_phase(&self) -> PipelinePhase {
        if self.mesh.has_pending() {
            PipelinePhase::Meshing
        } else if self.data.has_pending() {
            PipelinePhase::Streaming
        } else {
            PipelinePhase::Idle
        }
    }

    /// Drives the active phase by one step.
    ///
    /// An idle scheduler gets `step_begin`, a running one gets `step_complete`.
    pub fn tick(
        &mut self,
        world: &mut World,
        sink: &mut dyn PresentationSink,
    ) -> Result<TickReport, EngineError> {
        if self.phase == PipelinePhase::Idle {
            self.phase = self.select_phase();
            if self.phase != PipelinePhase::Idle {
                trace!("Pipeline entering {:?}", self.phase);
            }
        }

        let mut report = TickReport {
            phase: self.phase,
            ..TickReport::default()
        };

        match self.phase {
            PipelinePhase::Idle => {}
            PipelinePhase::Streaming => {
                if self.data.is_idle() {
                    report.launched = self.data.step_begin(world)?;
                    if report.launched == 0 {
                        self.phase = PipelinePhase::Idle;
                    }
                } else if let Some(merged) = self.data.step_complete(world)? {
                    report.merged_data = merged;
                    self.phase = PipelinePhase::Idle;
                }
            }
            PipelinePhase::Meshing => {
                if self.mesh.is_idle() {
                    report.launched = self.mesh.step_begin(world)?;
                    if report.launched == 0 {
                        self.phase = PipelinePhase::Idle;
                    }
                } else if let Some(presented) = self.mesh.step_complete(world, sink)? {
                    report.presented = presented;
                    self.phase = PipelinePhase::Idle;
                }
            }
        }

        Ok(report)
    }
}
