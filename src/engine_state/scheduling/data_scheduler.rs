//! # Data Scheduler
//!
//! Streams block data for coordinates that entered the load region. Each batch
//! generates its chunks in parallel; the results are written into the chunk
//! store together when the whole batch has finished.

use std::sync::Arc;

use log::{info, trace, warn};
use web_time::Instant;

use crate::engine_state::voxels::{
    chunk::{Chunk, ChunkExtent, ChunkState},
    coord::ChunkCoordinate,
    generation::{TerrainGenerator, WorldTheme},
    tasks::chunk_generation_task::{ChunkGenerationTask, ChunkGenerationTaskResult},
    world::World,
};
use crate::error::EngineError;

use super::batch_scheduler::{BatchScheduler, SchedulerState};

/// Batched chunk generation.
pub struct DataScheduler {
    scheduler: BatchScheduler<ChunkGenerationTask>,
    extent: ChunkExtent,
    generator: Arc<TerrainGenerator>,
    theme: Arc<dyn WorldTheme>,
}

impl DataScheduler {
    /// Creates an idle data scheduler.
    pub fn new(
        extent: ChunkExtent,
        generator: Arc<TerrainGenerator>,
        theme: Arc<dyn WorldTheme>,
        batch_size: usize,
        num_workers: usize,
    ) -> Self {
        DataScheduler {
            scheduler: BatchScheduler::new("chunk-data", batch_size, num_workers),
            extent,
            generator,
            theme,
        }
    }

    /// Queues coordinates for generation and marks them `QueuedData` in the store.
    pub fn enqueue(&mut self, world: &mut World, coordinates: impl IntoIterator<Item = ChunkCoordinate>) {
        let coordinates: Vec<_> = coordinates.into_iter().collect();
        for position in &coordinates {
            world.set_pending(*position, ChunkState::QueuedData);
        }
        self.scheduler.enqueue(coordinates);
    }

    /// Drops a coordinate from the queue. Returns `false` if it was not queued,
    /// which means it is either unknown or part of the batch in flight.
    pub fn cancel_queued(&mut self, position: ChunkCoordinate) -> bool {
        self.scheduler.remove_queued(|queued| queued == position) > 0
    }

    /// Launches the next batch of generation tasks.
    pub fn step_begin(&mut self, world: &World) -> Result<usize, EngineError> {
        let (extent, generator, theme) = (self.extent, &self.generator, &self.theme);
        self.scheduler.step_begin(|position| {
            build_task(world, position, extent, generator, theme)
        })
    }

    /// Polls the batch in flight and merges it into the store once complete.
    ///
    /// # Returns
    /// `Some(coordinates)` newly holding block data once a batch merged, `None`
    /// while the batch is still running or no batch is in flight.
    pub fn step_complete(&mut self, world: &mut World) -> Result<Option<Vec<ChunkCoordinate>>, EngineError> {
        let mut merged = Vec::new();
        let completed = self
            .scheduler
            .step_complete(|result| merge_result(world, result, &mut merged))?;
        Ok(completed.then_some(merged))
    }

    /// Generates every queued coordinate, blocking until all are in the store.
    ///
    /// Used once at world start, before the world is considered ready.
    pub fn initial_fill(&mut self, world: &mut World) -> Result<Vec<ChunkCoordinate>, EngineError> {
        let started = Instant::now();
        let mut merged = Vec::new();

        // A batch left running by earlier ticks has to land first.
        self.scheduler
            .wait_complete(|result| merge_result(world, result, &mut merged))?;

        let (extent, generator, theme) = (self.extent, &self.generator, &self.theme);
        let snapshot: &World = world;
        let mut results = Vec::new();
        self.scheduler.drain_blocking(
            |position| build_task(snapshot, position, extent, generator, theme),
            |result| results.push(result),
        )?;
        for result in results {
            merge_result(world, result, &mut merged);
        }

        info!(
            "Initial fill generated {} chunks in {:?}",
            merged.len(),
            started.elapsed()
        );
        Ok(merged)
    }

    /// Whether there is queued or in-flight generation.
    pub fn has_pending(&self) -> bool {
        self.scheduler.has_pending()
    }

    /// Whether no batch is in flight.
    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle()
    }

    /// State of the underlying batch scheduler.
    pub fn state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Coordinates waiting for a batch.
    pub fn queue_len(&self) -> usize {
        self.scheduler.queue_len()
    }
}

fn build_task(
    world: &World,
    position: ChunkCoordinate,
    extent: ChunkExtent,
    generator: &Arc<TerrainGenerator>,
    theme: &Arc<dyn WorldTheme>,
) -> Option<ChunkGenerationTask> {
    if world.state_of(position) != ChunkState::QueuedData {
        return None;
    }
    Some(ChunkGenerationTask::new(
        position,
        extent,
        Arc::clone(generator),
        Arc::clone(theme),
    ))
}

fn merge_result(world: &mut World, result: ChunkGenerationTaskResult, merged: &mut Vec<ChunkCoordinate>) {
    let position = result.position;
    match world.clear_pending(position) {
        Some(ChunkState::QueuedData) => {
            trace!(
                "Chunk {:?} generated with {} runs ({} bytes)",
                position,
                result.blocks.run_count(),
                result.blocks.memory_runs()
            );
            world.insert(Chunk::new(position, result.blocks));
            merged.push(position);
        }
        Some(ChunkState::QueuedUnload) => {
            warn!("Discarding chunk {:?}, it left the load region", position);
        }
        other => {
            warn!("Discarding generated chunk {:?} in unexpected state {:?}", position, other);
        }
    }
}
