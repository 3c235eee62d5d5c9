//! # Mesh Scheduler
//!
//! Streams meshes for chunks that became eligible for drawing. Tasks mesh a
//! snapshot of the chunk and its neighbors; finished meshes go to the
//! presentation layer when the batch merges.

use std::sync::Arc;

use log::warn;

use crate::engine_state::{
    rendering::{
        meshing::{ChunkNeighborhood, PresentationSink},
        tasks::chunk_mesh_generation_task::{ChunkMeshGenerationTask, ChunkMeshGenerationTaskResult},
    },
    voxels::{chunk::ChunkState, coord::ChunkCoordinate, generation::WorldTheme, world::World},
};
use crate::error::EngineError;

use super::batch_scheduler::{BatchScheduler, SchedulerState};

/// Batched chunk meshing.
pub struct MeshScheduler {
    scheduler: BatchScheduler<ChunkMeshGenerationTask>,
    theme: Arc<dyn WorldTheme>,
}

impl MeshScheduler {
    /// Creates an idle mesh scheduler.
    pub fn new(theme: Arc<dyn WorldTheme>, batch_size: usize, num_workers: usize) -> Self {
        MeshScheduler {
            scheduler: BatchScheduler::new("chunk-mesh", batch_size, num_workers),
            theme,
        }
    }

    /// Queues a loaded chunk for meshing and marks it `QueuedMesh`.
    ///
    /// Returns `false`, queuing nothing, if the chunk is not `Loaded`.
    pub fn enqueue(&mut self, world: &mut World, position: ChunkCoordinate) -> bool {
        if world.state_of(position) != ChunkState::Loaded {
            return false;
        }
        world.set_state(position, ChunkState::QueuedMesh);
        self.scheduler.enqueue([position]);
        true
    }

    /// Drops a coordinate from the queue. Returns `false` if it was not queued.
    pub fn cancel_queued(&mut self, position: ChunkCoordinate) -> bool {
        self.scheduler.remove_queued(|queued| queued == position) > 0
    }

    /// Launches the next batch of mesh tasks.
    pub fn step_begin(&mut self, world: &World) -> Result<usize, EngineError> {
        let theme = &self.theme;
        self.scheduler.step_begin(|position| {
            if world.state_of(position) != ChunkState::QueuedMesh {
                return None;
            }
            let neighborhood = ChunkNeighborhood::from_world(world, position)?;
            Some(ChunkMeshGenerationTask::new(
                position,
                neighborhood,
                Arc::clone(theme),
            ))
        })
    }

    /// Polls the batch in flight and presents its meshes once complete.
    ///
    /// # Returns
    /// `Some(count)` of meshes presented once a batch merged, `None` otherwise.
    pub fn step_complete(
        &mut self,
        world: &mut World,
        sink: &mut dyn PresentationSink,
    ) -> Result<Option<usize>, EngineError> {
        let mut presented = 0;
        let completed = self.scheduler.step_complete(|result| {
            if merge_result(world, sink, result) {
                presented += 1;
            }
        })?;
        Ok(completed.then_some(presented))
    }

    /// Whether there is queued or in-flight meshing.
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

fn merge_result(
    world: &mut World,
    sink: &mut dyn PresentationSink,
    result: ChunkMeshGenerationTaskResult,
) -> bool {
    let position = result.position;
    match world.state_of(position) {
        ChunkState::QueuedMesh => {
            world.set_state(position, ChunkState::Meshed);
            sink.present(position, result.mesh);
            true
        }
        ChunkState::QueuedUnload => {
            warn!("Discarding mesh for {:?}, it left the load region", position);
            world.remove(position);
            false
        }
        ChunkState::Loaded => {
            warn!("Discarding mesh for {:?}, it left the draw region", position);
            false
        }
        other => {
            warn!("Discarding mesh for {:?} in unexpected state {:?}", position, other);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use web_time::Instant;

    use super::*;
    use crate::engine_state::{
        rendering::RenderObjectPool,
        voxels::{
            block::{block_side::BlockSide, block_type::BlockType},
            chunk::{Chunk, ChunkExtent},
            generation::StoneTheme,
        },
    };

    const EXTENT: ChunkExtent = ChunkExtent::new(4, 4, 4);

    fn run_batch(mesh: &mut MeshScheduler, world: &mut World, pool: &mut RenderObjectPool) -> usize {
        let deadline = Instant::now() + web_time::Duration::from_secs(10);
        while Instant::now() < deadline {
            if let Some(presented) = mesh.step_complete(world, pool).unwrap() {
                return presented;
            }
            std::thread::yield_now();
        }
        panic!("batch did not complete");
    }

    fn floor_world() -> World {
        let mut world = World::new(EXTENT);
        let floor = Chunk::from_fn(ChunkCoordinate::ORIGIN, EXTENT, |p| {
            if p.y == 0 {
                BlockType::STONE
            } else {
                BlockType::AIR
            }
        });
        world.insert(floor);
        world
    }

    #[test]
    fn test_meshes_are_presented_on_merge() {
        let mut world = floor_world();
        let mut pool = RenderObjectPool::new(16);
        let mut mesh = MeshScheduler::new(Arc::new(StoneTheme), 4, 1);

        assert!(mesh.enqueue(&mut world, ChunkCoordinate::ORIGIN));
        assert!(!mesh.enqueue(&mut world, ChunkCoordinate::ORIGIN));
        assert_eq!(mesh.step_begin(&world), Ok(1));
        assert_eq!(run_batch(&mut mesh, &mut world, &mut pool), 1);

        assert_eq!(world.state_of(ChunkCoordinate::ORIGIN), ChunkState::Meshed);
        let presented = pool.get(ChunkCoordinate::ORIGIN).expect("mesh presented");
        assert_eq!(presented.quads_on_side(BlockSide::TOP), 1);
    }

    #[test]
    fn test_unload_during_meshing_drops_chunk() {
        let mut world = floor_world();
        let mut pool = RenderObjectPool::new(16);
        let mut mesh = MeshScheduler::new(Arc::new(StoneTheme), 4, 1);

        mesh.enqueue(&mut world, ChunkCoordinate::ORIGIN);
        mesh.step_begin(&world).unwrap();
        world.set_state(ChunkCoordinate::ORIGIN, ChunkState::QueuedUnload);

        assert_eq!(run_batch(&mut mesh, &mut world, &mut pool), 0);
        assert!(pool.is_empty());
        assert!(!world.contains(ChunkCoordinate::ORIGIN));
    }
}
