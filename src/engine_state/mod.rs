//! # Engine State Module
//!
//! The host-facing streaming pipeline. The host calls [`EngineState::tick`] once
//! per frame with the focus position; the engine resolves it to a focus chunk,
//! diffs the load and draw regions when the focus crosses a chunk boundary, and
//! drives one scheduler step.
//!
//! ## Key Components
//!
//! * `EngineState` - Owns the chunk store, the schedulers and the presentation sink
//! * `rendering` - Greedy meshing, mesh buffers and the presentation sink
//! * `scheduling` - Batched data and mesh phases and the pipeline state machine
//! * `task_management` - Worker threads running one batch in parallel
//! * `voxels` - Blocks, compressed chunks, the chunk store, generation and view regions
//!
//! ## Region rules
//!
//! Two cubes follow the focus. Chunks inside the load cube hold block data; chunks
//! inside the smaller draw cube are additionally meshed once all six face-neighbors
//! are loaded. A chunk leaving a cube is cancelled if its work is still queued, or
//! marked and discarded at merge if its batch is already in flight.

use std::sync::Arc;

use cgmath::Point3;
use log::{debug, info, trace};

use rendering::meshing::PresentationSink;
use scheduling::{DataScheduler, MeshScheduler, PipelinePhase, PipelineScheduler, TickReport};
use voxels::{
    chunk::{ChunkExtent, ChunkState},
    coord::ChunkCoordinate,
    generation::{theme_by_name, TerrainGenerator},
    view_region::{diff_regions, sort_nearest_first, ViewRegion},
    world::World,
};

use crate::config::EngineConfig;
use crate::error::EngineError;

pub mod rendering;
pub mod scheduling;
pub mod task_management;
pub mod voxels;

/// A snapshot of pipeline progress.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Chunks holding block data.
    pub chunks_loaded: usize,
    /// Chunks whose mesh is with the presentation layer.
    pub chunks_meshed: usize,
    /// Coordinates waiting for, or undergoing, generation.
    pub queued_data: usize,
    /// Chunks waiting for, or undergoing, meshing.
    pub queued_mesh: usize,
    /// Coordinates that left the load region while their batch was in flight.
    pub queued_unload: usize,
    /// The phase the pipeline will drive next.
    pub phase: PipelinePhase,
}

/// The streaming pipeline.
///
/// Generic over the presentation layer so hosts can plug in their own renderer;
/// [`RenderObjectPool`](rendering::RenderObjectPool) is the in-memory default.
///
/// # Examples
///
/// ```ignore
/// let mut engine = EngineState::new(EngineConfig::default(), RenderObjectPool::new(4096))?;
/// engine.initial_fill(Point3::new(0, 0, 0))?;
///
/// // Main loop
/// loop {
///     engine.tick(player_position)?;
/// }
/// ```
pub struct EngineState<S: PresentationSink> {
    config: EngineConfig,
    extent: ChunkExtent,
    /// The chunk store
    world: World,
    pipeline: PipelineScheduler,
    /// Receives finished meshes and releases
    sink: S,
    /// Current focus chunk
    focus: ChunkCoordinate,
    /// Whether the load cube around `focus` has been requested
    started: bool,
    /// Whether the initial fill has completed
    ready: bool,
}

impl<S: PresentationSink> EngineState<S> {
    /// Creates an engine from a configuration and a presentation sink.
    ///
    /// Nothing is generated until [`initial_fill`](Self::initial_fill) or the
    /// first [`tick`](Self::tick).
    ///
    /// # Returns
    /// `InvalidConfig` if the configuration fails validation or names an unknown theme.
    pub fn new(config: EngineConfig, sink: S) -> Result<Self, EngineError> {
        config.validate()?;
        let theme = theme_by_name(&config.theme).ok_or_else(|| {
            EngineError::InvalidConfig(format!("unknown theme {:?}", config.theme))
        })?;
        let extent = ChunkExtent::from_array(config.chunk_extent);
        let generator = Arc::new(TerrainGenerator::new(&config.noise));

        let data = DataScheduler::new(
            extent,
            generator,
            Arc::clone(&theme),
            config.data_batch_size,
            config.num_workers,
        );
        let mesh = MeshScheduler::new(theme, config.mesh_batch_size, config.num_workers);

        info!(
            "Engine constructed: theme {}, extent {:?}, load radius {}, draw radius {}, seed {}",
            config.theme, config.chunk_extent, config.load_radius, config.draw_radius, config.noise.seed
        );

        Ok(EngineState {
            extent,
            world: World::new(extent),
            pipeline: PipelineScheduler::new(data, mesh),
            sink,
            focus: ChunkCoordinate::ORIGIN,
            started: false,
            ready: false,
            config,
        })
    }

    /// Generates every chunk of the load cube around `focus`, blocking until done.
    ///
    /// Afterwards the draw cube is queued for meshing and the engine is ready.
    ///
    /// # Returns
    /// The number of chunks generated.
    pub fn initial_fill(&mut self, focus: Point3<i32>) -> Result<usize, EngineError> {
        let focus = ChunkCoordinate::containing(focus, self.extent);
        if self.started && focus != self.focus {
            self.move_focus(focus);
        }
        self.focus = focus;
        self.request_load_region();

        let merged = self.pipeline.data_mut().initial_fill(&mut self.world)?;
        self.ready = true;

        let draw_region = ViewRegion::new(self.focus, self.config.draw_radius).coordinates(self.extent);
        let queued = self.enqueue_mesh_candidates(draw_region);
        info!(
            "World ready around {:?}: {} chunks loaded, {} queued for meshing",
            self.focus,
            self.world.len(),
            queued
        );
        Ok(merged.len())
    }

    /// Advances the pipeline by one frame.
    ///
    /// Resolves `focus` to its chunk, applies the region diff if that chunk
    /// changed, then drives one step of the active scheduler.
    pub fn tick(&mut self, focus: Point3<i32>) -> Result<TickReport, EngineError> {
        let focus = ChunkCoordinate::containing(focus, self.extent);
        if !self.started {
            self.focus = focus;
            self.request_load_region();
        } else if focus != self.focus {
            self.move_focus(focus);
        }

        let report = self.pipeline.tick(&mut self.world, &mut self.sink)?;

        for position in self.sink.take_evicted() {
            if self.world.state_of(position) == ChunkState::Meshed {
                debug!("Chunk {:?} was evicted by the presentation sink", position);
                self.world.set_state(position, ChunkState::Loaded);
            }
        }

        if !report.merged_data.is_empty() {
            let mut candidates = Vec::with_capacity(report.merged_data.len() * 7);
            for position in &report.merged_data {
                candidates.push(*position);
                candidates.extend(position.neighbors(self.extent));
            }
            self.enqueue_mesh_candidates(candidates);
        }
        Ok(report)
    }

    /// Current pipeline counters.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            chunks_loaded: self.world.len(),
            chunks_meshed: self.world.count_in_state(ChunkState::Meshed),
            queued_data: self.world.count_in_state(ChunkState::QueuedData),
            queued_mesh: self.world.count_in_state(ChunkState::QueuedMesh),
            queued_unload: self.world.count_in_state(ChunkState::QueuedUnload),
            phase: self.pipeline.phase(),
        }
    }

    /// Whether the initial fill has completed.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Whether the pipeline has no queued or in-flight work.
    pub fn is_settled(&self) -> bool {
        !self.pipeline.has_pending()
    }

    /// The current focus chunk.
    pub fn focus(&self) -> ChunkCoordinate {
        self.focus
    }

    /// The configuration the engine was built from.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The chunk store.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The presentation sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The presentation sink, mutably.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Queues every untracked coordinate of the load cube for generation.
    fn request_load_region(&mut self) {
        let fresh: Vec<_> = ViewRegion::new(self.focus, self.config.load_radius)
            .coordinates(self.extent)
            .into_iter()
            .filter(|position| self.world.state_of(*position) == ChunkState::Unloaded)
            .collect();
        debug!("Requesting {} chunks around {:?}", fresh.len(), self.focus);
        self.pipeline.data_mut().enqueue(&mut self.world, fresh);
        self.started = true;
    }

    fn move_focus(&mut self, focus: ChunkCoordinate) {
        let old = self.focus;
        self.focus = focus;

        let load = diff_regions(old, focus, self.config.load_radius, self.extent);
        let draw = diff_regions(old, focus, self.config.draw_radius, self.extent);
        debug!(
            "Focus {:?} -> {:?}: load +{}/-{}, draw +{}/-{}",
            old,
            focus,
            load.enter.len(),
            load.exit.len(),
            draw.enter.len(),
            draw.exit.len()
        );

        for position in draw.exit {
            self.leave_draw_region(position);
        }
        for position in load.exit {
            self.leave_load_region(position);
        }

        let mut to_generate = Vec::with_capacity(load.enter.len());
        for position in load.enter {
            match self.world.state_of(position) {
                ChunkState::Unloaded => to_generate.push(position),
                ChunkState::QueuedUnload if !self.world.contains(position) => {
                    trace!("Chunk {:?} re-entered while generating", position);
                    self.world.set_pending(position, ChunkState::QueuedData);
                }
                ChunkState::QueuedUnload => {
                    trace!("Chunk {:?} re-entered while meshing", position);
                    self.world.set_state(position, ChunkState::Loaded);
                }
                _ => {}
            }
        }
        self.pipeline.data_mut().enqueue(&mut self.world, to_generate);

        self.enqueue_mesh_candidates(draw.enter);
    }

    fn leave_draw_region(&mut self, position: ChunkCoordinate) {
        match self.world.state_of(position) {
            ChunkState::QueuedMesh => {
                // An in-flight mesh for a `Loaded` chunk is discarded at merge.
                self.pipeline.mesh_mut().cancel_queued(position);
                self.world.set_state(position, ChunkState::Loaded);
            }
            ChunkState::Meshed => {
                self.sink.release(position);
                self.world.set_state(position, ChunkState::Loaded);
            }
            _ => {}
        }
    }

    fn leave_load_region(&mut self, position: ChunkCoordinate) {
        match self.world.state_of(position) {
            ChunkState::QueuedData => {
                if self.pipeline.data_mut().cancel_queued(position) {
                    self.world.clear_pending(position);
                } else {
                    self.world.set_pending(position, ChunkState::QueuedUnload);
                }
            }
            ChunkState::Loaded => {
                self.world.remove(position);
            }
            ChunkState::QueuedMesh => {
                if self.pipeline.mesh_mut().cancel_queued(position) {
                    self.world.remove(position);
                } else {
                    self.world.set_state(position, ChunkState::QueuedUnload);
                }
            }
            ChunkState::Meshed => {
                self.sink.release(position);
                self.world.remove(position);
            }
            ChunkState::Unloaded | ChunkState::QueuedUnload => {}
        }
        trace!("Chunk {:?} left the load region", position);
    }

    /// Queues every candidate that is in the draw cube, `Loaded`, and fully
    /// surrounded by loaded chunks. Returns how many were queued.
    fn enqueue_mesh_candidates(&mut self, candidates: impl IntoIterator<Item = ChunkCoordinate>) -> usize {
        let draw_region = ViewRegion::new(self.focus, self.config.draw_radius);
        let mut candidates: Vec<_> = candidates
            .into_iter()
            .filter(|position| draw_region.contains(*position, self.extent))
            .collect();
        sort_nearest_first(&mut candidates, self.focus, self.extent);
        candidates.dedup();

        let mut queued = 0;
        for position in candidates {
            if self.world.state_of(position) == ChunkState::Loaded
                && self.world.has_loaded_neighborhood(position)
                && self.pipeline.mesh_mut().enqueue(&mut self.world, position)
            {
                queued += 1;
            }
        }
        queued
    }
}

#[cfg(test)]
mod tests {
    use web_time::{Duration, Instant};

    use super::*;
    use crate::config::NoiseConfig;
    use crate::engine_state::rendering::RenderObjectPool;

    fn stone_config() -> EngineConfig {
        EngineConfig {
            chunk_extent: [4, 4, 4],
            load_radius: 2,
            draw_radius: 1,
            noise: NoiseConfig {
                octaves: 0,
                ..NoiseConfig::default()
            },
            data_batch_size: 8,
            mesh_batch_size: 4,
            num_workers: 2,
            theme: "stone".to_string(),
            max_presented_meshes: 1024,
        }
    }

    fn settle(engine: &mut EngineState<RenderObjectPool>, focus: Point3<i32>) {
        let deadline = Instant::now() + Duration::from_secs(20);
        loop {
            engine.tick(focus).unwrap();
            if engine.is_settled() {
                return;
            }
            assert!(Instant::now() < deadline, "pipeline did not settle");
            std::thread::yield_now();
        }
    }

    #[test]
    fn test_unknown_theme_rejected() {
        let config = EngineConfig {
            theme: "marble".to_string(),
            ..stone_config()
        };
        let result = EngineState::new(config, RenderObjectPool::new(8));
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_initial_fill_loads_cube_and_queues_draw_region() {
        let mut engine = EngineState::new(stone_config(), RenderObjectPool::new(1024)).unwrap();
        assert!(!engine.is_ready());
        let generated = engine.initial_fill(Point3::new(1, 1, 1)).unwrap();

        assert_eq!(generated, 125);
        assert!(engine.is_ready());
        let stats = engine.stats();
        assert_eq!(stats.chunks_loaded, 125);
        assert_eq!(stats.queued_mesh, 27);
        assert_eq!(stats.queued_data, 0);
    }

    #[test]
    fn test_draw_region_gets_meshed() {
        let mut engine = EngineState::new(stone_config(), RenderObjectPool::new(1024)).unwrap();
        engine.initial_fill(Point3::new(0, 0, 0)).unwrap();
        settle(&mut engine, Point3::new(0, 0, 0));

        assert_eq!(engine.stats().chunks_meshed, 27);
        assert_eq!(engine.sink().len(), 27);
    }

    #[test]
    fn test_focus_move_releases_and_unloads() {
        let mut engine = EngineState::new(stone_config(), RenderObjectPool::new(1024)).unwrap();
        engine.initial_fill(Point3::new(0, 0, 0)).unwrap();
        settle(&mut engine, Point3::new(0, 0, 0));

        let left = ChunkCoordinate::from_grid(-1, 0, 0, ChunkExtent::new(4, 4, 4));
        assert!(engine.sink().contains(left));

        settle(&mut engine, Point3::new(4, 0, 0));
        assert_eq!(engine.focus(), ChunkCoordinate::from_grid(1, 0, 0, ChunkExtent::new(4, 4, 4)));
        assert!(!engine.sink().contains(left));
        assert_eq!(engine.world().state_of(left), ChunkState::Loaded);

        let far_left = ChunkCoordinate::from_grid(-2, 0, 0, ChunkExtent::new(4, 4, 4));
        assert!(!engine.world().contains(far_left));
        let stats = engine.stats();
        assert_eq!(stats.chunks_loaded, 125);
        assert_eq!(stats.chunks_meshed, 27);
        assert_eq!(engine.sink().len(), 27);
    }

    #[test]
    fn test_sink_evictions_unmesh_chunks() {
        let mut engine = EngineState::new(stone_config(), RenderObjectPool::new(10)).unwrap();
        engine.initial_fill(Point3::new(0, 0, 0)).unwrap();
        settle(&mut engine, Point3::new(0, 0, 0));

        assert_eq!(engine.sink().len(), 10);
        assert_eq!(engine.sink().evictions(), 17);
        let stats = engine.stats();
        assert_eq!(stats.chunks_meshed, 10);
        assert_eq!(stats.queued_mesh, 0);
        for position in engine.sink().positions() {
            assert_eq!(engine.world().state_of(position), ChunkState::Meshed);
        }
    }

    #[test]
    fn test_tick_without_initial_fill_streams() {
        let mut engine = EngineState::new(stone_config(), RenderObjectPool::new(1024)).unwrap();
        settle(&mut engine, Point3::new(0, 0, 0));
        assert!(!engine.is_ready());
        assert_eq!(engine.stats().chunks_loaded, 125);
        assert_eq!(engine.stats().chunks_meshed, 27);
    }
}
