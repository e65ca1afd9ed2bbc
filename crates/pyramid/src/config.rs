//! Pyramid run configuration.

use std::path::PathBuf;

use projection::DEFAULT_TILE_SIZE;
use storage::EmptyTilePolicy;
use tile_common::{BoundingBox, TileError, TileResult, ZoomRange};

/// Worker threads used when none are configured.
pub const DEFAULT_WORKERS: usize = 4;

/// Bounded queue size between the dispatcher and the workers.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// Label used in completion records when the caller gives none.
pub const DEFAULT_LABEL: &str = "unknown";

/// Everything one `render_tiles` run needs besides the renderer.
#[derive(Debug, Clone)]
pub struct PyramidConfig {
    /// Region to cover at every zoom
    pub bbox: BoundingBox,
    /// Root of the `{z}/{x}/{y}.png` tree
    pub output_dir: PathBuf,
    pub zoom: ZoomRange,
    /// Copied into every completion record for log correlation
    pub label: String,
    pub workers: usize,
    pub queue_capacity: usize,
    /// Tile edge in pixels
    pub tile_size: u32,
    pub empty_tile: EmptyTilePolicy,
}

impl PyramidConfig {
    pub fn new(bbox: BoundingBox, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            bbox,
            output_dir: output_dir.into(),
            zoom: ZoomRange::default(),
            label: DEFAULT_LABEL.to_string(),
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            tile_size: DEFAULT_TILE_SIZE,
            empty_tile: EmptyTilePolicy::default(),
        }
    }

    pub fn with_zoom(mut self, zoom: ZoomRange) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_empty_tile_bytes(mut self, bytes: u64) -> Self {
        self.empty_tile = EmptyTilePolicy::new(bytes);
        self
    }

    /// Reject configurations that cannot run, before any work is dispatched.
    pub fn validate(&self) -> TileResult<()> {
        self.bbox.validate()?;
        // Re-check in case the range was built by hand
        ZoomRange::new(self.zoom.min(), self.zoom.max())?;

        if self.workers == 0 {
            return Err(TileError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(TileError::InvalidConfig(
                "queue capacity must be at least 1".to_string(),
            ));
        }
        if self.tile_size == 0 {
            return Err(TileError::InvalidConfig(
                "tile size must be at least 1 pixel".to_string(),
            ));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(TileError::InvalidConfig("output directory is empty".to_string()));
        }
        Ok(())
    }
}
