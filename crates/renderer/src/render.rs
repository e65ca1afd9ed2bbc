//! The render capability used by pyramid workers.

use std::path::Path;

use thiserror::Error;
use tile_common::{BoundingBox, TileCoord};

use crate::style::StyleError;

/// Everything a renderer needs to produce one tile.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    /// Where the finished image must be written
    pub path: &'a Path,
    pub coord: TileCoord,
    /// Geographic extent of the tile in degrees
    pub bounds: BoundingBox,
    /// Output width and height in pixels
    pub size: u32,
}

/// Errors raised while rendering a single tile.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid style: {0}")]
    Style(#[from] StyleError),

    #[error("Image encoding failed: {0}")]
    Encode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Renderer panicked: {0}")]
    Panicked(String),

    #[error("Rendering failed: {0}")]
    Failed(String),
}

/// Renders tiles to files.
///
/// Implementations are owned by exactly one worker and are never shared
/// between threads, so they need not be `Send` or `Sync`.
pub trait TileRenderer {
    /// Render `request.coord` and persist the image at `request.path`.
    fn render(&mut self, request: &RenderRequest<'_>) -> Result<(), RenderError>;
}

/// Builds one renderer per worker, on the worker's own thread.
pub trait RendererFactory: Sync {
    type Renderer: TileRenderer;

    fn create(&self, worker: usize) -> Result<Self::Renderer, RenderError>;

    /// Size in bytes of a blank `tile_size` tile from this factory's
    /// renderers, when the encoding is deterministic enough to know it.
    fn blank_tile_bytes(&self, _tile_size: u32) -> Result<Option<u64>, RenderError> {
        Ok(None)
    }
}

impl<F, R> RendererFactory for F
where
    F: Fn(usize) -> Result<R, RenderError> + Sync,
    R: TileRenderer,
{
    type Renderer = R;

    fn create(&self, worker: usize) -> Result<R, RenderError> {
        self(worker)
    }
}
