//! Built-in renderer that paints tiles from a [`StyleDefinition`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use projection::mercator_y;
use tile_common::BoundingBox;
use tracing::{debug, trace};

use crate::canvas::Canvas;
use crate::render::{RenderError, RenderRequest, RendererFactory, TileRenderer};
use crate::style::{GraticuleStyle, StyleDefinition};

/// Renders tiles for one worker.
///
/// The style is shared read-only between workers; everything else belongs
/// to the owning worker.
#[derive(Debug)]
pub struct StyleRenderer {
    worker: usize,
    style: Arc<StyleDefinition>,
    tiles_rendered: u64,
}

impl StyleRenderer {
    pub fn new(worker: usize, style: Arc<StyleDefinition>) -> Self {
        Self {
            worker,
            style,
            tiles_rendered: 0,
        }
    }

    pub fn tiles_rendered(&self) -> u64 {
        self.tiles_rendered
    }

    /// Paint a tile into a fresh canvas.
    pub fn paint(&self, bounds: &BoundingBox, size: u32) -> Canvas {
        let size = size as usize;
        let mut canvas = Canvas::new(size, size, self.style.background);

        if let Some(graticule) = &self.style.graticule {
            draw_graticule(&mut canvas, bounds, graticule);
        }
        if let Some(border) = &self.style.tile_border {
            canvas.outline(border.color);
        }

        canvas
    }
}

impl TileRenderer for StyleRenderer {
    fn render(&mut self, request: &RenderRequest<'_>) -> Result<(), RenderError> {
        let canvas = self.paint(&request.bounds, request.size);
        let png = canvas.encode_png().map_err(RenderError::Encode)?;

        write_atomically(request.path, &png)?;
        self.tiles_rendered += 1;

        trace!(
            worker = self.worker,
            tile = %request.coord,
            bytes = png.len(),
            "Tile written"
        );
        Ok(())
    }
}

/// Draw meridians and parallels that cross the tile.
///
/// Longitude is linear across the tile; latitude is placed in Mercator
/// space so parallels land where the projection puts them.
fn draw_graticule(canvas: &mut Canvas, bounds: &BoundingBox, style: &GraticuleStyle) {
    let spacing = style.spacing_degrees;
    let width = canvas.width() as f64;
    let height = canvas.height() as f64;

    let lon_span = bounds.east - bounds.west;
    if lon_span > 0.0 {
        for lon in lines_within(bounds.west, bounds.east, spacing) {
            let x = (lon - bounds.west) / lon_span * width;
            canvas.vertical_line(x, style.width, style.color);
        }
    }

    let top = mercator_y(bounds.north);
    let bottom = mercator_y(bounds.south);
    if top > bottom {
        for lat in lines_within(bounds.south, bounds.north, spacing) {
            let y = (top - mercator_y(lat)) / (top - bottom) * height;
            canvas.horizontal_line(y, style.width, style.color);
        }
    }
}

/// Multiples of `spacing` inside `[min, max]`.
fn lines_within(min: f64, max: f64, spacing: f64) -> impl Iterator<Item = f64> {
    let first = (min / spacing).ceil() as i64;
    let last = (max / spacing).floor() as i64;
    (first..=last).map(move |k| k as f64 * spacing)
}

/// Write to a sibling temporary file, then rename into place.
///
/// A render interrupted half-way never leaves a truncated tile behind that
/// a later run would skip as already present.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    let tmp = partial_path(path);
    fs::write(&tmp, bytes)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

/// Hands every worker its own [`StyleRenderer`] over a shared style.
#[derive(Debug, Clone)]
pub struct StyleRendererFactory {
    style: Arc<StyleDefinition>,
}

impl StyleRendererFactory {
    pub fn new(style: StyleDefinition) -> Self {
        Self {
            style: Arc::new(style),
        }
    }

    pub fn style(&self) -> &StyleDefinition {
        &self.style
    }
}

impl RendererFactory for StyleRendererFactory {
    type Renderer = StyleRenderer;

    fn create(&self, worker: usize) -> Result<StyleRenderer, RenderError> {
        self.style.validate()?;
        debug!(worker = worker, style = %self.style.name, "Creating style renderer");
        Ok(StyleRenderer::new(worker, Arc::clone(&self.style)))
    }

    /// A tile with nothing on it is the background alone.
    fn blank_tile_bytes(&self, tile_size: u32) -> Result<Option<u64>, RenderError> {
        let size = tile_size as usize;
        let png = Canvas::new(size, size, self.style.background)
            .encode_png()
            .map_err(RenderError::Encode)?;
        Ok(Some(png.len() as u64))
    }
}
