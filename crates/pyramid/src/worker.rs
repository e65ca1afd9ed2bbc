//! Per-worker state and the processing of a single job.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use projection::SphericalMercator;
use renderer::{RenderError, RenderRequest, TileRenderer};
use storage::{TileClass, TileStore};
use tracing::{debug, warn};

use crate::queue::RenderJob;
use crate::record::CompletionRecord;

/// State owned by exactly one worker for its whole lifetime.
///
/// Each worker builds its own projection and renderer once at startup;
/// nothing here is shared with other workers.
pub struct WorkerContext<R> {
    id: usize,
    renderer: R,
    projection: SphericalMercator,
}

impl<R: TileRenderer> WorkerContext<R> {
    pub fn new(id: usize, renderer: R, projection: SphericalMercator) -> Self {
        Self {
            id,
            renderer,
            projection,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Run one job to completion and describe the outcome.
    ///
    /// Never fails: render errors, renderer panics and unreadable output are
    /// all reported on the returned record.
    pub fn process(&mut self, job: &RenderJob, store: &TileStore) -> CompletionRecord {
        let coord = job.coord;
        let already_present = store.exists(&job.path);

        let mut error = None;
        if already_present {
            debug!(worker = self.id, tile = %coord, "Tile already present, skipping render");
        } else if let Err(e) = self.render(job) {
            warn!(worker = self.id, tile = %coord, error = %e, "Render failed");
            error = Some(e.to_string());
        }

        let mut empty = false;
        if error.is_none() {
            match store.classify(&job.path) {
                Ok(class) => empty = class == TileClass::Empty,
                Err(e) => error = Some(format!("tile missing after render: {}", e)),
            }
        }

        CompletionRecord {
            label: job.label.to_string(),
            zoom: coord.z,
            x: coord.x,
            y: coord.y,
            already_present: already_present && error.is_none(),
            empty,
            error,
            worker: self.id,
        }
    }

    fn render(&mut self, job: &RenderJob) -> Result<(), RenderError> {
        let bounds = self
            .projection
            .tile_bounds(job.coord)
            .map_err(|e| RenderError::Failed(e.to_string()))?;
        let request = RenderRequest {
            path: &job.path,
            coord: job.coord,
            bounds,
            size: self.projection.tile_size(),
        };

        let renderer = &mut self.renderer;
        panic::catch_unwind(AssertUnwindSafe(|| renderer.render(&request)))
            .unwrap_or_else(|payload| Err(RenderError::Panicked(panic_message(payload.as_ref()))))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
