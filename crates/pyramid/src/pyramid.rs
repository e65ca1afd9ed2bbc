//! Entry point tying enumeration, dispatch and the worker pool together.

use std::time::Instant;

use projection::SphericalMercator;
use renderer::RendererFactory;
use storage::TileStore;
use tile_common::TileResult;
use tracing::{error, info};

use crate::config::PyramidConfig;
use crate::dispatcher::Dispatcher;
use crate::enumerator::TileEnumerator;
use crate::pool::WorkerPool;
use crate::record::{CompletionSink, PyramidSummary, RecordEmitter};

/// Render every tile of `config.bbox` over `config.zoom`.
///
/// Blocks until all tiles are done and every worker has exited. One
/// [`CompletionRecord`](crate::CompletionRecord) per tile goes to `sink`.
/// Tiles already on disk are reported and left untouched, so re-running
/// over the same directory only fills in what is missing.
///
/// Per-tile render failures are reported on their records and in the
/// summary; they do not make this function fail. Invalid input, worker
/// startup failures and directory creation failures do.
pub fn render_tiles<F, S>(
    config: &PyramidConfig,
    factory: &F,
    sink: &mut S,
) -> TileResult<PyramidSummary>
where
    F: RendererFactory,
    S: CompletionSink + ?Sized,
{
    config.validate()?;
    let started = Instant::now();

    let enumerator = TileEnumerator::with_tile_size(config.bbox, config.zoom, config.tile_size);
    let expected = enumerator.total();
    let store = TileStore::new(&config.output_dir, config.empty_tile);

    info!(
        label = %config.label,
        bbox = %config.bbox,
        min_zoom = config.zoom.min(),
        max_zoom = config.zoom.max(),
        tiles = expected,
        workers = config.workers,
        output = %config.output_dir.display(),
        "Rendering tile pyramid"
    );

    let emitter = RecordEmitter::new(sink, &config.label, expected);
    let dispatched = {
        let pool = WorkerPool::new(
            config.workers,
            config.queue_capacity,
            SphericalMercator::new(config.zoom.max() + 1, config.tile_size),
            factory,
            &store,
            &emitter,
        );
        let dispatcher = Dispatcher::new(&store, &config.label);
        pool.run(|sender| dispatcher.dispatch(&enumerator, sender, config.workers))
    };

    let emitted = emitter.emitted();
    let dispatched = match dispatched {
        Ok(n) => n,
        Err(e) => {
            error!(label = %config.label, completed = emitted, error = %e, "Pyramid run aborted");
            return Err(e);
        }
    };

    let summary = emitter.finish(dispatched, started.elapsed());
    info!(
        label = %summary.label,
        total = summary.total,
        rendered = summary.rendered,
        already_present = summary.already_present,
        empty = summary.empty,
        failed = summary.failed,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "Tile pyramid complete"
    );
    Ok(summary)
}
