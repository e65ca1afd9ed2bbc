//! Batch generation of raster tile pyramids.
//!
//! [`render_tiles`] enumerates every tile covering a bounding box over a zoom
//! range and renders them on a fixed pool of worker threads:
//!
//! - the [`Dispatcher`] runs on the caller's thread and feeds a bounded
//!   [`queue`], blocking when the workers fall behind;
//! - each worker owns its renderer, skips tiles already on disk and emits
//!   one [`CompletionRecord`] per tile;
//! - shutdown is two-phase: every queued item is acknowledged, then every
//!   worker thread is joined.

pub mod config;
pub mod dispatcher;
pub mod enumerator;
pub mod pool;
pub mod pyramid;
pub mod queue;
pub mod record;
pub mod worker;

pub use config::{PyramidConfig, DEFAULT_LABEL, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS};
pub use dispatcher::Dispatcher;
pub use enumerator::{TileEnumerator, TileRange, Tiles};
pub use pool::WorkerPool;
pub use pyramid::render_tiles;
pub use queue::{QueueItem, RenderJob};
pub use record::{CompletionRecord, CompletionSink, PyramidSummary, RecordEmitter, TracingSink};
pub use worker::WorkerContext;
