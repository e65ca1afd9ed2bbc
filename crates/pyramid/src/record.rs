//! Per-tile completion records and the run summary.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tile_common::TileCoord;
use tracing::{error, info};

/// Log a progress line every this many completed tiles.
const PROGRESS_INTERVAL: u64 = 100;

/// Outcome of one tile, emitted exactly once per dispatched job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionRecord {
    pub label: String,
    pub zoom: u32,
    pub x: u32,
    pub y: u32,
    /// The file existed before the job ran; nothing was rendered
    pub already_present: bool,
    /// The file's size marks it as a blank tile
    pub empty: bool,
    /// Set when rendering failed; the other flags are then false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub worker: usize,
}

impl CompletionRecord {
    pub fn coord(&self) -> TileCoord {
        TileCoord::new(self.zoom, self.x, self.y)
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Receives completion records.
///
/// Calls are serialized by the pool, so implementations never see two
/// records at once and need no locking of their own.
pub trait CompletionSink: Send {
    fn record(&mut self, record: &CompletionRecord);
}

/// Collects records in memory.
impl CompletionSink for Vec<CompletionRecord> {
    fn record(&mut self, record: &CompletionRecord) {
        self.push(record.clone());
    }
}

/// Writes one structured log event per tile.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl CompletionSink for TracingSink {
    fn record(&mut self, record: &CompletionRecord) {
        match &record.error {
            None => info!(
                label = %record.label,
                z = record.zoom,
                x = record.x,
                y = record.y,
                already_present = record.already_present,
                empty = record.empty,
                worker = record.worker,
                "Tile complete"
            ),
            Some(e) => error!(
                label = %record.label,
                z = record.zoom,
                x = record.x,
                y = record.y,
                worker = record.worker,
                error = %e,
                "Tile failed"
            ),
        }
    }
}

/// Totals for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PyramidSummary {
    pub label: String,
    /// Jobs dispatched
    pub total: u64,
    /// Newly rendered tiles, empty ones included
    pub rendered: u64,
    pub already_present: u64,
    pub empty: u64,
    pub failed: u64,
    pub elapsed: Duration,
}

impl PyramidSummary {
    pub fn completed(&self) -> u64 {
        self.rendered + self.already_present + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    fn tally(&mut self, record: &CompletionRecord) {
        if record.is_failure() {
            self.failed += 1;
        } else if record.already_present {
            self.already_present += 1;
        } else {
            self.rendered += 1;
        }
        if record.empty {
            self.empty += 1;
        }
    }
}

struct EmitterState<'a, S: ?Sized> {
    sink: &'a mut S,
    summary: PyramidSummary,
    expected: u64,
}

/// Serializes record emission from many workers into one sink.
///
/// Also tallies the summary and logs progress.
pub struct RecordEmitter<'a, S: ?Sized> {
    state: Mutex<EmitterState<'a, S>>,
}

impl<'a, S: CompletionSink + ?Sized> RecordEmitter<'a, S> {
    /// `expected` is only used for progress messages.
    pub fn new(sink: &'a mut S, label: &str, expected: u64) -> Self {
        Self {
            state: Mutex::new(EmitterState {
                sink,
                summary: PyramidSummary {
                    label: label.to_string(),
                    ..Default::default()
                },
                expected,
            }),
        }
    }

    pub fn emit(&self, record: &CompletionRecord) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.sink.record(record);
        state.summary.tally(record);

        let done = state.summary.completed();
        if done % PROGRESS_INTERVAL == 0 {
            info!(
                label = %state.summary.label,
                completed = done,
                total = state.expected,
                failed = state.summary.failed,
                "Pyramid progress"
            );
        }
    }

    pub fn emitted(&self) -> u64 {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .summary
            .completed()
    }

    /// Close the emitter, returning the summary.
    pub fn finish(self, total: u64, elapsed: Duration) -> PyramidSummary {
        let state = self.state.into_inner().unwrap_or_else(PoisonError::into_inner);
        PyramidSummary {
            total,
            elapsed,
            ..state.summary
        }
    }
}
