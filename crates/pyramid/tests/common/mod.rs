//! Fake renderers shared by the pyramid integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use renderer::{RenderError, RenderRequest, RendererFactory, TileRenderer};
use tile_common::TileCoord;

/// Render calls seen across all workers: tile -> workers that rendered it.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<HashMap<TileCoord, Vec<usize>>>>,
}

impl CallLog {
    fn push(&self, coord: TileCoord, worker: usize) {
        self.calls
            .lock()
            .unwrap()
            .entry(coord)
            .or_default()
            .push(worker);
    }

    pub fn total(&self) -> usize {
        self.calls.lock().unwrap().values().map(Vec::len).sum()
    }

    pub fn snapshot(&self) -> HashMap<TileCoord, Vec<usize>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn workers_used(&self) -> usize {
        let mut workers: Vec<usize> = self
            .calls
            .lock()
            .unwrap()
            .values()
            .flatten()
            .copied()
            .collect();
        workers.sort_unstable();
        workers.dedup();
        workers.len()
    }
}

/// Writes a file of a fixed size for every tile and logs the call.
#[derive(Debug, Clone)]
pub struct CountingFactory {
    pub log: CallLog,
    pub tile_bytes: usize,
    pub delay: Duration,
}

impl CountingFactory {
    pub fn new(tile_bytes: usize) -> Self {
        Self {
            log: CallLog::default(),
            tile_bytes,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

pub struct CountingRenderer {
    worker: usize,
    log: CallLog,
    tile_bytes: usize,
    delay: Duration,
}

impl TileRenderer for CountingRenderer {
    fn render(&mut self, request: &RenderRequest<'_>) -> Result<(), RenderError> {
        self.log.push(request.coord, self.worker);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        fs::write(request.path, vec![0u8; self.tile_bytes])?;
        Ok(())
    }
}

impl RendererFactory for CountingFactory {
    type Renderer = CountingRenderer;

    fn create(&self, worker: usize) -> Result<CountingRenderer, RenderError> {
        Ok(CountingRenderer {
            worker,
            log: self.log.clone(),
            tile_bytes: self.tile_bytes,
            delay: self.delay,
        })
    }
}

/// How a [`FaultyRenderer`] treats a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Fail,
    Panic,
}

/// Like [`CountingFactory`], but some tiles fail or panic.
#[derive(Debug, Clone)]
pub struct FaultyFactory {
    pub inner: CountingFactory,
    pub faults: Arc<HashMap<TileCoord, Fault>>,
}

impl FaultyFactory {
    pub fn new(faults: impl IntoIterator<Item = (TileCoord, Fault)>) -> Self {
        Self {
            inner: CountingFactory::new(500),
            faults: Arc::new(faults.into_iter().collect()),
        }
    }
}

pub struct FaultyRenderer {
    inner: CountingRenderer,
    faults: Arc<HashMap<TileCoord, Fault>>,
}

impl TileRenderer for FaultyRenderer {
    fn render(&mut self, request: &RenderRequest<'_>) -> Result<(), RenderError> {
        match self.faults.get(&request.coord) {
            Some(Fault::Fail) => Err(RenderError::Failed(format!("no data for {}", request.coord))),
            Some(Fault::Panic) => panic!("renderer crashed on {}", request.coord),
            None => self.inner.render(request),
        }
    }
}

impl RendererFactory for FaultyFactory {
    type Renderer = FaultyRenderer;

    fn create(&self, worker: usize) -> Result<FaultyRenderer, RenderError> {
        Ok(FaultyRenderer {
            inner: self.inner.create(worker)?,
            faults: Arc::clone(&self.faults),
        })
    }
}
