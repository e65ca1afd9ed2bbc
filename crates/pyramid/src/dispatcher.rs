//! Producer side of the pyramid: enumerate tiles and feed the queue.

use std::sync::Arc;

use storage::TileStore;
use tile_common::TileResult;
use tracing::{debug, error};

use crate::enumerator::TileEnumerator;
use crate::queue::{QueueItem, RenderJob, WorkSender};

/// Turns enumerated tiles into queued jobs.
///
/// Runs on the caller's thread. Directories for a column are created just
/// before its first job is queued, so workers never see a job whose parent
/// directory is missing.
#[derive(Debug)]
pub struct Dispatcher<'a> {
    store: &'a TileStore,
    label: Arc<str>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(store: &'a TileStore, label: &str) -> Self {
        Self {
            store,
            label: Arc::from(label),
        }
    }

    /// Queue every tile, then one shutdown per worker.
    ///
    /// Shutdowns are sent even when enqueueing stopped on an error, so the
    /// workers always drain and exit. Returns the number of jobs queued, or
    /// the error that stopped enumeration.
    pub fn dispatch(
        &self,
        enumerator: &TileEnumerator,
        sender: &WorkSender,
        workers: usize,
    ) -> TileResult<u64> {
        let queued = self.enqueue_jobs(enumerator, sender);
        if let Err(e) = &queued {
            error!(error = %e, "Dispatch stopped early");
        }

        for _ in 0..workers {
            sender.push(QueueItem::Shutdown)?;
        }
        queued
    }

    fn enqueue_jobs(&self, enumerator: &TileEnumerator, sender: &WorkSender) -> TileResult<u64> {
        self.store.ensure_root()?;

        let mut column = None;
        let mut queued = 0u64;
        for coord in enumerator {
            if column != Some((coord.z, coord.x)) {
                self.store.ensure_directories(coord.z, coord.x)?;
                column = Some((coord.z, coord.x));
            }

            sender.push(QueueItem::Job(RenderJob {
                label: Arc::clone(&self.label),
                path: self.store.location_for(coord),
                coord,
            }))?;
            queued += 1;
        }

        debug!(queued = queued, "All jobs queued");
        Ok(queued)
    }
}
