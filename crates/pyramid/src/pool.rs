//! Fixed-size pool of worker threads fed by the bounded queue.

use std::thread::{self, ScopedJoinHandle};

use crossbeam_channel::Sender;
use projection::SphericalMercator;
use renderer::RendererFactory;
use storage::TileStore;
use tile_common::{TileError, TileResult};
use tracing::{debug, error, info};

use crate::queue::{work_queue, QueueItem, WorkReceiver, WorkSender};
use crate::record::{CompletionSink, RecordEmitter};
use crate::worker::WorkerContext;

/// Startup outcome sent by each worker before it takes any job.
type Ready = Result<usize, (usize, String)>;

/// Runs a producer against `workers` parallel consumers.
///
/// Workers are OS threads scoped to [`WorkerPool::run`], so they can borrow
/// the factory, the store and the emitter without reference counting.
pub struct WorkerPool<'a, 's, F, S: ?Sized> {
    workers: usize,
    queue_capacity: usize,
    projection: SphericalMercator,
    factory: &'a F,
    store: &'a TileStore,
    emitter: &'a RecordEmitter<'s, S>,
}

impl<'a, 's, F, S> WorkerPool<'a, 's, F, S>
where
    F: RendererFactory,
    S: CompletionSink + ?Sized,
{
    pub fn new(
        workers: usize,
        queue_capacity: usize,
        projection: SphericalMercator,
        factory: &'a F,
        store: &'a TileStore,
        emitter: &'a RecordEmitter<'s, S>,
    ) -> Self {
        Self {
            workers,
            queue_capacity,
            projection,
            factory,
            store,
            emitter,
        }
    }

    /// Start the workers, hand the queue to `produce`, then shut down.
    ///
    /// `produce` runs on the calling thread once every worker has built its
    /// renderer; it must enqueue one [`QueueItem::Shutdown`] per worker after
    /// its last job. When it returns, the pool waits until every queued item
    /// is acknowledged and then joins every thread.
    ///
    /// If any worker fails to start, nothing is produced: a worker that
    /// panicked while starting yields [`TileError::WorkerPanicked`], one whose
    /// factory returned an error yields [`TileError::WorkerStartup`].
    pub fn run<P>(&self, produce: P) -> TileResult<u64>
    where
        P: FnOnce(&WorkSender) -> TileResult<u64>,
    {
        thread::scope(|scope| {
            let (sender, receiver) = work_queue(self.queue_capacity);
            let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Ready>(self.workers);

            let mut handles = Vec::with_capacity(self.workers);
            for id in 0..self.workers {
                let receiver = receiver.clone();
                let ready = ready_tx.clone();
                let handle = thread::Builder::new()
                    .name(format!("tile-worker-{}", id))
                    .spawn_scoped(scope, move || self.worker_main(id, receiver, ready))?;
                handles.push((id, handle));
            }
            drop(receiver);
            drop(ready_tx);

            if let Some(err) = self.await_startup(&ready_rx) {
                // Closing the queue releases the workers that did start; a
                // panicked worker is reported ahead of the startup error
                drop(sender);
                join_all(handles)?;
                return Err(err);
            }
            info!(workers = self.workers, capacity = self.queue_capacity, "Worker pool ready");

            let produced = produce(&sender);

            sender.wait_idle();
            drop(sender);
            let joined = join_all(handles);
            debug!("All workers joined");

            let produced = produced?;
            joined?;
            Ok(produced)
        })
    }

    /// Wait for every worker to report; any worker that did not report
    /// ready is a startup failure.
    fn await_startup(&self, ready: &crossbeam_channel::Receiver<Ready>) -> Option<TileError> {
        let mut started = vec![false; self.workers];
        let mut first = None;
        for _ in 0..self.workers {
            match ready.recv() {
                Ok(Ok(worker)) => {
                    if let Some(slot) = started.get_mut(worker) {
                        *slot = true;
                    }
                }
                Ok(Err((worker, message))) => {
                    first.get_or_insert(TileError::WorkerStartup { worker, message });
                }
                // Every sender is gone; the silent workers died while starting
                Err(_) => break,
            }
        }

        first.or_else(|| {
            let worker = started.iter().position(|ok| !ok)?;
            error!(worker = worker, "Worker exited before reporting ready");
            Some(TileError::WorkerStartup {
                worker,
                message: "exited before reporting ready".to_string(),
            })
        })
    }

    fn worker_main(&self, id: usize, receiver: WorkReceiver, ready: Sender<Ready>) {
        let _consumer = receiver.register();

        let mut context = match self.factory.create(id) {
            Ok(renderer) => WorkerContext::new(id, renderer, self.projection.clone()),
            Err(e) => {
                error!(worker = id, error = %e, "Worker failed to start");
                let _ = ready.send(Err((id, e.to_string())));
                return;
            }
        };
        let _ = ready.send(Ok(id));
        drop(ready);
        debug!(worker = id, "Worker started");

        let mut processed = 0u64;
        while let Some((item, _ack)) = receiver.pop() {
            match item {
                QueueItem::Job(job) => {
                    let record = context.process(&job, self.store);
                    self.emitter.emit(&record);
                    processed += 1;
                }
                QueueItem::Shutdown => break,
            }
        }

        debug!(worker = id, processed = processed, "Worker stopped");
    }
}

fn join_all(handles: Vec<(usize, ScopedJoinHandle<'_, ()>)>) -> TileResult<()> {
    let mut first = Ok(());
    for (worker, handle) in handles {
        if handle.join().is_err() {
            error!(worker = worker, "Worker panicked");
            if first.is_ok() {
                first = Err(TileError::WorkerPanicked { worker });
            }
        }
    }
    first
}
