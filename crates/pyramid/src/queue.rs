//! Bounded work queue between the dispatcher and the workers.
//!
//! The channel itself is a `crossbeam_channel::bounded` queue: `push` blocks
//! while it is full, which is what keeps the dispatcher from running ahead
//! of the workers. On top of it sits a counting barrier. Every pushed item
//! increments a pending count and every popped item hands out an [`Ack`]
//! that decrements it when dropped, so [`WorkSender::wait_idle`] returns
//! only once each item has been fully processed, even when processing
//! unwinds.

use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crossbeam_channel::{Receiver, Sender};
use tile_common::{TileCoord, TileError, TileResult};

/// One tile to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    pub label: Arc<str>,
    /// Final location of the tile file
    pub path: PathBuf,
    pub coord: TileCoord,
}

/// What travels through the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueItem {
    Job(RenderJob),
    /// Tells exactly one worker to stop.
    Shutdown,
}

#[derive(Debug, Default)]
struct BarrierState {
    /// Items pushed but not yet acknowledged
    pending: usize,
    /// Workers still able to acknowledge items
    consumers: usize,
}

#[derive(Debug, Default)]
struct Barrier {
    state: Mutex<BarrierState>,
    changed: Condvar,
}

impl Barrier {
    fn lock(&self) -> MutexGuard<'_, BarrierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, f: impl FnOnce(&mut BarrierState)) {
        f(&mut self.lock());
        self.changed.notify_all();
    }
}

/// Create a queue holding at most `capacity` items.
pub fn work_queue(capacity: usize) -> (WorkSender, WorkReceiver) {
    let (tx, rx) = crossbeam_channel::bounded(capacity);
    let barrier = Arc::new(Barrier::default());
    (
        WorkSender {
            tx,
            barrier: Arc::clone(&barrier),
        },
        WorkReceiver { rx, barrier },
    )
}

/// Producer side. Dropping it lets workers drain the queue and then see it
/// closed.
#[derive(Debug)]
pub struct WorkSender {
    tx: Sender<QueueItem>,
    barrier: Arc<Barrier>,
}

impl WorkSender {
    /// Enqueue an item, blocking while the queue is full.
    ///
    /// Fails with [`TileError::QueueClosed`] once every receiver is gone.
    pub fn push(&self, item: QueueItem) -> TileResult<()> {
        self.barrier.update(|s| s.pending += 1);
        if self.tx.send(item).is_err() {
            self.barrier.update(|s| s.pending -= 1);
            return Err(TileError::QueueClosed);
        }
        Ok(())
    }

    /// Items pushed but not yet acknowledged.
    pub fn pending(&self) -> usize {
        self.barrier.lock().pending
    }

    /// Block until every pushed item has been acknowledged.
    ///
    /// Also returns once no registered consumer is left, since nobody
    /// could acknowledge the remainder.
    pub fn wait_idle(&self) {
        let state = self.barrier.lock();
        let _state = self
            .barrier
            .changed
            .wait_while(state, |s| s.pending > 0 && s.consumers > 0)
            .unwrap_or_else(PoisonError::into_inner);
    }
}

/// Consumer side, cloned once per worker.
#[derive(Debug, Clone)]
pub struct WorkReceiver {
    rx: Receiver<QueueItem>,
    barrier: Arc<Barrier>,
}

impl WorkReceiver {
    /// Count the calling worker as a consumer until the guard drops.
    pub fn register(&self) -> ConsumerGuard {
        self.barrier.update(|s| s.consumers += 1);
        ConsumerGuard {
            barrier: Arc::clone(&self.barrier),
        }
    }

    /// Block for the next item; `None` once the queue is drained and the
    /// sender is gone.
    pub fn pop(&self) -> Option<(QueueItem, Ack)> {
        let item = self.rx.recv().ok()?;
        Some((
            item,
            Ack {
                barrier: Arc::clone(&self.barrier),
            },
        ))
    }
}

/// Acknowledges one item when dropped.
#[derive(Debug)]
#[must_use = "dropping the ack immediately marks the item as done"]
pub struct Ack {
    barrier: Arc<Barrier>,
}

impl Drop for Ack {
    fn drop(&mut self) {
        self.barrier.update(|s| s.pending = s.pending.saturating_sub(1));
    }
}

/// Keeps a worker counted as a live consumer.
#[derive(Debug)]
pub struct ConsumerGuard {
    barrier: Arc<Barrier>,
}

impl Drop for ConsumerGuard {
    fn drop(&mut self) {
        self.barrier
            .update(|s| s.consumers = s.consumers.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    fn job(y: u32) -> QueueItem {
        QueueItem::Job(RenderJob {
            label: Arc::from("test"),
            path: PathBuf::from(format!("/t/0/0/{}.png", y)),
            coord: TileCoord::new(0, 0, y),
        })
    }

    #[test]
    fn test_push_pop_in_order() {
        let (tx, rx) = work_queue(4);
        tx.push(job(0)).unwrap();
        tx.push(QueueItem::Shutdown).unwrap();
        assert_eq!(tx.pending(), 2);

        let (first, ack) = rx.pop().unwrap();
        assert_eq!(first, job(0));
        drop(ack);
        assert_eq!(tx.pending(), 1);

        let (second, _ack) = rx.pop().unwrap();
        assert_eq!(second, QueueItem::Shutdown);
    }

    #[test]
    fn test_pop_after_sender_dropped() {
        let (tx, rx) = work_queue(2);
        tx.push(job(1)).unwrap();
        drop(tx);
        assert!(rx.pop().is_some());
        assert!(rx.pop().is_none());
    }

    #[test]
    fn test_push_fails_without_receivers() {
        let (tx, rx) = work_queue(1);
        drop(rx);
        assert!(matches!(tx.push(job(0)), Err(TileError::QueueClosed)));
        assert_eq!(tx.pending(), 0);
    }

    #[test]
    fn test_push_blocks_when_full() {
        let (tx, rx) = work_queue(1);
        tx.push(job(0)).unwrap();

        let producer = thread::spawn(move || {
            tx.push(job(1)).unwrap();
            tx
        });
        thread::sleep(Duration::from_millis(50));
        assert!(!producer.is_finished());

        let (_, _ack) = rx.pop().unwrap();
        let tx = producer.join().unwrap();
        assert_eq!(tx.pending(), 2);
    }

    #[test]
    fn test_wait_idle_waits_for_acks() {
        let (tx, rx) = work_queue(8);
        // Held here so wait_idle cannot return before the worker registers
        let _consumer = rx.register();
        for y in 0..5 {
            tx.push(job(y)).unwrap();
        }

        let worker = thread::spawn(move || {
            let _guard = rx.register();
            let mut seen = 0;
            while let Some((_item, _ack)) = rx.pop() {
                thread::sleep(Duration::from_millis(5));
                seen += 1;
                if seen == 5 {
                    break;
                }
            }
            seen
        });

        tx.wait_idle();
        assert_eq!(tx.pending(), 0);
        assert_eq!(worker.join().unwrap(), 5);
    }

    #[test]
    fn test_ack_on_unwind() {
        let (tx, rx) = work_queue(2);
        tx.push(job(0)).unwrap();

        let result = thread::spawn(move || {
            let (_item, _ack) = rx.pop().unwrap();
            panic!("render blew up");
        })
        .join();

        assert!(result.is_err());
        assert_eq!(tx.pending(), 0);
    }

    #[test]
    fn test_wait_idle_returns_when_consumers_are_gone() {
        let (tx, rx) = work_queue(4);
        let guard = rx.register();
        tx.push(QueueItem::Shutdown).unwrap();
        drop(guard);
        // Nobody left to pop the item
        tx.wait_idle();
        assert_eq!(tx.pending(), 1);
    }
}
