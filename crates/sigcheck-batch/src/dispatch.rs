//! Bounded dispatcher.
//!
//! A single sequential loop admits work items through a semaphore with `jobs`
//! permits and hands each admitted item to a blocking worker. A permit is held
//! for the whole life of its worker and released when the worker finishes,
//! whatever the outcome.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use sigcheck_verify::HasherFactory;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use crate::data::{BatchOptions, FileResult, WorkItem};
use crate::source::StreamSource;
use crate::worker;

/// Cooperative stop request. Raising it stops admission of new work only.
#[derive(Clone, Debug, Default)]
pub struct CancelSignal(Arc<AtomicBool>);

impl CancelSignal {
    pub fn new() -> Self { Self::default() }

    pub fn cancel(&self) { self.0.store(true, Ordering::SeqCst); }

    pub fn is_cancelled(&self) -> bool { self.0.load(Ordering::SeqCst) }
}

/// Counts workers currently holding a permit and the highest value seen.
#[derive(Debug, Default)]
pub struct InFlight {
    current: AtomicUsize,
    peak:    AtomicUsize,
}

impl InFlight {
    pub fn current(&self) -> usize { self.current.load(Ordering::SeqCst) }

    pub fn peak(&self) -> usize { self.peak.load(Ordering::SeqCst) }

    fn enter(&self) -> usize {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        now
    }

    fn leave(&self) { self.current.fetch_sub(1, Ordering::SeqCst); }
}

/// An admission slot held by a running worker.
struct Admission {
    _permit: OwnedSemaphorePermit,
    gauge:   Arc<InFlight>,
}

impl Admission {
    fn new(permit: OwnedSemaphorePermit, gauge: Arc<InFlight>) -> (Self, usize) {
        let in_flight = gauge.enter();
        (Self { _permit: permit, gauge }, in_flight)
    }
}

impl Drop for Admission {
    fn drop(&mut self) { self.gauge.leave(); }
}

pub struct Dispatcher<S, F> {
    slots:       Arc<Semaphore>,
    source:      Arc<S>,
    hashers:     Arc<F>,
    buffer_size: usize,
    gauge:       Arc<InFlight>,
}

impl<S, F> Dispatcher<S, F>
where
    S: StreamSource + 'static,
    F: HasherFactory + 'static,
{
    /// `options.jobs` must be at least 1; [`crate::verify`] checks this.
    pub fn new(source: S, hashers: F, options: &BatchOptions) -> Self {
        Self {
            slots:       Arc::new(Semaphore::new(options.jobs)),
            source:      Arc::new(source),
            hashers:     Arc::new(hashers),
            buffer_size: options.buffer_size,
            gauge:       Arc::new(InFlight::default()),
        }
    }

    pub fn in_flight(&self) -> Arc<InFlight> { Arc::clone(&self.gauge) }

    /// Admit every item in order, posting exactly one result per item on `results`.
    ///
    /// Items not admitted because `cancel` was raised are posted as skipped.
    pub async fn run(self, items: Vec<WorkItem>, results: UnboundedSender<FileResult>, cancel: CancelSignal) {
        let mut pending = items.into_iter();

        while let Some(item) = pending.next() {
            if cancel.is_cancelled() {
                skip_remaining(item, pending, &results);
                return;
            }

            let Ok(permit) = Arc::clone(&self.slots).acquire_owned().await else {
                skip_remaining(item, pending, &results);
                return;
            };

            // Cancellation may have arrived while waiting for a slot.
            if cancel.is_cancelled() {
                drop(permit);
                skip_remaining(item, pending, &results);
                return;
            }

            let (admission, in_flight) = Admission::new(permit, Arc::clone(&self.gauge));
            debug!(file = %item.name, in_flight, "admitted");

            let source = Arc::clone(&self.source);
            let hashers = Arc::clone(&self.hashers);
            let tx = results.clone();
            let buffer_size = self.buffer_size;

            tokio::task::spawn_blocking(move || {
                let result = worker::check(item, source.as_ref(), hashers.as_ref(), buffer_size);
                drop(admission);
                let _ = tx.send(result);
            });
        }
    }
}

fn skip_remaining(
    first: WorkItem,
    rest: impl Iterator<Item = WorkItem>,
    results: &UnboundedSender<FileResult>,
) {
    let mut skipped = 0usize;
    for item in std::iter::once(first).chain(rest) {
        skipped += 1;
        let _ = results.send(FileResult::skipped(item));
    }
    debug!(skipped, "cancellation requested, remaining entries not admitted");
}
