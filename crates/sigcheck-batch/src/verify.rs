use sigcheck_verify::{DigestAlgorithm, HasherFactory};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::aggregate::{Aggregator, RunReport};
use crate::data::{BatchOptions, StorageLayout, WorkItem};
use crate::dispatch::{CancelSignal, Dispatcher};
use crate::error::{BatchError, Result};
use crate::manifest::Manifest;
use crate::source::{FileSource, StreamSource};

/// Verify `items` concurrently and wait for every result.
///
/// Must be called from within a multi-threaded tokio runtime; workers run on
/// the blocking pool.
pub async fn verify<S, F>(items: Vec<WorkItem>, source: S, hashers: F, options: &BatchOptions) -> Result<RunReport>
where
    S: StreamSource + 'static,
    F: HasherFactory + 'static,
{
    if options.jobs == 0 {
        return Err(BatchError::InvalidJobs);
    }

    let total = items.len();
    let (tx, rx) = mpsc::unbounded_channel();
    let cancel = CancelSignal::new();

    let mut aggregator = Aggregator::new(total);
    if options.fail_fast {
        aggregator = aggregator.fail_fast(cancel.clone());
    }

    let dispatcher = Dispatcher::new(source, hashers, options);
    let in_flight = dispatcher.in_flight();
    debug!(total, jobs = options.jobs, fail_fast = options.fail_fast, "starting verification");
    let dispatch = tokio::spawn(dispatcher.run(items, tx, cancel));

    let mut report = aggregator.drain(rx).await;
    if let Err(err) = dispatch.await {
        warn!(error = %err, "dispatcher task ended abnormally");
    }

    report.peak_in_flight = in_flight.peak();
    Ok(report)
}

/// Verify every manifest entry on disk using `layout` and `algorithm`.
pub async fn verify_manifest(
    manifest: &Manifest,
    layout: &StorageLayout,
    algorithm: DigestAlgorithm,
    options: &BatchOptions,
) -> Result<RunReport> {
    if !layout.compression.is_supported() {
        return Err(sigcheck_codec::CodecError::Unsupported(layout.compression).into());
    }

    let odd = manifest.wrong_length(algorithm);
    if !odd.is_empty() {
        warn!(
            entries = odd.len(),
            first = odd[0],
            %algorithm,
            "manifest digests have an unexpected length for this algorithm"
        );
    }

    let items = manifest.work_items(layout);
    verify(items, FileSource::new(layout.compression), algorithm, options).await
}
