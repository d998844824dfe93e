//! Bounded concurrent verification of files against a checksum manifest.
//!
//! # Architecture
//!
//! - [`manifest`] - manifest parsing, all-or-nothing
//! - `source` - byte stream per work item (file + codec)
//! - `worker` - hash one stream, compare, produce one [`FileResult`]
//! - `dispatch` - semaphore-bounded admission loop with cooperative cancellation
//! - `aggregate` - single consumer of results, produces the [`RunReport`]
//!
//! Every work item yields exactly one [`FileResult`]: workers post theirs when
//! done, and the dispatcher posts a skipped result for each item it never
//! admitted. The aggregator therefore knows when a run is complete.

pub use aggregate::{Aggregator, RunReport, Tally};
pub use data::{BatchOptions, FileResult, Outcome, StorageLayout, WorkItem};
pub use dispatch::{CancelSignal, Dispatcher, InFlight};
pub use error::{BatchError, CheckError, ManifestError, Result};
pub use manifest::{Manifest, ManifestOptions};
pub use source::{FileSource, StreamSource};
pub use verify::{verify, verify_manifest};
pub use worker::check;

mod aggregate;
mod data;
mod dispatch;
mod error;
pub mod manifest;
mod source;
mod verify;
mod worker;
