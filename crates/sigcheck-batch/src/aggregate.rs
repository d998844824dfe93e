//! Aggregator: drains worker results and renders the run verdict.

use std::time::{Duration, Instant};

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use crate::data::{FileResult, Outcome};
use crate::dispatch::CancelSignal;

/// Per-outcome counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub matched:    usize,
    pub mismatched: usize,
    pub errored:    usize,
    pub skipped:    usize,
}

impl Tally {
    pub fn failed(&self) -> usize { self.mismatched + self.errored + self.skipped }
}

/// Final state of one verification run.
#[derive(Debug)]
pub struct RunReport {
    /// Number of manifest entries the run was started with.
    pub total:          usize,
    pub tally:          Tally,
    /// Results in arrival order.
    pub results:        Vec<FileResult>,
    /// Entries whose worker never posted a result.
    pub missing:        usize,
    pub peak_in_flight: usize,
    pub elapsed:        Duration,
}

impl RunReport {
    pub fn processed(&self) -> usize { self.results.len() }

    pub fn is_success(&self) -> bool { self.missing == 0 && self.tally.matched == self.total }

    pub fn with_outcome(&self, outcome: Outcome) -> impl Iterator<Item = &FileResult> {
        self.results.iter().filter(move |result| result.outcome() == outcome)
    }

    /// Names of every entry that did not verify, sorted.
    pub fn failures(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .results
            .iter()
            .filter(|result| result.outcome() != Outcome::Matched)
            .map(|result| result.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

/// Single consumer of the completion channel.
pub struct Aggregator {
    expected:  usize,
    fail_fast: Option<CancelSignal>,
    tally:     Tally,
    results:   Vec<FileResult>,
    started:   Instant,
}

impl Aggregator {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            fail_fast: None,
            tally: Tally::default(),
            results: Vec::with_capacity(expected),
            started: Instant::now(),
        }
    }

    /// Raise `signal` on the first failure.
    pub fn fail_fast(mut self, signal: CancelSignal) -> Self {
        self.fail_fast = Some(signal);
        self
    }

    /// Receive until `expected` results arrived or every sender is gone.
    pub async fn drain(mut self, mut results: UnboundedReceiver<FileResult>) -> RunReport {
        while self.results.len() < self.expected {
            let Some(result) = results.recv().await else {
                break;
            };
            self.record(result);
        }

        let missing = self.expected - self.results.len();
        if missing > 0 {
            warn!(missing, "completion channel closed before every entry reported");
        }

        RunReport {
            total: self.expected,
            tally: self.tally,
            results: self.results,
            missing,
            peak_in_flight: 0,
            elapsed: self.started.elapsed(),
        }
    }

    fn record(&mut self, result: FileResult) {
        let outcome = result.outcome();
        match outcome {
            Outcome::Matched => {
                self.tally.matched += 1;
                info!(file = %result.name, "matched");
            }
            Outcome::Mismatch => {
                self.tally.mismatched += 1;
                warn!(
                    file = %result.name,
                    actual = result.actual.as_deref().unwrap_or_default(),
                    "digest mismatch"
                );
            }
            Outcome::Error => {
                self.tally.errored += 1;
                if let Some(err) = &result.error {
                    warn!(file = %result.name, error = %err, "verification failed");
                }
            }
            Outcome::Skipped => {
                self.tally.skipped += 1;
                debug!(file = %result.name, "skipped");
            }
        }

        if outcome != Outcome::Matched {
            if let Some(signal) = &self.fail_fast {
                signal.cancel();
            }
        }

        self.results.push(result);
    }
}
