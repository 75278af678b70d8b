//! Bounded fan-out/fan-in pipeline: fetch and digest every target.
//!
//! Topology per run (all inside one `thread::scope`):
//!
//! ```text
//! caller ─▶ [targets, bounded] ─▶ worker × parallel ─▶ [outcomes, bounded] ─▶ aggregator
//! ```
//!
//! The aggregator is spawned before any worker and before the first target is
//! fed, so a full outcome channel always has a consumer. Closing the target
//! channel is the only shutdown signal workers get. The aggregator counts
//! outcomes and returns once it has one per fed target.

mod aggregate;
mod worker;

use crossbeam_channel::bounded;
use std::thread;
use std::time::Duration;

use crate::digest::Digester;
use crate::error::ConfigError;
use crate::fetch::{CurlFetcher, Fetcher};
use crate::target::{self, Target};

pub use aggregate::{Outcome, ResultSet};

/// A prepared set of targets plus the capabilities to process them.
/// Configuration is fixed at construction; `run` can be called repeatedly.
pub struct Pipeline {
    targets: Vec<Target>,
    parallel: usize,
    fetcher: Box<dyn Fetcher>,
    digester: Box<dyn Digester>,
}

impl Pipeline {
    /// Builds a pipeline that fetches with libcurl, bounded by `timeout` per request.
    /// Malformed addresses in `raw` are dropped silently.
    pub fn new<I, S, D>(
        raw: I,
        parallel: usize,
        digester: D,
        timeout: Duration,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        D: Digester + 'static,
    {
        if timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Self::with_fetcher(raw, parallel, digester, CurlFetcher::new(timeout))
    }

    /// Like `new` but with a caller-supplied fetch capability.
    pub fn with_fetcher<I, S, D, F>(
        raw: I,
        parallel: usize,
        digester: D,
        fetcher: F,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        D: Digester + 'static,
        F: Fetcher + 'static,
    {
        if parallel == 0 {
            return Err(ConfigError::NoWorkers);
        }
        Ok(Self {
            targets: target::prepare(raw),
            parallel,
            fetcher: Box::new(fetcher),
            digester: Box::new(digester),
        })
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn parallel(&self) -> usize {
        self.parallel
    }

    /// Fetches and digests every target; blocks until each has exactly one outcome.
    /// Per-target failures are collected, never propagated.
    pub fn run(&self) -> ResultSet {
        let expected = self.targets.len();
        tracing::info!(
            "pipeline starting: {} targets, {} workers",
            expected,
            self.parallel
        );

        let (target_tx, target_rx) = bounded::<Target>(self.parallel);
        let (outcome_tx, outcome_rx) = bounded::<Outcome>(self.parallel);
        let fetcher = self.fetcher.as_ref();
        let digester = self.digester.as_ref();

        let results = thread::scope(|s| {
            let aggregator = s.spawn(move || aggregate::collect(outcome_rx, expected));

            for id in 0..self.parallel {
                let targets = target_rx.clone();
                let outcomes = outcome_tx.clone();
                s.spawn(move || worker::run(id, fetcher, digester, targets, outcomes));
            }
            // Only workers hold these now: the outcome channel closes when the last worker exits.
            drop(target_rx);
            drop(outcome_tx);

            for target in &self.targets {
                if target_tx.send(target.clone()).is_err() {
                    tracing::error!("all workers exited before every target was fed");
                    break;
                }
            }
            drop(target_tx);

            match aggregator.join() {
                Ok(results) => results,
                Err(payload) => std::panic::resume_unwind(payload),
            }
        });

        tracing::info!(
            "pipeline finished: {} succeeded, {} failed",
            results.successes().len(),
            results.failures().len()
        );
        results
    }
}
