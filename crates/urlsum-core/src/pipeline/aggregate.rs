//! Single consumer of worker outcomes.

use crossbeam_channel::Receiver;

use crate::error::TargetError;
use crate::target::Target;

/// Terminal result for one target. Exactly one per target fed to the pool.
#[derive(Debug)]
pub enum Outcome {
    Success { target: Target, digest: String },
    Failure(TargetError),
}

impl Outcome {
    pub fn target(&self) -> &Target {
        match self {
            Outcome::Success { target, .. } => target,
            Outcome::Failure(e) => e.target(),
        }
    }
}

/// Successes (`"<target> <digest>"`) and failures of a run, in arrival order.
#[derive(Debug, Default)]
pub struct ResultSet {
    successes: Vec<String>,
    failures: Vec<TargetError>,
}

impl ResultSet {
    fn with_capacity(n: usize) -> Self {
        Self {
            successes: Vec::with_capacity(n),
            failures: Vec::new(),
        }
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Success { target, digest } => {
                self.successes.push(format!("{} {}", target, digest));
            }
            Outcome::Failure(e) => self.failures.push(e),
        }
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn failures(&self) -> &[TargetError] {
        &self.failures
    }

    /// Number of outcomes recorded.
    pub fn len(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<TargetError>) {
        (self.successes, self.failures)
    }
}

/// Receives exactly `expected` outcomes and returns them. Returning is the
/// completion signal; the count lives here and nowhere else.
///
/// Stops early only if every sender is gone, which means outcomes were lost.
pub(super) fn collect(outcomes: Receiver<Outcome>, expected: usize) -> ResultSet {
    let mut results = ResultSet::with_capacity(expected);
    while results.len() < expected {
        match outcomes.recv() {
            Ok(outcome) => {
                tracing::trace!("outcome for {}", outcome.target());
                results.record(outcome);
            }
            Err(_) => {
                tracing::error!(
                    "outcome channel closed with {} of {} outcomes missing",
                    expected - results.len(),
                    expected
                );
                break;
            }
        }
    }
    results
}
