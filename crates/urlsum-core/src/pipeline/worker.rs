//! Worker loop: fetch, then digest, one outcome per target.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crossbeam_channel::{Receiver, Sender};

use super::aggregate::Outcome;
use crate::digest::Digester;
use crate::error::{DigestError, TargetError};
use crate::fetch::Fetcher;
use crate::target::Target;

/// Drains `targets` until it is closed and empty. Never retries.
pub(super) fn run(
    id: usize,
    fetcher: &dyn Fetcher,
    digester: &dyn Digester,
    targets: Receiver<Target>,
    outcomes: Sender<Outcome>,
) {
    let mut processed = 0usize;
    while let Ok(target) = targets.recv() {
        let outcome = process_guarded(fetcher, digester, target);
        processed += 1;
        if outcomes.send(outcome).is_err() {
            tracing::error!("worker {}: outcome channel closed", id);
            break;
        }
    }
    tracing::trace!("worker {} exiting after {} targets", id, processed);
}

/// A panicking capability still yields a failure outcome for its target.
fn process_guarded(fetcher: &dyn Fetcher, digester: &dyn Digester, target: Target) -> Outcome {
    match panic::catch_unwind(AssertUnwindSafe(|| process(fetcher, digester, &target))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!("worker panicked on {}: {}", target, message);
            Outcome::Failure(TargetError::Panicked { target, message })
        }
    }
}

fn process(fetcher: &dyn Fetcher, digester: &dyn Digester, target: &Target) -> Outcome {
    let mut body = match fetcher.fetch(target) {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!("{}", e);
            return Outcome::Failure(e.into());
        }
    };
    match digester.digest(&mut body) {
        Ok(digest) => {
            tracing::debug!("{} {}", target, digest);
            Outcome::Success {
                target: target.clone(),
                digest,
            }
        }
        Err(source) => {
            let e = DigestError {
                target: target.clone(),
                source,
            };
            tracing::debug!("{}", e);
            Outcome::Failure(e.into())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
