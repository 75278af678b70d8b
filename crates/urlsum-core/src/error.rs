//! Error types for a pipeline run.
//!
//! Per-target errors never abort a run: workers turn them into failure
//! outcomes. Only `ConfigError` is returned to the caller directly, and only
//! from construction.

use std::io;

use crate::target::Target;

/// Boxed cause carried by a `FetchError`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Rough classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The per-request timeout expired before the body started.
    Timeout,
    /// DNS, refused connection, reset, or nothing received.
    Connection,
    /// Handshake or certificate failure.
    Tls,
    /// Anything else (bad URL, unsupported protocol, ...).
    Other,
}

/// Network or transport failure for one target. Never retried.
#[derive(Debug, thiserror::Error)]
#[error("fetch {target}: {source}")]
pub struct FetchError {
    pub target: Target,
    pub kind: FetchErrorKind,
    #[source]
    pub source: BoxError,
}

impl FetchError {
    pub fn new(target: Target, kind: FetchErrorKind, source: impl Into<BoxError>) -> Self {
        Self {
            target,
            kind,
            source: source.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == FetchErrorKind::Timeout
    }
}

/// Failure while reading or hashing a body that was fetched successfully.
#[derive(Debug, thiserror::Error)]
#[error("digest {target}: {source}")]
pub struct DigestError {
    pub target: Target,
    #[source]
    pub source: io::Error,
}

/// Terminal error for one target, as collected by the aggregator.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Digest(#[from] DigestError),
    /// A fetch or digest capability panicked while processing the target.
    #[error("worker panicked on {target}: {message}")]
    Panicked { target: Target, message: String },
}

impl TargetError {
    pub fn target(&self) -> &Target {
        match self {
            TargetError::Fetch(e) => &e.target,
            TargetError::Digest(e) => &e.target,
            TargetError::Panicked { target, .. } => target,
        }
    }

    /// True for a fetch timeout, and for a body read that timed out mid-transfer.
    pub fn is_timeout(&self) -> bool {
        match self {
            TargetError::Fetch(e) => e.is_timeout(),
            TargetError::Digest(e) => e.source.kind() == io::ErrorKind::TimedOut,
            TargetError::Panicked { .. } => false,
        }
    }
}

/// Invalid pipeline configuration, reported before any network activity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("worker count must be at least 1")]
    NoWorkers,
    #[error("fetch timeout must be greater than zero")]
    ZeroTimeout,
}
