//! Fetch capability: turn a target into a streamed response body.
//!
//! The pipeline only sees the `Fetcher` trait. `CurlFetcher` is the default
//! implementation; tests substitute in-memory fetchers.

mod classify;
mod transport;

use std::io::Read;

use crate::error::FetchError;
use crate::target::Target;

pub use classify::{classify_curl_error, curl_error_to_io};
pub use transport::CurlFetcher;

/// Streamed response body. Reading may fail mid-way (e.g. timeout after headers).
pub type Body = Box<dyn Read + Send>;

/// Performs one request per call, bounded by the implementation's timeout.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, target: &Target) -> Result<Body, FetchError>;
}
