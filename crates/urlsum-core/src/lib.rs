pub mod config;
pub mod logging;

pub mod digest;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod target;

pub use digest::{DigestAlgorithm, Digester};
pub use error::{ConfigError, DigestError, FetchError, FetchErrorKind, TargetError};
pub use fetch::{Body, CurlFetcher, Fetcher};
pub use pipeline::{Outcome, Pipeline, ResultSet};
pub use target::Target;
