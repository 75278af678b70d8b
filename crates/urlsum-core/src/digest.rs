//! Content digests of response bodies.
//!
//! The pipeline takes any `Digester`; the built-in algorithms stream the body
//! through the hasher in fixed-size chunks so memory stays bounded no matter
//! how large the response is.

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::{self, Read};
use std::str::FromStr;

const BUF_SIZE: usize = 64 * 1024;

/// Pluggable digest capability: consume a body fully, return lowercase hex.
///
/// Implemented for every `Fn(&mut dyn Read) -> io::Result<String>` closure, so
/// test doubles need no extra types.
pub trait Digester: Send + Sync {
    fn digest(&self, body: &mut dyn Read) -> io::Result<String>;
}

impl<F> Digester for F
where
    F: Fn(&mut dyn Read) -> io::Result<String> + Send + Sync,
{
    fn digest(&self, body: &mut dyn Read) -> io::Result<String> {
        self(body)
    }
}

/// Built-in digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Md5,
    Sha256,
}

impl Digester for DigestAlgorithm {
    fn digest(&self, body: &mut dyn Read) -> io::Result<String> {
        match self {
            DigestAlgorithm::Md5 => hex_digest::<Md5>(body),
            DigestAlgorithm::Sha256 => hex_digest::<Sha256>(body),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestAlgorithm::Md5 => f.write_str("md5"),
            DigestAlgorithm::Sha256 => f.write_str("sha256"),
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(DigestAlgorithm::Md5),
            "sha256" | "sha-256" => Ok(DigestAlgorithm::Sha256),
            other => Err(format!("unknown digest algorithm {:?} (expected md5 or sha256)", other)),
        }
    }
}

/// Streams `body` through hasher `D` and returns the digest as lowercase hex.
pub fn hex_digest<D: Digest>(body: &mut dyn Read) -> io::Result<String> {
    let mut hasher = D::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = match body.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
