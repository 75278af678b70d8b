//! CLI for urlsum.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use urlsum_core::config::{self, UrlsumConfig};
use urlsum_core::{DigestAlgorithm, ResultSet};

/// Fetch URLs concurrently and print a digest of each response body.
#[derive(Debug, Parser)]
#[command(name = "urlsum")]
#[command(about = "Fetch URLs concurrently and print a digest of each response body", long_about = None)]
pub struct Cli {
    /// Number of parallel requests (default 10).
    #[arg(long, value_name = "N")]
    pub parallel: Option<usize>,

    /// Per-request timeout in seconds, covering connect, headers and body (default 60).
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Separate bound on connection setup in seconds.
    #[arg(long, value_name = "SECS")]
    pub connect_timeout: Option<u64>,

    /// Digest algorithm: md5 (default) or sha256.
    #[arg(long, value_name = "ALGO")]
    pub algorithm: Option<DigestAlgorithm>,

    /// Read configuration from this file instead of ~/.config/urlsum/config.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Also print failed targets to stderr.
    #[arg(long)]
    pub report_failures: bool,

    /// Addresses to fetch. A missing scheme defaults to http; malformed ones are skipped.
    pub urls: Vec<String>,
}

impl Cli {
    pub fn run_from_args() -> Result<()> {
        Cli::parse().run()
    }

    /// Command-line flags win over the config file.
    pub fn apply_overrides(&self, mut cfg: UrlsumConfig) -> UrlsumConfig {
        if let Some(parallel) = self.parallel {
            cfg.parallel = parallel;
        }
        if let Some(timeout) = self.timeout {
            cfg.timeout_secs = timeout;
        }
        if let Some(connect) = self.connect_timeout {
            cfg.connect_timeout_secs = Some(connect);
        }
        if let Some(algorithm) = self.algorithm {
            cfg.algorithm = algorithm;
        }
        cfg
    }

    fn run(self) -> Result<()> {
        let cfg = match &self.config {
            Some(path) => config::load_from(path)?,
            None => config::load_or_default()?,
        };
        let cfg = self.apply_overrides(cfg);
        tracing::debug!("effective config: {:?}", cfg);

        let pipeline = cfg.pipeline(&self.urls).context("invalid configuration")?;
        let skipped = self.urls.len() - pipeline.targets().len();
        if skipped > 0 {
            tracing::info!("skipped {} malformed addresses", skipped);
        }

        let results = pipeline.run();
        self.print(&results)?;
        Ok(())
    }

    /// Successes go to stdout. Failures are logged, and echoed to stderr only on request.
    fn print(&self, results: &ResultSet) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for line in results.successes() {
            writeln!(out, "{}", line)?;
        }
        out.flush()?;

        for e in results.failures() {
            tracing::warn!("failed: {}", e);
            if self.report_failures {
                eprintln!("{}", e);
            }
        }
        Ok(())
    }
}
