use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::digest::DigestAlgorithm;
use crate::error::ConfigError;
use crate::fetch::CurlFetcher;
use crate::pipeline::Pipeline;

/// Global configuration loaded from `~/.config/urlsum/config.toml`.
/// Every field is optional in the file; command-line flags override it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlsumConfig {
    /// Number of parallel requests (workers).
    pub parallel: usize,
    /// Total per-request timeout in seconds (connect + headers + body).
    pub timeout_secs: u64,
    /// Optional bound on connection setup in seconds; capped at `timeout_secs`.
    pub connect_timeout_secs: Option<u64>,
    /// Digest applied to each body: "md5" (default) or "sha256".
    pub algorithm: DigestAlgorithm,
    /// Optional User-Agent header sent with each request.
    pub user_agent: Option<String>,
}

impl Default for UrlsumConfig {
    fn default() -> Self {
        Self {
            parallel: 10,
            timeout_secs: 60,
            connect_timeout_secs: None,
            algorithm: DigestAlgorithm::Md5,
            user_agent: None,
        }
    }
}

impl UrlsumConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builds the libcurl fetch capability described by this config.
    pub fn fetcher(&self) -> CurlFetcher {
        let mut fetcher = CurlFetcher::new(self.timeout());
        if let Some(secs) = self.connect_timeout_secs {
            fetcher = fetcher.with_connect_timeout(Duration::from_secs(secs));
        }
        if let Some(ua) = &self.user_agent {
            fetcher = fetcher.with_user_agent(ua.clone());
        }
        fetcher
    }

    /// Builds a pipeline over `raw` using this config's worker count, digest and transport.
    pub fn pipeline<I, S>(&self, raw: I) -> Result<Pipeline, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Pipeline::with_fetcher(raw, self.parallel, self.algorithm, self.fetcher())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("urlsum")?;
    Ok(xdg_dirs.get_config_file("config.toml"))
}

/// Load configuration from the default path, or built-in defaults if no file exists.
pub fn load_or_default() -> Result<UrlsumConfig> {
    let path = config_path()?;
    if !path.exists() {
        tracing::debug!("no config at {}, using defaults", path.display());
        return Ok(UrlsumConfig::default());
    }
    load_from(&path)
}

/// Load configuration from an explicit file.
pub fn load_from(path: &Path) -> Result<UrlsumConfig> {
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: UrlsumConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let cfg = UrlsumConfig::default();
        assert_eq!(cfg.parallel, 10);
        assert_eq!(cfg.timeout_secs, 60);
        assert_eq!(cfg.algorithm, DigestAlgorithm::Md5);
        assert!(cfg.connect_timeout_secs.is_none());
        assert!(cfg.user_agent.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = UrlsumConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: UrlsumConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.parallel, cfg.parallel);
        assert_eq!(parsed.timeout_secs, cfg.timeout_secs);
        assert_eq!(parsed.algorithm, cfg.algorithm);
    }

    #[test]
    fn config_toml_partial_uses_defaults() {
        let toml = r#"
            parallel = 4
            algorithm = "sha256"
        "#;
        let cfg: UrlsumConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.parallel, 4);
        assert_eq!(cfg.algorithm, DigestAlgorithm::Sha256);
        assert_eq!(cfg.timeout_secs, 60);
    }

    #[test]
    fn config_toml_transport_options() {
        let toml = r#"
            timeout_secs = 5
            connect_timeout_secs = 2
            user_agent = "urlsum/0.1"
        "#;
        let cfg: UrlsumConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.timeout(), Duration::from_secs(5));
        assert_eq!(cfg.connect_timeout_secs, Some(2));
        assert_eq!(cfg.user_agent.as_deref(), Some("urlsum/0.1"));
        assert_eq!(cfg.fetcher().timeout(), Duration::from_secs(5));
    }

    #[test]
    fn config_toml_rejects_unknown_algorithm() {
        let toml = r#"algorithm = "crc32""#;
        assert!(toml::from_str::<UrlsumConfig>(toml).is_err());
    }

    #[test]
    fn pipeline_from_config() {
        let cfg = UrlsumConfig {
            parallel: 3,
            ..Default::default()
        };
        let pipeline = cfg.pipeline(["abc", "example.com"]).unwrap();
        assert_eq!(pipeline.parallel(), 3);
        assert_eq!(pipeline.targets().len(), 1);
    }

    #[test]
    fn pipeline_from_config_rejects_bad_values() {
        let zero_workers = UrlsumConfig {
            parallel: 0,
            ..Default::default()
        };
        assert_eq!(
            zero_workers.pipeline(["example.com"]).err(),
            Some(ConfigError::NoWorkers)
        );
        let zero_timeout = UrlsumConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            zero_timeout.pipeline(["example.com"]).err(),
            Some(ConfigError::ZeroTimeout)
        );
    }

    #[test]
    fn load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "parallel = 3").unwrap();
        f.flush().unwrap();
        let cfg = load_from(f.path()).unwrap();
        assert_eq!(cfg.parallel, 3);
    }

    #[test]
    fn load_from_missing_file_errors_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("absent.toml"));
    }
}
