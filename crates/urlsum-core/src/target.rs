//! Target preparation: turn raw address strings into schemed URLs.
//!
//! Validity is decided by the WHATWG URL parser (`url` crate), but a target
//! keeps the address as it was given: only a missing `http://` is added and
//! the scheme lowercased. Anything without a plausible host is dropped
//! without an error; best-effort filtering is the contract here.

use std::fmt;
use url::{Host, Url};

const DEFAULT_SCHEME_PREFIX: &str = "http://";

/// A schemed address to fetch. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target(String);

impl Target {
    /// Parses one raw address. Returns `None` when the input is not a usable URL.
    ///
    /// - `abc.com` → `http://abc.com`
    /// - `localhost:8080` → `http://localhost:8080`
    /// - `abc` → `None` (single-label host)
    pub fn parse(raw: &str) -> Option<Target> {
        let raw = raw.trim();
        let rendered = match Url::parse(raw) {
            Ok(url) if url.has_host() => {
                if !has_plausible_host(&url) {
                    return None;
                }
                let rest = raw.get(url.scheme().len()..)?;
                format!("{}{}", url.scheme(), rest)
            }
            // No scheme, or the "scheme" is really a host as in `localhost:8080`.
            Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => {
                let schemed = format!("{}{}", DEFAULT_SCHEME_PREFIX, raw);
                let url = Url::parse(&schemed).ok()?;
                if !has_plausible_host(&url) {
                    return None;
                }
                schemed
            }
            Err(_) => return None,
        };
        Some(Target(rendered))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Target {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// IP literals, `localhost`, or a domain with at least two labels.
fn has_plausible_host(url: &Url) -> bool {
    match url.host() {
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => true,
        Some(Host::Domain(domain)) => {
            domain.eq_ignore_ascii_case("localhost")
                || domain.split('.').filter(|label| !label.is_empty()).count() >= 2
        }
        None => false,
    }
}

/// Prepares raw addresses in order, silently skipping malformed ones.
pub fn prepare<I, S>(raw: I) -> Vec<Target>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .filter_map(|s| {
            let s = s.as_ref();
            let target = Target::parse(s);
            if target.is_none() {
                tracing::debug!("dropping malformed address {:?}", s);
            }
            target
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(targets: &[Target]) -> Vec<&str> {
        targets.iter().map(Target::as_str).collect()
    }

    #[test]
    fn prepare_defaults_scheme_and_drops_single_labels() {
        let raw = [
            "abc",
            "abc.com",
            "goo.gle",
            "www.google.com",
            "example.com/a/b/c/d/e",
        ];
        let targets = prepare(raw);
        assert_eq!(
            strings(&targets),
            [
                "http://abc.com",
                "http://goo.gle",
                "http://www.google.com",
                "http://example.com/a/b/c/d/e",
            ]
        );
    }

    #[test]
    fn prepare_keeps_explicit_schemes() {
        let targets = prepare(["https://example.org/x?y=1", "ftp://files.example.net/pub"]);
        assert_eq!(
            strings(&targets),
            ["https://example.org/x?y=1", "ftp://files.example.net/pub"]
        );
    }

    #[test]
    fn prepare_accepts_ip_and_localhost_hosts() {
        let targets = prepare(["127.0.0.1:8080/a", "localhost:3000", "http://[::1]:9000/"]);
        assert_eq!(
            strings(&targets),
            [
                "http://127.0.0.1:8080/a",
                "http://localhost:3000",
                "http://[::1]:9000/",
            ]
        );
    }

    #[test]
    fn prepare_drops_malformed_entries_and_preserves_order() {
        let targets = prepare([
            "",
            "b.example.com",
            "http://",
            "mailto:someone",
            "abc.",
            "a.example.com",
            "http://exa mple.com",
        ]);
        assert_eq!(
            strings(&targets),
            ["http://b.example.com", "http://a.example.com"]
        );
    }

    #[test]
    fn parse_keeps_address_as_given() {
        let t = Target::parse("HTTP://Example.COM/Path").unwrap();
        assert_eq!(t.as_str(), "http://Example.COM/Path");
        assert_eq!(t.to_string(), "http://Example.COM/Path");
        let t = Target::parse("  https://example.org  ").unwrap();
        assert_eq!(t.as_str(), "https://example.org");
    }

    #[test]
    fn parse_does_not_add_trailing_slash() {
        let t = Target::parse("http://127.0.0.1:43397").unwrap();
        assert_eq!(t.as_str(), "http://127.0.0.1:43397");
        let t = Target::parse("127.0.0.1:43397").unwrap();
        assert_eq!(t.as_str(), "http://127.0.0.1:43397");
    }
}
