//! URL Parsing
//!
//! Lexical split of a raw URL into the parts the extractor needs.
//! Splitting never fails; only host classification can, and the extractor
//! decides what a failure means for each feature.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Host;

/// `scheme://` at the start of the input
static SCHEME_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("scheme prefix regex"));

/// Prepended to inputs without a scheme so bare domains parse
pub const DEFAULT_SCHEME_PREFIX: &str = "http://";

/// Prefix `http://` unless the input already carries a scheme.
pub fn normalize(url: &str) -> String {
    if SCHEME_PREFIX.is_match(url) {
        url.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME_PREFIX, url)
    }
}

// ============================================================================
// PARSED URL
// ============================================================================

/// What the host text turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    Ipv4,
    Ipv6,
    Domain,
    Empty,
}

/// Components of a normalized URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    /// Input after scheme normalization
    pub normalized: String,
    /// Lowercased scheme
    pub scheme: String,
    /// `userinfo@host:port` as written
    pub netloc: String,
    /// Host without userinfo, port or trailing dot; lowercased
    pub host: String,
    /// Port text after the host, if any
    pub port: Option<String>,
    /// Path without query or fragment
    pub path: String,
}

impl ParsedUrl {
    /// Normalize and split `raw`.
    pub fn parse(raw: &str) -> Self {
        let normalized = normalize(raw);

        let (scheme, rest) = match normalized.find("://") {
            Some(idx) => (normalized[..idx].to_ascii_lowercase(), &normalized[idx + 3..]),
            None => (String::new(), normalized.as_str()),
        };

        let netloc_end = rest.find(&['/', '?', '#'][..]).unwrap_or(rest.len());
        let netloc = &rest[..netloc_end];
        let after_netloc = &rest[netloc_end..];
        let path_end = after_netloc.find(&['?', '#'][..]).unwrap_or(after_netloc.len());
        let path = &after_netloc[..path_end];

        let (host, port) = split_host_port(netloc);

        Self {
            scheme,
            netloc: netloc.to_string(),
            host,
            port,
            path: path.to_string(),
            normalized,
        }
    }

    /// Classify the host with WHATWG host parsing.
    pub fn host_kind(&self) -> Result<HostKind, url::ParseError> {
        if self.host.is_empty() {
            return Ok(HostKind::Empty);
        }
        let input = if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        Ok(match Host::parse(&input)? {
            Host::Ipv4(_) => HostKind::Ipv4,
            Host::Ipv6(_) => HostKind::Ipv6,
            Host::Domain(_) => HostKind::Domain,
        })
    }

    /// Explicit port, if present and valid. `Err` carries the bad text.
    pub fn port_number(&self) -> Result<Option<u16>, String> {
        match &self.port {
            None => Ok(None),
            Some(text) => text.parse::<u16>().map(Some).map_err(|_| text.clone()),
        }
    }
}

/// Split `userinfo@host:port` into lowercased host and port text.
fn split_host_port(netloc: &str) -> (String, Option<String>) {
    let host_port = match netloc.rfind('@') {
        Some(idx) => &netloc[idx + 1..],
        None => netloc,
    };

    let (host, port) = if let Some(stripped) = host_port.strip_prefix('[') {
        // [v6]:port
        match stripped.find(']') {
            Some(close) => {
                let tail = &stripped[close + 1..];
                (&stripped[..close], tail.strip_prefix(':'))
            }
            None => (stripped, None),
        }
    } else {
        match host_port.rsplit_once(':') {
            Some((h, p)) => (h, Some(p)),
            None => (host_port, None),
        }
    };

    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let port = port.filter(|p| !p.is_empty()).map(str::to_string);
    (host, port)
}

// ============================================================================
// DOMAIN DECOMPOSITION
// ============================================================================

/// Public-suffix-aware split of a host name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainParts {
    /// Everything left of the registrable domain (`www`, `a.b`)
    pub subdomain: String,
    /// Registrable label (`example` in `www.example.co.uk`)
    pub domain: String,
    /// Public suffix (`co.uk`), empty when unknown
    pub suffix: String,
}

impl DomainParts {
    /// Decompose `host`. IP literals become the domain as a whole.
    pub fn split(host: &str, kind: HostKind) -> Self {
        match kind {
            HostKind::Empty => Self::default(),
            HostKind::Ipv4 | HostKind::Ipv6 => Self {
                domain: host.to_string(),
                ..Self::default()
            },
            HostKind::Domain => Self::split_name(host),
        }
    }

    fn split_name(host: &str) -> Self {
        let suffix = icann_suffix(host).unwrap_or("");

        let rest = if suffix.is_empty() {
            host
        } else if host == suffix {
            ""
        } else {
            host.strip_suffix(suffix)
                .and_then(|r| r.strip_suffix('.'))
                .unwrap_or(host)
        };

        let (subdomain, domain) = match rest.rsplit_once('.') {
            Some((sub, dom)) => (sub, dom),
            None => ("", rest),
        };

        Self {
            subdomain: subdomain.to_string(),
            domain: domain.to_string(),
            suffix: suffix.to_string(),
        }
    }

    /// Number of dot-separated labels in the subdomain
    pub fn subdomain_count(&self) -> usize {
        if self.subdomain.is_empty() {
            0
        } else {
            self.subdomain.split('.').count()
        }
    }
}

/// Longest ICANN public suffix of `host`.
///
/// Private registry entries (`blogspot.com`, `github.io`) are skipped, so
/// hosted sites keep the platform name as their registrable domain.
fn icann_suffix(host: &str) -> Option<&str> {
    let mut candidate = host;
    loop {
        let suffix = psl::suffix(candidate.as_bytes()).filter(|s| s.is_known())?;
        let len = suffix.as_bytes().len();
        let matched = candidate.get(candidate.len().checked_sub(len)?..)?;
        if suffix.typ() == Some(psl::Type::Icann) {
            return Some(matched);
        }
        // private entry: retry on what is left after its first label
        candidate = matched.split_once('.')?.1;
    }
}
