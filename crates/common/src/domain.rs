//! Domain selection and resolution.
//!
//! Every certflow run operates on exactly one domain: either the configured
//! primary domain or one of its subdomains. A [`DomainSelector`] captures
//! that choice independently of the primary domain it resolves against, so
//! the CLI boundary, the flows, and the cron scan all share one vocabulary.

use std::fmt;

/// Which domain an invocation targets, relative to the configured primary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainSelector {
    /// The primary domain itself.
    Main,
    /// A subdomain of the primary domain, e.g. `api` for `api.example.com`.
    Sub(String),
}

impl DomainSelector {
    /// Resolve to a fully-qualified hostname against `primary`.
    pub fn resolve(&self, primary: &str) -> String {
        match self {
            Self::Main => primary.to_string(),
            Self::Sub(sub) => format!("{sub}.{primary}"),
        }
    }

    /// Map an inventory domains string back to a selector.
    ///
    /// The string is the verbatim `Domains:` value from the certificate
    /// inventory. Returns `Some(Main)` on an exact match against `primary`,
    /// `Some(Sub(..))` when it is a direct or nested subdomain of `primary`,
    /// and `None` for anything else (unrelated certificates on the host are
    /// expected and skipped by the caller).
    pub fn from_inventory_domains(domains: &str, primary: &str) -> Option<Self> {
        if domains == primary {
            return Some(Self::Main);
        }
        domains
            .strip_suffix(primary)
            .and_then(|prefix| prefix.strip_suffix('.'))
            .map(|sub| Self::Sub(sub.to_string()))
    }
}

impl fmt::Display for DomainSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => write!(f, "(main)"),
            Self::Sub(sub) => write!(f, "{sub}"),
        }
    }
}
