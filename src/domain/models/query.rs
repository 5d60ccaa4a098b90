use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::DomainError;

pub const MIN_K: usize = 1;
pub const MAX_K: usize = 200;
pub const DEFAULT_K: usize = 10;

/// Raw, caller-supplied query shape, prior to normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawQuery {
    pub text: String,
    pub country: String,
    pub k: Option<usize>,
    #[serde(default)]
    pub must_domains: Vec<String>,
    #[serde(default)]
    pub must_not_domains: Vec<String>,
    pub time_window: Option<TimeWindow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub from_unix_secs: i64,
    pub to_unix_secs: i64,
}

/// A canonical, validated query. Immutable after construction — the only
/// way to produce one is [`crate::application::normalize_query`].
///
/// Two semantically equivalent raw queries (same text, country, k, filters)
/// normalize to byte-identical field orderings and therefore the same
/// [`NormalizedQuery::fingerprint`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedQuery {
    text: String,
    country: String,
    k: usize,
    must_domains: BTreeSet<String>,
    must_not_domains: BTreeSet<String>,
    time_window: Option<TimeWindow>,
}

impl NormalizedQuery {
    /// Constructs a `NormalizedQuery` from already-canonical parts. Only
    /// `normalize_query` should call this — it is `pub(crate)` to keep the
    /// normalizer as the sole construction path.
    pub(crate) fn from_parts(
        text: String,
        country: String,
        k: usize,
        must_domains: BTreeSet<String>,
        must_not_domains: BTreeSet<String>,
        time_window: Option<TimeWindow>,
    ) -> Result<Self, DomainError> {
        if text.is_empty() {
            return Err(DomainError::invalid_query("query text must not be empty"));
        }
        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::invalid_query(format!(
                "country must be a 2-letter code, got {country:?}"
            )));
        }
        if !must_domains.is_disjoint(&must_not_domains) {
            return Err(DomainError::invalid_query(
                "mustDomains and mustNotDomains must be disjoint",
            ));
        }
        Ok(Self {
            text,
            country,
            k: k.clamp(MIN_K, MAX_K),
            must_domains,
            must_not_domains,
            time_window,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn must_domains(&self) -> &BTreeSet<String> {
        &self.must_domains
    }

    pub fn must_not_domains(&self) -> &BTreeSet<String> {
        &self.must_not_domains
    }

    pub fn time_window(&self) -> Option<TimeWindow> {
        self.time_window
    }

    pub fn has_domain_filters(&self) -> bool {
        !self.must_domains.is_empty() || !self.must_not_domains.is_empty()
    }

    pub fn passes_domain_filters(&self, domain: &str) -> bool {
        if self.must_not_domains.contains(domain) {
            return false;
        }
        self.must_domains.is_empty() || self.must_domains.contains(domain)
    }

    /// Deterministic fingerprint of the canonical form: a truncated SHA-256
    /// over a stable, sorted-field encoding. Used as the cache key.
    pub fn fingerprint(&self) -> String {
        let mut canonical = String::new();
        canonical.push_str("text=");
        canonical.push_str(&self.text);
        canonical.push_str("|country=");
        canonical.push_str(&self.country);
        canonical.push_str("|k=");
        canonical.push_str(&self.k.to_string());
        canonical.push_str("|must=");
        for d in &self.must_domains {
            canonical.push_str(d);
            canonical.push(',');
        }
        canonical.push_str("|mustnot=");
        for d in &self.must_not_domains {
            canonical.push_str(d);
            canonical.push(',');
        }
        if let Some(w) = self.time_window {
            canonical.push_str(&format!("|window={}..{}", w.from_unix_secs, w.to_unix_secs));
        }

        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let digest = hasher.finalize();
        hex_prefix(&digest, 16)
    }
}

fn hex_prefix(bytes: &[u8], len: usize) -> String {
    bytes
        .iter()
        .take(len)
        .map(|b| format!("{:02x}", b))
        .collect()
}
