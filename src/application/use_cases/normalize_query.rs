use std::collections::BTreeSet;

use crate::domain::{DomainError, NormalizedQuery, RawQuery};

/// `normalize(raw, defaults) -> NormalizedQuery | fails(InvalidQuery)`.
///
/// Trims `text`, lowercases `country`, clamps `k`, and de-duplicates /
/// lowercases the domain filter sets. Output is deterministic: the same
/// input always yields the same [`NormalizedQuery::fingerprint`].
pub fn normalize_query(raw: RawQuery, default_k: usize) -> Result<NormalizedQuery, DomainError> {
    let text = raw.text.trim().to_string();
    if text.is_empty() {
        return Err(DomainError::invalid_query("query text must not be empty after trimming"));
    }

    let country = raw.country.trim().to_lowercase();

    // `k` absent defaults to `default_k`; `k=0` is an explicit caller error,
    // not a request to clamp up to the minimum.
    if raw.k == Some(0) {
        return Err(DomainError::invalid_query("k must be at least 1, got 0"));
    }
    let k = raw.k.unwrap_or(default_k);

    let must_domains: BTreeSet<String> = raw.must_domains.iter().map(|d| d.trim().to_lowercase()).collect();
    let must_not_domains: BTreeSet<String> = raw
        .must_not_domains
        .iter()
        .map(|d| d.trim().to_lowercase())
        .collect();

    NormalizedQuery::from_parts(text, country, k, must_domains, must_not_domains, raw.time_window)
}
