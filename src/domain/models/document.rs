use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dimensionality of stored embeddings (matches the document store's
/// `embedding VECTOR(1536)` column).
pub const EMBEDDING_DIMENSIONS: usize = 1536;

/// A localized, retrievable document.
///
/// `id` is the stable primary key; upserts replace all mutable fields and
/// preserve a prior `embedding` when the new one is absent (see
/// [`Document::merge_onto`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    id: String,
    title: String,
    body: String,
    tags: Vec<String>,
    url: String,
    domain: String,
    lang: Option<String>,
    country: String,
    published_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    authority_score: Option<f32>,
    embedding: Option<Vec<f32>>,
}

impl Document {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        url: impl Into<String>,
        domain: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            tags: Vec::new(),
            url: url.into(),
            domain: domain.into(),
            lang: None,
            country: country.into().to_lowercase(),
            published_at: None,
            updated_at: None,
            authority_score: None,
            embedding: None,
        }
    }

    /// Reconstitutes from persisted data (used by store adapters).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: String,
        title: String,
        body: String,
        tags: Vec<String>,
        url: String,
        domain: String,
        lang: Option<String>,
        country: String,
        published_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
        authority_score: Option<f32>,
        embedding: Option<Vec<f32>>,
    ) -> Self {
        Self {
            id,
            title,
            body,
            tags,
            url,
            domain,
            lang,
            country: country.to_lowercase(),
            published_at,
            updated_at,
            authority_score,
            embedding,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn with_published_at(mut self, ts: DateTime<Utc>) -> Self {
        self.published_at = Some(ts);
        self
    }

    pub fn with_updated_at(mut self, ts: DateTime<Utc>) -> Self {
        self.updated_at = Some(ts);
        self
    }

    pub fn with_authority_score(mut self, score: f32) -> Self {
        self.authority_score = Some(score.clamp(0.0, 1.0));
        self
    }

    /// Attaches a unit-normalized embedding. Vectors are normalized in place
    /// so the stored invariant (‖v‖₂ ≈ 1) always holds.
    pub fn with_embedding(mut self, vector: Vec<f32>) -> Self {
        self.embedding = Some(normalize(vector));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn lang(&self) -> Option<&str> {
        self.lang.as_deref()
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn authority_score(&self) -> Option<f32> {
        self.authority_score
    }

    pub fn embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref()
    }

    pub fn matches_country(&self, country: &str) -> bool {
        self.country.eq_ignore_ascii_case(country)
    }

    /// Text fed to the embedding client: `title \n body`, per the indexer's
    /// embedding-backfill contract.
    pub fn embedding_source_text(&self) -> String {
        format!("{}\n{}", self.title, self.body)
    }

    /// Applies an incoming upsert `new` onto `self`, preserving the prior
    /// embedding when `new` carries none (`embedding = COALESCE(new, existing)`).
    pub fn merge_onto(self, new: Document) -> Document {
        Document {
            embedding: new.embedding.or(self.embedding),
            ..new
        }
    }

    /// Age of the document in days, using `updated_at` or falling back to
    /// `published_at`. `None` when neither is known.
    pub fn age_days(&self, now: DateTime<Utc>) -> Option<f64> {
        let ts = self.updated_at.or(self.published_at)?;
        Some((now - ts).num_seconds() as f64 / 86_400.0)
    }
}

fn normalize(vector: Vec<f32>) -> Vec<f32> {
    let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        vector.into_iter().map(|x| x / magnitude).collect()
    } else {
        vector
    }
}
