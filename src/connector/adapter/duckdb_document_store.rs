use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use duckdb::{params, Connection, Row};
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::interfaces::DocumentStore;
use crate::domain::{CandidateRow, Document, DomainError};

const VECTOR_DIMENSIONS: usize = 1536;

const TITLE_WEIGHT: f64 = 3.0;
const BODY_WEIGHT: f64 = 2.0;
const TAGS_WEIGHT: f64 = 1.0;

/// Document store backed by embedded DuckDB.
///
/// Realizes the Postgres-shaped contract (weighted full-text column, GIN
/// index, IVFFLAT vector index) with DuckDB's own mechanisms: a weighted
/// per-term `LIKE` scan stands in for the generated tsvector column, and the
/// VSS extension's HNSW index under cosine metric stands in for IVFFLAT —
/// both preserve the ranking contract the store trait requires.
pub struct DuckdbDocumentStore {
    conn: Arc<Mutex<Connection>>,
}

impl DuckdbDocumentStore {
    pub fn open(path: &Path) -> Result<Self, DomainError> {
        let conn = Connection::open(path)
            .map_err(|e| DomainError::store_unavailable(format!("failed to open DuckDB database: {e}")))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self, DomainError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DomainError::store_unavailable(format!("failed to open DuckDB in-memory database: {e}")))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn vector_to_array_literal(vector: &[f32]) -> Result<String, DomainError> {
        if vector.len() != VECTOR_DIMENSIONS {
            return Err(DomainError::invalid_query(format!(
                "expected embedding dimension {VECTOR_DIMENSIONS}, got {}",
                vector.len()
            )));
        }
        let mut s = String::with_capacity(vector.len() * 8);
        s.push('[');
        for (i, v) in vector.iter().enumerate() {
            if i > 0 {
                s.push_str(", ");
            }
            s.push_str(&v.to_string());
        }
        s.push(']');
        s.push_str(&format!("::FLOAT[{VECTOR_DIMENSIONS}]"));
        Ok(s)
    }

    fn row_to_document(row: &Row) -> Result<Document, duckdb::Error> {
        let tags_joined: String = row.get(3)?;
        let tags = if tags_joined.is_empty() {
            Vec::new()
        } else {
            tags_joined.split('\u{1f}').map(str::to_string).collect()
        };

        Ok(Document::reconstitute(
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            tags,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, Option<String>>(6)?,
            row.get::<_, String>(7)?,
            row.get::<_, Option<i64>>(8)?.map(from_unix_secs),
            row.get::<_, Option<i64>>(9)?.map(from_unix_secs),
            row.get::<_, Option<f64>>(10)?.map(|v| v as f32),
            None,
        ))
    }

    fn run_lexical(conn: &Connection, country: &str, query_text: &str, limit: usize) -> Result<Vec<CandidateRow>, DomainError> {
        let terms: Vec<&str> = query_text.split_whitespace().collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut score_parts = Vec::new();
        let mut where_parts = Vec::new();

        for term in &terms {
            let safe = term
                .to_lowercase()
                .replace('\\', "\\\\")
                .replace('\'', "''")
                .replace('%', "\\%")
                .replace('_', "\\_");
            // One term occurrence in a field contributes that field's weight;
            // occurrence counted via the length delta of a global replace.
            score_parts.push(format!(
                "({tw} * (LENGTH(LOWER(title)) - LENGTH(REPLACE(LOWER(title), '{s}', ''))) \
                 + {bw} * (LENGTH(LOWER(body)) - LENGTH(REPLACE(LOWER(body), '{s}', ''))) \
                 + {gw} * (LENGTH(LOWER(tags_blob)) - LENGTH(REPLACE(LOWER(tags_blob), '{s}', '')))) \
                 / GREATEST(LENGTH('{s}'), 1)",
                tw = TITLE_WEIGHT,
                bw = BODY_WEIGHT,
                gw = TAGS_WEIGHT,
                s = safe,
            ));
            where_parts.push(format!(
                "LOWER(title) LIKE '%{s}%' ESCAPE '\\' OR LOWER(body) LIKE '%{s}%' ESCAPE '\\' OR LOWER(tags_blob) LIKE '%{s}%' ESCAPE '\\'",
                s = safe
            ));
        }

        let score_expr = score_parts.join(" + ");
        let where_expr = where_parts.join(" OR ");

        let sql = format!(
            "SELECT id, title, body, tags_blob, url, domain, lang, country, \
                epoch(published_at), epoch(updated_at), authority_score, \
                CAST({score_expr} AS DOUBLE) AS score_raw \
             FROM documents \
             WHERE LOWER(country) = LOWER(?) AND ({where_expr}) \
             ORDER BY score_raw DESC, updated_at DESC, id ASC \
             LIMIT ?"
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::store_unavailable(format!("failed to prepare lexical search: {e}")))?;
        let mut rows = stmt
            .query(params![country, limit as i64])
            .map_err(|e| DomainError::store_unavailable(format!("failed to run lexical search: {e}")))?;

        let mut results = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| DomainError::store_unavailable(format!("failed to read lexical row: {e}")))?
        {
            let score: f64 = row
                .get(11)
                .map_err(|e| DomainError::store_unavailable(format!("failed to read score: {e}")))?;
            if score <= 0.0 {
                continue;
            }
            let doc = Self::row_to_document(row)
                .map_err(|e| DomainError::store_unavailable(format!("failed to parse document row: {e}")))?;
            results.push(CandidateRow::lexical(doc, score as f32));
        }
        Ok(results)
    }

    fn run_semantic(
        conn: &Connection,
        array_lit: &str,
        country: &str,
        limit: usize,
    ) -> Result<Vec<CandidateRow>, DomainError> {
        let sql = format!(
            "SELECT d.id, d.title, d.body, d.tags_blob, d.url, d.domain, d.lang, d.country, \
                epoch(d.published_at), epoch(d.updated_at), d.authority_score, \
                1.0 - array_cosine_distance(e.vector, {array_lit}) AS score_vector \
             FROM embeddings e \
             JOIN documents d ON d.id = e.doc_id \
             WHERE LOWER(d.country) = LOWER(?) \
             ORDER BY array_cosine_distance(e.vector, {array_lit}), d.updated_at DESC, d.id ASC \
             LIMIT ?"
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::store_unavailable(format!("failed to prepare semantic search: {e}")))?;
        let mut rows = stmt
            .query(params![country, limit as i64])
            .map_err(|e| DomainError::store_unavailable(format!("failed to run semantic search: {e}")))?;

        let mut results = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| DomainError::store_unavailable(format!("failed to read semantic row: {e}")))?
        {
            let score: f64 = row
                .get(11)
                .map_err(|e| DomainError::store_unavailable(format!("failed to read score_vector: {e}")))?;
            let doc = Self::row_to_document(row)
                .map_err(|e| DomainError::store_unavailable(format!("failed to parse document row: {e}")))?;
            results.push(CandidateRow::semantic(doc, score.clamp(0.0, 1.0) as f32));
        }
        Ok(results)
    }
}

fn from_unix_secs(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_else(Utc::now)
}

#[async_trait]
impl DocumentStore for DuckdbDocumentStore {
    async fn lexical_search(&self, country: &str, query_text: &str, limit: usize) -> Result<Vec<CandidateRow>, DomainError> {
        let conn = self.conn.lock().await;
        Self::run_lexical(&conn, country, query_text, limit)
    }

    async fn semantic_search(&self, query_vector: &[f32], country: &str, limit: usize) -> Result<Vec<CandidateRow>, DomainError> {
        let array_lit = Self::vector_to_array_literal(query_vector)?;
        let conn = self.conn.lock().await;
        Self::run_semantic(&conn, &array_lit, country, limit)
    }

    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize, DomainError> {
        if docs.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.lock().await;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::store_unavailable(format!("failed to begin transaction: {e}")))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR REPLACE INTO documents \
                     (id, title, body, tags_blob, url, domain, lang, country, published_at, updated_at, authority_score) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, to_timestamp(?), to_timestamp(?), ?)",
                )
                .map_err(|e| DomainError::store_unavailable(format!("failed to prepare upsert: {e}")))?;

            for doc in docs {
                stmt.execute(params![
                    doc.id(),
                    doc.title(),
                    doc.body(),
                    doc.tags().join("\u{1f}"),
                    doc.url(),
                    doc.domain(),
                    doc.lang(),
                    doc.country(),
                    doc.published_at().map(|ts| ts.timestamp()),
                    doc.updated_at().map(|ts| ts.timestamp()),
                    doc.authority_score(),
                ])
                .map_err(|e| DomainError::store_unavailable(format!("failed to upsert document {}: {e}", doc.id())))?;
            }
        }

        for doc in docs {
            if let Some(vector) = doc.embedding() {
                let array_lit = Self::vector_to_array_literal(vector)?;
                let sql = format!("INSERT OR REPLACE INTO embeddings (doc_id, vector) VALUES (?, {array_lit})");
                tx.execute(&sql, params![doc.id()])
                    .map_err(|e| DomainError::store_unavailable(format!("failed to upsert embedding for {}: {e}", doc.id())))?;
            }
        }

        tx.commit()
            .map_err(|e| DomainError::store_unavailable(format!("failed to commit upsert: {e}")))?;

        debug!(count = docs.len(), "upserted document chunk");
        Ok(docs.len())
    }

    async fn delete_batch(&self, ids: &[String]) -> Result<usize, DomainError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.lock().await;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::store_unavailable(format!("failed to begin transaction: {e}")))?;

        let placeholders = vec!["?"; ids.len()].join(", ");
        let params_refs: Vec<&dyn duckdb::ToSql> = ids.iter().map(|id| id as &dyn duckdb::ToSql).collect();

        tx.execute(
            &format!("DELETE FROM embeddings WHERE doc_id IN ({placeholders})"),
            params_refs.as_slice(),
        )
        .map_err(|e| DomainError::store_unavailable(format!("failed to delete embeddings: {e}")))?;

        let removed = tx
            .execute(
                &format!("DELETE FROM documents WHERE id IN ({placeholders})"),
                params_refs.as_slice(),
            )
            .map_err(|e| DomainError::store_unavailable(format!("failed to delete documents: {e}")))?;

        tx.commit()
            .map_err(|e| DomainError::store_unavailable(format!("failed to commit delete: {e}")))?;

        Ok(removed)
    }

    async fn find_embedding(&self, id: &str) -> Result<Option<Vec<f32>>, DomainError> {
        let conn = self.conn.lock().await;
        let result: Result<Vec<f32>, duckdb::Error> =
            conn.query_row("SELECT vector FROM embeddings WHERE doc_id = ?", params![id], |row| row.get(0));

        match result {
            Ok(vector) => Ok(Some(vector)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DomainError::store_unavailable(format!("failed to look up embedding: {e}"))),
        }
    }

    async fn ensure_schema(&self) -> Result<(), DomainError> {
        let conn = self.conn.lock().await;

        conn.execute_batch("INSTALL vss; LOAD vss; SET hnsw_enable_experimental_persistence = true;")
            .map_err(|e| DomainError::store_unavailable(format!("failed to load VSS extension: {e}")))?;

        let schema_sql = format!(
            "CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                tags_blob TEXT NOT NULL DEFAULT '',
                url TEXT NOT NULL,
                domain TEXT NOT NULL,
                lang TEXT,
                country TEXT NOT NULL,
                published_at TIMESTAMP,
                updated_at TIMESTAMP,
                authority_score DOUBLE
            );

            CREATE INDEX IF NOT EXISTS documents_country_idx ON documents (country);
            CREATE INDEX IF NOT EXISTS documents_domain_idx ON documents (domain);

            CREATE TABLE IF NOT EXISTS embeddings (
                doc_id TEXT PRIMARY KEY,
                vector FLOAT[{VECTOR_DIMENSIONS}] NOT NULL
            );

            CREATE INDEX IF NOT EXISTS embeddings_hnsw_idx ON embeddings USING HNSW (vector) WITH (metric = 'cosine');
            "
        );

        conn.execute_batch(&schema_sql)
            .map_err(|e| DomainError::store_unavailable(format!("failed to initialize schema: {e}")))?;

        Ok(())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let conn = self.conn.lock().await;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
            .map_err(|e| DomainError::store_unavailable(format!("failed to count documents: {e}")))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> DuckdbDocumentStore {
        let store = DuckdbDocumentStore::in_memory().unwrap();
        store
    }

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let store = store();
        store.ensure_schema().await.unwrap();
        store.ensure_schema().await.unwrap();
    }

    #[tokio::test]
    async fn upsert_then_lexical_search_finds_match() {
        let store = store();
        store.ensure_schema().await.unwrap();

        let doc = Document::new("apple", "Apple Pie Recipe", "A classic dessert", "http://x", "food.example", "us");
        store.upsert_batch(&[doc]).await.unwrap();

        let results = store.lexical_search("us", "apple", 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document().id(), "apple");
    }

    #[tokio::test]
    async fn country_scoping_excludes_other_countries() {
        let store = store();
        store.ensure_schema().await.unwrap();

        let us_doc = Document::new("us-doc", "Apple Pie", "body", "http://x", "food.example", "us");
        let ca_doc = Document::new("ca-doc", "Apple Pie", "body", "http://y", "food.example", "ca");
        store.upsert_batch(&[us_doc, ca_doc]).await.unwrap();

        let results = store.lexical_search("ca", "apple", 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document().id(), "ca-doc");
    }

    #[tokio::test]
    async fn delete_batch_removes_document_and_embedding() {
        let store = store();
        store.ensure_schema().await.unwrap();

        let doc = Document::new("to-delete", "t", "b", "http://x", "d.example", "us").with_embedding(vec![0.1; VECTOR_DIMENSIONS]);
        store.upsert_batch(&[doc]).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);

        let removed = store.delete_batch(&["to-delete".to_string()]).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.find_embedding("to-delete").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_embedding_returns_stored_vector() {
        let store = store();
        store.ensure_schema().await.unwrap();

        let vector = vec![0.2; VECTOR_DIMENSIONS];
        let doc = Document::new("with-vec", "t", "b", "http://x", "d.example", "us").with_embedding(vector.clone());
        store.upsert_batch(&[doc]).await.unwrap();

        let found = store.find_embedding("with-vec").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn semantic_search_orders_by_cosine_then_updated_at_then_id() {
        let store = store();
        store.ensure_schema().await.unwrap();

        let query_vector = vec![1.0; VECTOR_DIMENSIONS];
        let mut closest = vec![0.0; VECTOR_DIMENSIONS];
        closest[0] = 1.0;
        let mut farther = vec![0.0; VECTOR_DIMENSIONS];
        farther[0] = 1.0;
        farther[1] = 1.0;

        let near = Document::new("near", "t", "b", "http://x", "d.example", "us").with_embedding(closest);
        let far = Document::new("far", "t", "b", "http://y", "d.example", "us").with_embedding(farther);
        store.upsert_batch(&[near, far]).await.unwrap();

        let results = store.semantic_search(&query_vector, "us", 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document().id(), "near");
        assert!(results[0].score_vector().unwrap() >= results[1].score_vector().unwrap());
    }

    #[tokio::test]
    async fn semantic_search_excludes_documents_without_embeddings() {
        let store = store();
        store.ensure_schema().await.unwrap();

        let with_vec = Document::new("has-vec", "t", "b", "http://x", "d.example", "us").with_embedding(vec![0.3; VECTOR_DIMENSIONS]);
        let without_vec = Document::new("no-vec", "t", "b", "http://y", "d.example", "us");
        store.upsert_batch(&[with_vec, without_vec]).await.unwrap();

        let results = store.semantic_search(&vec![0.3; VECTOR_DIMENSIONS], "us", 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document().id(), "has-vec");
    }
}
