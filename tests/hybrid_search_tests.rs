use std::sync::Arc;

use hybrid_search_engine::{
    CacheStore, Document, DocumentStore, DuckdbDocumentStore, EmbeddingClient, EngineConfig,
    Evaluator, GoldQuery, MemoryCache, MockEmbedding, RawQuery, SearchUseCase,
};
use tempfile::tempdir;

async fn seeded_store() -> Arc<DuckdbDocumentStore> {
    let store = DuckdbDocumentStore::in_memory().expect("in-memory duckdb");
    store.ensure_schema().await.expect("ensure schema");
    Arc::new(store)
}

fn engine(store: Arc<dyn DocumentStore>, embedder: Arc<dyn EmbeddingClient>) -> SearchUseCase {
    let cache: Arc<dyn CacheStore> = Arc::new(MemoryCache::new());
    SearchUseCase::new(store, embedder, cache, EngineConfig::default())
}

#[tokio::test]
async fn lexical_only_hit_ranks_the_matching_document_first() {
    let store = seeded_store().await;
    let docs = vec![
        Document::new("apple", "Apple Pie Recipe", "A classic dessert.", "http://a", "food.example", "us"),
        Document::new("banana", "Banana Bread", "A moist loaf.", "http://b", "food.example", "us"),
        Document::new("cherry", "Cherry Tart", "A tangy treat.", "http://c", "food.example", "us"),
    ];
    store.upsert_batch(&docs).await.unwrap();

    let embedder: Arc<dyn EmbeddingClient> = Arc::new(MockEmbedding::new());
    let search = engine(store.clone(), embedder);

    let results = search
        .execute(RawQuery {
            text: "apple".into(),
            country: "US".into(),
            k: Some(2),
            must_domains: vec![],
            must_not_domains: vec![],
            time_window: None,
        })
        .await
        .unwrap();

    assert_eq!(results[0].document().id(), "apple");
    assert!(results.iter().all(|r| r.document().country() == "us"));
}

#[tokio::test]
async fn domain_filter_excludes_blocked_domain() {
    let store = seeded_store().await;
    let docs = vec![
        Document::new("good-1", "Daily News", "headline one", "http://a", "news.example", "us"),
        Document::new("good-2", "Daily News Two", "headline two", "http://b", "news.example", "us"),
        Document::new("spam", "News Spam", "headline spam", "http://c", "spam.example", "us"),
    ];
    store.upsert_batch(&docs).await.unwrap();

    let embedder: Arc<dyn EmbeddingClient> = Arc::new(MockEmbedding::new());
    let search = engine(store.clone(), embedder);

    let results = search
        .execute(RawQuery {
            text: "news".into(),
            country: "us".into(),
            k: Some(10),
            must_domains: vec![],
            must_not_domains: vec!["spam.example".into()],
            time_window: None,
        })
        .await
        .unwrap();

    assert!(results.iter().all(|r| r.document().domain() != "spam.example"));
}

#[tokio::test]
async fn country_isolation_only_returns_matching_country() {
    let store = seeded_store().await;
    let docs = vec![
        Document::new("us-doc", "Apple Pie Recipe", "body", "http://a", "food.example", "us"),
        Document::new("ca-doc", "Apple Pie Recipe", "body", "http://b", "food.example", "ca"),
    ];
    store.upsert_batch(&docs).await.unwrap();

    let embedder: Arc<dyn EmbeddingClient> = Arc::new(MockEmbedding::new());
    let search = engine(store.clone(), embedder);

    let results = search
        .execute(RawQuery {
            text: "apple".into(),
            country: "CA".into(),
            k: Some(10),
            must_domains: vec![],
            must_not_domains: vec![],
            time_window: None,
        })
        .await
        .unwrap();

    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r.document().country() == "ca"));
}

#[tokio::test]
async fn repeated_query_is_served_from_cache() {
    let store = seeded_store().await;
    let docs = vec![Document::new("apple", "Apple Pie Recipe", "body", "http://a", "food.example", "us")];
    store.upsert_batch(&docs).await.unwrap();

    let embedder: Arc<dyn EmbeddingClient> = Arc::new(MockEmbedding::new());
    let cache: Arc<dyn CacheStore> = Arc::new(MemoryCache::new());
    let search = SearchUseCase::new(store.clone(), embedder, cache, EngineConfig::default());

    let raw = RawQuery {
        text: "apple".into(),
        country: "us".into(),
        k: Some(10),
        must_domains: vec![],
        must_not_domains: vec![],
        time_window: None,
    };

    let first = search.execute(raw.clone()).await.unwrap();

    // Mutate the fixture after the first call; a cache hit must not see it.
    store.delete_batch(&["apple".to_string()]).await.unwrap();

    let second = search.execute(raw).await.unwrap();
    assert_eq!(first.len(), second.len());
    assert_eq!(first[0].document().id(), second[0].document().id());
}

#[tokio::test]
async fn evaluator_passes_threshold_on_a_well_matched_gold_set() {
    let dir = tempdir().unwrap();
    let _ = dir.path();

    let store = seeded_store().await;
    let docs = vec![
        Document::new("apple", "Apple Pie Recipe", "A classic dessert.", "http://a", "food.example", "us"),
        Document::new("banana", "Banana Bread", "A moist loaf.", "http://b", "food.example", "us"),
    ];
    store.upsert_batch(&docs).await.unwrap();

    let embedder: Arc<dyn EmbeddingClient> = Arc::new(MockEmbedding::new());
    let evaluator = Evaluator::new(store.clone(), embedder, EngineConfig::default());

    let gold = vec![
        GoldQuery {
            query: "apple".into(),
            country: "us".into(),
            expected_ids: vec!["apple".into()],
            must_domains: vec![],
            must_not_domains: vec![],
            k: Some(2),
            time_window: None,
        },
        GoldQuery {
            query: "banana".into(),
            country: "us".into(),
            expected_ids: vec!["banana".into()],
            must_domains: vec![],
            must_not_domains: vec![],
            k: Some(2),
            time_window: None,
        },
    ];

    let summary = evaluator.run(&gold).await.unwrap();
    assert!(summary.passes_thresholds());
}

#[tokio::test]
async fn evaluator_fails_threshold_on_a_mismatched_gold_set() {
    let store = seeded_store().await;
    let docs = vec![Document::new("apple", "Apple Pie Recipe", "A classic dessert.", "http://a", "food.example", "us")];
    store.upsert_batch(&docs).await.unwrap();

    let embedder: Arc<dyn EmbeddingClient> = Arc::new(MockEmbedding::new());
    let evaluator = Evaluator::new(store.clone(), embedder, EngineConfig::default());

    let gold = vec![GoldQuery {
        query: "apple".into(),
        country: "us".into(),
        expected_ids: vec!["nonexistent-id".into()],
        must_domains: vec![],
        must_not_domains: vec![],
        k: Some(2),
        time_window: None,
    }];

    let summary = evaluator.run(&gold).await.unwrap();
    assert!(!summary.passes_thresholds());
}
