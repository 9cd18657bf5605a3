// tests/resolver_strategies.rs
//
// Strategy order of the single-record resolver: a native-key-shaped
// identifier tries the primary-key lookup first; slugs skip straight to
// the natural-key lookup; an origin hint restricts the search.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use estate_content::record::DEFAULT_AUTHOR;
use estate_content::{resolve, ContentRecord, Origin, RecordStore, Resolution};

struct MockStore {
    name: &'static str,
    origin: Origin,
    records: Vec<ContentRecord>,
    id_lookups: Arc<AtomicUsize>,
    key_lookups: Arc<AtomicUsize>,
}

impl MockStore {
    fn new(name: &'static str, origin: Origin, records: Vec<ContentRecord>) -> Self {
        Self {
            name,
            origin,
            records,
            id_lookups: Arc::new(AtomicUsize::new(0)),
            key_lookups: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn counters(&self) -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (self.id_lookups.clone(), self.key_lookups.clone())
    }
}

#[async_trait]
impl RecordStore for MockStore {
    fn name(&self) -> &str {
        self.name
    }
    fn origin(&self) -> Origin {
        self.origin
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<ContentRecord>> {
        self.id_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.iter().find(|r| r.id == id).cloned())
    }
    async fn find_by_natural_key(&self, key: &str) -> Result<Option<ContentRecord>> {
        self.key_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.iter().find(|r| r.source_key == key).cloned())
    }
}

struct FailingStore;

#[async_trait]
impl RecordStore for FailingStore {
    fn name(&self) -> &str {
        "failing"
    }
    fn origin(&self) -> Origin {
        Origin::Primary
    }
    async fn find_by_id(&self, _id: &str) -> Result<Option<ContentRecord>> {
        anyhow::bail!("store unavailable")
    }
    async fn find_by_natural_key(&self, _key: &str) -> Result<Option<ContentRecord>> {
        anyhow::bail!("store unavailable")
    }
}

fn rec(id: &str, slug: &str, title: &str, origin: Origin) -> ContentRecord {
    ContentRecord {
        id: id.to_string(),
        title: title.to_string(),
        summary: String::new(),
        body: String::new(),
        published_at: 0,
        display_date: String::new(),
        author: DEFAULT_AUTHOR.to_string(),
        image: None,
        origin,
        source_key: slug.to_string(),
    }
}

#[tokio::test]
async fn object_id_resolves_without_natural_key_lookup() {
    let oid = "507f1f77bcf86cd799439011";
    let store = MockStore::new(
        "docs",
        Origin::Secondary,
        vec![rec(oid, "some-post", "By Object Id", Origin::Secondary)],
    );
    let (_, key_lookups) = store.counters();
    let stores: Vec<Box<dyn RecordStore>> = vec![Box::new(store)];

    match resolve(oid, None, &stores).await {
        Resolution::Found(r) => assert_eq!(r.title, "By Object Id"),
        Resolution::NotFound => panic!("expected a hit on the id strategy"),
    }
    assert_eq!(
        key_lookups.load(Ordering::SeqCst),
        0,
        "a primary-key hit must short-circuit the natural-key strategy"
    );
}

#[tokio::test]
async fn slug_identifier_skips_the_id_strategy() {
    let store = MockStore::new(
        "docs",
        Origin::Secondary,
        vec![rec("11", "some-slug-not-an-id", "By Slug", Origin::Secondary)],
    );
    let (id_lookups, _) = store.counters();
    let stores: Vec<Box<dyn RecordStore>> = vec![Box::new(store)];

    let out = resolve("some-slug-not-an-id", None, &stores).await;
    assert_eq!(out.into_option().map(|r| r.title), Some("By Slug".to_string()));
    assert_eq!(
        id_lookups.load(Ordering::SeqCst),
        0,
        "non-key-shaped identifiers must not hit find_by_id"
    );
}

#[tokio::test]
async fn primary_key_strategy_wins_over_natural_key() {
    // "12345" is a record id on one record and a natural key on another.
    let by_id = rec("12345", "something-else", "Id Match", Origin::Primary);
    let by_key = rec("77", "12345", "Key Match", Origin::Primary);
    let stores: Vec<Box<dyn RecordStore>> =
        vec![Box::new(MockStore::new("docs", Origin::Primary, vec![by_id, by_key]))];

    match resolve("12345", None, &stores).await {
        Resolution::Found(r) => assert_eq!(r.title, "Id Match"),
        Resolution::NotFound => panic!("expected the id strategy to win"),
    }
}

#[tokio::test]
async fn each_strategy_is_attempted_at_most_once_per_store() {
    let store = MockStore::new("docs", Origin::Primary, vec![]);
    let (id_lookups, key_lookups) = store.counters();
    let stores: Vec<Box<dyn RecordStore>> = vec![Box::new(store)];

    let out = resolve("12345", None, &stores).await;
    assert_eq!(out, Resolution::NotFound);
    assert_eq!(id_lookups.load(Ordering::SeqCst), 1);
    assert_eq!(key_lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn origin_hint_restricts_the_search() {
    let primary = MockStore::new(
        "cms",
        Origin::Primary,
        vec![rec("1", "shared-slug", "Primary Copy", Origin::Primary)],
    );
    let secondary = MockStore::new(
        "docs",
        Origin::Secondary,
        vec![rec("2", "shared-slug", "Secondary Copy", Origin::Secondary)],
    );
    let stores: Vec<Box<dyn RecordStore>> = vec![Box::new(primary), Box::new(secondary)];

    match resolve("shared-slug", Some(Origin::Secondary), &stores).await {
        Resolution::Found(r) => assert_eq!(r.title, "Secondary Copy"),
        Resolution::NotFound => panic!("hinted origin holds the record"),
    }

    // Hinted origin without the record: miss, even though the other
    // origin could have served it.
    let out = resolve("1", Some(Origin::Secondary), &stores).await;
    assert_eq!(out, Resolution::NotFound);
}

#[tokio::test]
async fn miss_is_not_found_not_an_error() {
    let stores: Vec<Box<dyn RecordStore>> =
        vec![Box::new(MockStore::new("docs", Origin::Primary, vec![]))];
    let out = resolve("nothing-here", None, &stores).await;
    assert_eq!(out, Resolution::NotFound);
}

#[tokio::test]
async fn store_errors_degrade_to_the_next_store() {
    let healthy = MockStore::new(
        "docs",
        Origin::Secondary,
        vec![rec("9", "still-served", "Healthy", Origin::Secondary)],
    );
    let stores: Vec<Box<dyn RecordStore>> = vec![Box::new(FailingStore), Box::new(healthy)];

    match resolve("still-served", None, &stores).await {
        Resolution::Found(r) => assert_eq!(r.title, "Healthy"),
        Resolution::NotFound => panic!("healthy store must still be consulted"),
    }
}
