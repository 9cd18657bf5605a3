// src/store.rs
use anyhow::Result;
use async_trait::async_trait;

use crate::fetch::SourceFetcher;
use crate::record::{ContentRecord, Origin};
use crate::resolve::RecordStore;

/// `RecordStore` over a source fetcher: pulls the source's batch and
/// scans it by id or natural key. This wires the resolver to the same
/// upstreams the aggregator reads; a document-database store would sit
/// behind the same trait.
pub struct FetcherStore<F> {
    fetcher: F,
}

impl<F: SourceFetcher> FetcherStore<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl<F: SourceFetcher> RecordStore for FetcherStore<F> {
    fn name(&self) -> &str {
        self.fetcher.name()
    }

    fn origin(&self) -> Origin {
        self.fetcher.origin()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ContentRecord>> {
        let batch = self.fetcher.fetch_records().await;
        Ok(batch.into_iter().find(|rec| rec.id == id))
    }

    async fn find_by_natural_key(&self, key: &str) -> Result<Option<ContentRecord>> {
        let batch = self.fetcher.fetch_records().await;
        Ok(batch.into_iter().find(|rec| rec.source_key == key))
    }
}
