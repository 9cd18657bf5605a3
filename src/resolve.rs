// src/resolve.rs
//
// Single-record lookup as an ordered chain of strategies, each attempted
// at most once per store: a primary-key lookup when the identifier looks
// like a native store key, then a natural-key (slug) lookup. An origin
// hint restricts both attempts to that origin's stores. `NotFound` is a
// normal terminal outcome, not an error.

use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::record::{ContentRecord, Origin};

/// Repository seam over one backing store (document database, or a
/// fetcher-backed scan — see `store::FetcherStore`).
#[async_trait]
pub trait RecordStore: Send + Sync {
    fn name(&self) -> &str;
    fn origin(&self) -> Origin;
    async fn find_by_id(&self, id: &str) -> Result<Option<ContentRecord>>;
    async fn find_by_natural_key(&self, key: &str) -> Result<Option<ContentRecord>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(ContentRecord),
    NotFound,
}

impl Resolution {
    pub fn into_option(self) -> Option<ContentRecord> {
        match self {
            Resolution::Found(rec) => Some(rec),
            Resolution::NotFound => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    PrimaryKey,
    NaturalKey,
}

/// 24-hex document-store object id, or an all-numeric CMS post id.
pub fn looks_like_primary_key(identifier: &str) -> bool {
    static RE_OBJECT_ID: OnceCell<Regex> = OnceCell::new();
    let re_oid = RE_OBJECT_ID.get_or_init(|| Regex::new(r"^[0-9a-fA-F]{24}$").unwrap());

    static RE_NUMERIC: OnceCell<Regex> = OnceCell::new();
    let re_num = RE_NUMERIC.get_or_init(|| Regex::new(r"^\d+$").unwrap());

    re_oid.is_match(identifier) || re_num.is_match(identifier)
}

/// The strategy list is data, not nested handlers: the primary-key step
/// only joins the chain when the identifier has a native key shape.
fn strategies_for(identifier: &str) -> Vec<Strategy> {
    let mut chain = Vec::with_capacity(2);
    if looks_like_primary_key(identifier) {
        chain.push(Strategy::PrimaryKey);
    }
    chain.push(Strategy::NaturalKey);
    chain
}

/// Resolve one record by identifier. A store error counts as a miss for
/// that strategy (logged), keeping the outcome `Found`/`NotFound`-valued.
pub async fn resolve(
    identifier: &str,
    origin_hint: Option<Origin>,
    stores: &[Box<dyn RecordStore>],
) -> Resolution {
    for strategy in strategies_for(identifier) {
        for store in stores {
            if let Some(hint) = origin_hint {
                if store.origin() != hint {
                    continue;
                }
            }
            let attempt = match strategy {
                Strategy::PrimaryKey => store.find_by_id(identifier).await,
                Strategy::NaturalKey => store.find_by_natural_key(identifier).await,
            };
            match attempt {
                Ok(Some(rec)) => return Resolution::Found(rec),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        error = ?e,
                        store = store.name(),
                        strategy = ?strategy,
                        "store lookup failed; treating as miss"
                    );
                }
            }
        }
    }
    Resolution::NotFound
}
