// src/aggregate.rs
use std::collections::HashSet;

use futures::future::join_all;

use crate::fetch::SourceFetcher;
use crate::record::ContentRecord;

/// Merge every configured source into one de-duplicated, newest-first
/// list. All sources fetch concurrently, so the worst case costs one
/// request timeout rather than the sum of them; the merge below walks
/// the completed batches in priority order, so dedup outcomes stay
/// deterministic no matter which request finishes first. Each fetcher
/// is isolated: one source failing (which its fetcher reports as an
/// empty batch) never stops the rest of the chain.
///
/// Never fails; total upstream exhaustion yields the static placeholder
/// set so list pages always have something to render.
pub async fn aggregate(fetchers: &[Box<dyn SourceFetcher>]) -> Vec<ContentRecord> {
    let batches = join_all(fetchers.iter().map(|f| f.fetch_records())).await;

    let mut merged: Vec<ContentRecord> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut dedup_out = 0usize;

    for (fetcher, batch) in fetchers.iter().zip(batches) {
        tracing::debug!(source = fetcher.name(), records = batch.len(), "source fetched");

        for rec in batch {
            // First writer wins: the higher-priority source keeps the key.
            if !seen.insert(rec.source_key.clone()) {
                dedup_out += 1;
                continue;
            }
            merged.push(rec);
        }
    }

    if dedup_out > 0 {
        tracing::debug!(dropped = dedup_out, "duplicate natural keys discarded");
    }

    if merged.is_empty() {
        tracing::warn!("all sources returned nothing; serving static placeholders");
        merged = ContentRecord::placeholders();
    }

    // Stable sort: ties keep priority/insertion order.
    merged.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    merged
}
