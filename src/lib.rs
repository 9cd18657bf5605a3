// src/lib.rs
// Public library surface for integration tests (and the service binary).

pub mod aggregate;
pub mod api;
pub mod config;
pub mod fetch;
pub mod normalize;
pub mod record;
pub mod resolve;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::aggregate;
pub use crate::api::{create_router, AppState};
pub use crate::fetch::{HttpFetcher, ResponseShape, SourceFetcher};
pub use crate::record::{ContentRecord, Image, Origin};
pub use crate::resolve::{resolve, RecordStore, Resolution};
pub use crate::store::FetcherStore;
