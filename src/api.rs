// src/api.rs
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::aggregate::aggregate;
use crate::config::SourceConfig;
use crate::fetch::{HttpFetcher, SourceFetcher};
use crate::record::{ContentRecord, Origin};
use crate::resolve::{resolve, RecordStore, Resolution};
use crate::store::FetcherStore;

#[derive(Clone)]
pub struct AppState {
    fetchers: Arc<Vec<Box<dyn SourceFetcher>>>,
    stores: Arc<Vec<Box<dyn RecordStore>>>,
}

impl AppState {
    pub fn new(fetchers: Vec<Box<dyn SourceFetcher>>, stores: Vec<Box<dyn RecordStore>>) -> Self {
        Self {
            fetchers: Arc::new(fetchers),
            stores: Arc::new(stores),
        }
    }

    /// Build the fetch chain and matching stores from the configured
    /// sources, in priority (file) order.
    pub fn from_configs(configs: &[SourceConfig]) -> Result<Self> {
        let mut fetchers: Vec<Box<dyn SourceFetcher>> = Vec::with_capacity(configs.len());
        let mut stores: Vec<Box<dyn RecordStore>> = Vec::with_capacity(configs.len());
        for cfg in configs {
            fetchers.push(Box::new(HttpFetcher::new(cfg)?));
            stores.push(Box::new(FetcherStore::new(HttpFetcher::new(cfg)?)));
        }
        Ok(Self::new(fetchers, stores))
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/content", get(list_content))
        .route("/content/{id}", get(get_content))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// List endpoint: always 200, worst case the static placeholder set.
async fn list_content(State(state): State<AppState>) -> Json<Vec<ContentRecord>> {
    Json(aggregate(&state.fetchers).await)
}

#[derive(serde::Deserialize)]
struct DetailQuery {
    origin: Option<String>,
}

#[derive(serde::Serialize)]
struct NotFoundBody {
    error: &'static str,
    id: String,
}

/// Detail endpoint. A miss is a well-formed 404 body, never a 5xx; the
/// page renders its own "not available" state from it.
async fn get_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<DetailQuery>,
) -> impl IntoResponse {
    let hint = q.origin.as_deref().and_then(Origin::parse);
    match resolve(&id, hint, &state.stores).await {
        Resolution::Found(rec) => Json(rec).into_response(),
        Resolution::NotFound => (
            StatusCode::NOT_FOUND,
            Json(NotFoundBody {
                error: "not_found",
                id,
            }),
        )
            .into_response(),
    }
}
