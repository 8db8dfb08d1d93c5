use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::api::response;
use crate::query::{NewsFilters, NewsService};

#[derive(Clone)]
pub struct AppState {
    pub service: NewsService,
}

/// Raw query string of `GET /api/news`. Everything is an optional string.
#[derive(Debug, Default, Deserialize)]
pub struct NewsParams {
    pub country: Option<String>,
    pub sector: Option<String>,
    pub company: Option<String>,
    pub limit: Option<String>,
}

impl NewsParams {
    /// Empty values count as absent; a limit that is not a positive integer is ignored.
    pub fn into_filters(self) -> NewsFilters {
        let present = |v: Option<String>| v.filter(|s| !s.is_empty());

        NewsFilters {
            country: present(self.country),
            sector: present(self.sector),
            company: present(self.company),
            limit: self
                .limit
                .and_then(|l| l.trim().parse::<i64>().ok())
                .filter(|&l| l > 0)
                .and_then(|l| usize::try_from(l).ok()),
        }
    }
}

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/news", get(news_handler))
        .route("/api/scopes", get(scopes_handler))
        .route("/health", get(health_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn news_handler(
    State(state): State<AppState>,
    Query(params): Query<NewsParams>,
) -> impl IntoResponse {
    let filters = params.into_filters();
    info!("Processing news request: {:?}", filters);

    let service = state.service.clone();
    match tokio::spawn(async move { service.query(&filters).await }).await {
        Ok(news) => response::list(news).into_response(),
        Err(e) => {
            error!("Error fetching news: {}", e);
            response::error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch news").into_response()
        }
    }
}

async fn scopes_handler(State(state): State<AppState>) -> impl IntoResponse {
    response::list(state.service.scopes())
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
