//! HTTP server for the flashcard UI.
//!
//! Routes:
//! - `GET /papers?limit&offset`: one page of enriched papers
//! - `GET /papers/{id}/content`: full text for one paper
//! - `GET /`, `GET /health`: liveness

use std::net::SocketAddr;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    response::IntoResponse,
    routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{ApiError, ApiResult};
use crate::models::{PaperContent, PapersPage, PapersQuery};
use crate::pipeline::PaperPipeline;

/// GrugTok HTTP server.
#[derive(Debug, Clone)]
pub struct GrugServer {
    pipeline: PaperPipeline,
}

impl GrugServer {
    /// Create a new server around a pipeline.
    #[must_use]
    pub const fn new(pipeline: PaperPipeline) -> Self {
        Self { pipeline }
    }

    /// Build the router without binding a socket.
    #[must_use]
    pub fn router(self) -> Router {
        create_router(self.pipeline)
    }

    /// Serve on `0.0.0.0:port` until Ctrl+C.
    ///
    /// # Errors
    ///
    /// Returns error on server failure.
    pub async fn run(self, port: u16) -> anyhow::Result<()> {
        let router = self.router();
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("HTTP server listening on http://{}", addr);

        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }
}

/// Create the HTTP router.
pub fn create_router(pipeline: PaperPipeline) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/papers", get(list_papers))
        .route("/papers/{id}/content", get(paper_content))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(pipeline)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "grugtok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn list_papers(
    State(pipeline): State<PaperPipeline>,
    query: Result<Query<PapersQuery>, QueryRejection>,
) -> ApiResult<Json<PapersPage>> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let (limit, offset) = (query.limit(), query.offset());

    tracing::info!(limit, offset, "Fetching papers");
    let page = pipeline.page(limit, offset).await?;
    tracing::info!(count = page.papers.len(), has_more = page.has_more, "Returning papers");

    Ok(Json(page))
}

async fn paper_content(
    State(pipeline): State<PaperPipeline>,
    Path(id): Path<String>,
) -> ApiResult<Json<PaperContent>> {
    tracing::info!(id = %id, "Fetching paper content");
    Ok(Json(pipeline.content(&id).await?))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install CTRL+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
