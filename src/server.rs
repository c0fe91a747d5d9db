use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Extension, Router,
};
use hyper::Server;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::cache::LoadCache;
use crate::config::DisplayConfig;
use crate::constants::EXPORT_FILE_NAME;
use crate::dashboard::{compare, recompute, Comparison, DashboardParams, Snapshot};
use crate::error::Result;
use crate::export::to_csv_bytes;
use crate::pipeline::processing::filter::{facet_options, Facet, FilterSet};
use crate::pipeline::processing::tiering::{annotate_tiers, TierThresholds};
use crate::pipeline::BaseTable;

/// Shared server state: the current base table and how to reload it
pub struct AppState {
    source_path: PathBuf,
    cache: LoadCache,
    base: RwLock<Arc<BaseTable>>,
    defaults: DashboardParams,
}

impl AppState {
    /// Load the source once; a failed load means there is nothing to serve
    pub fn load(source_path: PathBuf, defaults: DashboardParams) -> Result<Self> {
        let cache = LoadCache::new();
        let base = cache.load(&source_path)?;
        Ok(Self {
            source_path,
            cache,
            base: RwLock::new(base),
            defaults,
        })
    }

    fn current(&self) -> Arc<BaseTable> {
        Arc::clone(&self.base.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Swap in the latest source contents; the old table stays on failure
    fn reload(&self) -> Result<Arc<BaseTable>> {
        let fresh = self.cache.load(&self.source_path)?;
        *self.base.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&fresh);
        Ok(fresh)
    }
}

type SharedState = Arc<AppState>;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    rows: usize,
    source_sha256: String,
}

async fn health(Extension(state): Extension<SharedState>) -> impl IntoResponse {
    let base = state.current();
    Json(HealthResponse {
        status: "healthy",
        service: "tam-dashboard",
        version: env!("CARGO_PKG_VERSION"),
        rows: base.table.len(),
        source_sha256: base.source_sha256.clone(),
    })
}

/// Run a full-table computation off the async executor
async fn run_blocking<T, F>(work: F) -> std::result::Result<T, Response>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        error!("Dashboard computation failed: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
    })
}

/// Selectable values per facet; `null` marks a facet with no column.
/// Tier options come from the tiers the filter engine matches against.
async fn facets(Extension(state): Extension<SharedState>) -> Response {
    let base = state.current();
    let thresholds = state.defaults.thresholds;
    let options = run_blocking(move || {
        let tiered = annotate_tiers(&base.table, &thresholds);
        Facet::ALL
            .into_iter()
            .map(|facet| (facet.name(), facet_options(&tiered, facet)))
            .collect::<BTreeMap<&'static str, Option<Vec<String>>>>()
    })
    .await;
    match options {
        Ok(options) => Json(options).into_response(),
        Err(response) => response,
    }
}

/// Request body: any omitted part falls back to the configured defaults
#[derive(Debug, Default, Deserialize)]
struct ParamsRequest {
    filters: Option<FilterSet>,
    thresholds: Option<TierThresholds>,
    display: Option<DisplayConfig>,
}

impl ParamsRequest {
    fn resolve(self, defaults: &DashboardParams) -> DashboardParams {
        DashboardParams {
            filters: self
                .filters
                .map(|f| f.canonicalized())
                .unwrap_or_else(|| defaults.filters.clone()),
            thresholds: self.thresholds.unwrap_or(defaults.thresholds),
            display: self.display.unwrap_or_else(|| defaults.display.clone()),
        }
    }
}

async fn snapshot(
    Extension(state): Extension<SharedState>,
    Json(request): Json<ParamsRequest>,
) -> Response {
    let params = request.resolve(&state.defaults);
    let base = state.current();
    match run_blocking(move || recompute(&base.table, &params).snapshot).await {
        Ok(snapshot) => Json::<Snapshot>(snapshot).into_response(),
        Err(response) => response,
    }
}

#[derive(Debug, Deserialize)]
struct CompareRequest {
    #[serde(default)]
    left: ParamsRequest,
    #[serde(default)]
    right: ParamsRequest,
}

async fn compare_views(
    Extension(state): Extension<SharedState>,
    Json(request): Json<CompareRequest>,
) -> Response {
    let left = request.left.resolve(&state.defaults);
    let right = request.right.resolve(&state.defaults);
    let base = state.current();
    match run_blocking(move || compare(&base.table, &left, &right)).await {
        Ok(comparison) => Json::<Comparison>(comparison).into_response(),
        Err(response) => response,
    }
}

async fn export_csv(
    Extension(state): Extension<SharedState>,
    Json(request): Json<ParamsRequest>,
) -> Response {
    let params = request.resolve(&state.defaults);
    let base = state.current();
    let exported = run_blocking(move || to_csv_bytes(&recompute(&base.table, &params).filtered)).await;
    let exported = match exported {
        Ok(exported) => exported,
        Err(response) => return response,
    };
    match exported {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            error!("Export failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn reload(Extension(state): Extension<SharedState>) -> Response {
    match state.reload() {
        Ok(base) => {
            info!(rows = base.table.len(), "Reloaded source");
            Json(serde_json::json!({
                "rows": base.table.len(),
                "source_sha256": base.source_sha256,
                "report": base.report,
            }))
            .into_response()
        }
        Err(e) => {
            error!("Reload failed: {}", e);
            (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).into_response()
        }
    }
}

async fn metrics_text() -> Response {
    match crate::metrics::render() {
        Some(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}

/// Router with every dashboard route
pub fn create_server(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/facets", get(facets))
        .route("/snapshot", post(snapshot))
        .route("/compare", post(compare_views))
        .route("/export", post(export_csv))
        .route("/reload", post(reload))
        .route("/metrics", get(metrics_text))
        .layer(Extension(state))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(state: SharedState, port: u16) -> anyhow::Result<()> {
    let app = create_server(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("HTTP server running on http://localhost:{port}");
    info!("Health check: http://localhost:{port}/health");

    Server::bind(&addr).serve(app.into_make_service()).await?;
    Ok(())
}
