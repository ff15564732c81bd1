use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use replica_api::{ItemIndex, QueryResponse, RecordKey};

#[derive(Clone)]
struct AppState {
    index: Arc<dyn ItemIndex>,
}

/// HTTP query gateway поверх выбранного индекса.
pub async fn run(
    port: u16,
    index: Arc<dyn ItemIndex>,
    shutdown: CancellationToken,
) -> Result<(), String> {
    let listener = bind(port).await?;
    serve(listener, index, shutdown).await
}

/// Занять порт заранее, чтобы ошибка bind остановила старт процесса.
pub async fn bind(port: u16) -> Result<TcpListener, String> {
    TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .map_err(|e| format!("bind api :{port}: {e}"))
}

pub async fn serve(
    listener: TcpListener,
    index: Arc<dyn ItemIndex>,
    shutdown: CancellationToken,
) -> Result<(), String> {
    let addr = listener.local_addr().map_err(|e| format!("api listener: {e}"))?;
    tracing::info!(%addr, backend = index.name(), "query gateway listening");

    axum::serve(listener, router(index))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| format!("axum serve: {e}"))?;

    Ok(())
}

pub fn router(index: Arc<dyn ItemIndex>) -> Router {
    Router::new()
        .route("/ping", get(handle_ping))
        .route("/document", get(handle_document))
        .with_state(AppState { index })
}

// --- GET /ping ---

async fn handle_ping() -> &'static str {
    "pong"
}

// --- GET /document?id=X | ?color=Y ---

#[derive(Deserialize)]
struct DocumentParams {
    id: Option<String>,
    color: Option<String>,
}

async fn handle_document(
    State(state): State<AppState>,
    Query(params): Query<DocumentParams>,
) -> impl IntoResponse {
    let response = match (params.id, params.color) {
        (Some(id), _) => lookup_by_key(&*state.index, &id).await,
        (None, Some(color)) => lookup_by_color(&*state.index, &color).await,
        (None, None) => QueryResponse::failure("expected one of the query parameters: id, color"),
    };
    axum::Json(response)
}

async fn lookup_by_key(index: &dyn ItemIndex, raw: &str) -> QueryResponse {
    let key = match RecordKey::parse(raw) {
        Ok(key) => key,
        Err(e) => {
            tracing::debug!(id = %raw, error = %e, "malformed key");
            return QueryResponse::not_found();
        }
    };
    match index.get_by_key(&key).await {
        Ok(item) => QueryResponse::lookup(item),
        Err(e) => {
            tracing::warn!(%key, error = %e, "lookup by key failed");
            QueryResponse::not_found()
        }
    }
}

async fn lookup_by_color(index: &dyn ItemIndex, color: &str) -> QueryResponse {
    match index.get_by_attribute(Some(color)).await {
        Ok(items) => QueryResponse::items(items),
        Err(e) => {
            tracing::warn!(%color, error = %e, "lookup by color failed");
            QueryResponse::items(Vec::new())
        }
    }
}
