//! HTTP routing for the entries service.

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::handler::SyncServer;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use daylog_entry::EntrySet;
use daylog_storage::FileEntryStore;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

type AppState = Arc<SyncServer>;

/// Builds the entries router.
pub fn router(server: Arc<SyncServer>) -> Router {
    Router::new()
        .route("/entries", get(list_entries))
        .route(
            "/entries/:id",
            get(get_entry).post(put_entry).delete(delete_entry),
        )
        .with_state(server)
}

/// Opens the data directory and serves until Ctrl-C.
pub async fn serve(config: ServerConfig) -> ServerResult<()> {
    let store = FileEntryStore::open(&config.data_dir)?;
    let server = Arc::new(SyncServer::new(Arc::new(store)));
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        data_dir = %config.data_dir.display(),
        "entries server listening"
    );
    serve_listener(listener, server, shutdown_signal()).await
}

/// Serves on an already bound listener until `shutdown` resolves.
pub async fn serve_listener<F>(
    listener: TcpListener,
    server: Arc<SyncServer>,
    shutdown: F,
) -> ServerResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(server))
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!("entries server stopped");
    Ok(())
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

fn success() -> Json<serde_json::Value> {
    Json(json!({ "status": "success" }))
}

/// Runs a store-backed handler on the blocking pool.
async fn run_blocking<T, F>(server: AppState, handler: F) -> ServerResult<T>
where
    T: Send + 'static,
    F: FnOnce(&SyncServer) -> ServerResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || handler(&server)).await?
}

async fn list_entries(State(server): State<AppState>) -> ServerResult<Json<EntrySet>> {
    tracing::debug!("GET /entries");
    run_blocking(server, SyncServer::handle_list).await.map(Json)
}

async fn get_entry(
    State(server): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    tracing::debug!(%id, "GET /entries/{{id}}");
    run_blocking(server, move |server| server.handle_get(&id))
        .await
        .map(Json)
}

async fn put_entry(
    State(server): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ServerResult<impl IntoResponse> {
    tracing::debug!(%id, len = body.len(), "POST /entries/{{id}}");
    run_blocking(server, move |server| server.handle_put(&id, &body)).await?;
    Ok(success())
}

async fn delete_entry(
    State(server): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    tracing::debug!(%id, "DELETE /entries/{{id}}");
    run_blocking(server, move |server| server.handle_delete(&id)).await?;
    Ok(success())
}
