use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::json;
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::roster::RosterStore;

/// HTTPサーバー用の共有状態
#[derive(Clone)]
pub struct HttpState {
    pub store: RosterStore,
}

/// ルーターを構築
pub fn build_router(store: RosterStore) -> Router {
    let state = HttpState { store };

    Router::new()
        .route("/", get(get_snapshot))
        .route("/api/health", get(health_check))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTPサーバーを起動
///
/// `shutdown` が完了すると新規接続の受付をやめ、処理中のリクエストを捌いてから戻る。
pub async fn start_http_server<F>(
    listener: TcpListener,
    store: RosterStore,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(store);

    log::info!("HTTP server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

/// ヘルスチェックエンドポイント
async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "server": "live-roster",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// 名簿スナップショット
///
/// 更新サイクルを待たず、最後に公開された名簿をそのまま返す。
async fn get_snapshot(State(state): State<HttpState>) -> Response {
    let members = state.store.snapshot().await;

    match serde_json::to_vec(members.as_slice()) {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => {
            log::error!("Failed to serialize roster snapshot: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to serialize roster" })),
            )
                .into_response()
        }
    }
}
